//! The reference card catalog.
//!
//! A [`CardCatalog`] is built once per session (see [`crate::remote`]) and
//! then passed by reference to whatever needs to look cards up.

use crate::{CatalogCard, Result};
use std::collections::HashSet;
use std::path::Path;

/// Immutable, normalized list of known cards
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: Vec<CatalogCard>,
}

impl CardCatalog {
    /// Build a catalog, normalizing name and set to trimmed lowercase
    pub fn new(cards: Vec<CatalogCard>) -> Self {
        let cards = cards
            .into_iter()
            .map(|card| CatalogCard {
                name: card.name.trim().to_lowercase(),
                set: card.set.trim().to_lowercase(),
                id: card.id.trim().to_string(),
            })
            .collect();
        Self { cards }
    }

    /// Catalog with no cards; every search comes back empty
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a catalog from a JSON array of `{name, set, id}` objects
    ///
    /// Missing fields read as empty. Cards left without a name or an id
    /// cannot be searched for or added, so they are skipped with a warning.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let cards: Vec<CatalogCard> = serde_json::from_str(&contents)?;
        let total = cards.len();

        let cards: Vec<CatalogCard> = cards
            .into_iter()
            .enumerate()
            .filter_map(|(idx, card)| {
                if card.name.trim().is_empty() || card.id.trim().is_empty() {
                    tracing::warn!(
                        "Skipping card #{} in {:?}: missing name or id",
                        idx + 1,
                        path
                    );
                    None
                } else {
                    Some(card)
                }
            })
            .collect();

        tracing::debug!("Read {} of {} cards from {:?}", cards.len(), total, path);
        Ok(Self::new(cards))
    }

    /// All cards in catalog order
    pub fn cards(&self) -> &[CatalogCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Case-insensitive substring search over card name and set
    ///
    /// The iterator is lazy and `Clone`, so a caller can count the matches
    /// and walk them again without searching twice. A blank term matches
    /// nothing.
    pub fn search<'a>(&'a self, term: &str) -> Search<'a> {
        Search {
            cards: self.cards.iter(),
            term: term.trim().to_lowercase(),
        }
    }

    /// Exact, case-insensitive lookup by card id
    pub fn find_by_id(&self, id: &str) -> Option<&CatalogCard> {
        let needle = id.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.cards.iter().find(|c| c.id.to_lowercase() == needle)
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen_ids = HashSet::new();

        for (idx, card) in self.cards.iter().enumerate() {
            if card.name.is_empty() {
                errors.push(format!("Card #{} ({}) has empty name", idx + 1, card.id));
            }
            if card.id.is_empty() {
                errors.push(format!("Card #{} ({}) has empty ID", idx + 1, card.name));
            } else if !seen_ids.insert(card.id.to_lowercase()) {
                errors.push(format!("Duplicate card ID '{}'", card.id));
            }
        }

        errors
    }
}

/// Lazy search over a [`CardCatalog`], in catalog order
#[derive(Clone, Debug)]
pub struct Search<'a> {
    cards: std::slice::Iter<'a, CatalogCard>,
    term: String,
}

impl<'a> Iterator for Search<'a> {
    type Item = &'a CatalogCard;

    fn next(&mut self) -> Option<Self::Item> {
        if self.term.is_empty() {
            return None;
        }
        let term = &self.term;
        self.cards
            .by_ref()
            .find(|c| c.name.contains(term.as_str()) || c.set.contains(term.as_str()))
    }
}
