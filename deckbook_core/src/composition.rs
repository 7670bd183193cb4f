//! Deck composition rules.
//!
//! A deck may hold at most two copies of a card name across all of its
//! prints, and at most two copies of any single (name, set) print. The global
//! limit is checked first, so a name already at two copies is rejected even
//! when the requested print has none.
//!
//! Adding is a two-step flow when a search term is ambiguous:
//! [`CompositionEngine::add_card`] returns the candidates, and the caller
//! picks one and continues with [`CompositionEngine::resolve`].

use crate::{
    CardCatalog, CatalogCard, Deck, DeckEntry, Error, Result, GLOBAL_COPY_LIMIT,
    SET_COPY_LIMIT,
};

/// Result of an add attempt
#[derive(Clone, Debug, PartialEq)]
pub enum AddOutcome {
    /// A copy was added; `entry` is the entry after the change
    Added { entry: DeckEntry, total_copies: u32 },
    /// More than one catalog card matched; pick one (1-based) and resolve
    AmbiguousNeedsChoice(Vec<CatalogCard>),
    /// The deck already holds the maximum copies of this name
    AtGlobalLimit { name: String, total_copies: u32 },
    /// The deck already holds the maximum copies of this print
    AtSetLimit { name: String, set: String },
    /// Nothing in the catalog matched
    NotFound,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }
}

/// Result of a removal attempt
#[derive(Clone, Debug, PartialEq)]
pub enum RemoveOutcome {
    /// One copy removed; `remaining` is 0 when the entry was deleted
    Removed { entry: DeckEntry, remaining: u32 },
    /// The position does not exist; nothing changed
    InvalidIndex,
}

/// Applies the copy limits when adding catalog cards to a deck
pub struct CompositionEngine<'a> {
    catalog: &'a CardCatalog,
}

impl<'a> CompositionEngine<'a> {
    pub fn new(catalog: &'a CardCatalog) -> Self {
        Self { catalog }
    }

    /// Search the catalog (see [`CardCatalog::search`])
    pub fn search(&self, term: &str) -> crate::catalog::Search<'a> {
        self.catalog.search(term)
    }

    /// Add the card matching `term`
    pub fn add_card(&self, deck: &mut Deck, term: &str) -> AddOutcome {
        let mut matches = self.search(term);
        let first = match matches.next() {
            Some(card) => card,
            None => {
                tracing::debug!("No catalog card matches '{}'", term);
                return AddOutcome::NotFound;
            }
        };

        if matches.clone().next().is_some() {
            let candidates: Vec<CatalogCard> = std::iter::once(first)
                .chain(matches)
                .cloned()
                .collect();
            tracing::debug!("'{}' matched {} cards", term, candidates.len());
            return AddOutcome::AmbiguousNeedsChoice(candidates);
        }

        self.add_resolved(deck, first)
    }

    /// Continue an ambiguous add with the caller's 1-based `selection`
    pub fn resolve(
        &self,
        deck: &mut Deck,
        candidates: &[CatalogCard],
        selection: usize,
    ) -> Result<AddOutcome> {
        let card = selection
            .checked_sub(1)
            .and_then(|idx| candidates.get(idx))
            .ok_or(Error::InvalidSelection {
                selection,
                candidates: candidates.len(),
            })?;
        Ok(self.add_resolved(deck, card))
    }

    /// Add the catalog card with this id
    pub fn add_card_by_id(&self, deck: &mut Deck, id: &str) -> AddOutcome {
        match self.catalog.find_by_id(id) {
            Some(card) => self.add_resolved(deck, card),
            None => {
                tracing::debug!("No catalog card with id '{}'", id);
                AddOutcome::NotFound
            }
        }
    }

    /// Apply the copy limits for one resolved card
    pub fn add_resolved(&self, deck: &mut Deck, card: &CatalogCard) -> AddOutcome {
        let card_name = card.display_name();
        let card_set = card.display_set();

        let total = deck.total_copies(&card_name);
        if total >= GLOBAL_COPY_LIMIT {
            tracing::info!("{} already has {} copies across sets", card_name, total);
            return AddOutcome::AtGlobalLimit {
                name: card_name,
                total_copies: total,
            };
        }

        if let Some(entry) = deck
            .entries
            .iter_mut()
            .find(|e| e.is_print(&card_name, &card_set))
        {
            if entry.count >= SET_COPY_LIMIT {
                tracing::info!("{} from {} is at the set limit", card_name, card_set);
                return AddOutcome::AtSetLimit {
                    name: card_name,
                    set: card_set,
                };
            }
            entry.count += 1;
            tracing::info!("Added {} from {} ({} in set)", card_name, card_set, entry.count);
            return AddOutcome::Added {
                entry: entry.clone(),
                total_copies: total + 1,
            };
        }

        let entry = DeckEntry {
            name: card_name,
            set: card_set,
            count: 1,
        };
        tracing::info!("Added new entry {} from {}", entry.name, entry.set);
        deck.entries.push(entry.clone());
        AddOutcome::Added {
            entry,
            total_copies: total + 1,
        }
    }
}

impl Deck {
    /// Total copies of `card_name` across all sets (case-insensitive)
    pub fn total_copies(&self, card_name: &str) -> u32 {
        let needle = card_name.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase() == needle)
            .map(|e| e.count)
            .sum()
    }

    /// Remove one copy of the entry at 0-based `index`
    ///
    /// Deleting an entry shifts the positions of every later entry; callers
    /// must re-read [`Deck::entries`] before removing by position again.
    pub fn remove_card(&mut self, index: usize) -> RemoveOutcome {
        let Some(entry) = self.entries.get_mut(index) else {
            return RemoveOutcome::InvalidIndex;
        };

        if entry.count > 1 {
            entry.count -= 1;
            tracing::info!("Removed one {} from {}", entry.name, entry.set);
            return RemoveOutcome::Removed {
                entry: entry.clone(),
                remaining: entry.count,
            };
        }

        let entry = self.entries.remove(index);
        tracing::info!("Removed entry {} from {}", entry.name, entry.set);
        RemoveOutcome::Removed {
            entry,
            remaining: 0,
        }
    }
}
