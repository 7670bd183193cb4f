//! Core domain types for Deckbook.
//!
//! This module defines the fundamental types used throughout the system:
//! - Catalog cards and their display casing
//! - Deck entries and the deck aggregate
//! - Battle records and outcomes

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum copies of one card name across all of its prints
pub const GLOBAL_COPY_LIMIT: u32 = 2;

/// Maximum copies of a single (name, set) print
pub const SET_COPY_LIMIT: u32 = 2;

// ============================================================================
// Catalog Types
// ============================================================================

/// A card known to the reference catalog
///
/// `name` and `set` are lowercase once the card is inside a
/// [`crate::CardCatalog`]; use the display helpers for output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogCard {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub set: String,
    #[serde(default)]
    pub id: String,
}

impl CatalogCard {
    /// Card name as stored in decks ("pikachu ex" -> "Pikachu ex")
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }

    /// Set name as stored in decks ("genetic apex (a1)" -> "Genetic Apex (A1)")
    pub fn display_set(&self) -> String {
        title_case(&self.set)
    }
}

impl fmt::Display for CatalogCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Set: {}, ID: {})",
            self.display_name(),
            self.display_set(),
            self.id
        )
    }
}

/// Uppercase the first character and lowercase the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
///
/// Digits and punctuation end a run, so "a1" becomes "A1" and "(a1b)"
/// becomes "(A1B)".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

// ============================================================================
// Deck Types
// ============================================================================

/// All owned copies of one card print in a deck
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeckEntry {
    pub name: String,
    pub set: String,
    pub count: u32,
}

impl DeckEntry {
    /// Case-insensitive match on the (name, set) uniqueness key
    pub fn is_print(&self, name: &str, set: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
            && self.set.to_lowercase() == set.to_lowercase()
    }
}

impl fmt::Display for DeckEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} from {}", self.name, self.count, self.set)
    }
}

/// A deck: owned card entries plus its battle history
///
/// Entries are only mutated through the composition operations and the
/// history only grows through the battle ledger, so the copy limits hold for
/// every deck built in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deck {
    pub name: String,
    pub(crate) entries: Vec<DeckEntry>,
    pub(crate) battle_history: Vec<BattleRecord>,
}

impl Deck {
    /// Create an empty deck
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            battle_history: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        name: impl Into<String>,
        entries: Vec<DeckEntry>,
        battle_history: Vec<BattleRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            entries,
            battle_history,
        }
    }

    /// Entries in insertion (display) order
    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    /// Battle records, oldest first
    pub fn battle_history(&self) -> &[BattleRecord] {
        &self.battle_history
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of cards in the deck
    pub fn card_count(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

// ============================================================================
// Battle Types
// ============================================================================

/// Outcome of a battle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BattleResult {
    #[serde(rename = "W", alias = "w")]
    Win,
    #[serde(rename = "L", alias = "l")]
    Loss,
}

impl FromStr for BattleResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "w" | "win" => Ok(BattleResult::Win),
            "l" | "loss" => Ok(BattleResult::Loss),
            _ => Err(Error::InvalidResult(s.to_string())),
        }
    }
}

impl fmt::Display for BattleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleResult::Win => f.write_str("W"),
            BattleResult::Loss => f.write_str("L"),
        }
    }
}

/// One logged battle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BattleRecord {
    #[serde(rename = "date")]
    pub timestamp: String,
    pub result: BattleResult,
    #[serde(default)]
    pub opponent: String,
}
