#![forbid(unsafe_code)]

//! Core domain model and business logic for Deckbook.
//!
//! This crate provides:
//! - Domain types (catalog cards, deck entries, battle records)
//! - Card catalog search and loading
//! - Deck composition rules (copy limits)
//! - Battle ledger and statistics
//! - Deck persistence

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod remote;
pub mod composition;
pub mod ledger;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::CardCatalog;
pub use config::Config;
pub use remote::{CatalogLoader, CatalogSource, LoadedCatalog};
pub use composition::{AddOutcome, CompositionEngine, RemoveOutcome};
pub use ledger::BattleStats;
pub use store::{DeckStore, JsonDeckStore, LoadStatus, LoadedDeck};
