//! Error types for the deckbook_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for deckbook_core operations
///
/// Rule outcomes (limits, unknown cards, bad removal positions) are not
/// errors; they come back as [`crate::AddOutcome`] / [`crate::RemoveOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP error while talking to the card database
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Disambiguation choice outside the candidate list (1-based)
    #[error("Invalid selection {selection}: expected a number between 1 and {candidates}")]
    InvalidSelection { selection: usize, candidates: usize },

    /// Battle outcome that is neither a win nor a loss
    #[error("Invalid battle result '{0}': use W or L")]
    InvalidResult(String),

    /// Deck name that cannot be used as a file name
    #[error("Invalid deck name '{0}'")]
    InvalidDeckName(String),

    /// A deck with this name is already saved
    #[error("A deck named '{0}' already exists")]
    DeckExists(String),

    /// No saved deck with this name
    #[error("Deck '{0}' not found. Create it first with `deckbook new {0}`")]
    DeckNotFound(String),

    /// Catalog data error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
