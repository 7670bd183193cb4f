//! Deck persistence with file locking.
//!
//! Each deck lives in its own pretty-printed JSON file,
//! `<decks_dir>/<name>.json`, holding the card entries and the battle
//! history. Reads take a shared lock; writes go to a locked temp file that
//! is renamed over the original.

use crate::{BattleRecord, Deck, DeckEntry, Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// On-disk deck record; both keys are optional when reading
#[derive(Debug, Default, Serialize, Deserialize)]
struct DeckFile {
    #[serde(default)]
    cards: Vec<DeckEntry>,
    #[serde(default)]
    battle_history: Vec<BattleRecord>,
}

/// How a deck came out of the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// No saved file; the deck starts empty
    New,
    /// Read from disk
    Loaded,
    /// The file could not be read or parsed; the deck starts empty and the
    /// file is left as is until the next save
    Reset(String),
}

/// A deck plus how it was loaded
#[derive(Clone, Debug)]
pub struct LoadedDeck {
    pub deck: Deck,
    pub status: LoadStatus,
}

/// Load/save capability for decks keyed by name
pub trait DeckStore {
    fn load(&self, name: &str) -> Result<LoadedDeck>;
    fn save(&self, deck: &Deck) -> Result<()>;
}

/// Stores each deck as a JSON file in one directory
#[derive(Clone, Debug)]
pub struct JsonDeckStore {
    decks_dir: PathBuf,
}

impl JsonDeckStore {
    /// Create a store for the given directory
    pub fn new(decks_dir: impl Into<PathBuf>) -> Self {
        Self {
            decks_dir: decks_dir.into(),
        }
    }

    pub fn decks_dir(&self) -> &Path {
        &self.decks_dir
    }

    /// File path for a deck name
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.decks_dir.join(format!("{}.json", name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }

    /// Names of all saved decks, sorted
    pub fn list_decks(&self) -> Result<Vec<String>> {
        if !self.decks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut decks = Vec::new();
        for entry in std::fs::read_dir(&self.decks_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                decks.push(stem.to_string());
            }
        }
        decks.sort();
        Ok(decks)
    }

    /// Create and save a new, empty deck
    pub fn create_deck(&self, name: &str) -> Result<Deck> {
        let name = validate_deck_name(name)?;
        if self.exists(name) {
            return Err(Error::DeckExists(name.to_string()));
        }

        let deck = Deck::new(name);
        self.save(&deck)?;
        tracing::info!("Created deck '{}'", name);
        Ok(deck)
    }
}

impl DeckStore for JsonDeckStore {
    /// Load a deck
    ///
    /// Returns an empty deck if the file doesn't exist. If the file can't be
    /// read or parsed, logs a warning and returns an empty deck.
    fn load(&self, name: &str) -> Result<LoadedDeck> {
        let name = validate_deck_name(name)?;
        let path = self.path_for(name);

        if !path.exists() {
            tracing::info!("No deck file at {:?}, starting new deck '{}'", path, name);
            return Ok(LoadedDeck {
                deck: Deck::new(name),
                status: LoadStatus::New,
            });
        }

        let reset = |reason: String| {
            tracing::warn!("{}. Starting with an empty deck.", reason);
            LoadedDeck {
                deck: Deck::new(name),
                status: LoadStatus::Reset(reason),
            }
        };

        let contents = match read_locked(&path) {
            Ok(contents) => contents,
            Err(e) => return Ok(reset(format!("Unable to read {:?}: {}", path, e))),
        };

        match serde_json::from_str::<DeckFile>(&contents) {
            Ok(file) => {
                tracing::debug!(
                    "Loaded deck '{}' ({} entries, {} battles) from {:?}",
                    name,
                    file.cards.len(),
                    file.battle_history.len(),
                    path
                );
                Ok(LoadedDeck {
                    deck: Deck::from_parts(name, file.cards, file.battle_history),
                    status: LoadStatus::Loaded,
                })
            }
            Err(e) => Ok(reset(format!("Error decoding {:?}: {}", path, e))),
        }
    }

    /// Save a deck atomically
    ///
    /// 1. Write to a temp file in the decks directory
    /// 2. Sync to disk
    /// 3. Rename over the original
    fn save(&self, deck: &Deck) -> Result<()> {
        let name = validate_deck_name(&deck.name)?;
        std::fs::create_dir_all(&self.decks_dir)?;
        let path = self.path_for(name);

        let file = DeckFile {
            cards: deck.entries().to_vec(),
            battle_history: deck.battle_history().to_vec(),
        };

        let temp = NamedTempFile::new_in(&self.decks_dir)?;
        temp.as_file().lock_exclusive()?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &file)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved deck '{}' to {:?}", name, path);
        Ok(())
    }
}

/// Read a whole file under a shared lock
fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;
    Ok(contents)
}

/// Deck names become file names: no blanks, no path separators
fn validate_deck_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains(|c: char| c == '/' || c == '\\' || c.is_control())
    {
        return Err(Error::InvalidDeckName(name.to_string()));
    }
    Ok(trimmed)
}
