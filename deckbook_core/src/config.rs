//! Configuration file support for Deckbook.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/deckbook/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Card database configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_cards_url")]
    pub cards_url: String,

    #[serde(default = "default_sets_url")]
    pub sets_url: String,

    /// Local cache file; relative paths are resolved against the data dir
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Never contact the card database, read the cache only
    #[serde(default)]
    pub offline: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cards_url: default_cards_url(),
            sets_url: default_sets_url(),
            cache_file: default_cache_file(),
            timeout_secs: default_timeout_secs(),
            offline: false,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("deckbook")
}

fn default_cards_url() -> String {
    "https://raw.githubusercontent.com/flibustier/pokemon-tcg-pocket-database/main/dist/cards.json"
        .into()
}

fn default_sets_url() -> String {
    "https://raw.githubusercontent.com/flibustier/pokemon-tcg-pocket-database/main/dist/sets.json"
        .into()
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("valid_cards.json")
}

fn default_timeout_secs() -> u64 {
    15
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("deckbook").join("config.toml")
    }

    /// Reject settings the rest of the system cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.catalog.timeout_secs == 0 {
            return Err(Error::Config("catalog.timeout_secs must be positive".into()));
        }
        if self.catalog.cache_file.as_os_str().is_empty() {
            return Err(Error::Config("catalog.cache_file must not be empty".into()));
        }
        Ok(())
    }

    /// Directory holding one JSON file per deck
    pub fn decks_dir(&self) -> PathBuf {
        self.data.data_dir.join("decks")
    }

    /// Resolved path of the local catalog cache
    pub fn catalog_cache_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.catalog.cache_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data.data_dir.ends_with("deckbook"));
        assert_eq!(config.catalog.timeout(), Duration::from_secs(15));
        assert!(!config.catalog.offline);
        assert!(config.catalog.cards_url.ends_with("cards.json"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[data]
data_dir = "/tmp/decks-home"

[catalog]
offline = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.catalog.offline);
        assert_eq!(config.catalog.timeout_secs, 15); // default
        assert_eq!(config.decks_dir(), PathBuf::from("/tmp/decks-home/decks"));
        assert_eq!(
            config.catalog_cache_path(),
            PathBuf::from("/tmp/decks-home/valid_cards.json")
        );
    }

    #[test]
    fn test_absolute_cache_file_wins() {
        let mut config = Config::default();
        config.catalog.cache_file = PathBuf::from("/srv/cards.json");
        assert_eq!(config.catalog_cache_path(), PathBuf::from("/srv/cards.json"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[catalog]\ntimeout_secs = 5\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.catalog.timeout_secs, 5);
        assert_eq!(loaded.catalog.sets_url, default_sets_url());
        assert!(loaded.data.data_dir.ends_with("deckbook"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[catalog]\ntimeout_secs = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
