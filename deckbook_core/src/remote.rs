//! Card catalog loading from the remote card database.
//!
//! The catalog is fetched over HTTP when possible and written to a local
//! cache file; when the database is unreachable the cache is used instead.
//! Neither failure is fatal: with no data at all the session runs against an
//! empty catalog, where every search simply finds nothing.

use crate::config::Config;
use crate::{CardCatalog, CatalogCard, Error, Result};
use fs2::FileExt;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Where the session's catalog came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Local,
    None,
}

/// A catalog plus what happened while loading it
#[derive(Clone, Debug)]
pub struct LoadedCatalog {
    pub catalog: CardCatalog,
    pub source: CatalogSource,
    /// Set when a fallback was used
    pub warning: Option<String>,
}

/// Card as published by the remote database
#[derive(Debug, Deserialize)]
pub struct RemoteCard {
    #[serde(default)]
    pub set: String,
    #[serde(default)]
    pub number: serde_json::Value,
    #[serde(default)]
    pub label: HashMap<String, String>,
}

/// Set as published by the remote database
#[derive(Debug, Deserialize)]
pub struct RemoteSet {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub label: HashMap<String, String>,
}

/// Loads the catalog with remote-then-cache fallback
#[derive(Clone, Debug)]
pub struct CatalogLoader {
    cards_url: String,
    sets_url: String,
    cache_path: PathBuf,
    timeout: Duration,
    offline: bool,
}

impl CatalogLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            cards_url: config.catalog.cards_url.clone(),
            sets_url: config.catalog.sets_url.clone(),
            cache_path: config.catalog_cache_path(),
            timeout: config.catalog.timeout(),
            offline: config.catalog.offline,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Load the catalog, degrading to the cache and then to an empty catalog
    pub fn load(&self) -> LoadedCatalog {
        let remote_error = if self.offline {
            tracing::debug!("Offline mode, skipping card database");
            None
        } else {
            match self.fetch_remote() {
                Ok(cards) => {
                    tracing::info!("Loaded {} cards from card database", cards.len());
                    if let Err(e) = self.write_cache(&cards) {
                        tracing::warn!("Failed to refresh card cache {:?}: {}", self.cache_path, e);
                    }
                    return LoadedCatalog {
                        catalog: CardCatalog::new(cards),
                        source: CatalogSource::Remote,
                        warning: None,
                    };
                }
                Err(e) => {
                    tracing::warn!("Could not fetch latest card data: {}", e);
                    Some(e)
                }
            }
        };

        match CardCatalog::load_from_file(&self.cache_path) {
            Ok(catalog) => {
                tracing::info!(
                    "Loaded {} cards from cache {:?}",
                    catalog.len(),
                    self.cache_path
                );
                LoadedCatalog {
                    catalog,
                    source: CatalogSource::Local,
                    warning: remote_error.map(|e| {
                        format!("Could not fetch latest card data ({}). Using local cache.", e)
                    }),
                }
            }
            Err(local_error) => {
                let warning = match remote_error {
                    Some(e) => format!(
                        "No card data available: remote error: {}; local error: {}",
                        e, local_error
                    ),
                    None => format!(
                        "No card data available: cannot read {}: {}",
                        self.cache_path.display(),
                        local_error
                    ),
                };
                tracing::warn!("{}", warning);
                LoadedCatalog {
                    catalog: CardCatalog::empty(),
                    source: CatalogSource::None,
                    warning: Some(warning),
                }
            }
        }
    }

    fn fetch_remote(&self) -> Result<Vec<CatalogCard>> {
        let client = Client::builder().timeout(self.timeout).build()?;

        let cards: Vec<RemoteCard> = client
            .get(&self.cards_url)
            .header(ACCEPT, "application/json")
            .send()?
            .error_for_status()?
            .json()?;
        let sets: Vec<RemoteSet> = client
            .get(&self.sets_url)
            .header(ACCEPT, "application/json")
            .send()?
            .error_for_status()?
            .json()?;

        let parsed = parse_remote(cards, sets);
        if parsed.is_empty() {
            return Err(Error::Catalog("card database returned no usable cards".into()));
        }
        Ok(parsed)
    }

    /// Atomically replace the cache file with `cards`
    fn write_cache(&self, cards: &[CatalogCard]) -> Result<()> {
        let parent = self
            .cache_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, cards)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.cache_path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} cards to {:?}", cards.len(), self.cache_path);
        Ok(())
    }
}

/// Convert the remote card and set lists into catalog cards
///
/// Sets render as `"<set label> (<code>)"` and ids as
/// `"<code>-<number:03>"`. Cards without a set code, a numeric number or a
/// name are skipped.
pub fn parse_remote(cards: Vec<RemoteCard>, sets: Vec<RemoteSet>) -> Vec<CatalogCard> {
    let set_names: HashMap<String, String> = sets
        .into_iter()
        .filter(|s| !s.code.trim().is_empty())
        .map(|s| {
            let name = pick_label(&s.label).unwrap_or(s.code.as_str()).to_string();
            (s.code.trim().to_lowercase(), name)
        })
        .collect();

    cards
        .into_iter()
        .filter_map(|raw| {
            let code = raw.set.trim();
            if code.is_empty() {
                return None;
            }
            let number = parse_number(&raw.number)?;
            let name = pick_label(&raw.label)?.trim();
            if name.is_empty() {
                return None;
            }
            let set_name = set_names
                .get(&code.to_lowercase())
                .map(String::as_str)
                .unwrap_or(code);

            Some(CatalogCard {
                name: name.to_string(),
                set: format!("{} ({})", set_name, code),
                id: format!("{}-{:03}", code.to_lowercase(), number),
            })
        })
        .collect()
}

/// English label, preferring `eng` over `en`
fn pick_label(label: &HashMap<String, String>) -> Option<&str> {
    ["eng", "en"]
        .iter()
        .filter_map(|key| label.get(*key))
        .map(String::as_str)
        .find(|s| !s.trim().is_empty())
}

fn parse_number(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
