use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::index::ShortcutIndex;
use crate::engine::shortcut::RawShortcut;
use crate::keyboard::platform::Os;

#[derive(Embed)]
#[folder = "assets/shortcuts/"]
struct CatalogAssets;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no shortcut catalog named {0:?}")]
    NotFound(String),
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog {name:?} is not valid TOML: {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("bundled catalog {0:?} is not UTF-8")]
    Encoding(String),
}

/// One application's shortcut list as stored on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShortcutCatalog {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shortcuts: Vec<RawShortcut>,
}

impl ShortcutCatalog {
    pub fn from_toml(id: &str, content: &str) -> Result<Self, CatalogError> {
        let mut catalog: ShortcutCatalog =
            toml::from_str(content).map_err(|source| CatalogError::Parse {
                name: id.to_string(),
                source,
            })?;
        if catalog.name.is_empty() {
            catalog.name = id.to_string();
        }
        Ok(catalog)
    }

    /// Load `id`, preferring a user catalog under `user_dir` over the bundled one.
    pub fn load(id: &str, user_dir: Option<&Path>) -> Result<Self, CatalogError> {
        if let Some(dir) = user_dir {
            let path = dir.join(format!("{id}.toml"));
            if path.exists() {
                let content = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?;
                info!("loaded user catalog {}", path.display());
                return Self::from_toml(id, &content);
            }
        }
        Self::bundled(id)
    }

    pub fn bundled(id: &str) -> Result<Self, CatalogError> {
        let file = CatalogAssets::get(&format!("{id}.toml"))
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|_| CatalogError::Encoding(id.to_string()))?;
        Self::from_toml(id, content)
    }

    /// Ids of every bundled catalog, sorted.
    pub fn available() -> Vec<String> {
        let mut ids: Vec<String> = CatalogAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        ids.sort();
        ids
    }

    /// Bundled ids plus any `*.toml` catalogs in `user_dir`, sorted and deduplicated.
    pub fn discover(user_dir: Option<&Path>) -> Vec<String> {
        let mut ids = Self::available();
        if let Some(entries) = user_dir.and_then(|dir| fs::read_dir(dir).ok()) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        ids.push(stem.to_string());
                    }
                }
            }
        }
        ids.sort();
        ids.dedup();
        ids
    }

    /// Default user catalog directory.
    pub fn user_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shortcutdr")
            .join("shortcuts")
    }

    pub fn index(&self, id: &str, os: Os) -> ShortcutIndex {
        ShortcutIndex::build(id, os, &self.shortcuts)
    }
}
