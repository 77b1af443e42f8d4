use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::artifact_io::{merge_toml_tables, parse_toml_table, read_text_file};
use crate::catalog::InMemoryCatalog;
use crate::default_config::DEFAULT_CONFIG_TOML;
use crate::error::{CatalogError, ConfigError};
use crate::lookup::{DisplayOverrides, DocumentLookup, HttpLookup};
use crate::trigger::TriggerScope;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub lookup: LookupConfig,
    pub composer: ComposerConfig,
    #[serde(default)]
    pub display_overrides: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LookupConfig {
    pub endpoint: String,
    pub catalog: String,
    pub limit: usize,
    pub timeout_ms: u64,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComposerConfig {
    pub trigger_scope: TriggerScope,
    pub placeholders: Vec<String>,
    pub placeholder_interval_ms: u64,
}

/// Where candidates come from, after config and flags are combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupBackend {
    Http { endpoint: String, timeout: Duration },
    Catalog(PathBuf),
    Empty,
}

impl Default for Config {
    fn default() -> Self {
        match Self::from_toml_str("") {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(error = %err, "built-in config is invalid");
                Self {
                    lookup: LookupConfig {
                        endpoint: String::new(),
                        catalog: String::new(),
                        limit: crate::lookup::MAX_CANDIDATES,
                        timeout_ms: 3000,
                        case_sensitive: false,
                    },
                    composer: ComposerConfig {
                        trigger_scope: TriggerScope::Caret,
                        placeholders: Vec::new(),
                        placeholder_interval_ms: 2000,
                    },
                    display_overrides: HashMap::new(),
                }
            }
        }
    }
}

impl Config {
    /// Parses `text` as overrides layered on top of the built-in defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut merged = parse_toml_table(DEFAULT_CONFIG_TOML)?;
        merge_toml_tables(&mut merged, parse_toml_table(text)?);
        Ok(merged.try_into::<Self>()?)
    }

    /// An explicit path must exist. Without one, `~/.docmention/config.toml`
    /// is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path().filter(|path| path.exists()) {
                Some(path) => path,
                None => return Self::from_toml_str(""),
            },
        };
        let text = read_text_file(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn set_catalog(&mut self, path: &Path) {
        self.lookup.catalog = path.display().to_string();
        self.lookup.endpoint.clear();
    }

    pub fn set_endpoint(&mut self, endpoint: &str) {
        self.lookup.endpoint = endpoint.to_string();
        self.lookup.catalog.clear();
    }

    pub fn backend(&self) -> LookupBackend {
        let endpoint = self.lookup.endpoint.trim();
        if !endpoint.is_empty() {
            return LookupBackend::Http {
                endpoint: endpoint.to_string(),
                timeout: Duration::from_millis(self.lookup.timeout_ms),
            };
        }
        let catalog = self.lookup.catalog.trim();
        if !catalog.is_empty() {
            return LookupBackend::Catalog(expand_home(catalog));
        }
        LookupBackend::Empty
    }

    pub fn display_overrides(&self) -> DisplayOverrides {
        DisplayOverrides::new(self.display_overrides.clone())
    }

    pub fn placeholder_interval(&self) -> Duration {
        Duration::from_millis(self.composer.placeholder_interval_ms)
    }

    pub fn build_lookup(&self) -> Result<Arc<dyn DocumentLookup>, CatalogError> {
        match self.backend() {
            LookupBackend::Http { endpoint, timeout } => {
                tracing::info!(%endpoint, "using http lookup service");
                Ok(Arc::new(HttpLookup::new(endpoint, timeout)))
            }
            LookupBackend::Catalog(path) => {
                let catalog = InMemoryCatalog::load(&path, self.display_overrides())?
                    .case_sensitive(self.lookup.case_sensitive);
                tracing::info!(path = %path.display(), documents = catalog.len(), "using catalog");
                Ok(Arc::new(catalog))
            }
            LookupBackend::Empty => {
                tracing::warn!("no catalog or endpoint configured; suggestions will be empty");
                Ok(Arc::new(InMemoryCatalog::new(
                    Vec::new(),
                    self.display_overrides(),
                )))
            }
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".docmention").join("config.toml"))
}

fn expand_home(raw_path: &str) -> PathBuf {
    if let Some(rest) = raw_path.strip_prefix("~/")
        && let Some(home) = env::var_os("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(raw_path)
}
