//! Process settings: built-in defaults, an optional TOML file, then environment overrides.

use crate::embedding::DEFAULT_BATCH_SIZE;
use crate::error::Result;
use crate::service::DEFAULT_SIMILARITY_THRESHOLD;
use crate::types::DEFAULT_LIMIT;
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RECIPE_SEARCH_CONFIG";

const ENV_THRESHOLD: &str = "RECIPE_SEARCH_SIMILARITY_THRESHOLD";
const ENV_CATALOG: &str = "RECIPE_SEARCH_CATALOG";
const ENV_THESAURUS: &str = "RECIPE_SEARCH_THESAURUS";
const ENV_LOG_FORMAT: &str = "RECIPE_SEARCH_LOG_FORMAT";
const ENV_DIMENSION: &str = "RECIPE_SEARCH_EMBEDDING_DIMENSION";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format '{}', expected 'compact' or 'json'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Hard similarity floor for plain, smart and hybrid search (0-1)
    pub similarity_threshold: f32,
    /// Result limit used by the CLI when none is given
    pub default_limit: usize,
    /// Length of vectors produced by the built-in embedder
    pub embedding_dimension: usize,
    /// Query embeddings remembered by the LRU cache
    pub embedding_cache_size: usize,
    /// Recipes embedded per batch during backfill
    pub backfill_batch_size: usize,
    /// JSON recipe catalog served by the in-memory backend
    pub catalog_path: Option<PathBuf>,
    /// JSON word list used as the secondary synonym source
    pub thesaurus_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            default_limit: DEFAULT_LIMIT,
            embedding_dimension: 384,
            embedding_cache_size: 256,
            backfill_batch_size: DEFAULT_BATCH_SIZE,
            catalog_path: None,
            thesaurus_path: None,
            log_format: LogFormat::Compact,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// The file is `explicit` if given, else `$RECIPE_SEARCH_CONFIG`, else
    /// `<config dir>/recipe-search/config.toml` when it exists. An explicitly named
    /// file that is missing is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut settings = match named {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path().filter(|path| path.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        settings.apply_env_from(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_THRESHOLD) {
            self.similarity_threshold = value
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number, got '{}'", ENV_THRESHOLD, value))?;
        }
        if let Some(value) = lookup(ENV_DIMENSION) {
            self.embedding_dimension = value
                .trim()
                .parse()
                .with_context(|| format!("{} must be an integer, got '{}'", ENV_DIMENSION, value))?;
        }
        if let Some(value) = lookup(ENV_CATALOG) {
            self.catalog_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_THESAURUS) {
            self.thesaurus_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.log_format = value.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            bail!(
                "similarity_threshold must be between 0 and 1, got {}",
                self.similarity_threshold
            );
        }
        if self.embedding_dimension == 0 {
            bail!("embedding_dimension must be positive");
        }
        if self.backfill_batch_size == 0 {
            bail!("backfill_batch_size must be positive");
        }
        crate::types::validate_limit("default_limit", self.default_limit, crate::types::MAX_LIMIT)?;
        Ok(())
    }
}

/// `<config dir>/recipe-search/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("recipe-search").join("config.toml"))
}
