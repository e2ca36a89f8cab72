//! Configuration loader: a TOML document mapping category names to feed
//! URLs, read once at startup.
//!
//! ```toml
//! golang = ["https://go.dev/blog/feed.atom"]
//! jobs = ["https://example.com/jobs.rss"]
//! ```
//!
//! The config decides *which* feeds exist; the cache only ever contributes
//! their state. A missing file is a hard error for initial load — unlike the
//! cache there is no sensible empty default to fall back to.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file at the expected location.
    #[error("no config file at {0}")]
    Missing(PathBuf),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The document parsed but is not a category → URL-list mapping.
    #[error("invalid config structure: {0}")]
    Invalid(String),
}

/// The category → URLs mapping, in document order (toml's `preserve_order`
/// keeps the file order, which becomes the feed list order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub categories: Vec<(String, Vec<String>)>,
}

impl Config {
    /// Loads and validates the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            categories = config.categories.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parses a config document. An empty document yields zero feeds; a
    /// structurally invalid one (values that are not string arrays) is an
    /// error. Unparseable URLs are kept but logged, so one typo does not
    /// hide the rest of a category.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse()?;

        let mut categories = Vec::with_capacity(table.len());
        for (category, value) in table {
            let toml::Value::Array(entries) = value else {
                return Err(ConfigError::Invalid(format!(
                    "category '{}' must be an array of URLs",
                    category
                )));
            };

            let mut urls = Vec::with_capacity(entries.len());
            for entry in entries {
                let toml::Value::String(raw) = entry else {
                    return Err(ConfigError::Invalid(format!(
                        "category '{}' contains a non-string entry",
                        category
                    )));
                };
                if url::Url::parse(&raw).is_err() {
                    tracing::warn!(url = %raw, category = %category, "Config URL does not parse; the feed will fail to fetch");
                }
                urls.push(raw);
            }
            categories.push((category, urls));
        }

        Ok(Self { categories })
    }
}
