//! Configuration for remapping sessions.
//!
//! Settings are read from a TOML file (`remap.toml`):
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [logging.targets]
//! "remap.index" = "trace"
//!
//! [index]
//! skip_jre_classes = false
//! ```

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;
mod schema;

pub use logging::{init_tracing, LoggingConfig};
pub use schema::json_schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RemapConfig {
    /// Logging settings shared by every remap crate.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Controls what the jar indexer records.
    #[serde(default)]
    pub index: IndexConfig,
}

#[allow(clippy::derivable_impls)]
impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Ignore declarations and references of `java/` and `javax/` classes.
    #[serde(default = "default_true")]
    pub skip_jre_classes: bool,

    /// Build a library index from the dependency classpath next to the main index.
    #[serde(default = "default_true")]
    pub index_libraries: bool,

    /// Check that the bridge method maps agree with each other when an index is frozen.
    #[serde(default = "default_true")]
    pub verify_bridge_consistency: bool,
}

fn default_true() -> bool {
    true
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            skip_jre_classes: true,
            index_libraries: true,
            verify_bridge_consistency: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep the message only; the default `Display` includes a snippet of the input.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl RemapConfig {
    /// Load a config file from TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: "remap.config", path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
