//! Configuration
//!
//! Two layers:
//!
//! - [`Config`] - process settings from environment variables (logging, where
//!   the enricher definition lives)
//! - [`EnricherConfig`] - declarative enricher definition, loaded from JSON
//!
//! ```json
//! {
//!   "skip_null_results": true,
//!   "overwrite": true,
//!   "headers": {
//!     "one": { "xpath": "/root/elementOne" },
//!     "two": { "xpath": "/root/elementTwo", "type": "number", "overwrite": false }
//!   }
//! }
//! ```

use crate::enricher::HeaderEnricher;
use crate::error::EnrichError;
use crate::expression::{EvaluationType, XPathExpression};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable for the log filter
pub const ENV_LOG_LEVEL: &str = "OTSAKE_LOG_LEVEL";
/// Environment variable for the log format (`pretty` or `json`)
pub const ENV_LOG_FORMAT: &str = "OTSAKE_LOG_FORMAT";
/// Environment variable pointing at the enricher JSON definition
pub const ENV_ENRICHER_CONFIG: &str = "OTSAKE_ENRICHER_CONFIG";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid JSON for the expected shape
    #[error("invalid enricher config: {0}")]
    Json(#[from] serde_json::Error),

    /// Config parsed but describes an unusable enricher
    #[error("invalid enricher config: {0}")]
    Invalid(#[from] EnrichError),

    /// Environment variable has an unusable value
    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Path of the enricher definition, if configured
    pub enricher_config: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            enricher_config: None,
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using a custom variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.log_format = match format.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Env {
                        var: ENV_LOG_FORMAT,
                        value: format,
                    })
                }
            };
        }

        config.enricher_config = lookup(ENV_ENRICHER_CONFIG).map(PathBuf::from);

        Ok(config)
    }
}

/// Initialise the tracing subscriber based on config
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// One header in an [`EnricherConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderConfig {
    /// XPath expression to evaluate
    pub xpath: String,
    /// Result conversion (default: string)
    #[serde(default, rename = "type")]
    pub evaluation_type: EvaluationType,
    /// Per-header overwrite policy (default: the enricher's)
    #[serde(default)]
    pub overwrite: Option<bool>,
}

/// Declarative enricher definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnricherConfig {
    /// Leave out null/empty results (default: true)
    #[serde(default = "default_true")]
    pub skip_null_results: bool,
    /// Replace headers already on the message (default: true)
    #[serde(default = "default_true")]
    pub overwrite: bool,
    /// Header name to definition
    #[serde(default)]
    pub headers: HashMap<String, HeaderConfig>,
}

fn default_true() -> bool {
    true
}

impl EnricherConfig {
    /// Parse a JSON definition
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON definition from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(
            path = %path.display(),
            headers = config.headers.len(),
            "enricher config loaded"
        );
        Ok(config)
    }

    /// Compile every expression and build the enricher
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for the first expression that fails to compile.
    pub fn into_enricher(self) -> Result<HeaderEnricher, ConfigError> {
        let mut builder = HeaderEnricher::builder()
            .skip_null_results(self.skip_null_results)
            .overwrite(self.overwrite);

        for (name, header) in self.headers {
            let expression = XPathExpression::compile(header.xpath)?;
            if let Some(overwrite) = header.overwrite {
                builder = builder.header_overwrite(name.clone(), overwrite);
            }
            builder = builder
                .evaluation_type(name.clone(), header.evaluation_type)
                .expression(name, expression);
        }

        Ok(builder.build())
    }
}
