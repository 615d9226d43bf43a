//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{AdapterKind, CounterConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Base URL of the remote document store.
pub const ENV_STORE_URL: &str = "COUNTER_STORE_URL";
/// Accepted alias for [`ENV_STORE_URL`].
pub const ENV_STORE_URL_ALIAS: &str = "FIREBASE_URL";
pub const ENV_BIND_ADDRESS: &str = "COUNTER_BIND_ADDRESS";
pub const ENV_ADAPTER: &str = "COUNTER_ADAPTER";
pub const ENV_LOG_LEVEL: &str = "COUNTER_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Invalid value '{}' for {}", value, var)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<CounterConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_file(path)?,
        None => CounterConfig::default(),
    };
    let config = apply_env_overrides(config, |var| std::env::var(var).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<CounterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Overlay environment variables onto a parsed configuration.
///
/// `lookup` abstracts the environment so callers can supply their own source.
pub fn apply_env_overrides<F>(mut config: CounterConfig, lookup: F) -> Result<CounterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_STORE_URL).or_else(|| non_empty(ENV_STORE_URL_ALIAS)) {
        config.store.base_url = url;
    }
    if let Some(addr) = non_empty(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(kind) = non_empty(ENV_ADAPTER) {
        config.adapter.kind = match kind.to_ascii_lowercase().as_str() {
            "standalone" => AdapterKind::Standalone,
            "function" => AdapterKind::Function,
            _ => {
                return Err(ConfigError::Env {
                    var: ENV_ADAPTER,
                    value: kind,
                })
            }
        };
    }
    if let Some(level) = non_empty(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }

    Ok(config)
}
