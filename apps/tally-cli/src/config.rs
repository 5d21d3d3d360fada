//! Application configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                  | Default      |
//! |---------------------------|--------------|
//! | `TALLY_DATABASE_PATH`     | `./tally.db` |
//! | `TALLY_DEFAULT_TAX_RATE`  | `0.05`       |
//! | `TALLY_MAX_CONNECTIONS`   | `5`          |
//! | `TALLY_BUSY_TIMEOUT_SECS` | `5`          |
//! | `TALLY_CURRENCY`          | `INR`        |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tally_core::{Money, TaxRate};
use tally_db::{DbConfig, EngineConfig};

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Rate for new orders whose intent names none
    pub default_tax_rate: TaxRate,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits for the database lock
    pub busy_timeout: Duration,

    /// Prefix for printed amounts
    pub currency: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (the environment, in production).
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = AppConfig {
            database_path: PathBuf::from(var("TALLY_DATABASE_PATH", "./tally.db")),

            default_tax_rate: TaxRate::parse(&var("TALLY_DEFAULT_TAX_RATE", "0.05"))
                .map_err(|_| ConfigError::InvalidValue("TALLY_DEFAULT_TAX_RATE".to_string()))?,

            max_connections: var("TALLY_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TALLY_MAX_CONNECTIONS".to_string()))?,

            busy_timeout: var("TALLY_BUSY_TIMEOUT_SECS", "5")
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue("TALLY_BUSY_TIMEOUT_SECS".to_string()))?,

            currency: var("TALLY_CURRENCY", "INR").trim().to_string(),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("TALLY_MAX_CONNECTIONS".to_string()));
        }

        if config.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("TALLY_DATABASE_PATH".to_string()));
        }

        Ok(config)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(self.busy_timeout)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.default_tax_rate)
    }

    /// `INR 420.00`
    pub fn format_currency(&self, amount: Money) -> String {
        if self.currency.is_empty() {
            amount.to_string()
        } else {
            format!("{} {}", self.currency, amount)
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
