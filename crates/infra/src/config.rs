//! Configuration loading and representation.

use thiserror::Error;

pub const DEFAULT_LOW_STOCK_THRESHOLD: u64 = 5;
pub const DEFAULT_ALERT_RECIPIENT: &str = "admin@example.com";

pub const LOW_STOCK_THRESHOLD_VAR: &str = "LOW_STOCK_THRESHOLD";
pub const ADMIN_EMAIL_VAR: &str = "ADMIN_EMAIL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer (got '{value}')")]
    InvalidThreshold { var: &'static str, value: String },

    #[error("{var} cannot be empty")]
    Empty { var: &'static str },
}

/// Runtime settings for low-stock detection and alerting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Balances at or below this quantity are reported as low stock.
    pub low_stock_threshold: u64,
    /// Where low-stock alerts are addressed.
    pub alert_recipient: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            alert_recipient: DEFAULT_ALERT_RECIPIENT.to_string(),
        }
    }
}

impl InventoryConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup (unset variables fall back to defaults).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let low_stock_threshold = match lookup(LOW_STOCK_THRESHOLD_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidThreshold {
                    var: LOW_STOCK_THRESHOLD_VAR,
                    value: raw.clone(),
                })?,
            None => {
                tracing::warn!(
                    "{LOW_STOCK_THRESHOLD_VAR} not set; using default of {DEFAULT_LOW_STOCK_THRESHOLD}"
                );
                DEFAULT_LOW_STOCK_THRESHOLD
            }
        };

        let alert_recipient = match lookup(ADMIN_EMAIL_VAR) {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Empty { var: ADMIN_EMAIL_VAR });
            }
            Some(raw) => raw.trim().to_string(),
            None => {
                tracing::warn!("{ADMIN_EMAIL_VAR} not set; alerts go to {DEFAULT_ALERT_RECIPIENT}");
                DEFAULT_ALERT_RECIPIENT.to_string()
            }
        };

        Ok(Self {
            low_stock_threshold,
            alert_recipient,
        })
    }
}
