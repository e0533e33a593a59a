//! Client configuration from the environment.

use crate::reconciler::DEFAULT_POLL_INTERVAL;
use shisan_core::{AssetExt, AssetStyle};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive number of milliseconds, got {value:?}")]
    InvalidInterval { var: &'static str, value: String },

    #[error("{var} must be svg or png, got {value:?}")]
    InvalidAssetExt { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub room_id: Option<String>,
    pub user_id: Option<String>,
    pub poll_interval: Duration,
    pub assets: AssetStyle,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            room_id: None,
            user_id: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            assets: AssetStyle::default(),
        }
    }
}

impl ClientConfig {
    /// Read `SHISAN_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = ClientConfig::default();

        if let Some(base) = get("SHISAN_API_BASE") {
            config.api_base = base;
        }
        config.room_id = get("SHISAN_ROOM_ID");
        config.user_id = get("SHISAN_USER_ID");

        if let Some(value) = get("SHISAN_POLL_INTERVAL_MS") {
            config.poll_interval = match value.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::InvalidInterval {
                        var: "SHISAN_POLL_INTERVAL_MS",
                        value,
                    })
                }
            };
        }

        let ext = match get("SHISAN_ASSET_EXT") {
            Some(value) => {
                AssetExt::from_extension(&value).ok_or(ConfigError::InvalidAssetExt {
                    var: "SHISAN_ASSET_EXT",
                    value,
                })?
            }
            None => AssetExt::default(),
        };
        let base = get("SHISAN_ASSET_BASE").unwrap_or_else(|| AssetStyle::default().base);
        config.assets = AssetStyle::new(base, ext);

        Ok(config)
    }
}
