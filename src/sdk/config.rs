use crate::sdk::util::rate_limit::DEFAULT_REQUESTS_PER_MINUTE;
use std::{env, num::NonZeroU32, path::PathBuf};
use thiserror::Error;

pub const API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";
pub const CACHE_DIR_VAR: &str = "DISTANCE_TRACKER_CACHE_DIR";
pub const PAIRS_VAR: &str = "DISTANCE_TRACKER_PAIRS";
pub const RATE_VAR: &str = "DISTANCE_TRACKER_REQUESTS_PER_MINUTE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not found in environment variables")]
    MissingApiKey(&'static str),

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Settings taken from the environment (and `.env`, once loaded by the binary).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub cache_dir: PathBuf,
    pub pairs_path: PathBuf,
    pub requests_per_minute: NonZeroU32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;

        let requests_per_minute = match lookup(RATE_VAR) {
            Some(value) => value
                .trim()
                .parse::<NonZeroU32>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: RATE_VAR,
                    value,
                })?,
            None => NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE)
                .unwrap_or(NonZeroU32::MIN),
        };

        Ok(Self {
            api_key,
            cache_dir: lookup(CACHE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".cache")),
            pairs_path: lookup(PAIRS_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.json")),
            requests_per_minute,
        })
    }
}
