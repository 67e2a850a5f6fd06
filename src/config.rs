use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.spoonacular.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub db_path: Option<PathBuf>,
    pub scroll_debounce: Duration,
}

impl Config {
    /// Reads the configuration from the environment. Call `dotenv()` first to
    /// pick up a `.env` file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("RECIPES_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("RECIPES_API_KEY"))?;
        let api_url = lookup("RECIPES_API_URL").unwrap_or_else(|| {
            log::info!("RECIPES_API_URL not set, using default: {}", DEFAULT_API_URL);
            DEFAULT_API_URL.to_string()
        });
        let db_path = lookup("RECIPES_DB_PATH").map(PathBuf::from);
        if db_path.is_none() {
            log::info!("RECIPES_DB_PATH not set, keeping recipes in memory");
        }
        let debounce_ms: u64 = try_parse(&lookup, "SCROLL_DEBOUNCE_MS", 200)?;

        Ok(Config {
            api_url,
            api_key,
            db_path,
            scroll_debounce: Duration::from_millis(debounce_ms),
        })
    }
}

fn try_parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            log::info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
