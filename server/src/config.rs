//! Server configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data/users";
pub const DEFAULT_ASSETS_DIR: &str = "assets";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a port number, got '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// One directory per user, maps under `{user}/maps/{id}.json`.
    pub data_dir: PathBuf,
    /// Root holding the asset pack directories.
    pub assets_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `TILEBOARD_DATA_DIR`: default `data/users`
    /// - `TILEBOARD_ASSETS_DIR`: default `assets`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] when `PORT` is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let dir_or = |key: &str, default: &str| {
            std::env::var(key).map_or_else(|_| PathBuf::from(default), PathBuf::from)
        };

        Ok(Self {
            port,
            data_dir: dir_or("TILEBOARD_DATA_DIR", DEFAULT_DATA_DIR),
            assets_dir: dir_or("TILEBOARD_ASSETS_DIR", DEFAULT_ASSETS_DIR),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
