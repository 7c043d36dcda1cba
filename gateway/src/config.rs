//! Gateway configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_STATIC_ROOT: &str = ".";
pub const DEFAULT_PACKS_INDEX: &str = "packs-index.json";
pub const DEFAULT_MAPS_INDEX: &str = "maps-index.json";
pub const DEFAULT_MAPS_DIR: &str = "maps";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a boolean (true/false/1/0), got '{value}'")]
    InvalidFlag { var: &'static str, value: String },
}

/// Which gateway variant to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Remote REST API.
    #[default]
    Live,
    /// Read-only static index plus a writable local store.
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub mode: Mode,
    /// Live mode: API root, e.g. `http://host/api`. No trailing slash.
    pub api_base_url: String,
    /// Static mode: an `http(s)://` URL or a directory holding the index files.
    pub static_root: String,
    /// Packs index path relative to `static_root`.
    pub packs_index: String,
    /// Maps index path relative to `static_root`.
    pub maps_index: String,
    /// Directory of standalone `{id}.json` map files relative to `static_root`.
    pub maps_dir: String,
    /// Static mode: directory for the file-backed local store. `None` keeps
    /// local maps in memory (or in `localStorage` on browser builds).
    pub local_store_dir: Option<PathBuf>,
    pub timeouts: Timeouts,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Live,
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            static_root: DEFAULT_STATIC_ROOT.to_owned(),
            packs_index: DEFAULT_PACKS_INDEX.to_owned(),
            maps_index: DEFAULT_MAPS_INDEX.to_owned(),
            maps_dir: DEFAULT_MAPS_DIR.to_owned(),
            local_store_dir: None,
            timeouts: Timeouts::default(),
        }
    }
}

impl GatewayConfig {
    /// Build typed gateway config from environment variables.
    ///
    /// All optional:
    /// - `TILEBOARD_STATIC_MODE`: `true` selects the static gateway (default `false`)
    /// - `TILEBOARD_API_BASE_URL`: default `http://127.0.0.1:3000/api`
    /// - `TILEBOARD_STATIC_ROOT`: URL or directory, default `.`
    /// - `TILEBOARD_PACKS_INDEX`: default `packs-index.json`
    /// - `TILEBOARD_MAPS_INDEX`: default `maps-index.json`
    /// - `TILEBOARD_MAPS_DIR`: default `maps`
    /// - `TILEBOARD_LOCAL_STORE_DIR`: unset keeps local maps in memory
    /// - `TILEBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TILEBOARD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFlag`] for an unparseable static-mode flag.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFlag`] for an unparseable static-mode flag.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = if parse_flag("TILEBOARD_STATIC_MODE", lookup("TILEBOARD_STATIC_MODE").as_deref())? {
            Mode::Static
        } else {
            Mode::Live
        };
        let string_or = |key: &str, default: &str| lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_owned());
        let u64_or = |key: &str, default: u64| lookup(key).and_then(|v| v.parse::<u64>().ok()).unwrap_or(default);

        Ok(Self {
            mode,
            api_base_url: string_or("TILEBOARD_API_BASE_URL", DEFAULT_API_BASE_URL).trim_end_matches('/').to_owned(),
            static_root: string_or("TILEBOARD_STATIC_ROOT", DEFAULT_STATIC_ROOT),
            packs_index: string_or("TILEBOARD_PACKS_INDEX", DEFAULT_PACKS_INDEX),
            maps_index: string_or("TILEBOARD_MAPS_INDEX", DEFAULT_MAPS_INDEX),
            maps_dir: string_or("TILEBOARD_MAPS_DIR", DEFAULT_MAPS_DIR).trim_end_matches('/').to_owned(),
            local_store_dir: lookup("TILEBOARD_LOCAL_STORE_DIR").filter(|v| !v.is_empty()).map(PathBuf::from),
            timeouts: Timeouts {
                request_secs: u64_or("TILEBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
                connect_secs: u64_or("TILEBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
        })
    }

    /// Whether `static_root` names a remote location.
    #[must_use]
    pub fn static_root_is_url(&self) -> bool {
        self.static_root.starts_with("http://") || self.static_root.starts_with("https://")
    }
}

fn parse_flag(var: &'static str, raw: Option<&str>) -> Result<bool, ConfigError> {
    match raw.map(str::trim).unwrap_or("") {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        other => Err(ConfigError::InvalidFlag { var, value: other.to_owned() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
