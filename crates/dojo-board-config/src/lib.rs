// crates/dojo-board-config/src/lib.rs
// ============================================================================
// Module: Dojo Board Configuration
// Description: Canonical configuration model, loading, and validation.
// Purpose: Fail closed on malformed or unsafe deployment configuration.
// Dependencies: dojo-board-core, dojo-board-store-sqlite, serde, thiserror,
//               toml
// ============================================================================

//! ## Overview
//! Deployment configuration for the Dojo Board server: bind address, exam
//! store backend selection, engine limits, and the seeded account roster
//! with bearer tokens. Loading applies strict input guards (path limits,
//! file size, UTF-8) before parsing, and [`DojoBoardConfig::validate`]
//! rejects any configuration a server must not start with.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;

use dojo_board_core::BeltRank;
use dojo_board_core::Role;
use dojo_board_core::UserId;
use dojo_board_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration path when none is supplied.
pub const DEFAULT_CONFIG_PATH: &str = "dojo-board.toml";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default server bind address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
/// Default request body limit in bytes.
const DEFAULT_REQUEST_BODY_LIMIT: usize = 64 * 1024;
/// Default compare-and-swap attempt budget per engine mutation.
const DEFAULT_MAX_SAVE_RETRIES: u32 = 8;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Messages never echo account tokens.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Configuration failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// Server transport configuration.
///
/// # Invariants
/// - `bind_addr` must parse as a socket address.
/// - `request_body_limit` must be greater than zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_request_body_limit")]
    pub request_body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_body_limit: default_request_body_limit(),
        }
    }
}

/// Returns the default bind address.
fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

/// Returns the default request body limit.
const fn default_request_body_limit() -> usize {
    DEFAULT_REQUEST_BODY_LIMIT
}

/// Exam store backend selector.
///
/// # Invariants
/// - `Sqlite` requires the `[store.sqlite]` section to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-memory store; state is lost on restart.
    #[default]
    Memory,
    /// Durable `SQLite` store.
    Sqlite,
}

/// Exam store configuration.
///
/// # Invariants
/// - `sqlite` must be present when `backend` selects the `SQLite` store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Selected store backend.
    #[serde(default, rename = "type")]
    pub backend: StoreBackend,
    /// `SQLite` store settings, required for the `sqlite` backend.
    #[serde(default)]
    pub sqlite: Option<SqliteStoreConfig>,
}

/// Exam engine limits.
///
/// # Invariants
/// - `max_save_retries` must be greater than zero.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// Maximum compare-and-swap attempts per mutation.
    #[serde(default = "default_max_save_retries")]
    pub max_save_retries: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_save_retries: default_max_save_retries(),
        }
    }
}

/// Returns the default engine retry budget.
const fn default_max_save_retries() -> u32 {
    DEFAULT_MAX_SAVE_RETRIES
}

/// One seeded account with its bearer token.
///
/// # Invariants
/// - `user_id` and `token` are unique across the roster.
/// - `token` contains no whitespace and is never logged.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Account identifier.
    pub user_id: String,
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Current belt rank.
    pub belt_level: BeltRank,
    /// Training start in unix epoch milliseconds.
    pub training_start_unix_millis: i64,
    /// Bearer token presented by this account's client.
    pub token: String,
}

/// Top-level Dojo Board configuration.
///
/// # Invariants
/// - [`DojoBoardConfig::validate`] must pass before the config is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DojoBoardConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Exam store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Exam engine limits.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Seeded account roster.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl DojoBoardConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// When `path` is `None`, [`DEFAULT_CONFIG_PATH`] is used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds input
    /// guards, fails to parse, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        validate_config_path(path)?;
        let metadata = std::fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let bytes = std::fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for server startup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for any setting a server must not
    /// start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid("bind_addr must be a socket address".to_string()))?;
        if self.server.request_body_limit == 0 {
            return Err(ConfigError::Invalid(
                "request_body_limit must be greater than zero".to_string(),
            ));
        }
        if self.engine.max_save_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_save_retries must be greater than zero".to_string(),
            ));
        }
        if self.store.backend == StoreBackend::Sqlite && self.store.sqlite.is_none() {
            return Err(ConfigError::Invalid(
                "sqlite backend requires the [store.sqlite] section".to_string(),
            ));
        }
        self.validate_accounts()
    }

    /// Validates the seeded account roster.
    fn validate_accounts(&self) -> Result<(), ConfigError> {
        let mut user_ids: Vec<&str> = Vec::with_capacity(self.accounts.len());
        let mut tokens: Vec<&str> = Vec::with_capacity(self.accounts.len());
        for account in &self.accounts {
            if account.user_id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "account user_id must be non-empty".to_string(),
                ));
            }
            if account.full_name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "account full_name must be non-empty for {}",
                    account.user_id
                )));
            }
            if account.token.is_empty() || account.token.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "account token must be non-empty without whitespace for {}",
                    account.user_id
                )));
            }
            if user_ids.contains(&account.user_id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate account user_id: {}",
                    account.user_id
                )));
            }
            if tokens.contains(&account.token.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate account token for {}",
                    account.user_id
                )));
            }
            user_ids.push(&account.user_id);
            tokens.push(&account.token);
        }
        Ok(())
    }

    /// Returns the account owning `user_id`, if present.
    #[must_use]
    pub fn account(&self, user_id: &UserId) -> Option<&AccountConfig> {
        self.accounts.iter().find(|account| account.user_id == user_id.as_str())
    }
}

/// Validates configuration paths for safety limits.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
