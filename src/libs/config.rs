//! Process configuration.
//!
//! Configuration is resolved once at start-up into an immutable [`Config`]
//! that is handed to the server and the commands; nothing below this module
//! reads the environment.
//!
//! ## Sources
//!
//! Later sources win:
//!
//! 1. Built-in defaults
//! 2. `config.json` in the platform data directory (optional)
//! 3. Environment variables, including those loaded from `.env`
//!
//! | Variable | Field | Example |
//! |---|---|---|
//! | `CLASSDESK_ADDR` | `addr` | `0.0.0.0:5000` |
//! | `CLASSDESK_DATABASE` | `database` | `/var/lib/classdesk/classdesk.db` |
//! | `JWT_SECRET` | `jwt_secret` | any non-empty string |
//! | `JWT_EXPIRES_IN` | `token_ttl_secs` | `3600`, `45m`, `24h`, `7d` |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use classdesk::libs::config::Config;
//!
//! let config = Config::read()?;
//! println!("listening on {}", config.addr);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_error_anyhow};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DB_FILE_NAME: &str = "classdesk.db";
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// On-disk shape of `config.json`. Every key is optional.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
}

#[derive(Clone, PartialEq)]
pub struct Config {
    /// Socket the HTTP server binds to.
    pub addr: SocketAddr,
    /// SQLite database file.
    pub database: PathBuf,
    /// HMAC secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    /// Lifetime of issued tokens in seconds.
    pub token_ttl_secs: i64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("database", &self.database)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl Config {
    /// Resolves the configuration from `.env`, `config.json` and the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Fails when `config.json` exists but cannot be parsed, when a value is
    /// malformed, or when no JWT secret is configured anywhere.
    pub fn read() -> Result<Config> {
        let (file, default_database) = Self::load()?;
        Self::from_sources(file, |key| std::env::var(key).ok(), default_database)
    }

    /// Resolves only the database path. Used by the offline commands, which
    /// never sign tokens and so do not need a secret.
    pub fn read_database() -> Result<PathBuf> {
        let (file, default_database) = Self::load()?;
        Ok(resolve_database(&file, |key| std::env::var(key).ok(), default_database))
    }

    fn load() -> Result<(ConfigFile, PathBuf)> {
        dotenv::dotenv().ok();

        let storage = DataStorage::new();
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let file = if config_file_path.exists() {
            let raw = fs::read_to_string(&config_file_path)?;
            serde_json::from_str(&raw).map_err(|e| msg_error_anyhow!(Message::ConfigParseError(e.to_string())))?
        } else {
            ConfigFile::default()
        };

        Ok((file, storage.get_path(DB_FILE_NAME)?))
    }

    /// Merges an already-parsed file with an environment lookup. Split out of
    /// [`Config::read`] so the precedence rules can be exercised without
    /// touching the real environment.
    pub fn from_sources<F>(file: ConfigFile, env: F, default_database: PathBuf) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = resolve_database(&file, &env, default_database);

        let addr_raw = env("CLASSDESK_ADDR").or(file.addr).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr_raw.parse().map_err(|_| msg_error_anyhow!(Message::InvalidAddress(addr_raw.clone())))?;

        let jwt_secret = match env("JWT_SECRET").or(file.jwt_secret) {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => msg_bail_anyhow!(Message::JwtSecretMissing),
        };

        let token_ttl_secs = match env("JWT_EXPIRES_IN").or(file.token_ttl) {
            Some(raw) => parse_ttl(&raw).ok_or_else(|| msg_error_anyhow!(Message::InvalidTokenTtl(raw.clone())))?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        Ok(Config {
            addr,
            database,
            jwt_secret,
            token_ttl_secs,
        })
    }
}

fn resolve_database<F>(file: &ConfigFile, env: F, default_database: PathBuf) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    env("CLASSDESK_DATABASE")
        .map(PathBuf::from)
        .or_else(|| file.database.clone())
        .unwrap_or(default_database)
}

/// Parses a token lifetime: plain seconds or a number with an `s`, `m`, `h`
/// or `d` suffix. Zero, negative and over a year are rejected.
pub fn parse_ttl(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.char_indices().last()? {
        (i, 's') => (&raw[..i], 1),
        (i, 'm') => (&raw[..i], 60),
        (i, 'h') => (&raw[..i], 60 * 60),
        (i, 'd') => (&raw[..i], 24 * 60 * 60),
        _ => (raw, 1),
    };
    let value: i64 = digits.trim().parse().ok()?;
    if value <= 0 {
        return None;
    }
    value.checked_mul(multiplier).filter(|secs| *secs <= MAX_TOKEN_TTL_SECS)
}
