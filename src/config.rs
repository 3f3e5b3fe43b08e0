//! Server configuration.
//!
//! Sources, later ones winning:
//! 1. `~/.config/gcal-mcp/config.toml` (or `--config <path>`), optional
//! 2. `GCAL_MCP_*` environment variables (a `.env` file is loaded first)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use gcal_mcp_google::api::DEFAULT_BASE_URL;
use gcal_mcp_google::consent::DEFAULT_REDIRECT_PORT;
use gcal_mcp_google::token::DEFAULT_TOKEN_URL;
use serde::Deserialize;

const ENV_PREFIX: &str = "GCAL_MCP";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// Single-record `token.json`
    #[default]
    File,
    /// Keyed collection in a SQLite database
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Google OAuth client bundle (`credentials.json`)
    #[serde(default)]
    pub client_secret_path: Option<String>,

    #[serde(default)]
    pub token_backend: TokenBackend,

    #[serde(default)]
    pub token_path: Option<String>,

    #[serde(default)]
    pub token_db_path: Option<String>,

    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// OAuth endpoint that exchanges refresh tokens for access tokens
    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,

    /// IANA zone used to reduce instants to dates for all-day events
    #[serde(default)]
    pub timezone: Option<String>,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_redirect_port() -> u16 {
    DEFAULT_REDIRECT_PORT
}

/// `~/.config/gcal-mcp`
pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("gcal-mcp"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("config.toml"))
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// `env` replaces the process environment as the variable source.
    fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };

        Config::builder()
            .add_source(File::from(path.clone()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn path_or_default(value: &Option<String>, file_name: &str) -> Result<PathBuf> {
        match value {
            Some(path) => Ok(expand(path)),
            None => Ok(base_dir()?.join(file_name)),
        }
    }

    pub fn client_secret_path(&self) -> Result<PathBuf> {
        Self::path_or_default(&self.client_secret_path, "credentials.json")
    }

    pub fn token_path(&self) -> Result<PathBuf> {
        Self::path_or_default(&self.token_path, "token.json")
    }

    pub fn token_db_path(&self) -> Result<PathBuf> {
        Self::path_or_default(&self.token_db_path, "tokens.db")
    }

    /// The configured zone, else the system zone, else UTC.
    pub fn timezone(&self) -> Tz {
        if let Some(name) = &self.timezone {
            match name.parse::<Tz>() {
                Ok(tz) => return tz,
                Err(e) => tracing::warn!(timezone = %name, error = %e, "Ignoring unknown time zone"),
            }
        }

        iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(Tz::UTC)
    }
}
