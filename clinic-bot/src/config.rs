use std::path::PathBuf;

use crate::error::ConfigError;

pub const BACKEND_URL_VAR: &str = "FASTAPI_URL";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const PORT_VAR: &str = "PORT";
pub const VOICES_DIR_VAR: &str = "VOICES_DIR";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_VOICES_DIR: &str = "./voices";

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the clinic backend, without a trailing slash
    pub backend_url: String,
    /// Bearer secret for the category listing
    pub secret_key: Option<String>,
    pub port: u16,
    /// Where transcoded voice clips are written
    pub voices_dir: PathBuf,
}

impl Config {
    /// Read the configuration from the process environment. `main` loads `.env` beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup(BACKEND_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing(BACKEND_URL_VAR))?;

        let secret_key = lookup(SECRET_KEY_VAR).filter(|secret| !secret.trim().is_empty());

        let port = match lookup(PORT_VAR) {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: PORT_VAR,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let voices_dir = lookup(VOICES_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VOICES_DIR));

        Ok(Self {
            backend_url,
            secret_key,
            port,
            voices_dir,
        })
    }
}
