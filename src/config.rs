//! Optional configuration file.
//!
//! `~/.quex.toml` can hold a default connection URL and query count so
//! the CLI works without flags. Flags and the `QUEX_DATABASE_URL`
//! environment variable take precedence over the file.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{QuexError, QuexResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Default connection URL used when none is given on the command line.
    pub database_url: Option<String>,
    /// Default number of example queries per request.
    pub default_count: Option<usize>,
}

impl Config {
    /// Path of the config file, if a home directory exists.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".quex.toml"))
    }

    /// Load the config file. A missing file is an empty config; a
    /// malformed one is an error worth telling the user about.
    pub fn load() -> QuexResult<Self> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|e| QuexError::Config(e.to_string()))
    }

    /// Pick the connection URL: explicit flag/env wins over the file.
    pub fn resolve_url(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.database_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: Config =
            toml::from_str("database_url = \"sqlite::memory:\"\ndefault_count = 3\n").unwrap();
        assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.default_count, Some(3));
    }

    #[test]
    fn test_flag_beats_file() {
        let config: Config = toml::from_str("database_url = \"sqlite::memory:\"").unwrap();
        assert_eq!(
            config.resolve_url(Some("postgres://x/y".into())).as_deref(),
            Some("postgres://x/y")
        );
        assert_eq!(config.resolve_url(None).as_deref(), Some("sqlite::memory:"));
    }
}
