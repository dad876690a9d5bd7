//! INI file configuration adapter with environment overrides.
//!
//! `STAGWATCH_<SECTION>_<KEY>` takes precedence over the file, so
//! `STAGWATCH_FRED_API_KEY` supplies `[fred] api_key` without writing
//! the credential to disk.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub const ENV_PREFIX: &str = "STAGWATCH";

pub struct FileConfigAdapter {
    config: Ini,
    env_prefix: Option<String>,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self {
            config,
            env_prefix: Some(ENV_PREFIX.to_string()),
        })
    }

    /// Parse INI text. No environment overrides unless
    /// [`with_env_prefix`](Self::with_env_prefix) is applied.
    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self {
            config,
            env_prefix: None,
        })
    }

    /// Environment variables only, for running without a config file.
    pub fn from_env_only() -> Self {
        Self {
            config: Ini::new(),
            env_prefix: Some(ENV_PREFIX.to_string()),
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    fn env_key(prefix: &str, section: &str, key: &str) -> String {
        format!("{}_{}_{}", prefix, section, key).to_uppercase()
    }

    fn env_override(&self, section: &str, key: &str) -> Option<String> {
        let prefix = self.env_prefix.as_deref()?;
        std::env::var(Self::env_key(prefix, section, key))
            .ok()
            .filter(|v| !v.is_empty())
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.env_override(section, key)
            .or_else(|| self.config.get(section, key))
    }
}
