use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, anyhow, Context};

use crate::input::DEFAULT_INPUT_LIMIT;

pub const ENV_API_BASE: &str = "CCCC_API_BASE";
pub const ENV_INPUT_LIMIT: &str = "CCCC_INPUT_LIMIT";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_base: Option<String>,
    pub input_limit: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

/// Values supplied on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub input_limit: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("invalid config file {}", config_path.display()))?;
        Ok(config)
    }

    /// Layer environment variables on top of the file values.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(ENV_API_BASE) {
            self.api_base = Some(base);
        }
        if let Some(limit) = lookup(ENV_INPUT_LIMIT) {
            let limit = limit
                .trim()
                .parse::<usize>()
                .map_err(|_| anyhow!("{} must be a positive number, got {:?}", ENV_INPUT_LIMIT, limit))?;
            self.input_limit = Some(limit);
        }
        Ok(self)
    }

    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.api_base.is_some() {
            self.api_base = overrides.api_base;
        }
        if overrides.input_limit.is_some() {
            self.input_limit = overrides.input_limit;
        }
        if overrides.request_timeout_secs.is_some() {
            self.request_timeout_secs = overrides.request_timeout_secs;
        }
        self
    }

    /// File, then environment, then command line.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let config = Self::load()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring unreadable config file");
                Self::new()
            })
            .apply_env(|key| std::env::var(key).ok())?
            .apply_overrides(overrides);
        Ok(config)
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or("")
    }

    pub fn input_limit(&self) -> usize {
        match self.input_limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_INPUT_LIMIT,
        }
    }

    /// `None` means wait for the server indefinitely.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("cccc-chat").join("config.json"))
    }
}
