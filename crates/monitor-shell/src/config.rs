use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shortcut::KeyBinding;

pub const ENV_APPS_PAGE_SIZE: &str = "MONITOR_APPS_PAGE_SIZE";
pub const ENV_APPS_RETRY_DELAY_MS: &str = "MONITOR_APPS_RETRY_DELAY_MS";
pub const ENV_DRAFT_START_CLEAR_MS: &str = "MONITOR_DRAFT_START_CLEAR_MS";
pub const ENV_NEW_AGENT_SHORTCUT: &str = "MONITOR_NEW_AGENT_SHORTCUT";

pub const DEFAULT_APPS_PAGE_SIZE: u32 = 100;
pub const DEFAULT_APPS_RETRY_DELAY_MS: u64 = 1_500;
pub const DEFAULT_DRAFT_START_CLEAR_MS: u64 = 4_000;
pub const DEFAULT_NEW_AGENT_SHORTCUT: &str = "cmd+n";

pub const CONFIG_SOURCE_DEFAULT: &str = "default";
pub const CONFIG_SOURCE_ENV: &str = "env";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub apps_page_size: u32,
    pub apps_retry_delay_ms: u64,
    pub draft_start_clear_ms: u64,
    pub new_agent_shortcut: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            apps_page_size: DEFAULT_APPS_PAGE_SIZE,
            apps_retry_delay_ms: DEFAULT_APPS_RETRY_DELAY_MS,
            draft_start_clear_ms: DEFAULT_DRAFT_START_CLEAR_MS,
            new_agent_shortcut: DEFAULT_NEW_AGENT_SHORTCUT.to_string(),
        }
    }
}

impl ShellConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(raw).map_err(|error| ConfigError::InvalidToml(error.to_string()))?;
        config.validate()
    }

    /// Defaults overlaid with `MONITOR_*` environment variables, plus the source label.
    pub fn resolve() -> Result<(Self, &'static str), ConfigError> {
        let mut overridden = false;
        let config = Self::default().with_overrides_from(|key| {
            let value = env_non_empty(key);
            overridden |= value.is_some();
            value
        })?;
        let source = if overridden {
            CONFIG_SOURCE_ENV
        } else {
            CONFIG_SOURCE_DEFAULT
        };
        Ok((config, source))
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(env_non_empty)
    }

    pub fn with_overrides_from(
        mut self,
        mut lookup: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(ENV_APPS_PAGE_SIZE) {
            self.apps_page_size = parse_positive(ENV_APPS_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_APPS_RETRY_DELAY_MS) {
            self.apps_retry_delay_ms = parse_positive(ENV_APPS_RETRY_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DRAFT_START_CLEAR_MS) {
            self.draft_start_clear_ms = parse_positive(ENV_DRAFT_START_CLEAR_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_NEW_AGENT_SHORTCUT) {
            self.new_agent_shortcut = raw;
        }
        self.validate()
    }

    pub fn apps_retry_delay(&self) -> Duration {
        Duration::from_millis(self.apps_retry_delay_ms)
    }

    pub fn draft_start_clear_delay(&self) -> Duration {
        Duration::from_millis(self.draft_start_clear_ms)
    }

    pub fn new_agent_binding(&self) -> Result<KeyBinding, ConfigError> {
        KeyBinding::parse(&self.new_agent_shortcut).map_err(ConfigError::from)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.apps_page_size == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "apps_page_size",
                value: "0".to_string(),
            });
        }
        self.new_agent_binding()?;
        Ok(self)
    }
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
