//! Named configuration keys accepted by `omnichat set` / `omnichat unset`.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::core::config::data::Config;
use crate::utils::url::parse_base_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    BackendName,
    BaseUrl,
    Model,
    MaxTokens,
    Temperature,
    ContextWindow,
    TimeoutSecs,
    Greeting,
    CredentialName,
}

pub const ALL_KEYS: &[ConfigKey] = &[
    ConfigKey::BackendName,
    ConfigKey::BaseUrl,
    ConfigKey::Model,
    ConfigKey::MaxTokens,
    ConfigKey::Temperature,
    ConfigKey::ContextWindow,
    ConfigKey::TimeoutSecs,
    ConfigKey::Greeting,
    ConfigKey::CredentialName,
];

#[derive(Debug, PartialEq)]
pub enum ConfigKeyError {
    UnknownKey(String),
    InvalidValue { key: ConfigKey, value: String },
}

impl fmt::Display for ConfigKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKeyError::UnknownKey(key) => {
                let known: Vec<&str> = ALL_KEYS.iter().map(|k| k.as_str()).collect();
                write!(
                    f,
                    "Unknown config key: {key} (expected one of: {})",
                    known.join(", ")
                )
            }
            ConfigKeyError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {value}", key.as_str())
            }
        }
    }
}

impl Error for ConfigKeyError {}

impl ConfigKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::BackendName => "backend-name",
            ConfigKey::BaseUrl => "base-url",
            ConfigKey::Model => "model",
            ConfigKey::MaxTokens => "max-tokens",
            ConfigKey::Temperature => "temperature",
            ConfigKey::ContextWindow => "context-window",
            ConfigKey::TimeoutSecs => "timeout-secs",
            ConfigKey::Greeting => "greeting",
            ConfigKey::CredentialName => "credential-name",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

fn parse_number<T: FromStr>(key: ConfigKey, value: &str) -> Result<T, ConfigKeyError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigKeyError::InvalidValue {
            key,
            value: value.to_string(),
        })
}

fn non_empty(key: ConfigKey, value: &str) -> Result<String, ConfigKeyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigKeyError::InvalidValue {
            key,
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

impl Config {
    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigKeyError> {
        match key {
            ConfigKey::BackendName => self.backend_name = Some(non_empty(key, value)?),
            ConfigKey::BaseUrl => {
                let url = parse_base_url(value).ok_or_else(|| ConfigKeyError::InvalidValue {
                    key,
                    value: value.to_string(),
                })?;
                self.base_url = Some(url);
            }
            ConfigKey::Model => self.model = Some(non_empty(key, value)?),
            ConfigKey::MaxTokens => {
                let tokens: u32 = parse_number(key, value)?;
                if tokens == 0 {
                    return Err(ConfigKeyError::InvalidValue {
                        key,
                        value: value.to_string(),
                    });
                }
                self.max_tokens = Some(tokens);
            }
            ConfigKey::Temperature => {
                let temperature: f32 = parse_number(key, value)?;
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(ConfigKeyError::InvalidValue {
                        key,
                        value: value.to_string(),
                    });
                }
                self.temperature = Some(temperature);
            }
            ConfigKey::ContextWindow => self.context_window = Some(parse_number(key, value)?),
            ConfigKey::TimeoutSecs => {
                let secs: u64 = parse_number(key, value)?;
                if secs == 0 {
                    return Err(ConfigKeyError::InvalidValue {
                        key,
                        value: value.to_string(),
                    });
                }
                self.timeout_secs = Some(secs);
            }
            ConfigKey::Greeting => self.greeting = Some(non_empty(key, value)?),
            ConfigKey::CredentialName => self.credential_name = Some(non_empty(key, value)?),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::BackendName => self.backend_name = None,
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::Model => self.model = None,
            ConfigKey::MaxTokens => self.max_tokens = None,
            ConfigKey::Temperature => self.temperature = None,
            ConfigKey::ContextWindow => self.context_window = None,
            ConfigKey::TimeoutSecs => self.timeout_secs = None,
            ConfigKey::Greeting => self.greeting = None,
            ConfigKey::CredentialName => self.credential_name = None,
        }
    }
}
