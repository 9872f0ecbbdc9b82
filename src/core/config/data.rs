use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User-editable settings persisted as `config.toml`.
///
/// Every field is optional; unset values fall back to the built-in defaults
/// when resolved through [`Config::backend_settings`].
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Human-readable backend name used in in-band error messages
    pub backend_name: Option<String>,
    /// Base URL of the OpenAI-compatible API (e.g., "https://api.openai.com/v1")
    pub base_url: Option<String>,
    /// Model identifier sent with every completion request
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Number of prior transcript messages sent as context
    pub context_window: Option<usize>,
    /// Request timeout for backend calls, in seconds
    pub timeout_secs: Option<u64>,
    /// Assistant message that opens every session
    pub greeting: Option<String>,
    /// Name of the keyring entry and environment variable holding the API key
    pub credential_name: Option<String>,
}

/// Fully-resolved backend parameters with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    pub backend_name: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub context_window: usize,
    pub timeout_secs: u64,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
