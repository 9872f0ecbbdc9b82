use crate::core::config::data::{BackendSettings, Config};

pub const DEFAULT_BACKEND_NAME: &str = "OpenAI";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CONTEXT_WINDOW: usize = 12;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CREDENTIAL_NAME: &str = "OPENAI_API_KEY";
pub const DEFAULT_GREETING: &str =
    "Hello! I'm Omnichat AI. Type a message below and press Send.";

impl Config {
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            backend_name: self
                .backend_name
                .clone()
                .unwrap_or_else(|| DEFAULT_BACKEND_NAME.to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: self
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            context_window: self.context_window.unwrap_or(DEFAULT_CONTEXT_WINDOW),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or(DEFAULT_GREETING)
    }

    pub fn credential_name(&self) -> &str {
        self.credential_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_CREDENTIAL_NAME)
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Config::default().backend_settings()
    }
}
