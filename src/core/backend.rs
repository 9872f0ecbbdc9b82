//! Completion backend adapter.
//!
//! [`CompletionBackend::complete`] sends one non-streaming request and
//! returns either the assistant text or a [`BackendFailure`]. Failures are
//! values, not panics or raw transport errors; turning them into chat text
//! is the dispatcher's job.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::core::config::data::BackendSettings;
use crate::core::credentials::BackendCredential;
use crate::core::message::{Message, TranscriptRole};
use crate::utils::url::construct_api_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendFailure {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Connection, DNS, TLS or other transport failure.
    Transport(String),
    /// Non-success HTTP status, with the server's error summary if any.
    Status { code: u16, detail: String },
    /// The body could not be parsed or carried no usable completion.
    Malformed(String),
}

impl BackendFailure {
    /// Renders the failure as the assistant text shown in the transcript.
    pub fn in_band_message(&self, backend_name: &str) -> String {
        format!("Error calling {backend_name} API: {self}")
    }
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendFailure::Timeout => write!(f, "timeout"),
            BackendFailure::Transport(detail) => write!(f, "{detail}"),
            BackendFailure::Status { code, detail } if detail.is_empty() => {
                write!(f, "HTTP {code}")
            }
            BackendFailure::Status { code, detail } => write!(f, "HTTP {code}: {detail}"),
            BackendFailure::Malformed(detail) => write!(f, "malformed response: {detail}"),
        }
    }
}

impl Error for BackendFailure {}

impl From<reqwest::Error> for BackendFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendFailure::Timeout
        } else if err.is_decode() {
            BackendFailure::Malformed(err.to_string())
        } else {
            BackendFailure::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Name used in in-band error messages, e.g. "OpenAI".
    fn name(&self) -> &str;

    async fn complete(
        &self,
        history: &[Message],
        new_prompt: &str,
        credential: &BackendCredential,
    ) -> Result<String, BackendFailure>;
}

pub struct OpenAiBackend {
    client: reqwest::Client,
    settings: BackendSettings,
}

impl OpenAiBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendFailure> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|err| BackendFailure::Transport(err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    /// Most recent `context_window` messages, oldest first, then the new
    /// prompt as the final user turn.
    pub fn build_request(&self, history: &[Message], new_prompt: &str) -> ChatCompletionRequest {
        let start = history.len().saturating_sub(self.settings.context_window);
        let mut messages: Vec<ChatMessage> = history[start..]
            .iter()
            .map(|msg| ChatMessage::new(msg.role.as_str(), msg.content.clone()))
            .collect();
        messages.push(ChatMessage::new(TranscriptRole::User.as_str(), new_prompt));

        ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &str {
        &self.settings.backend_name
    }

    async fn complete(
        &self,
        history: &[Message],
        new_prompt: &str,
        credential: &BackendCredential,
    ) -> Result<String, BackendFailure> {
        let request = self.build_request(history, new_prompt);
        let url = construct_api_url(&self.settings.base_url, "chat/completions");
        tracing::debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "completion request rejected");
            return Err(BackendFailure::Status {
                code: status.as_u16(),
                detail: summarize_error_body(&body),
            });
        }

        parse_completion(&body)
    }
}

/// Extracts the trimmed text of the first choice.
pub fn parse_completion(body: &str) -> Result<String, BackendFailure> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|err| BackendFailure::Malformed(err.to_string()))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendFailure::Malformed("no choices returned".to_string()))?;

    let content = choice.message.content.unwrap_or_default();
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(BackendFailure::Malformed(
            "completion had no content".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// One-line description of an error response body.
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            if !summary.is_empty() {
                return summary;
            }
        }
    }
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
