//! Blocking transport for the external semantic-analysis service.
//!
//! All model calls go through the `LlmTransport` trait. The trait returns
//! plain text and never fails out-of-band: any transport problem is embedded
//! in the reply as a string containing `error`, which the reply parsers in
//! `rules::semantic` treat as inconclusive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model for semantic checks; overridable via `[llm] model` in config.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
/// Default completion budget; the replies parsed here are short line lists.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text content")]
    EmptyContent,
}

/// Capability to obtain one free-form completion for a system/user prompt
/// pair. Implementations hold no per-call mutable state, so a single instance
/// can be shared read-only across rules and files.
pub trait LlmTransport: Send + Sync {
    /// Blocking request/response. On any internal failure the reply is a
    /// textual value embedding the marker `error` rather than a panic or an
    /// out-of-band error, because the callers distinguish success and failure
    /// lexically.
    fn complete(&self, system_prompt: &str, user_content: &str) -> String;
}

/// Resolve the required API key at startup.
///
/// Loads `.env` if present. Missing keys fail here, at construction time,
/// not on first use.
pub fn api_key_from_env() -> Result<String, LlmError> {
    dotenvy::dotenv().ok();
    std::env::var("ANTHROPIC_API_KEY").map_err(|_| LlmError::MissingApiKey)
}

/// Transport that never reaches the network; every reply is the literal
/// `none`, so semantic rules stay quiet. Used where a rule set must be
/// constructed without credentials (rule listing, tests).
pub struct NoopLlmClient;

impl LlmTransport for NoopLlmClient {
    fn complete(&self, _system_prompt: &str, _user_content: &str) -> String {
        "none".to_string()
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first text block, if any.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Anthropic Messages API client used for all semantic checks.
///
/// No retry or backoff at this layer; a transient failure degrades to the
/// inconclusive reply path instead of blocking the scan.
pub struct HttpLlmClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl HttpLlmClient {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model,
            max_tokens,
        })
    }

    fn request(&self, system_prompt: &str, user_content: &str) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: user_content,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response.json()?;
        match parsed.text() {
            Some(t) => Ok(t.trim().to_string()),
            None => Err(LlmError::EmptyContent),
        }
    }
}

impl LlmTransport for HttpLlmClient {
    fn complete(&self, system_prompt: &str, user_content: &str) -> String {
        match self.request(system_prompt, user_content) {
            Ok(text) => text,
            Err(e) => format!("error querying model: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"content":[{"type":"thinking","text":null},{"type":"text","text":"None"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), Some("None"));
    }

    #[test]
    fn test_response_without_text_blocks() {
        let raw = r#"{"content":[]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), None);
    }
}
