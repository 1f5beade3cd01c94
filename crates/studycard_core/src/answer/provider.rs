//! Chat-completion provider contract and HTTPS implementation.
//!
//! # Responsibility
//! - Define the single-call provider seam used by the answer client.
//! - Map transport, rate-limit and response-shape failures onto
//!   [`AnswerError`].
//!
//! # Invariants
//! - Providers perform exactly one network call per `complete`.
//! - The credential only ever travels in the Authorization header.

use super::prompt::ChatRequest;
use crate::config::{ApiKey, ProviderConfig};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AnswerResult<T> = Result<T, AnswerError>;

/// Answer generation failure.
#[derive(Debug)]
pub enum AnswerError {
    /// Connection, timeout or body read failure.
    Transport(String),
    /// Provider answered HTTP 429.
    RateLimited(String),
    /// Non-2xx status, API error object or malformed body.
    Provider(String),
    /// HTTP client could not be constructed.
    InvalidConfig(String),
    /// Every attempt failed; carries the last failure.
    RetriesExhausted {
        attempts: u32,
        last: Box<AnswerError>,
    },
}

impl AnswerError {
    /// Short stable name for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::RateLimited(_) => "rate_limited",
            Self::Provider(_) => "provider",
            Self::InvalidConfig(_) => "invalid_config",
            Self::RetriesExhausted { .. } => "retries_exhausted",
        }
    }
}

impl Display for AnswerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "provider unreachable: {message}"),
            Self::RateLimited(message) => write!(f, "provider rate limited: {message}"),
            Self::Provider(message) => write!(f, "provider error: {message}"),
            Self::InvalidConfig(message) => write!(f, "invalid provider config: {message}"),
            Self::RetriesExhausted { attempts, last } => {
                write!(f, "answer failed after {attempts} attempt(s): {last}")
            }
        }
    }
}

impl Error for AnswerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RetriesExhausted { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }
}

/// One chat-completion call.
pub trait ChatProvider {
    /// Sends `request` and returns the first choice's text.
    fn complete(&self, request: &ChatRequest) -> AnswerResult<String>;
}

/// HTTPS provider for the Ark chat-completion endpoint.
pub struct ArkChatProvider {
    http: Client,
    base_url: String,
    api_key: ApiKey,
}

impl ArkChatProvider {
    /// Builds a provider with its own HTTP client honoring `config.timeout`.
    pub fn new(config: &ProviderConfig, api_key: ApiKey) -> AnswerResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AnswerError::InvalidConfig(err.to_string()))?;
        Ok(Self::with_client(http, &config.base_url, api_key))
    }

    /// Builds a provider around a caller-configured HTTP client.
    pub fn with_client(http: Client, base_url: &str, api_key: ApiKey) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl ChatProvider for ArkChatProvider {
    fn complete(&self, request: &ChatRequest) -> AnswerResult<String> {
        let response = self
            .http
            .post(self.url())
            .bearer_auth(self.api_key.expose())
            .json(request)
            .send()
            .map_err(|err| AnswerError::Transport(format!("HTTP request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| AnswerError::Transport(format!("failed to read response: {err}")))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AnswerError::RateLimited(error_message(status, &body)));
        }
        if !status.is_success() {
            return Err(AnswerError::Provider(error_message(status, &body)));
        }

        parse_completion_text(&body)
    }
}

/// Extracts `choices[0].message.content` from a completion body.
pub fn parse_completion_text(body: &str) -> AnswerResult<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| AnswerError::Provider(format!("failed to parse response JSON: {err}")))?;

    if let Some(err) = value.get("error") {
        let message = err["message"].as_str().unwrap_or("unknown error");
        return Err(AnswerError::Provider(format!("API error: {message}")));
    }

    value["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            AnswerError::Provider("response has no choices[0].message.content".to_string())
        })
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
        .map(|message| format!("HTTP {status}: {message}"))
        .unwrap_or_else(|| format!("HTTP {status}: {}", body.trim()))
}
