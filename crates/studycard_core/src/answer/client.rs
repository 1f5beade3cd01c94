//! Answer client with bounded retry and placeholder degradation.
//!
//! # Responsibility
//! - Turn a question and category into answer text via a [`ChatProvider`].
//! - Retry failed calls with exponential backoff.
//! - Answer with [`PLACEHOLDER_ANSWER`] when no credential is configured.
//!
//! # Invariants
//! - Without a provider the client performs no network I/O.
//! - At most `max_retries` attempts (minimum one); after failed attempt `k`
//!   that is not the last, the client waits `2^k` seconds.
//! - Question and answer text are never logged, only their lengths.

use super::prompt::ChatRequest;
use super::provider::{AnswerError, AnswerResult, ArkChatProvider, ChatProvider};
use crate::config::ProviderConfig;
use log::{info, warn};
use std::time::Duration;

/// Attempts used by [`AnswerClient::ask`].
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed answer returned when no provider credential is configured.
pub const PLACEHOLDER_ANSWER: &str = "当前环境无法连接到AI服务。这是一个示例回答，展示了AI产品经理学习助手的基本功能。\n\n请配置环境变量ARK_API_KEY以获取完整的AI回答能力。";

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOrigin {
    Provider,
    /// No credential; [`PLACEHOLDER_ANSWER`].
    Placeholder,
}

/// Generated answer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub origin: AnswerOrigin,
}

impl Answer {
    pub fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER_ANSWER.to_string(),
            origin: AnswerOrigin::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.origin == AnswerOrigin::Placeholder
    }
}

/// Waits between retry attempts.
pub trait Backoff {
    fn wait(&self, delay: Duration);
}

/// Blocks the current thread for the full delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadBackoff;

impl Backoff for ThreadBackoff {
    fn wait(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Delay after failed attempt `attempt` (1-based): `2^attempt` seconds.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Question answering entry point.
pub struct AnswerClient {
    model: String,
    provider: Option<Box<dyn ChatProvider>>,
    backoff: Box<dyn Backoff>,
}

impl AnswerClient {
    /// Builds the client from configuration.
    ///
    /// Reads the credential once; without it the client answers with the
    /// placeholder and never touches the network.
    ///
    /// # Errors
    /// - `InvalidConfig` when the HTTP client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> AnswerResult<Self> {
        let Some(api_key) = config.api_key.clone() else {
            info!("event=answer_client_init module=answer status=ok mode=placeholder");
            return Ok(Self::placeholder(&config.model));
        };

        let provider = ArkChatProvider::new(config, api_key)?;
        info!(
            "event=answer_client_init module=answer status=ok mode=provider model={} timeout_secs={}",
            config.model,
            config
                .timeout
                .map(|timeout| timeout.as_secs().to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        Ok(Self::with_provider(
            &config.model,
            Box::new(provider),
            Box::new(ThreadBackoff),
        ))
    }

    /// Client that always returns the placeholder answer.
    pub fn placeholder(model: &str) -> Self {
        Self {
            model: model.to_string(),
            provider: None,
            backoff: Box::new(ThreadBackoff),
        }
    }

    /// Client over an explicit provider and backoff.
    pub fn with_provider(
        model: &str,
        provider: Box<dyn ChatProvider>,
        backoff: Box<dyn Backoff>,
    ) -> Self {
        Self {
            model: model.to_string(),
            provider: Some(provider),
            backoff,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// [`generate_answer`](Self::generate_answer) with
    /// [`DEFAULT_MAX_RETRIES`].
    pub fn ask(&self, question: &str, category: &str) -> AnswerResult<Answer> {
        self.generate_answer(question, category, DEFAULT_MAX_RETRIES)
    }

    /// Generates an answer, retrying failed provider calls.
    ///
    /// Empty questions are not rejected here.
    ///
    /// # Errors
    /// - `RetriesExhausted` wrapping the last `Transport`, `RateLimited` or
    ///   `Provider` failure.
    pub fn generate_answer(
        &self,
        question: &str,
        category: &str,
        max_retries: u32,
    ) -> AnswerResult<Answer> {
        let Some(provider) = self.provider.as_deref() else {
            info!(
                "event=answer_generate module=answer status=ok origin=placeholder question_chars={}",
                question.chars().count()
            );
            return Ok(Answer::placeholder());
        };

        let attempts = max_retries.max(1);
        let request = ChatRequest::interview_question(&self.model, question, category);
        let mut attempt = 1;

        loop {
            match provider.complete(&request) {
                Ok(text) => {
                    info!(
                        "event=answer_generate module=answer status=ok origin=provider attempt={}/{} question_chars={} answer_chars={}",
                        attempt,
                        attempts,
                        question.chars().count(),
                        text.chars().count()
                    );
                    return Ok(Answer {
                        text,
                        origin: AnswerOrigin::Provider,
                    });
                }
                Err(err) => {
                    warn!(
                        "event=answer_attempt module=answer status=error attempt={}/{} error_kind={} error={}",
                        attempt,
                        attempts,
                        err.kind(),
                        err
                    );
                    if attempt >= attempts {
                        return Err(AnswerError::RetriesExhausted {
                            attempts,
                            last: Box::new(err),
                        });
                    }
                    self.backoff.wait(backoff_delay(attempt));
                    attempt += 1;
                }
            }
        }
    }
}
