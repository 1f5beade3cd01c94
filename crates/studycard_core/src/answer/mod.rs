//! AI answer generation over a chat-completion provider.
//!
//! # Responsibility
//! - Compose the interview-coach request for one question.
//! - Call the provider with bounded retry and exponential backoff.
//! - Degrade to a placeholder answer when no credential is configured.

pub mod client;
pub mod prompt;
pub mod provider;
