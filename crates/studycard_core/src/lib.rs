//! Core domain logic for the AI product manager study cards tool.
//! This crate is the single source of truth for card invariants.

pub mod answer;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use answer::client::{
    backoff_delay, Answer, AnswerClient, AnswerOrigin, Backoff, ThreadBackoff,
    DEFAULT_MAX_RETRIES, PLACEHOLDER_ANSWER,
};
pub use answer::prompt::{compose_prompt, ChatRequest};
pub use answer::provider::{AnswerError, AnswerResult, ArkChatProvider, ChatProvider};
pub use config::{ApiKey, AppConfig, ConfigError, ProviderConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config};
pub use model::card::{Card, CardId, Category, UnknownCategoryError};
pub use repo::cache::ViewCache;
pub use repo::card_store::{CardRepository, JsonCardStore, StoreError, StoreResult};
pub use repo::view::{
    categorize, normalize_records, CardRecord, CategorizedView, Normalized, StoredRecord,
    UnknownViewError, ViewKind,
};
pub use search::filter::{query_cards, CardQuery};
pub use service::study_service::{PendingAnswer, ServiceError, StudyService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
