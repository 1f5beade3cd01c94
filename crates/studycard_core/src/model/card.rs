//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical question/answer record saved by the study flow.
//! - Define the fixed topic taxonomy every visible card belongs to.
//!
//! # Invariants
//! - `id` is unique across the whole store and never reused.
//! - `category` is always one of the five topic labels.
//! - `timestamp` uses [`TIMESTAMP_FORMAT`] in local time.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque card identifier.
///
/// Kept as plain text so ids written by older tools load verbatim.
pub type CardId = String;

/// `YYYY-MM-DD HH:MM:SS`, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Display label of the derived starred projection.
pub const STARRED_VIEW_LABEL: &str = "重点标注学习";

/// Fixed topic taxonomy for interview questions.
///
/// Declaration order is the display and flatten order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// 技术原理与基础概念
    #[default]
    Fundamentals,
    /// 产品设计与用户体验
    Design,
    /// 产品落地与工程实践
    Engineering,
    /// 特定场景与行业应用
    Industry,
    /// 团队协作与职业发展
    Career,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 5] = [
        Category::Fundamentals,
        Category::Design,
        Category::Engineering,
        Category::Industry,
        Category::Career,
    ];

    /// Persisted label, also shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fundamentals => "技术原理与基础概念",
            Self::Design => "产品设计与用户体验",
            Self::Engineering => "产品落地与工程实践",
            Self::Industry => "特定场景与行业应用",
            Self::Career => "团队协作与职业发展",
        }
    }

    /// ASCII alias accepted on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Fundamentals => "fundamentals",
            Self::Design => "design",
            Self::Engineering => "engineering",
            Self::Industry => "industry",
            Self::Career => "career",
        }
    }

    /// Resolves a persisted label. Exact match only.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for category text that is neither a label nor a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategoryError(pub String);

impl Display for UnknownCategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let slugs = Category::ALL.map(Category::slug).join("|");
        write!(f, "unknown category `{}`; expected one of {slugs}", self.0)
    }
}

impl Error for UnknownCategoryError {}

impl FromStr for Category {
    type Err = UnknownCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Some(category) = Self::from_label(trimmed) {
            return Ok(category);
        }
        let lowered = trimmed.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == lowered)
            .ok_or_else(|| UnknownCategoryError(trimmed.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(UnknownCategoryError(label)))
    }
}

/// One saved question/answer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub category: Category,
    pub question: String,
    pub answer: String,
    /// Creation time formatted with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    pub starred: bool,
}

impl Card {
    /// Creates an unstarred card with a fresh id, stamped with the current
    /// local time.
    pub fn new(
        category: Category,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: new_card_id(),
            category,
            question: question.into(),
            answer: answer.into(),
            timestamp: now_timestamp(),
            starred: false,
        }
    }

    pub fn star(&mut self) {
        self.starred = true;
    }

    pub fn unstar(&mut self) {
        self.starred = false;
    }

    /// Case-insensitive substring match over question and answer.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn matches_lowercase(&self, needle_lower: &str) -> bool {
        self.question.to_lowercase().contains(needle_lower)
            || self.answer.to_lowercase().contains(needle_lower)
    }
}

/// Generates a fresh opaque card id.
pub fn new_card_id() -> CardId {
    Uuid::new_v4().to_string()
}

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{Card, Category, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;

    #[test]
    fn category_parses_label_and_slug() {
        assert_eq!(
            "技术原理与基础概念".parse::<Category>().unwrap(),
            Category::Fundamentals
        );
        assert_eq!(" Career ".parse::<Category>().unwrap(), Category::Career);
        let err = "AI解答".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("AI解答"));
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Industry).unwrap();
        assert_eq!(json, "\"特定场景与行业应用\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::Industry);
    }

    #[test]
    fn new_card_has_unique_id_and_parseable_timestamp() {
        let first = Card::new(Category::Design, "q", "a");
        let second = Card::new(Category::Design, "q", "a");
        assert_ne!(first.id, second.id);
        assert!(!first.starred);
        NaiveDateTime::parse_from_str(&first.timestamp, TIMESTAMP_FORMAT)
            .expect("timestamp should match the fixed format");
    }

    #[test]
    fn matches_lowercase_checks_question_and_answer() {
        let card = Card::new(Category::Career, "What is RAG?", "Retrieval Augmented");
        assert!(card.matches_lowercase("rag"));
        assert!(card.matches_lowercase("augmented"));
        assert!(!card.matches_lowercase("agent"));
    }
}
