//! Substring search over one card view.
//!
//! # Responsibility
//! - Filter a view's cards by a case-insensitive substring.
//! - Return cards newest first.
//!
//! # Invariants
//! - Cards with unknown categories are never returned.
//! - Empty query text returns the whole view; other text is matched as given.

use crate::model::card::Card;
use crate::repo::view::{CategorizedView, ViewKind};

/// Search options for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardQuery {
    pub view: ViewKind,
    /// Matched against question and answer, untrimmed; empty means no filter.
    pub text: String,
}

impl CardQuery {
    /// Lists the whole view.
    pub fn all(view: ViewKind) -> Self {
        Self {
            view,
            text: String::new(),
        }
    }

    pub fn matching(view: ViewKind, text: impl Into<String>) -> Self {
        Self {
            view,
            text: text.into(),
        }
    }

    /// Whether the query narrows the view.
    pub fn is_filtered(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Returns the view's cards matching `query`, newest first.
///
/// Timestamps share one fixed-width format, so text order is time order.
/// Ties keep stored order.
pub fn query_cards(view: &CategorizedView, query: &CardQuery) -> Vec<Card> {
    let needle = query.text.to_lowercase();
    let mut cards: Vec<Card> = view
        .items(query.view)
        .into_iter()
        .filter(|card| needle.is_empty() || card.matches_lowercase(&needle))
        .cloned()
        .collect();
    cards.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    cards
}

#[cfg(test)]
mod tests {
    use super::{query_cards, CardQuery};
    use crate::model::card::{Card, Category};
    use crate::repo::view::{CategorizedView, ViewKind};

    fn card(question: &str, answer: &str, timestamp: &str, starred: bool) -> Card {
        let mut card = Card::new(Category::Design, question, answer);
        card.timestamp = timestamp.to_string();
        card.starred = starred;
        card
    }

    fn sample_view() -> CategorizedView {
        let mut view = CategorizedView::default();
        view.push(card("Old prompt question", "a1", "2024-01-01 09:00:00", false));
        view.push(card("New question", "Prompt engineering", "2024-06-01 09:00:00", true));
        view.push(card("Unrelated", "nothing", "2024-03-01 09:00:00", false));
        view
    }

    #[test]
    fn blank_query_lists_view_newest_first() {
        let cards = query_cards(
            &sample_view(),
            &CardQuery::all(ViewKind::Category(Category::Design)),
        );
        let questions: Vec<&str> = cards.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["New question", "Unrelated", "Old prompt question"]);
    }

    #[test]
    fn query_matches_question_or_answer_case_insensitively() {
        let query = CardQuery::matching(ViewKind::Category(Category::Design), "PROMPT");
        assert!(query.is_filtered());
        let cards = query_cards(&sample_view(), &query);
        let questions: Vec<&str> = cards.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["New question", "Old prompt question"]);
    }

    #[test]
    fn surrounding_spaces_are_part_of_the_phrase() {
        let view = ViewKind::Category(Category::Design);
        let cards = query_cards(&sample_view(), &CardQuery::matching(view, " prompt"));
        let questions: Vec<&str> = cards.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["Old prompt question"]);

        let spaces_only = CardQuery::matching(view, " ");
        assert!(spaces_only.is_filtered());
        assert_eq!(query_cards(&sample_view(), &spaces_only).len(), 2);
    }

    #[test]
    fn starred_view_only_returns_starred_cards() {
        let cards = query_cards(&sample_view(), &CardQuery::all(ViewKind::Starred));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "New question");
    }

    #[test]
    fn other_categories_are_empty() {
        let cards = query_cards(
            &sample_view(),
            &CardQuery::all(ViewKind::Category(Category::Career)),
        );
        assert!(cards.is_empty());
    }
}
