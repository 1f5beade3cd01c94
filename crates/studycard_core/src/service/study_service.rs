//! Study use-case service.
//!
//! # Responsibility
//! - Provide the ask -> save flow and card browsing entry points.
//! - Hold the transient pending answer between asking and saving.
//!
//! # Invariants
//! - Blank questions never reach the answer client.
//! - A card is only created from a successful answer.
//! - A failed ask clears the pending answer; saving keeps it.

use crate::answer::client::{Answer, AnswerClient};
use crate::answer::provider::AnswerError;
use crate::model::card::{Card, Category};
use crate::repo::card_store::{CardRepository, StoreError};
use crate::repo::view::ViewKind;
use crate::search::filter::{query_cards, CardQuery};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for study use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Question text is blank.
    EmptyQuestion,
    /// No successful answer is waiting to be saved.
    NothingToSave,
    Answer(AnswerError),
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyQuestion => f.write_str("question must not be empty"),
            Self::NothingToSave => f.write_str("no answer to save; ask a question first"),
            Self::Answer(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Answer(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::EmptyQuestion | Self::NothingToSave => None,
        }
    }
}

impl From<AnswerError> for ServiceError {
    fn from(value: AnswerError) -> Self {
        Self::Answer(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Last successful answer, not yet necessarily saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnswer {
    pub question: String,
    pub category: Category,
    pub answer: Answer,
}

/// Study flow facade over a card repository and an answer client.
pub struct StudyService<R: CardRepository> {
    repo: R,
    answers: AnswerClient,
    pending: Option<PendingAnswer>,
}

impl<R: CardRepository> StudyService<R> {
    pub fn new(repo: R, answers: AnswerClient) -> Self {
        Self {
            repo,
            answers,
            pending: None,
        }
    }

    /// Asks with the client's default retry budget.
    pub fn ask(
        &mut self,
        question: &str,
        category: Category,
    ) -> Result<&PendingAnswer, ServiceError> {
        self.ask_with_retries(
            question,
            category,
            crate::answer::client::DEFAULT_MAX_RETRIES,
        )
    }

    /// Asks one question and holds the answer as pending.
    ///
    /// # Errors
    /// - `EmptyQuestion` for blank input (the client is not called).
    /// - `Answer` when every attempt failed.
    pub fn ask_with_retries(
        &mut self,
        question: &str,
        category: Category,
        max_retries: u32,
    ) -> Result<&PendingAnswer, ServiceError> {
        if question.trim().is_empty() {
            return Err(ServiceError::EmptyQuestion);
        }

        match self
            .answers
            .generate_answer(question, category.label(), max_retries)
        {
            Ok(answer) => Ok(&*self.pending.insert(PendingAnswer {
                question: question.to_string(),
                category,
                answer,
            })),
            Err(err) => {
                self.pending = None;
                Err(err.into())
            }
        }
    }

    pub fn pending(&self) -> Option<&PendingAnswer> {
        self.pending.as_ref()
    }

    /// Saves the pending answer as a new card.
    pub fn save_pending(&mut self) -> Result<Card, ServiceError> {
        let pending = self.pending.as_ref().ok_or(ServiceError::NothingToSave)?;
        let card = Card::new(
            pending.category,
            pending.question.as_str(),
            pending.answer.text.as_str(),
        );
        self.repo.append(card.clone())?;
        info!(
            "event=card_save module=service status=ok category={} placeholder={}",
            card.category.slug(),
            pending.answer.is_placeholder()
        );
        Ok(card)
    }

    /// Lists one view, optionally filtered.
    pub fn list(&mut self, query: &CardQuery) -> Result<Vec<Card>, ServiceError> {
        let view = self.repo.load()?;
        Ok(query_cards(&view, query))
    }

    /// Card count per view, in sidebar order.
    pub fn counts(&mut self) -> Result<Vec<(ViewKind, usize)>, ServiceError> {
        let view = self.repo.load()?;
        Ok(ViewKind::ALL
            .into_iter()
            .map(|kind| (kind, view.items(kind).len()))
            .collect())
    }

    pub fn star(&mut self, id: &str) -> Result<(), ServiceError> {
        self.repo.star(id)?;
        info!("event=card_star module=service status=ok starred=true");
        Ok(())
    }

    pub fn unstar(&mut self, id: &str) -> Result<(), ServiceError> {
        self.repo.unstar(id)?;
        info!("event=card_star module=service status=ok starred=false");
        Ok(())
    }

    /// Deletes a card from every view.
    pub fn delete(&mut self, id: &str) -> Result<Card, ServiceError> {
        let removed = self.repo.delete(id)?;
        info!(
            "event=card_delete module=service status=ok was_starred={}",
            removed.starred
        );
        Ok(removed)
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn answer_client(&self) -> &AnswerClient {
        &self.answers
    }
}
