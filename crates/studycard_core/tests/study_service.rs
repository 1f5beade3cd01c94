use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use studycard_core::{
    AnswerClient, AnswerError, AnswerResult, Backoff, CardQuery, ChatProvider, ChatRequest,
    Category, JsonCardStore, ServiceError, StoreError, StudyService, ViewCache, ViewKind,
    PLACEHOLDER_ANSWER,
};

struct FixedProvider {
    reply: Option<&'static str>,
    calls: Rc<Cell<usize>>,
}

impl ChatProvider for FixedProvider {
    fn complete(&self, _request: &ChatRequest) -> AnswerResult<String> {
        self.calls.set(self.calls.get() + 1);
        match self.reply {
            Some(text) => Ok(text.to_string()),
            None => Err(AnswerError::Transport("offline".to_string())),
        }
    }
}

struct NoWait;

impl Backoff for NoWait {
    fn wait(&self, _delay: Duration) {}
}

fn service_with(
    dir: &tempfile::TempDir,
    reply: Option<&'static str>,
) -> (StudyService<JsonCardStore>, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let provider = FixedProvider {
        reply,
        calls: Rc::clone(&calls),
    };
    let client = AnswerClient::with_provider("m", Box::new(provider), Box::new(NoWait));
    let store = JsonCardStore::with_cache(dir.path().join("cards.json"), ViewCache::default());
    (StudyService::new(store, client), calls)
}

#[test]
fn blank_question_is_rejected_before_calling_provider() {
    let dir = tempfile::tempdir().unwrap();
    let (mut service, calls) = service_with(&dir, Some("A"));

    let err = service.ask("   \n", Category::Design).unwrap_err();
    assert!(matches!(err, ServiceError::EmptyQuestion));
    assert_eq!(calls.get(), 0);
    assert!(service.pending().is_none());
}

#[test]
fn ask_then_save_creates_card_in_chosen_category() {
    let dir = tempfile::tempdir().unwrap();
    let (mut service, _calls) = service_with(&dir, Some("结构化回答"));

    let pending = service.ask("什么是Agent？", Category::Fundamentals).unwrap();
    assert_eq!(pending.answer.text, "结构化回答");

    let card = service.save_pending().unwrap();
    assert_eq!(card.category, Category::Fundamentals);
    assert_eq!(card.question, "什么是Agent？");
    assert!(!card.starred);
    assert!(service.pending().is_some());

    let cards = service
        .list(&CardQuery::all(ViewKind::Category(Category::Fundamentals)))
        .unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, card.id);
}

#[test]
fn failed_ask_clears_pending_answer() {
    let dir = tempfile::tempdir().unwrap();
    let (mut service, calls) = service_with(&dir, None);

    let err = service
        .ask_with_retries("Q", Category::Career, 2)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Answer(AnswerError::RetriesExhausted { attempts: 2, .. })
    ));
    assert_eq!(calls.get(), 2);
    assert!(service.pending().is_none());
    assert!(matches!(
        service.save_pending(),
        Err(ServiceError::NothingToSave)
    ));
}

#[test]
fn placeholder_answers_can_be_saved() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonCardStore::new(dir.path().join("cards.json"));
    let mut service = StudyService::new(store, AnswerClient::placeholder("m"));

    let pending = service.ask("Q", Category::Industry).unwrap();
    assert!(pending.answer.is_placeholder());
    let card = service.save_pending().unwrap();
    assert_eq!(card.answer, PLACEHOLDER_ANSWER);
}

#[test]
fn star_unstar_delete_and_counts_flow_through_service() {
    let dir = tempfile::tempdir().unwrap();
    let (mut service, _calls) = service_with(&dir, Some("answer about prompts"));

    service.ask("Prompt design?", Category::Design).unwrap();
    let first = service.save_pending().unwrap();
    service.ask("Roadmap?", Category::Engineering).unwrap();
    let second = service.save_pending().unwrap();

    service.star(&first.id).unwrap();
    let counts = service.counts().unwrap();
    assert_eq!(counts.len(), 6);
    assert_eq!(counts[1], (ViewKind::Category(Category::Design), 1));
    assert_eq!(counts[2], (ViewKind::Category(Category::Engineering), 1));
    assert_eq!(counts[5], (ViewKind::Starred, 1));

    let hits = service
        .list(&CardQuery::matching(ViewKind::Starred, "PROMPT"))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, first.id);

    service.unstar(&first.id).unwrap();
    assert!(service
        .list(&CardQuery::all(ViewKind::Starred))
        .unwrap()
        .is_empty());

    let removed = service.delete(&second.id).unwrap();
    assert_eq!(removed.id, second.id);
    assert!(matches!(
        service.delete(&second.id),
        Err(ServiceError::Store(StoreError::NotFound(_)))
    ));
    let total: usize = service
        .counts()
        .unwrap()
        .iter()
        .filter(|(kind, _)| *kind != ViewKind::Starred)
        .map(|(_, count)| count)
        .sum();
    assert_eq!(total, 1);
}
