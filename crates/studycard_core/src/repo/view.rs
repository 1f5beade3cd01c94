//! Categorized projection over the flat card sequence.
//!
//! # Responsibility
//! - Normalize raw JSON records (defaults, id repair) into [`CardRecord`]s.
//! - Bucket records by category (`categorize`) and flatten them back.
//! - Derive the starred projection on demand.
//!
//! # Invariants
//! - Everything here is pure: no file I/O and no global state.
//! - The starred projection is computed from bucket contents, never stored,
//!   so star/unstar/delete cannot leave it stale.
//! - Records with unknown categories are kept in `unsorted` and flattened
//!   back unchanged; objects that cannot be read as cards are kept in
//!   `opaque` and written back verbatim.

use crate::model::card::{new_card_id, Card, CardId, Category, STARRED_VIEW_LABEL};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One persisted record exactly as written to disk.
///
/// `category` stays free text so unknown labels survive a round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: CardId,
    pub category: String,
    pub question: String,
    pub answer: String,
    pub timestamp: String,
    pub starred: bool,
}

impl From<&Card> for CardRecord {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            category: card.category.label().to_string(),
            question: card.question.clone(),
            answer: card.answer.clone(),
            timestamp: card.timestamp.clone(),
            starred: card.starred,
        }
    }
}

impl CardRecord {
    /// Converts into a typed card, or hands the record back when its
    /// category is not one of the fixed labels.
    pub fn into_card(self) -> Result<Card, CardRecord> {
        match Category::from_label(&self.category) {
            Some(category) => Ok(Card {
                id: self.id,
                category,
                question: self.question,
                answer: self.answer,
                timestamp: self.timestamp,
                starred: self.starred,
            }),
            None => Err(self),
        }
    }
}

/// One element of the persisted array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoredRecord {
    Card(CardRecord),
    /// Object that could not be read as a card, written back verbatim.
    Raw(Value),
}

/// Output of [`normalize_records`].
#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<CardRecord>,
    /// Objects with non-text values in text fields.
    pub opaque: Vec<Value>,
    /// Records whose id or timestamp was generated during normalization.
    pub repaired: usize,
}

impl Normalized {
    /// Categorizes the records and keeps opaque objects alongside.
    pub fn into_view(self) -> CategorizedView {
        let mut view = categorize(self.records);
        view.opaque = self.opaque;
        view
    }
}

/// Card fields read leniently from one JSON object.
struct LooseFields {
    id: Option<String>,
    category: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    timestamp: Option<String>,
    starred: bool,
}

impl LooseFields {
    /// `None` when a text field holds a value that has no text form.
    fn read(fields: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            id: id_field(fields.get("id"))?,
            category: text_field(fields.get("category"))?,
            question: text_field(fields.get("question"))?,
            answer: text_field(fields.get("answer"))?,
            timestamp: text_field(fields.get("timestamp"))?,
            starred: fields.get("starred").is_some_and(is_truthy),
        })
    }
}

fn text_field(value: Option<&Value>) -> Option<Option<String>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(text)) => Some(Some(text.clone())),
        Some(_) => None,
    }
}

fn id_field(value: Option<&Value>) -> Option<Option<String>> {
    match value {
        Some(Value::Number(number)) => Some(Some(number.to_string())),
        other => text_field(other),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn raw_id(value: &Value) -> Option<String> {
    id_field(value.get("id")).flatten()
}

/// Normalizes raw array elements into records.
///
/// Rules:
/// - non-object elements are skipped;
/// - a numeric `id` becomes its decimal text, `starred` is read as truthy;
/// - objects with non-text `category`/`question`/`answer`/`timestamp`
///   (or a bool/array/object `id`) are kept verbatim in `opaque`;
/// - a missing/blank `id`, or an `id` already used by an earlier record,
///   is replaced by a fresh one;
/// - a missing `timestamp` becomes `now`;
/// - other missing fields become empty text.
pub fn normalize_records(values: Vec<Value>, now: &str) -> Normalized {
    let mut seen_ids = HashSet::new();
    let mut out = Normalized::default();

    for (index, value) in values.into_iter().enumerate() {
        let Value::Object(fields) = value else {
            warn!("event=record_skip module=repo reason=not_object index={index}");
            continue;
        };

        let Some(loose) = LooseFields::read(&fields) else {
            warn!("event=record_keep_raw module=repo reason=non_text_field index={index}");
            let raw = Value::Object(fields);
            if let Some(id) = raw_id(&raw) {
                seen_ids.insert(id);
            }
            out.opaque.push(raw);
            continue;
        };

        let mut id = loose.id.filter(|id| !id.trim().is_empty());
        if let Some(existing) = id.as_ref() {
            if seen_ids.contains(existing) {
                warn!("event=record_id_repair module=repo reason=duplicate index={index}");
                id = None;
            }
        }
        let repaired = id.is_none() || loose.timestamp.is_none();
        let id = id.unwrap_or_else(new_card_id);
        seen_ids.insert(id.clone());
        if repaired {
            out.repaired += 1;
        }

        out.records.push(CardRecord {
            id,
            category: loose.category.unwrap_or_default(),
            question: loose.question.unwrap_or_default(),
            answer: loose.answer.unwrap_or_default(),
            timestamp: loose.timestamp.unwrap_or_else(|| now.to_string()),
            starred: loose.starred,
        });
    }

    out
}

/// Buckets records by category. Unknown categories land in `unsorted`.
pub fn categorize(records: impl IntoIterator<Item = CardRecord>) -> CategorizedView {
    let mut view = CategorizedView::default();
    for record in records {
        match record.into_card() {
            Ok(card) => view.buckets[bucket_index(card.category)].push(card),
            Err(record) => view.unsorted.push(record),
        }
    }
    view
}

/// In-memory grouping of all cards by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedView {
    buckets: [Vec<Card>; Category::ALL.len()],
    unsorted: Vec<CardRecord>,
    opaque: Vec<Value>,
}

impl CategorizedView {
    /// Cards of one category in stored order.
    pub fn cards(&self, category: Category) -> &[Card] {
        &self.buckets[bucket_index(category)]
    }

    /// Derived starred projection, in category then stored order.
    pub fn starred(&self) -> Vec<&Card> {
        self.visible().filter(|card| card.starred).collect()
    }

    /// Cards shown by one sidebar view.
    pub fn items(&self, view: ViewKind) -> Vec<&Card> {
        match view {
            ViewKind::Category(category) => self.cards(category).iter().collect(),
            ViewKind::Starred => self.starred(),
        }
    }

    /// Records whose category is not a known label.
    pub fn unsorted(&self) -> &[CardRecord] {
        &self.unsorted
    }

    /// All visible cards in category order.
    pub fn visible(&self) -> impl Iterator<Item = &Card> {
        self.buckets.iter().flatten()
    }

    /// Number of visible cards.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Objects kept verbatim because they could not be read as cards.
    pub fn opaque(&self) -> &[Value] {
        &self.opaque
    }

    /// Whether any stored element (visible, unsorted or opaque) uses `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        self.visible().any(|card| card.id == id)
            || self.unsorted.iter().any(|record| record.id == id)
            || self
                .opaque
                .iter()
                .any(|value| raw_id(value).as_deref() == Some(id))
    }

    pub fn find(&self, id: &str) -> Option<&Card> {
        self.visible().find(|card| card.id == id)
    }

    /// Appends a card to the end of its category bucket.
    pub fn push(&mut self, card: Card) {
        self.buckets[bucket_index(card.category)].push(card);
    }

    /// Sets the starred flag. Returns `false` when no visible card has `id`.
    pub fn set_starred(&mut self, id: &str, starred: bool) -> bool {
        match self.find_mut(id) {
            Some(card) => {
                if starred {
                    card.star();
                } else {
                    card.unstar();
                }
                true
            }
            None => false,
        }
    }

    /// Removes a visible card from its owning category.
    pub fn remove(&mut self, id: &str) -> Option<Card> {
        for bucket in &mut self.buckets {
            if let Some(position) = bucket.iter().position(|card| card.id == id) {
                return Some(bucket.remove(position));
            }
        }
        None
    }

    /// Flattens the five categories in fixed order, then unsorted records,
    /// then opaque objects.
    ///
    /// The starred projection is never emitted separately.
    pub fn flatten(&self) -> Vec<StoredRecord> {
        self.visible()
            .map(|card| StoredRecord::Card(CardRecord::from(card)))
            .chain(self.unsorted.iter().cloned().map(StoredRecord::Card))
            .chain(self.opaque.iter().cloned().map(StoredRecord::Raw))
            .collect()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.buckets
            .iter_mut()
            .flatten()
            .find(|card| card.id == id)
    }
}

fn bucket_index(category: Category) -> usize {
    category as usize
}

/// One sidebar view: a topic category or the derived starred projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Category(Category),
    Starred,
}

impl ViewKind {
    /// All card views in sidebar order.
    pub const ALL: [ViewKind; 6] = [
        ViewKind::Category(Category::Fundamentals),
        ViewKind::Category(Category::Design),
        ViewKind::Category(Category::Engineering),
        ViewKind::Category(Category::Industry),
        ViewKind::Category(Category::Career),
        ViewKind::Starred,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Category(category) => category.label(),
            Self::Starred => STARRED_VIEW_LABEL,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Category(category) => category.slug(),
            Self::Starred => "starred",
        }
    }
}

impl Display for ViewKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for view text that names no known view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownViewError(pub String);

impl Display for UnknownViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let slugs = ViewKind::ALL.map(ViewKind::slug).join("|");
        write!(f, "unknown view `{}`; expected one of {slugs}", self.0)
    }
}

impl Error for UnknownViewError {}

impl FromStr for ViewKind {
    type Err = UnknownViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed == STARRED_VIEW_LABEL || trimmed.eq_ignore_ascii_case("starred") {
            return Ok(Self::Starred);
        }
        trimmed
            .parse::<Category>()
            .map(Self::Category)
            .map_err(|_| UnknownViewError(trimmed.to_string()))
    }
}
