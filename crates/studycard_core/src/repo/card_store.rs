//! Card repository contract and JSON file implementation.
//!
//! # Responsibility
//! - Provide load/save over one flat JSON array of cards.
//! - Express append/star/unstar/delete as load -> mutate -> save.
//! - Degrade to an empty store when the file content is unusable.
//! - Persist ids and timestamps generated on load before handing them out.
//!
//! # Invariants
//! - `save` replaces the whole file and always invalidates the view cache.
//! - A failed mutation leaves the file untouched.
//! - No locking: the last writer wins when two sessions share a file.

use super::cache::ViewCache;
use super::view::{normalize_records, CategorizedView, StoredRecord};
use crate::model::card::{now_timestamp, Card, CardId};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Default file name used by the study tool.
pub const DEFAULT_DATA_FILE: &str = "questions&answers.json";

const MALFORMED_SUFFIX: &str = ".malformed";
const TEMP_SUFFIX: &str = ".tmp";

pub type StoreResult<T> = Result<T, StoreError>;

/// Card store error for file access and semantic lookups.
#[derive(Debug)]
pub enum StoreError {
    /// File could not be read, written or renamed.
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    Serialize(serde_json::Error),
    NotFound(CardId),
    DuplicateId(CardId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { op, path, source } => {
                write!(f, "failed to {op} card file `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to encode cards: {err}"),
            Self::NotFound(id) => write!(f, "card not found: {id}"),
            Self::DuplicateId(id) => write!(f, "card id already exists: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Repository interface for card persistence.
///
/// Implementors provide `load` and `save`; mutations are derived from them.
pub trait CardRepository {
    /// Reads the whole store as a categorized view.
    fn load(&mut self) -> StoreResult<CategorizedView>;

    /// Replaces the whole store with the flattened view.
    fn save(&mut self, view: &CategorizedView) -> StoreResult<()>;

    /// Appends one card to its category.
    ///
    /// # Errors
    /// - `DuplicateId` when the id is already used by any stored record.
    fn append(&mut self, card: Card) -> StoreResult<()> {
        let mut view = self.load()?;
        if view.contains_id(&card.id) {
            return Err(StoreError::DuplicateId(card.id));
        }
        view.push(card);
        self.save(&view)
    }

    fn star(&mut self, id: &str) -> StoreResult<()> {
        self.set_starred(id, true)
    }

    fn unstar(&mut self, id: &str) -> StoreResult<()> {
        self.set_starred(id, false)
    }

    /// Sets the starred flag; idempotent for known ids.
    fn set_starred(&mut self, id: &str, starred: bool) -> StoreResult<()> {
        let mut view = self.load()?;
        if !view.set_starred(id, starred) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.save(&view)
    }

    /// Removes a card from every view and returns it.
    fn delete(&mut self, id: &str) -> StoreResult<Card> {
        let mut view = self.load()?;
        let removed = view
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.save(&view)?;
        Ok(removed)
    }
}

/// Card store backed by one pretty-printed JSON array file.
#[derive(Debug)]
pub struct JsonCardStore {
    path: PathBuf,
    cache: ViewCache,
}

impl JsonCardStore {
    /// Creates a store with the default view cache.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_cache(path, ViewCache::default())
    }

    pub fn with_cache(path: impl Into<PathBuf>, cache: ViewCache) -> Self {
        Self {
            path: path.into(),
            cache,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_view(&self) -> StoreResult<CategorizedView> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.write_records(&[])?;
                info!(
                    "event=store_init module=repo status=ok path={}",
                    self.path.display()
                );
                return Ok(CategorizedView::default());
            }
            Err(source) => return Err(io_error("read", &self.path, source)),
        };

        let values = match parse_sequence(&bytes) {
            Ok(values) => values,
            Err(reason) => {
                self.recover_malformed(&bytes, &reason)?;
                return Ok(CategorizedView::default());
            }
        };

        let normalized = normalize_records(values, &now_timestamp());
        let repaired = normalized.repaired;
        let view = normalized.into_view();
        if repaired > 0 {
            self.write_records(&view.flatten())?;
            info!(
                "event=store_repair module=repo status=ok repaired={} path={}",
                repaired,
                self.path.display()
            );
        }
        Ok(view)
    }

    fn recover_malformed(&self, bytes: &[u8], reason: &str) -> StoreResult<()> {
        if !bytes.iter().all(u8::is_ascii_whitespace) {
            let backup = sibling_path(&self.path, MALFORMED_SUFFIX);
            fs::write(&backup, bytes).map_err(|source| io_error("back up", &backup, source))?;
        }
        self.write_records(&[])?;
        warn!(
            "event=store_reset module=repo status=recovered path={} reason={}",
            self.path.display(),
            reason
        );
        Ok(())
    }

    fn write_records(&self, records: &[StoredRecord]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .map_err(|source| io_error("create directory for", &self.path, source))?;
        }

        let temp = sibling_path(&self.path, TEMP_SUFFIX);
        fs::write(&temp, json.as_bytes()).map_err(|source| io_error("write", &temp, source))?;
        fs::rename(&temp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&temp);
            io_error("replace", &self.path, source)
        })
    }
}

impl CardRepository for JsonCardStore {
    fn load(&mut self) -> StoreResult<CategorizedView> {
        let now = Instant::now();
        if let Some(view) = self.cache.get(now) {
            debug!("event=store_load module=repo status=ok source=cache");
            return Ok(view);
        }

        match self.read_view() {
            Ok(view) => {
                info!(
                    "event=store_load module=repo status=ok source=file cards={} unsorted={} duration_ms={}",
                    view.len(),
                    view.unsorted().len(),
                    now.elapsed().as_millis()
                );
                self.cache.put(&view, now);
                Ok(view)
            }
            Err(err) => {
                error!(
                    "event=store_load module=repo status=error duration_ms={} error={}",
                    now.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save(&mut self, view: &CategorizedView) -> StoreResult<()> {
        self.cache.invalidate();
        let started_at = Instant::now();
        let records = view.flatten();

        match self.write_records(&records) {
            Ok(()) => {
                info!(
                    "event=store_save module=repo status=ok records={} duration_ms={}",
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn parse_sequence(bytes: &[u8]) -> Result<Vec<Value>, String> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(values)) => Ok(values),
        Ok(other) => Err(format!("expected array, found {}", json_kind(&other))),
        Err(err) => Err(format!("invalid json: {err}")),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn io_error(op: &'static str, path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        op,
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_sequence, sibling_path};
    use std::path::Path;

    #[test]
    fn parse_sequence_rejects_non_arrays() {
        assert_eq!(parse_sequence(b"[]").unwrap().len(), 0);
        let err = parse_sequence(br#"{"a": 1}"#).unwrap_err();
        assert!(err.contains("object"));
        let err = parse_sequence(b"{not json").unwrap_err();
        assert!(err.starts_with("invalid json"));
    }

    #[test]
    fn sibling_path_appends_suffix() {
        let path = sibling_path(Path::new("/tmp/cards.json"), ".tmp");
        assert_eq!(path, Path::new("/tmp/cards.json.tmp"));
    }
}
