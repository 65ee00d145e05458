//! Deck persistence.
//!
//! The deck file is a JSON list. We write `[question, answer]` pairs and read
//! those back, along with the older object shapes (`{"question", "answer"}` and
//! `{"q", "a"}`). Entries that fit none of these are skipped one by one rather
//! than failing the whole file.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::card::Card;
use crate::error::StorageError;

/// Built-in deck used whenever the backing store has nothing usable
pub const DEFAULT_CARDS: [(&str, &str); 6] = [
    ("What is Python?", "A high-level programming language."),
    ("What is a variable?", "A container that stores data."),
    ("What is a loop?", "A structure that repeats actions."),
    ("What is a function?", "A reusable block of code."),
    ("What planet is known as the Red Planet?", "Mars"),
    ("What is H2O?", "Water"),
];

pub fn default_cards() -> Vec<Card> {
    DEFAULT_CARDS
        .iter()
        .map(|(q, a)| Card::new(*q, *a))
        .collect()
}

/// Canonical question/answer pair, whatever shape it was stored in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub question: String,
    pub answer: String,
}

impl From<CardRecord> for Card {
    fn from(r: CardRecord) -> Self {
        Card::new(r.question, r.answer)
    }
}

impl From<&Card> for CardRecord {
    fn from(c: &Card) -> Self {
        Self {
            question: c.question.clone(),
            answer: c.answer.clone(),
        }
    }
}

/// Every entry shape the deck file has ever used
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Pair(Vec<Value>),
    Keyed(KeyedRecord),
}

#[derive(Debug, Deserialize)]
struct KeyedRecord {
    question: Option<Value>,
    q: Option<Value>,
    answer: Option<Value>,
    a: Option<Value>,
}

impl StoredRecord {
    fn into_record(self) -> Option<CardRecord> {
        match self {
            StoredRecord::Pair(items) => {
                let mut items = items.into_iter();
                let question = scalar_text(items.next()?)?;
                let answer = scalar_text(items.next()?)?;
                Some(CardRecord { question, answer })
            }
            StoredRecord::Keyed(k) => {
                let question = first_non_empty(k.question, k.q)?;
                let answer = first_non_empty(k.answer, k.a)?;
                Some(CardRecord { question, answer })
            }
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn first_non_empty(long: Option<Value>, short: Option<Value>) -> Option<String> {
    [long, short]
        .into_iter()
        .flatten()
        .filter_map(scalar_text)
        .find(|s| !s.is_empty())
}

/// Parse the contents of a deck file into records, skipping malformed entries
pub fn parse_records(bytes: &[u8], path: &Path) -> Result<Vec<CardRecord>, StorageError> {
    let root: Value = serde_json::from_slice(bytes).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(entries) = root else {
        return Err(StorageError::NotAList {
            path: path.to_path_buf(),
        });
    };

    let total = entries.len();
    let records: Vec<CardRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let record = serde_json::from_value::<StoredRecord>(entry)
                .ok()
                .and_then(StoredRecord::into_record);
            if record.is_none() {
                debug!(entry = idx, "skipping malformed card entry");
            }
            record
        })
        .collect();

    if records.len() < total {
        info!(
            kept = records.len(),
            skipped = total - records.len(),
            "deck file contained malformed entries"
        );
    }

    Ok(records)
}

/// Encode cards in the canonical `[[question, answer], ...]` shape
pub fn encode_cards(cards: &[Card]) -> Result<Vec<u8>, serde_json::Error> {
    let pairs: Vec<[&str; 2]> = cards
        .iter()
        .map(|c| [c.question.as_str(), c.answer.as_str()])
        .collect();
    serde_json::to_vec_pretty(&pairs)
}

pub trait CardStore {
    /// Never empty: falls back to the built-in deck
    fn load(&self) -> Vec<Card>;
    fn save(&self, cards: &[Card]) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The fallible half of `load`, without the default-deck fallback
    pub fn read_records(&self) -> Result<Vec<CardRecord>, StorageError> {
        let bytes = fs::read(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_records(&bytes, &self.path)
    }
}

impl CardStore for JsonFileStore {
    fn load(&self) -> Vec<Card> {
        match self.read_records() {
            Ok(records) if !records.is_empty() => {
                info!(path = %self.path.display(), cards = records.len(), "loaded deck");
                records.into_iter().map(Card::from).collect()
            }
            Ok(_) => {
                info!(path = %self.path.display(), "deck file has no usable cards, using defaults");
                default_cards()
            }
            Err(StorageError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!(path = %self.path.display(), "no deck file yet, using defaults");
                default_cards()
            }
            Err(e) => {
                warn!(error = %e, "could not read deck, using defaults");
                default_cards()
            }
        }
    }

    fn save(&self, cards: &[Card]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let data = encode_cards(cards).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, data).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), cards = cards.len(), "saved deck");
        Ok(())
    }
}

/// In-memory store for headless runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<Vec<CardRecord>>,
    saves: RefCell<usize>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new(records: Vec<CardRecord>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(q, a)| CardRecord {
                    question: q.to_string(),
                    answer: a.to_string(),
                })
                .collect(),
        )
    }

    /// A store whose every save fails
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<CardRecord> {
        self.records.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl CardStore for MemoryStore {
    fn load(&self) -> Vec<Card> {
        let records = self.records.borrow();
        if records.is_empty() {
            return default_cards();
        }
        records.iter().cloned().map(Card::from).collect()
    }

    fn save(&self, cards: &[Card]) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Unavailable("memory store is read-only".into()));
        }
        *self.records.borrow_mut() = cards.iter().map(CardRecord::from).collect();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

impl<S: CardStore + ?Sized> CardStore for std::rc::Rc<S> {
    fn load(&self) -> Vec<Card> {
        (**self).load()
    }

    fn save(&self, cards: &[Card]) -> Result<(), StorageError> {
        (**self).save(cards)
    }
}
