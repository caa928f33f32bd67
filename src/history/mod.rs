//! Bounded, persisted history of generated images.

mod store;

pub use store::{default_history_path, HistoryPersistence, JsonFileStore, MemoryStore};

use crate::image::ImageResource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of records kept in history.
pub const HISTORY_CAPACITY: usize = 50;

/// Storage key for the persisted history.
pub const HISTORY_KEY: &str = "image_history";

/// A successful generation.
///
/// Serialized as `{id, url, prompt, timestamp, style}` with `timestamp` in
/// epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImageRecord {
    /// Unique id.
    pub id: String,
    /// Data URI or remote URL of the image.
    pub url: ImageResource,
    /// The prompt as typed, without the style suffix.
    pub prompt: String,
    /// When the image was generated.
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Display name of the style used.
    #[serde(rename = "style")]
    pub style_name: String,
}

impl GeneratedImageRecord {
    /// Creates a record with a fresh id, stamped now.
    pub fn new(url: ImageResource, prompt: impl Into<String>, style_name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url,
            prompt: prompt.into(),
            created_at: Utc::now(),
            style_name: style_name.into(),
        }
    }

    /// True if both url and prompt are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.url.as_str().trim().is_empty() && !self.prompt.trim().is_empty()
    }

    /// Suggested filename for saving this image.
    pub fn download_filename(&self) -> String {
        format!("farhanimasi-ai-{}.{}", self.id, self.url.extension())
    }
}

/// Newest-first list of records, capped at a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    records: Vec<GeneratedImageRecord>,
    capacity: usize,
}

impl History {
    /// Empty history with [`HISTORY_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Empty history holding at most `capacity` records (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Builds a history from stored records, assumed newest-first.
    ///
    /// Invalid records are dropped and the list is truncated to capacity.
    pub fn from_records(records: Vec<GeneratedImageRecord>) -> Self {
        let mut history = Self::new();
        let total = records.len();
        history.records = records.into_iter().filter(|r| r.is_valid()).collect();
        let dropped = total - history.records.len();
        if dropped > 0 {
            tracing::warn!(dropped, "discarded history records with empty url or prompt");
        }
        history.records.truncate(history.capacity);
        history
    }

    /// Inserts a record at the front, evicting the oldest ones past capacity.
    ///
    /// Returns the evicted records, oldest last.
    pub fn push(&mut self, record: GeneratedImageRecord) -> Vec<GeneratedImageRecord> {
        self.records.insert(0, record);
        if self.records.len() > self.capacity {
            self.records.split_off(self.capacity)
        } else {
            Vec::new()
        }
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Finds a record by id.
    pub fn get(&self, id: &str) -> Option<&GeneratedImageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records, newest first.
    pub fn records(&self) -> &[GeneratedImageRecord] {
        &self.records
    }

    /// Iterates newest first.
    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedImageRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a GeneratedImageRecord;
    type IntoIter = std::slice::Iter<'a, GeneratedImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
