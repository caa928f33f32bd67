//! Durable slots for the history list.

use super::{GeneratedImageRecord, HISTORY_KEY};
use crate::error::{Result, StudioError};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single key-value slot holding the serialized history.
pub trait HistoryPersistence: Send {
    /// Reads the stored records, newest first.
    ///
    /// A missing slot is an empty history. Unreadable contents fail with
    /// [`StudioError::PersistenceLoad`].
    fn load(&self) -> Result<Vec<GeneratedImageRecord>>;

    /// Overwrites the slot with `records`.
    fn save(&self, records: &[GeneratedImageRecord]) -> Result<()>;

    /// Deletes the slot.
    fn clear(&self) -> Result<()>;
}

fn parse_records(text: &str) -> Result<Vec<GeneratedImageRecord>> {
    serde_json::from_str(text).map_err(|e| StudioError::PersistenceLoad(e.to_string()))
}

/// Default location of the history file: `<data dir>/genstudio/image_history.json`.
pub fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("genstudio").join(format!("{HISTORY_KEY}.json")))
}

/// History stored as a JSON array in a file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_history_path`].
    pub fn open_default() -> Result<Self> {
        default_history_path().map(Self::new).ok_or_else(|| {
            StudioError::InvalidRequest("could not determine a data directory for history".into())
        })
    }

    /// File this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryPersistence for JsonFileStore {
    fn load(&self) -> Result<Vec<GeneratedImageRecord>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StudioError::PersistenceLoad(e.to_string())),
        };
        parse_records(&text)
    }

    fn save(&self, records: &[GeneratedImageRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(records)?;

        // Write then rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slot. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot preloaded with raw text.
    pub fn with_raw(text: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(text.into()))),
        }
    }

    /// Raw slot contents, if any.
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl HistoryPersistence for MemoryStore {
    fn load(&self) -> Result<Vec<GeneratedImageRecord>> {
        match self.slot.lock().as_deref() {
            Some(text) => parse_records(text),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[GeneratedImageRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        *self.slot.lock() = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}
