//! Tracked-file time series store.
//!
//! Holds the append-only engagement history for every tracked file, keyed by
//! resource id, and persists it as a single JSON document at
//! `<data dir>/tracked.json`. Records are only ever appended; the sole other
//! mutations are removing a whole entry and refreshing a display name.

use crate::error::{Result, TrackError};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One recorded observation of a file's engagement counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Calendar day of the observation (`YYYY-MM-DD`).
    pub date: String,
    /// Full observation time (`YYYY-MM-DD HH:MM:SS`), when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Community member count at observation time.
    pub user_count: u64,
    /// Cumulative like count at observation time.
    pub like_count: u64,
}

impl Sample {
    /// Build a sample stamped with the current local date and time.
    #[must_use]
    pub fn now(user_count: u64, like_count: u64) -> Self {
        let now = chrono::Local::now();
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            timestamp: Some(now.format("%Y-%m-%d %H:%M:%S").to_string()),
            user_count,
            like_count,
        }
    }

    /// The most precise reference for this sample: timestamp when present,
    /// otherwise the calendar day.
    #[must_use]
    pub fn reference(&self) -> &str {
        self.timestamp.as_deref().unwrap_or(&self.date)
    }
}

/// A tracked file: display name plus its observation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedFile {
    /// Display name as last reported by the stats endpoint.
    pub name: String,
    /// Append-only observation history, oldest first.
    #[serde(default)]
    pub records: Vec<Sample>,
}

impl TrackedFile {
    /// Create an entry with no history yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }
}

/// All tracked files, keyed by resource id.
///
/// The map is a `BTreeMap` so the persisted document has a stable key order.
#[derive(Debug, Clone, Default)]
pub struct TrackedStore {
    files: BTreeMap<String, TrackedFile>,
    path: Option<PathBuf>,
}

impl TrackedStore {
    /// Load the store from `tracked.json` under the given paths.
    ///
    /// A missing file yields an empty store. A file that exists but does not
    /// parse is an error: starting over from empty would silently discard
    /// every recorded history.
    pub fn load(paths: &AppPaths) -> Result<Self> {
        let path = paths.tracked_file();
        let files = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                TrackError::Store(format!(
                    "cannot parse tracked store '{}': {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(TrackError::Store(format!(
                    "cannot read tracked store '{}': {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            files,
            path: Some(path),
        })
    }

    /// Create a store that is never persisted. Intended for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Persist the store atomically (temp file → fsync → rename).
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.files)
            .map_err(|e| TrackError::Store(format!("cannot serialize tracked store: {e}")))?;
        write_json_text_atomic(path, &json)
            .map_err(|e| TrackError::Store(format!("cannot write tracked store: {e}")))
    }

    /// Returns `true` when the id is already tracked.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    /// Number of tracked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Look up a tracked file.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TrackedFile> {
        self.files.get(id)
    }

    /// Mutable lookup, for appending samples and refreshing names.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut TrackedFile> {
        self.files.get_mut(id)
    }

    /// Start tracking a file. Replaces any existing entry with the same id.
    pub fn insert(&mut self, id: impl Into<String>, file: TrackedFile) {
        self.files.insert(id.into(), file);
    }

    /// Stop tracking a file, returning its entry when it existed.
    pub fn remove(&mut self, id: &str) -> Option<TrackedFile> {
        self.files.remove(id)
    }

    /// Iterate tracked files in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TrackedFile)> {
        self.files.iter()
    }

    /// Tracked ids in stable order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }
}

/// Write JSON text atomically (temp file → fsync → rename).
///
/// A crash mid-write leaves the previous document intact.
pub(crate) fn write_json_text_atomic(path: &Path, json_text: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(&tmp_path)?;
    file.write_all(json_text.as_bytes())?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)
}
