//! Shared test doubles used across multiple test modules.
//!
//! Scripted stand-ins for the three injected capabilities (stats fetches,
//! launchd control, yes/no confirmation) so state-machine and orchestration
//! tests run without a network, a terminal, or launchd.

use crate::error::{Result, TrackError};
use crate::prompt::Confirm;
use crate::provider::{ResourceStats, StatsProvider};
use crate::schedule::launchctl::JobControl;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Confirmation capability that always gives the same answer and counts how
/// often it was asked.
pub struct StaticConfirm {
    answer: bool,
    asked: AtomicUsize,
}

impl StaticConfirm {
    /// Build a confirmer that always answers `answer`.
    #[must_use]
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    /// How many times a confirmation was requested.
    #[must_use]
    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl Confirm for StaticConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// Job control that records every call instead of talking to launchd.
pub struct RecordingJobControl {
    calls: Mutex<Vec<String>>,
    loaded: AtomicBool,
}

impl RecordingJobControl {
    /// Build a recorder whose liveness check initially answers `loaded`.
    #[must_use]
    pub fn new(loaded: bool) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            loaded: AtomicBool::new(loaded),
        }
    }

    /// The calls made so far, in order (`"load"` / `"unload"`).
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Change what the liveness check answers.
    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::SeqCst);
    }

    fn record(&self, call: &str) {
        self.calls.lock().expect("calls lock").push(call.to_owned());
    }
}

impl JobControl for RecordingJobControl {
    fn load(&self, _descriptor: &Path) -> Result<()> {
        self.record("load");
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn unload(&self, _descriptor: &Path) -> Result<()> {
        self.record("unload");
        self.loaded.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_loaded(&self, _label: &str) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }
}

/// Stats provider answering from a scripted table.
#[derive(Default)]
pub struct ScriptedStats {
    stats: Mutex<HashMap<String, ResourceStats>>,
    failing: Mutex<HashSet<String>>,
}

impl ScriptedStats {
    /// Build an empty table. Every fetch fails until ids are inserted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response for `id`.
    pub fn insert(&self, id: &str, name: &str, user_count: u64, like_count: u64) {
        self.stats.lock().expect("stats lock").insert(
            id.to_owned(),
            ResourceStats {
                name: name.to_owned(),
                user_count,
                like_count,
            },
        );
    }

    /// Script a fetch failure for `id`.
    pub fn fail(&self, id: &str) {
        self.failing
            .lock()
            .expect("failing lock")
            .insert(id.to_owned());
    }
}

#[async_trait]
impl StatsProvider for ScriptedStats {
    async fn fetch(&self, id: &str) -> Result<ResourceStats> {
        if self.failing.lock().expect("failing lock").contains(id) {
            return Err(TrackError::Provider(format!("scripted failure for {id}")));
        }
        self.stats
            .lock()
            .expect("stats lock")
            .get(id)
            .cloned()
            .ok_or_else(|| TrackError::Provider(format!("no scripted stats for {id}")))
    }
}
