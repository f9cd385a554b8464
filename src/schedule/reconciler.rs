//! Schedule reconciliation.
//!
//! Merges requested daily run times into the persisted launchd job and
//! commits the result by reloading it. The system is in one of two states:
//! **unconfigured** (no descriptor file) or **configured** (descriptor
//! persisted and assumed loaded). Every transition goes through the
//! write → unload → load sequence so launchd always reflects the file.

use crate::error::{Result, TrackError};
use crate::paths::{AppPaths, JOB_LABEL};
use crate::prompt::Confirm;
use crate::schedule::descriptor::Descriptor;
use crate::schedule::launchctl::JobControl;
use crate::schedule::trigger::{self, Trigger};
use tracing::info;

/// Trigger sets with a minimum gap below this many minutes require explicit
/// confirmation before being committed. Runs that close together look like
/// polling abuse to the stats endpoint.
pub const MIN_GAP_MINUTES: u32 = 10;

/// Outcome of a schedule add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The trigger set was committed (or was already exactly this set).
    Committed {
        /// Triggers that were not previously configured.
        added: Vec<Trigger>,
        /// The full resulting trigger set, sorted.
        all: Vec<Trigger>,
    },
    /// The narrow-gap confirmation was declined; nothing changed.
    Cancelled,
}

/// Outcome of a schedule remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// No descriptor exists; there is nothing to remove.
    NotConfigured,
    /// The requested edit was applied (or was empty).
    Removed {
        /// Triggers that were configured and are now gone.
        removed: Vec<Trigger>,
        /// Requested triggers that were not configured.
        missing: Vec<Trigger>,
        /// Requested entries that did not parse as `HH:MM`.
        invalid: Vec<String>,
        /// Remaining trigger set, sorted. Empty means the descriptor was
        /// deleted and the job unloaded.
        remaining: Vec<Trigger>,
    },
}

/// Read-only schedule state.
#[derive(Debug, Clone)]
pub struct ScheduleStatus {
    /// Configured triggers, sorted. Empty when unconfigured.
    pub triggers: Vec<Trigger>,
    /// Whether a descriptor file exists.
    pub configured: bool,
    /// Whether the external scheduler currently reports the job as active.
    pub active: bool,
}

/// Merges requested run times into the persisted job and commits the result.
pub struct Reconciler<'a> {
    paths: &'a AppPaths,
    control: &'a dyn JobControl,
    confirm: &'a dyn Confirm,
}

impl<'a> Reconciler<'a> {
    /// Build a reconciler over the given paths and collaborators.
    pub fn new(paths: &'a AppPaths, control: &'a dyn JobControl, confirm: &'a dyn Confirm) -> Self {
        Self {
            paths,
            control,
            confirm,
        }
    }

    /// Merge `times` (each `HH:MM`) into the configured trigger set.
    ///
    /// The whole batch is validated before anything changes; one malformed
    /// entry rejects it all. Exact duplicates of configured triggers are
    /// dropped, and a commit only happens when the set actually grows.
    pub fn add(&self, times: &[String]) -> Result<AddOutcome> {
        let requested = trigger::parse_all(times)?;
        if requested.is_empty() {
            return Err(TrackError::InvalidInput("no times given".to_owned()));
        }

        let descriptor_path = self.paths.descriptor_file();
        let mut descriptor = match Descriptor::load(&descriptor_path)? {
            Some(existing) => existing,
            None => self.fresh_descriptor()?,
        };

        let mut added = Vec::new();
        for candidate in requested {
            if !descriptor.triggers.contains(&candidate) {
                descriptor.triggers.push(candidate);
                added.push(candidate);
            }
        }

        let mut all = descriptor.triggers.clone();
        all.sort_unstable();

        if added.is_empty() {
            info!("all requested times already scheduled");
            return Ok(AddOutcome::Committed { added, all });
        }

        if let Some(gap) = trigger::minimum_gap_minutes(&descriptor.triggers)
            && gap < MIN_GAP_MINUTES
        {
            let prompt = format!(
                "closest scheduled runs would be only {gap} minutes apart; schedule anyway?"
            );
            if !self.confirm.confirm(&prompt) {
                return Ok(AddOutcome::Cancelled);
            }
        }

        descriptor.save(&descriptor_path)?;
        self.commit(&descriptor_path)?;
        info!(
            "schedule committed: {} new, {} total",
            added.len(),
            all.len()
        );

        Ok(AddOutcome::Committed { added, all })
    }

    /// Remove `times` from the configured trigger set.
    ///
    /// Each entry is handled independently: a malformed time or one that is
    /// not configured is reported per item rather than failing the batch.
    /// Removing the final trigger deletes the descriptor and unloads the job.
    pub fn remove(&self, times: &[String]) -> Result<RemoveOutcome> {
        let descriptor_path = self.paths.descriptor_file();
        let Some(mut descriptor) = Descriptor::load(&descriptor_path)? else {
            return Ok(RemoveOutcome::NotConfigured);
        };

        let mut removed = Vec::new();
        let mut missing = Vec::new();
        let mut invalid = Vec::new();
        for raw in times {
            let Ok(candidate) = Trigger::parse(raw) else {
                if !invalid.contains(raw) {
                    invalid.push(raw.clone());
                }
                continue;
            };
            if descriptor.triggers.contains(&candidate) {
                if !removed.contains(&candidate) {
                    removed.push(candidate);
                }
            } else if !missing.contains(&candidate) {
                missing.push(candidate);
            }
        }

        let mut remaining: Vec<Trigger> = descriptor
            .triggers
            .iter()
            .copied()
            .filter(|t| !removed.contains(t))
            .collect();
        remaining.sort_unstable();

        if removed.is_empty() {
            return Ok(RemoveOutcome::Removed {
                removed,
                missing,
                invalid,
                remaining,
            });
        }

        if remaining.is_empty() {
            self.control.unload(&descriptor_path)?;
            std::fs::remove_file(&descriptor_path).map_err(|e| {
                TrackError::Schedule(format!(
                    "cannot delete descriptor '{}': {e}",
                    descriptor_path.display()
                ))
            })?;
            info!("last trigger removed, schedule unconfigured");
        } else {
            descriptor.triggers = remaining.clone();
            descriptor.save(&descriptor_path)?;
            self.commit(&descriptor_path)?;
            info!("schedule committed: {} triggers remain", remaining.len());
        }

        Ok(RemoveOutcome::Removed {
            removed,
            missing,
            invalid,
            remaining,
        })
    }

    /// Report configured triggers and, independently, whether the external
    /// scheduler currently lists the job.
    pub fn status(&self) -> Result<ScheduleStatus> {
        let descriptor = Descriptor::load(&self.paths.descriptor_file())?;

        let (configured, label, mut triggers) = match descriptor {
            Some(d) => (true, d.label, d.triggers),
            None => (false, JOB_LABEL.to_owned(), Vec::new()),
        };
        triggers.sort_unstable();

        Ok(ScheduleStatus {
            triggers,
            configured,
            active: self.control.is_loaded(&label),
        })
    }

    /// Descriptor for a job being configured for the first time: this
    /// executable's `run` command, logging under the data directory.
    fn fresh_descriptor(&self) -> Result<Descriptor> {
        let exe = std::env::current_exe().map_err(|e| {
            TrackError::Schedule(format!("cannot determine current executable: {e}"))
        })?;

        std::fs::create_dir_all(self.paths.logs_dir()).map_err(|e| {
            TrackError::Schedule(format!("cannot create logs directory: {e}"))
        })?;

        let mut descriptor = Descriptor::new(
            JOB_LABEL,
            vec![exe.to_string_lossy().into_owned(), "run".to_owned()],
        );
        descriptor.stdout_path = Some(self.paths.stdout_log_file().to_string_lossy().into_owned());
        descriptor.stderr_path = Some(self.paths.stderr_log_file().to_string_lossy().into_owned());
        Ok(descriptor)
    }

    /// Unload-then-load so launchd picks up the rewritten descriptor.
    fn commit(&self, descriptor_path: &std::path::Path) -> Result<()> {
        self.control.unload(descriptor_path)?;
        self.control.load(descriptor_path)
    }
}
