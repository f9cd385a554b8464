//! External scheduler control.
//!
//! The recurring job is committed to launchd by unloading and reloading its
//! descriptor through `launchctl`. The [`JobControl`] trait is the seam the
//! reconciler talks through, so tests can substitute a recording fake.

use crate::error::{Result, TrackError};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Control surface for the scheduler holding the collection job.
pub trait JobControl: Send + Sync {
    /// Load the job descriptor into the scheduler.
    fn load(&self, descriptor: &Path) -> Result<()>;

    /// Unload the job. Unloading a job that is not currently loaded is
    /// tolerated, since the commit sequence always unloads first.
    fn unload(&self, descriptor: &Path) -> Result<()>;

    /// Whether the scheduler currently lists the job as active. This is a
    /// liveness check against the scheduler, not a file-presence check.
    fn is_loaded(&self, label: &str) -> bool;
}

/// `launchctl` implementation of [`JobControl`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Launchctl;

impl JobControl for Launchctl {
    fn load(&self, descriptor: &Path) -> Result<()> {
        let output = Command::new("launchctl")
            .arg("load")
            .arg(descriptor)
            .output()
            .map_err(|e| TrackError::Schedule(format!("cannot run launchctl load: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrackError::Schedule(format!(
                "launchctl load failed: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn unload(&self, descriptor: &Path) -> Result<()> {
        let output = Command::new("launchctl")
            .arg("unload")
            .arg(descriptor)
            .output()
            .map_err(|e| TrackError::Schedule(format!("cannot run launchctl unload: {e}")))?;

        if !output.status.success() {
            // Expected when the job was never loaded.
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("launchctl unload: {}", stderr.trim());
        }
        Ok(())
    }

    fn is_loaded(&self, label: &str) -> bool {
        Command::new("launchctl")
            .arg("list")
            .arg(label)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}
