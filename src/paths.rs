//! Centralized filesystem layout for filepulse.
//!
//! A single [`AppPaths`] value is resolved once at startup and threaded into
//! every component that touches disk, so tests can point the whole tool at a
//! temp directory. Uses the [`dirs`] crate for platform-appropriate directory
//! resolution.
//!
//! # Directory Layout
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Tracked data + settings | `~/Library/Application Support/filepulse/` | `~/.local/share/filepulse/` |
//! | Run logs | `<data dir>/logs/` | `<data dir>/logs/` |
//! | launchd descriptor | `~/Library/LaunchAgents/` | `~/Library/LaunchAgents/` |
//!
//! # Environment Overrides
//!
//! - `FILEPULSE_DATA_DIR` overrides the data directory
//! - `FILEPULSE_AGENTS_DIR` overrides the launchd agents directory

use std::path::{Path, PathBuf};

/// launchd job label; also names the descriptor file.
pub const JOB_LABEL: &str = "com.saorsalabs.filepulse";

/// Resolved filesystem locations for all durable state.
#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
    agents_dir: PathBuf,
}

impl AppPaths {
    /// Resolve paths for a normal run.
    ///
    /// Precedence for the data directory: explicit override (CLI flag),
    /// then `FILEPULSE_DATA_DIR`, then `dirs::data_dir()/filepulse`.
    #[must_use]
    pub fn resolve(data_dir_override: Option<PathBuf>) -> Self {
        let data_dir = data_dir_override
            .or_else(|| std::env::var_os("FILEPULSE_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        let agents_dir = std::env::var_os("FILEPULSE_AGENTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_agents_dir);

        Self {
            data_dir,
            agents_dir,
        }
    }

    /// Build paths rooted at explicit directories. Intended for tests.
    #[must_use]
    pub fn with_roots(data_dir: impl Into<PathBuf>, agents_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            agents_dir: agents_dir.into(),
        }
    }

    /// Data root directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Tracked-file time series store (`<data dir>/tracked.json`).
    #[must_use]
    pub fn tracked_file(&self) -> PathBuf {
        self.data_dir.join("tracked.json")
    }

    /// Settings store (`<data dir>/settings.json`).
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    /// Directory for scheduled-run log files (`<data dir>/logs/`).
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Stdout log for scheduled runs.
    #[must_use]
    pub fn stdout_log_file(&self) -> PathBuf {
        self.logs_dir().join("filepulse.out.log")
    }

    /// Stderr log for scheduled runs.
    #[must_use]
    pub fn stderr_log_file(&self) -> PathBuf {
        self.logs_dir().join("filepulse.err.log")
    }

    /// launchd agents directory holding the job descriptor.
    #[must_use]
    pub fn agents_dir(&self) -> &Path {
        &self.agents_dir
    }

    /// launchd job descriptor path (`<agents dir>/<label>.plist`).
    #[must_use]
    pub fn descriptor_file(&self) -> PathBuf {
        self.agents_dir.join(format!("{JOB_LABEL}.plist"))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("filepulse"))
        .unwrap_or_else(|| PathBuf::from("/tmp/filepulse-data"))
}

fn default_agents_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join("Library").join("LaunchAgents"))
        .unwrap_or_else(|| PathBuf::from("/tmp/filepulse-agents"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_with_explicit_override_wins() {
        let paths = AppPaths::resolve(Some(PathBuf::from("/custom/data")));
        assert_eq!(paths.data_dir(), Path::new("/custom/data"));
    }

    #[test]
    fn resolve_env_override_used_when_no_flag() {
        let key = "FILEPULSE_DATA_DIR";
        let original = std::env::var_os(key);

        // SAFETY: test-only env mutation, restored below.
        unsafe { std::env::set_var(key, "/env/data") };
        let paths = AppPaths::resolve(None);
        assert_eq!(paths.data_dir(), Path::new("/env/data"));

        // Restore.
        match original {
            Some(val) => unsafe { std::env::set_var(key, val) },
            None => unsafe { std::env::remove_var(key) },
        }
    }

    #[test]
    fn tracked_file_lives_under_data_dir() {
        let paths = AppPaths::with_roots("/d", "/a");
        assert!(paths.tracked_file().starts_with("/d"));
        assert!(paths.tracked_file().ends_with("tracked.json"));
    }

    #[test]
    fn settings_file_lives_under_data_dir() {
        let paths = AppPaths::with_roots("/d", "/a");
        assert!(paths.settings_file().starts_with("/d"));
        assert!(paths.settings_file().ends_with("settings.json"));
    }

    #[test]
    fn descriptor_file_uses_job_label() {
        let paths = AppPaths::with_roots("/d", "/a");
        let descriptor = paths.descriptor_file();
        assert!(descriptor.starts_with("/a"));
        let name = descriptor.file_name().map(|n| n.to_string_lossy().into_owned());
        assert_eq!(name.as_deref(), Some("com.saorsalabs.filepulse.plist"));
    }

    #[test]
    fn log_files_live_under_logs_dir() {
        let paths = AppPaths::with_roots("/d", "/a");
        assert!(paths.stdout_log_file().starts_with(paths.logs_dir()));
        assert!(paths.stderr_log_file().starts_with(paths.logs_dir()));
    }
}
