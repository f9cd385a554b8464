//! Settings store: registered webhook destinations.
//!
//! Persisted as `<data dir>/settings.json`. Earlier releases stored a single
//! destination under a `webhook_url` key; that form is still read and folded
//! into the list, and the next save writes the list form only.

use crate::error::{Result, TrackError};
use crate::paths::AppPaths;
use crate::store::write_json_text_atomic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// On-disk settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SettingsDoc {
    /// Registered webhook destinations, in registration order.
    #[serde(default)]
    webhook_urls: Vec<String>,
    /// Single destination from pre-list releases. Read-only compatibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    webhook_url: Option<String>,
}

/// Mutable settings handle bound to its store path.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    webhook_urls: Vec<String>,
    path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from disk. A missing file yields defaults; a file that
    /// exists but does not parse is an error.
    pub fn load(paths: &AppPaths) -> Result<Self> {
        let path = paths.settings_file();
        let doc: SettingsDoc = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                TrackError::Store(format!("cannot parse settings '{}': {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SettingsDoc::default(),
            Err(e) => {
                return Err(TrackError::Store(format!(
                    "cannot read settings '{}': {e}",
                    path.display()
                )));
            }
        };

        let mut webhook_urls = doc.webhook_urls;
        if let Some(legacy) = doc.webhook_url
            && !webhook_urls.contains(&legacy)
        {
            webhook_urls.insert(0, legacy);
        }

        Ok(Self {
            webhook_urls,
            path: Some(path),
        })
    }

    /// Create settings that are never persisted. Intended for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Persist settings atomically. Always writes the list form.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let doc = SettingsDoc {
            webhook_urls: self.webhook_urls.clone(),
            webhook_url: None,
        };
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| TrackError::Store(format!("cannot serialize settings: {e}")))?;
        write_json_text_atomic(path, &json)
            .map_err(|e| TrackError::Store(format!("cannot write settings: {e}")))
    }

    /// Registered webhook destinations, in registration order.
    #[must_use]
    pub fn webhooks(&self) -> &[String] {
        &self.webhook_urls
    }

    /// Register a destination.
    ///
    /// The URL must parse as an absolute `http` or `https` URL, and an exact
    /// duplicate of an already registered destination is rejected.
    pub fn add_webhook(&mut self, raw: &str) -> Result<()> {
        let url = Url::parse(raw)
            .map_err(|e| TrackError::InvalidInput(format!("not a valid URL '{raw}': {e}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(TrackError::InvalidInput(format!(
                    "unsupported webhook scheme '{other}' in '{raw}'"
                )));
            }
        }

        if self.webhook_urls.iter().any(|existing| existing == raw) {
            return Err(TrackError::InvalidInput(format!(
                "webhook already registered: {raw}"
            )));
        }

        self.webhook_urls.push(raw.to_owned());
        Ok(())
    }

    /// Unregister a destination by exact URL.
    pub fn remove_webhook(&mut self, raw: &str) -> Result<()> {
        let before = self.webhook_urls.len();
        self.webhook_urls.retain(|existing| existing != raw);
        if self.webhook_urls.len() == before {
            return Err(TrackError::NotFound(format!("webhook not registered: {raw}")));
        }
        Ok(())
    }
}
