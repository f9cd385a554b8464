//! Collection orchestration.
//!
//! Drives one collection pass over every tracked file and owns the batch
//! edits of the tracked set. Collection is deliberately serial, one fetch in
//! flight at a time, because the stats endpoint rate-limits bursts. Each file
//! is isolated: a failed fetch is recorded and the loop moves on.

use crate::diff::compute_diff;
use crate::error::{Result, TrackError};
use crate::prompt::Confirm;
use crate::provider::StatsProvider;
use crate::report::render_file_report;
use crate::settings::Settings;
use crate::store::{Sample, TrackedFile, TrackedStore};
use crate::webhook::{DispatchOutcome, NotifyPayload, WebhookDispatcher};
use tracing::{info, warn};
use url::Url;

/// Growing the tracked set past this many files asks for confirmation first.
/// A soft threshold, not a hard limit.
pub const SOFT_TRACK_LIMIT: usize = 5;

/// Resolve a command-line argument into a resource id.
///
/// Accepts either a bare numeric id or a resource URL whose path carries the
/// id directly after a `file` segment, e.g.
/// `https://host/community/file/123456789`.
///
/// # Errors
///
/// Returns [`TrackError::InvalidInput`] when the argument is neither form.
pub fn extract_resource_id(input: &str) -> Result<String> {
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(input.to_owned());
    }

    let url = Url::parse(input)
        .map_err(|_| TrackError::InvalidInput(format!("not a file id or URL: '{input}'")))?;
    let mut segments = url
        .path_segments()
        .ok_or_else(|| TrackError::InvalidInput(format!("no file id in URL: '{input}'")))?;

    while let Some(segment) = segments.next() {
        if segment == "file"
            && let Some(id) = segments.next()
            && !id.is_empty()
            && id.bytes().all(|b| b.is_ascii_digit())
        {
            return Ok(id.to_owned());
        }
    }

    Err(TrackError::InvalidInput(format!(
        "no file id in URL: '{input}'"
    )))
}

/// Per-item result of a tracked-set edit.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// The argument as given (bare id or URL).
    pub input: String,
    /// Resolved resource id, when extraction succeeded.
    pub id: Option<String>,
    /// Display name involved, when known.
    pub name: Option<String>,
    /// `None` when the edit applied.
    pub error: Option<String>,
}

impl ItemOutcome {
    /// Returns `true` when the edit applied.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a batch add.
#[derive(Debug, Clone)]
pub struct AddSummary {
    /// Per-item outcomes, in argument order. Empty when cancelled.
    pub items: Vec<ItemOutcome>,
    /// The soft-limit confirmation was declined; nothing changed.
    pub cancelled: bool,
}

/// Per-file result of a collection pass.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Resource id.
    pub id: String,
    /// Display name, refreshed when the fetch succeeded.
    pub name: String,
    /// `None` when the file was sampled.
    pub error: Option<String>,
}

impl FileOutcome {
    /// Returns `true` when the file was sampled.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one collection pass.
#[derive(Debug)]
pub struct CollectionSummary {
    /// Per-file outcomes, in store order.
    pub files: Vec<FileOutcome>,
    /// Combined report sent to the webhooks. `None` when no file was sampled.
    pub message: Option<String>,
    /// Per-destination delivery outcomes.
    pub dispatch: Vec<DispatchOutcome>,
}

impl CollectionSummary {
    /// Number of files sampled this pass.
    #[must_use]
    pub fn sampled(&self) -> usize {
        self.files.iter().filter(|f| f.succeeded()).count()
    }

    /// Number of files whose fetch failed this pass.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.files.len() - self.sampled()
    }
}

/// Runs collection passes and tracked-set edits.
pub struct Collector<'a> {
    provider: &'a dyn StatsProvider,
    dispatcher: &'a WebhookDispatcher,
}

impl<'a> Collector<'a> {
    /// Build a collector over the given provider and dispatcher.
    pub fn new(provider: &'a dyn StatsProvider, dispatcher: &'a WebhookDispatcher) -> Self {
        Self {
            provider,
            dispatcher,
        }
    }

    /// One collection pass over every tracked file.
    ///
    /// Each sampled file gets a fresh record appended and its display name
    /// refreshed. The store is persisted exactly once, after the loop and
    /// before dispatch, so the history survives even when every delivery
    /// fails. All per-file reports go out as one combined payload.
    ///
    /// # Errors
    ///
    /// Only a store write failure aborts the pass. Fetch and delivery
    /// failures are recorded in the summary.
    pub async fn run(
        &self,
        store: &mut TrackedStore,
        settings: &Settings,
    ) -> Result<CollectionSummary> {
        if store.is_empty() {
            info!("no files tracked, nothing to collect");
            return Ok(CollectionSummary {
                files: Vec::new(),
                message: None,
                dispatch: Vec::new(),
            });
        }

        let mut files = Vec::new();
        let mut reports = Vec::new();

        for id in store.ids() {
            match self.provider.fetch(&id).await {
                Ok(stats) => {
                    let Some(file) = store.get_mut(&id) else {
                        continue;
                    };
                    file.name = stats.name;
                    let sample = Sample::now(stats.user_count, stats.like_count);
                    let diff = compute_diff(&file.records, &sample);
                    reports.push(render_file_report(&file.name, &diff));
                    file.records.push(sample);
                    files.push(FileOutcome {
                        id,
                        name: file.name.clone(),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("stats fetch for {id} failed: {e}");
                    let name = store.get(&id).map(|f| f.name.clone()).unwrap_or_default();
                    files.push(FileOutcome {
                        id,
                        name,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        store.save()?;

        let sampled = files.iter().filter(|f| f.succeeded()).count();
        info!(
            "collection pass done: {sampled} sampled, {} failed",
            files.len() - sampled
        );

        let message = (!reports.is_empty()).then(|| reports.join("\n\n"));
        let dispatch = match &message {
            Some(text) => {
                self.dispatcher
                    .dispatch(settings.webhooks(), &NotifyPayload::text(text.clone()))
                    .await
            }
            None => Vec::new(),
        };

        Ok(CollectionSummary {
            files,
            message,
            dispatch,
        })
    }

    /// Start tracking each given id or URL.
    ///
    /// Items are validated independently: an invalid argument, an already
    /// tracked id, or a repeat within the batch is reported without aborting
    /// the rest. Growing the set past [`SOFT_TRACK_LIMIT`] asks `confirm`
    /// once before anything changes; declining discards the whole batch.
    /// Every new id is verified with one stats fetch, which also resolves
    /// the stored display name. History starts empty and fills on the next
    /// collection run.
    ///
    /// # Errors
    ///
    /// Only a store write failure aborts the batch.
    pub async fn add(
        &self,
        store: &mut TrackedStore,
        inputs: &[String],
        confirm: &dyn Confirm,
    ) -> Result<AddSummary> {
        enum Plan {
            Track { input: String, id: String },
            Skip(ItemOutcome),
        }

        let mut plan = Vec::new();
        let mut new_ids = 0usize;
        for input in inputs {
            match extract_resource_id(input) {
                Ok(id) => {
                    if store.contains(&id) {
                        let name = store.get(&id).map(|f| f.name.clone());
                        plan.push(Plan::Skip(ItemOutcome {
                            input: input.clone(),
                            id: Some(id),
                            name,
                            error: Some("already tracked".to_owned()),
                        }));
                    } else if plan
                        .iter()
                        .any(|p| matches!(p, Plan::Track { id: seen, .. } if *seen == id))
                    {
                        plan.push(Plan::Skip(ItemOutcome {
                            input: input.clone(),
                            id: Some(id),
                            name: None,
                            error: Some("given more than once".to_owned()),
                        }));
                    } else {
                        new_ids += 1;
                        plan.push(Plan::Track {
                            input: input.clone(),
                            id,
                        });
                    }
                }
                Err(e) => plan.push(Plan::Skip(ItemOutcome {
                    input: input.clone(),
                    id: None,
                    name: None,
                    error: Some(e.to_string()),
                })),
            }
        }

        let prospective = store.len() + new_ids;
        if new_ids > 0 && prospective > SOFT_TRACK_LIMIT {
            let prompt = format!(
                "this would track {prospective} files (more than {SOFT_TRACK_LIMIT}); continue?"
            );
            if !confirm.confirm(&prompt) {
                info!("add cancelled at the soft tracking limit");
                return Ok(AddSummary {
                    items: Vec::new(),
                    cancelled: true,
                });
            }
        }

        let mut items = Vec::new();
        let mut changed = false;
        for entry in plan {
            match entry {
                Plan::Skip(item) => items.push(item),
                Plan::Track { input, id } => match self.provider.fetch(&id).await {
                    Ok(stats) => {
                        store.insert(id.clone(), TrackedFile::new(stats.name.clone()));
                        changed = true;
                        info!("tracking {} ({id})", stats.name);
                        items.push(ItemOutcome {
                            input,
                            id: Some(id),
                            name: Some(stats.name),
                            error: None,
                        });
                    }
                    Err(e) => {
                        warn!("cannot verify {id}, not tracking it: {e}");
                        items.push(ItemOutcome {
                            input,
                            id: Some(id),
                            name: None,
                            error: Some(e.to_string()),
                        });
                    }
                },
            }
        }

        if changed {
            store.save()?;
        }
        Ok(AddSummary {
            items,
            cancelled: false,
        })
    }
}

/// Stop tracking each given id or URL.
///
/// Unknown ids are reported per item, not fatal. The store is persisted once
/// when at least one entry was removed.
///
/// # Errors
///
/// Only a store write failure aborts the batch.
pub fn remove_files(store: &mut TrackedStore, inputs: &[String]) -> Result<Vec<ItemOutcome>> {
    let mut items = Vec::new();
    let mut changed = false;

    for input in inputs {
        match extract_resource_id(input) {
            Ok(id) => match store.remove(&id) {
                Some(file) => {
                    changed = true;
                    info!("stopped tracking {} ({id})", file.name);
                    items.push(ItemOutcome {
                        input: input.clone(),
                        id: Some(id),
                        name: Some(file.name),
                        error: None,
                    });
                }
                None => items.push(ItemOutcome {
                    input: input.clone(),
                    id: Some(id.clone()),
                    name: None,
                    error: Some(format!("not tracked: {id}")),
                }),
            },
            Err(e) => items.push(ItemOutcome {
                input: input.clone(),
                id: None,
                name: None,
                error: Some(e.to_string()),
            }),
        }
    }

    if changed {
        store.save()?;
    }
    Ok(items)
}
