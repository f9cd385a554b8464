//! Filepulse: engagement tracking for shared community files.
//!
//! Samples member and like counters for every tracked file, keeps an
//! append-only history per file, and reports deltas to registered webhook
//! destinations. Recurring runs belong to a single launchd agent whose
//! descriptor is rewritten and reloaded whenever the schedule changes.
//!
//! # Architecture
//!
//! A collection pass flows through independent pieces:
//! - **Store**: append-only per-file history persisted as JSON
//! - **Provider**: stats endpoint client behind the [`StatsProvider`] trait
//! - **Diff + report**: pure delta computation and message rendering
//! - **Dispatch**: concurrent webhook fan-out with per-target outcomes
//! - **Schedule**: launchd descriptor codec and reconciliation state machine

pub mod collect;
pub mod diff;
pub mod error;
pub mod paths;
pub mod prompt;
pub mod provider;
pub mod report;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod test_utils;
pub mod webhook;

pub use collect::{CollectionSummary, Collector};
pub use error::{Result, TrackError};
pub use paths::AppPaths;
pub use provider::{HttpStatsProvider, StatsProvider};
pub use settings::Settings;
pub use store::TrackedStore;
pub use webhook::{NotifyPayload, WebhookDispatcher};
