//! Daily run scheduling.
//!
//! Persists scheduled run times as a launchd agent descriptor and keeps the
//! loaded job in sync with the file. Triggers are plain `HH:MM` times of day;
//! launchd does the actual waking.

pub mod descriptor;
pub mod launchctl;
pub mod reconciler;
pub mod trigger;

pub use descriptor::Descriptor;
pub use launchctl::{JobControl, Launchctl};
pub use reconciler::{AddOutcome, MIN_GAP_MINUTES, Reconciler, RemoveOutcome, ScheduleStatus};
pub use trigger::{Trigger, minimum_gap_minutes};
