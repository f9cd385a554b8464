//! Delta computation between the latest observation and the prior one.

use crate::store::Sample;
use serde::{Deserialize, Serialize};

/// Engagement counters for one file, with deltas against the prior observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Calendar day of the latest observation.
    pub date: String,
    /// Member count at the latest observation.
    pub user_count: u64,
    /// Like count at the latest observation.
    pub like_count: u64,
    /// Change in member count since the baseline. `None` on first observation.
    pub user_delta: Option<i64>,
    /// Change in like count since the baseline. `None` on first observation.
    pub like_delta: Option<i64>,
    /// Reference of the baseline observation (timestamp, or date when the
    /// baseline has none). `None` on first observation.
    pub compared_against: Option<String>,
}

impl Diff {
    /// Returns `true` when there was no prior observation to compare against.
    #[must_use]
    pub fn is_first_observation(&self) -> bool {
        self.compared_against.is_none()
    }
}

/// Compute deltas for `latest` against the most recent entry of `history`.
///
/// The baseline is the last appended record regardless of calendar day, so
/// two runs on the same day compare against each other rather than against
/// the previous day. An empty history yields `None` deltas, which render
/// differently from a zero delta.
#[must_use]
pub fn compute_diff(history: &[Sample], latest: &Sample) -> Diff {
    let baseline = history.last();
    Diff {
        date: latest.date.clone(),
        user_count: latest.user_count,
        like_count: latest.like_count,
        user_delta: baseline.map(|b| latest.user_count as i64 - b.user_count as i64),
        like_delta: baseline.map(|b| latest.like_count as i64 - b.like_count as i64),
        compared_against: baseline.map(|b| b.reference().to_owned()),
    }
}
