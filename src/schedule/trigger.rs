//! Daily trigger times and the minimum-gap safety computation.

use crate::error::{Result, TrackError};
use serde::{Deserialize, Serialize};

/// One daily firing time for the collection job.
///
/// Serializes with launchd's calendar-interval key names (`Hour`, `Minute`).
/// Ordering follows time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Trigger {
    /// Hour of day (0-23).
    pub hour: u8,
    /// Minute of hour (0-59).
    pub minute: u8,
}

impl Trigger {
    /// Build a trigger, validating both fields.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 {
            return Err(TrackError::InvalidInput(format!(
                "hour out of range in trigger: {hour}"
            )));
        }
        if minute > 59 {
            return Err(TrackError::InvalidInput(format!(
                "minute out of range in trigger: {minute}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Parse the fixed `HH:MM` 24-hour form. Both fields must be zero padded;
    /// `9:30` is rejected, `09:30` is accepted.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && bytes[0].is_ascii_digit()
            && bytes[1].is_ascii_digit()
            && bytes[3].is_ascii_digit()
            && bytes[4].is_ascii_digit();
        if !well_formed {
            return Err(TrackError::InvalidInput(format!(
                "not a valid HH:MM time: '{s}'"
            )));
        }

        let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
        let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
        Self::new(hour, minute)
            .map_err(|_| TrackError::InvalidInput(format!("not a valid HH:MM time: '{s}'")))
    }

    /// Minutes elapsed since midnight.
    #[must_use]
    pub fn minutes_since_midnight(&self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse a whole batch of `HH:MM` strings.
///
/// Any malformed entry rejects the entire batch; there is no partial
/// application of schedule edits.
pub fn parse_all<S: AsRef<str>>(times: &[S]) -> Result<Vec<Trigger>> {
    times.iter().map(|t| Trigger::parse(t.as_ref())).collect()
}

/// Minimum pairwise gap between triggers, in minutes, computed circularly:
/// the wrap-around from the latest trigger to the earliest one across
/// midnight counts as a gap too.
///
/// Fewer than two triggers have no meaningful gap and return `None`.
#[must_use]
pub fn minimum_gap_minutes(triggers: &[Trigger]) -> Option<u32> {
    if triggers.len() < 2 {
        return None;
    }

    let mut minutes: Vec<u32> = triggers.iter().map(Trigger::minutes_since_midnight).collect();
    minutes.sort_unstable();

    let mut min_gap = u32::MAX;
    for pair in minutes.windows(2) {
        min_gap = min_gap.min(pair[1] - pair[0]);
    }

    let first = minutes[0];
    let last = minutes[minutes.len() - 1];
    min_gap = min_gap.min(24 * 60 - last + first);

    Some(min_gap)
}
