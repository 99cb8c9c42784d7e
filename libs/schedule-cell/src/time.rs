//! Clock-time arithmetic for same-day scheduling.
//!
//! All clinic scheduling happens within a single day, so times are plain
//! minute-of-day values. Addition deliberately does not wrap past 24:00:
//! an over-the-edge slot end must stay greater than every real closing
//! time so the window check rejects it.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid time of day: {0:?}")]
pub struct ParseTimeError(String);

/// Minutes since midnight. Parses from `"HH:MM"` (seconds in `"HH:MM:SS"`
/// input are truncated) and formats back to `"HH:MM"`. Ordering is numeric,
/// which matches the lexicographic order of zero-padded time strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(TimeOfDay(hour * 60 + minute))
    }

    pub fn minutes_from_midnight(self) -> u16 {
        self.0
    }

    /// Add a duration. No wrap past 24:00 on purpose; results past the end
    /// of the day only ever show up as candidate slot ends and always fail
    /// the closing-time comparison.
    pub fn add_minutes(self, minutes: u32) -> TimeOfDay {
        let total = (self.0 as u32).saturating_add(minutes);
        TimeOfDay(total.min(u16::MAX as u32) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(':');

        let hour = parts
            .next()
            .and_then(|part| part.parse::<u16>().ok())
            .ok_or_else(|| ParseTimeError(raw.to_string()))?;
        let minute = parts
            .next()
            .and_then(|part| part.parse::<u16>().ok())
            .ok_or_else(|| ParseTimeError(raw.to_string()))?;

        // A third component is tolerated ("HH:MM:SS" from the store) and
        // truncated; anything beyond that is malformed.
        if parts.clone().count() > 1 {
            return Err(ParseTimeError(raw.to_string()));
        }
        if let Some(seconds) = parts.next() {
            if seconds.parse::<u16>().is_err() {
                return Err(ParseTimeError(raw.to_string()));
            }
        }

        TimeOfDay::from_hm(hour, minute).ok_or_else(|| ParseTimeError(raw.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Half-open interval overlap: a slot ending exactly when another starts is
/// not a conflict, so back-to-back bookings are allowed.
pub fn ranges_overlap(
    a_start: TimeOfDay,
    a_end: TimeOfDay,
    b_start: TimeOfDay,
    b_end: TimeOfDay,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Break-window overlap uses closed-interval comparisons: a slot that ends
/// exactly at break start (or starts exactly at break end) still counts as
/// a conflict. Stricter than booking-to-booking overlap; reviewed and kept
/// as-is since relaxing it would change which slots the clinic offers.
pub fn overlaps_break(
    slot_start: TimeOfDay,
    slot_end: TimeOfDay,
    break_start: Option<TimeOfDay>,
    break_end: Option<TimeOfDay>,
) -> bool {
    match (break_start, break_end) {
        (Some(break_start), Some(break_end)) => {
            slot_start <= break_end && slot_end >= break_start
        }
        _ => false,
    }
}
