//! Grafana duration strings.
//!
//! Grafana provisioning files express windows and intervals as
//! `<integer><unit>` strings (`"30s"`, `"5m"`, `"1h"`, `"7d"`). This module
//! converts them to whole seconds and back. Only exact, integral values are
//! accepted, so a value that went through [`parse_duration_to_seconds`] and
//! [`seconds_to_duration`] keeps its canonical spelling.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AlertGenError, Result};

/// Seconds in one minute.
pub const MINUTE: u64 = 60;
/// Seconds in one hour.
pub const HOUR: u64 = 60 * MINUTE;
/// Seconds in one day.
pub const DAY: u64 = 24 * HOUR;

static DURATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)([smhd])$").unwrap_or_else(|_| unreachable!()));

/// Parses a `<integer><unit>` duration string into seconds.
///
/// # Errors
///
/// Returns [`AlertGenError::ConfigFormat`] if the string does not match the
/// pattern or the value does not fit in a `u64`.
pub fn parse_duration_to_seconds(s: &str) -> Result<u64> {
    parse_with_key(s, "duration")
}

/// Same as [`parse_duration_to_seconds`] but reports `key` in the error.
pub(crate) fn parse_with_key(s: &str, key: &str) -> Result<u64> {
    let caps = DURATION_REGEX
        .captures(s)
        .ok_or_else(|| AlertGenError::bad_duration(key, s))?;

    let value: u64 = caps[1]
        .parse()
        .map_err(|_| AlertGenError::bad_duration(key, s))?;

    let multiplier = match &caps[2] {
        "s" => 1,
        "m" => MINUTE,
        "h" => HOUR,
        "d" => DAY,
        _ => return Err(AlertGenError::bad_duration(key, s)),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| AlertGenError::bad_duration(key, s))
}

/// Formats seconds using the largest unit that divides them exactly.
///
/// Zero is rendered as `"0s"`.
pub fn seconds_to_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    if seconds % DAY == 0 {
        format!("{}d", seconds / DAY)
    } else if seconds % HOUR == 0 {
        format!("{}h", seconds / HOUR)
    } else if seconds % MINUTE == 0 {
        format!("{}m", seconds / MINUTE)
    } else {
        format!("{seconds}s")
    }
}

/// A validated Grafana duration, stored as whole seconds.
///
/// Serializes as its canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GrafanaDuration(u64);

impl GrafanaDuration {
    /// Creates a duration from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the duration in seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Parses a duration, naming `key` in the error if it is malformed.
    pub(crate) fn parse_field(s: &str, key: &str) -> Result<Self> {
        parse_with_key(s, key).map(Self)
    }
}

impl FromStr for GrafanaDuration {
    type Err = AlertGenError;

    fn from_str(s: &str) -> Result<Self> {
        parse_duration_to_seconds(s).map(Self)
    }
}

impl TryFrom<String> for GrafanaDuration {
    type Error = AlertGenError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<GrafanaDuration> for String {
    fn from(d: GrafanaDuration) -> Self {
        d.to_string()
    }
}

impl fmt::Display for GrafanaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&seconds_to_duration(self.0))
    }
}
