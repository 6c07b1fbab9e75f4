//! Clock times in the published "HHMM" format.

use std::fmt;

/// Error returned when parsing an invalid HHMM value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid HHMM time: {0:?}")]
pub struct InvalidHhmm(String);

/// A clock time written as a 4-digit integer, e.g. `0600` or `2330`.
///
/// Values past `2359` are accepted: frequency tables use them for
/// services that continue past midnight (`2530` is 01:30 the next day).
/// Ordering compares the raw integers, matching how the published data
/// is meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hhmm(u32);

impl Hhmm {
    /// Wrap a raw HHMM integer.
    pub fn from_raw(value: u32) -> Self {
        Hhmm(value)
    }

    /// Parse a string of ASCII digits (surrounding whitespace allowed).
    pub fn parse(s: &str) -> Result<Self, InvalidHhmm> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidHhmm(s.to_string()));
        }
        trimmed
            .parse::<u32>()
            .map(Hhmm)
            .map_err(|_| InvalidHhmm(s.to_string()))
    }

    /// Parse a JSON value holding either a digit string or a non-negative integer.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse(s).ok(),
            serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()).map(Hhmm),
            _ => None,
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Minutes after midnight: `hh * 60 + mm`.
    pub fn minutes(self) -> u32 {
        (self.0 / 100) * 60 + self.0 % 100
    }
}

impl fmt::Display for Hhmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}
