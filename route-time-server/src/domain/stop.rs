//! Stop identifiers.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading characters of a stop id used to pick its corpus partition.
pub const PARTITION_PREFIX_LEN: usize = 2;

/// An opaque stop identifier from the published database.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        StopId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The partition prefix: the first two characters of the id.
    ///
    /// Ids shorter than two characters are their own prefix.
    pub fn prefix(&self) -> &str {
        match self.0.char_indices().nth(PARTITION_PREFIX_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl Borrow<str> for StopId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StopId {
    fn from(s: &str) -> Self {
        StopId(s.to_string())
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
