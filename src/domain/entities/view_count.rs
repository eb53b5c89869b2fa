//! View count entity.

use serde::Serialize;
use std::fmt;

/// Number of views recorded for a slug.
///
/// Stored as a string-encoded integer. A missing key is a count of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ViewCount(u64);

impl ViewCount {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// The count after one more view. Saturates instead of wrapping.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Parses a value as read from the store.
    ///
    /// Accepts leading whitespace, an optional `+` and a run of ASCII digits;
    /// anything after the digits is ignored (`"12abc"` reads as 12). A value with
    /// no leading digits, a negative value or one that overflows `u64` reads as
    /// zero. Parsing never fails.
    pub fn parse_stored(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());

        unsigned[..end].parse().map(Self).unwrap_or_default()
    }

    /// Encodes the count the way it is persisted.
    pub fn to_stored(self) -> String {
        self.0.to_string()
    }
}

impl From<u64> for ViewCount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ViewCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
