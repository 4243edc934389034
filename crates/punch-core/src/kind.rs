//! Punch kind enum as the single source of truth for kind tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four punches a clock terminal can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunchKind {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
}

impl PunchKind {
    /// All kinds, in the order a well-formed day records them.
    pub const ALL: [Self; 4] = [
        Self::ClockIn,
        Self::BreakStart,
        Self::BreakEnd,
        Self::ClockOut,
    ];

    /// Canonical storage tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClockIn => "in",
            Self::ClockOut => "out",
            Self::BreakStart => "break_in",
            Self::BreakEnd => "break_out",
        }
    }

    /// Parses a stored tag, returning `None` for kinds this crate doesn't know.
    ///
    /// The reducer uses this so that tags written by newer producers are
    /// skipped instead of rejected.
    pub fn recognize(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }
}

impl fmt::Display for PunchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PunchKind {
    type Err = UnknownPunchKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" | "clock_in" => Ok(Self::ClockIn),
            "out" | "clock_out" => Ok(Self::ClockOut),
            "break_in" | "break_start" => Ok(Self::BreakStart),
            "break_out" | "break_end" => Ok(Self::BreakEnd),
            _ => Err(UnknownPunchKind(s.to_string())),
        }
    }
}

impl Serialize for PunchKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PunchKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown punch kind tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPunchKind(String);

impl UnknownPunchKind {
    /// The tag that failed to parse.
    pub fn tag(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnknownPunchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown punch kind: {} (expected one of: in, out, break_in, break_out)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPunchKind {}
