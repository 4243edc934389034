//! Raw punch events as handed to the core by storage or tests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::kind::PunchKind;
use crate::window::localize;

/// When a punch happened.
///
/// Terminals and imports don't always record an offset, so naive wall-clock
/// readings are accepted alongside zone-aware ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchTime {
    /// Wall-clock time in whatever zone the day is evaluated in.
    Naive(NaiveDateTime),
    /// An absolute instant.
    Zoned(DateTime<FixedOffset>),
}

impl PunchTime {
    /// Resolves this time as an instant in `tz`.
    ///
    /// Naive readings are taken as local time in `tz`, not UTC.
    pub fn in_zone(&self, tz: Tz) -> DateTime<Tz> {
        match self {
            Self::Naive(naive) => localize(*naive, tz),
            Self::Zoned(dt) => dt.with_timezone(&tz),
        }
    }
}

impl<Z: chrono::TimeZone> From<DateTime<Z>> for PunchTime {
    fn from(dt: DateTime<Z>) -> Self {
        Self::Zoned(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for PunchTime {
    fn from(naive: NaiveDateTime) -> Self {
        Self::Naive(naive)
    }
}

impl fmt::Display for PunchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Zoned(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

impl FromStr for PunchTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::Zoned(dt));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .map(Self::Naive)
    }
}

impl Serialize for PunchTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PunchTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An event the reconciliation can consume.
///
/// This trait allows summaries to work with different event representations
/// (e.g., `PunchRecord` from punch-db, or test fixtures).
pub trait PunchLike {
    /// Returns when the punch happened.
    fn punch_time(&self) -> PunchTime;

    /// Returns the raw kind tag (e.g., "in", "`break_out`").
    ///
    /// Tags that don't parse as a [`PunchKind`] are carried through and
    /// ignored by the reducer.
    fn kind_tag(&self) -> &str;
}

/// A plain owned punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punch {
    /// When the punch happened.
    pub at: PunchTime,
    /// The raw kind tag.
    pub kind: String,
}

impl Punch {
    /// Creates a punch of a known kind.
    pub fn new(at: impl Into<PunchTime>, kind: PunchKind) -> Self {
        Self {
            at: at.into(),
            kind: kind.as_str().to_string(),
        }
    }

    /// Creates a punch with an arbitrary tag, which may not be a known kind.
    pub fn tagged(at: impl Into<PunchTime>, tag: impl Into<String>) -> Self {
        Self {
            at: at.into(),
            kind: tag.into(),
        }
    }
}

impl PunchLike for Punch {
    fn punch_time(&self) -> PunchTime {
        self.at
    }

    fn kind_tag(&self) -> &str {
        &self.kind
    }
}

impl<T: PunchLike> PunchLike for &T {
    fn punch_time(&self) -> PunchTime {
        (*self).punch_time()
    }

    fn kind_tag(&self) -> &str {
        (*self).kind_tag()
    }
}
