//! Common types used across the platform

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest representable step between two timestamps in the ledger
pub fn tick() -> Duration {
    Duration::microseconds(1)
}

/// Report bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    Day,
    Week,
    Month,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Day => "day",
            Resolution::Week => "week",
            Resolution::Month => "month",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resolution: {0:?}")]
pub struct ParseResolutionError(pub String);

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Resolution::Day),
            "week" => Ok(Resolution::Week),
            "month" => Ok(Resolution::Month),
            other => Err(ParseResolutionError(other.to_string())),
        }
    }
}

/// One report bucket. Both bounds are inclusive; `end` is the last tick before
/// the next bucket starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The instant right before this period begins
    pub fn before_start(&self) -> DateTime<Utc> {
        self.start - tick()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    /// `YYYY-MM-DD` of the first day
    pub fn start_label(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// `YYYY-MM-DD` of the last day
    pub fn end_label(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}
