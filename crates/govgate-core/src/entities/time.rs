// crates/govgate-core/src/entities/time.rs
// ============================================================================
// Module: Governed Decision Engine Time Model
// Description: Canonical UTC timestamp used across every entity and log entry.
// Purpose: Provide a single, ordered, ISO 8601 wire representation of time.
// Dependencies: time, serde
// ============================================================================

//! ## Overview
//! All persisted records carry an explicit [`Timestamp`]. The orchestrator is
//! the only component that reads wall-clock time (see
//! `crate::orchestrator::Clock`); every other component receives time as
//! caller-supplied data, which keeps the pure validators and the event log
//! replay deterministic.

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as DeError;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// UTC timestamp, serialized as an RFC 3339 / ISO 8601 string on the wire.
///
/// # Invariants
/// - Always normalized to UTC on construction.
/// - Ordering matches instant ordering (non-decreasing ids in the event log
///   imply non-decreasing timestamps, per spec's verification rules).
#[derive(Debug, Clone, Copy)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Wraps an `OffsetDateTime`, normalizing it to UTC.
    #[must_use]
    pub fn new(value: OffsetDateTime) -> Self {
        Self(value.to_offset(time::UtcOffset::UTC))
    }

    /// Returns the inner `OffsetDateTime`.
    #[must_use]
    pub const fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    /// Formats the timestamp as RFC 3339.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be formatted (only possible
    /// for dates outside the representable range).
    pub fn to_rfc3339(self) -> Result<String, time::error::Format> {
        self.0.format(&Rfc3339)
    }

    /// Parses an RFC 3339 timestamp string.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is not valid RFC 3339.
    pub fn parse(value: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(value, &Rfc3339).map(Self::new)
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<unrepresentable timestamp>"),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = self
            .to_rfc3339()
            .map_err(|err| serde::ser::Error::custom(err.to_string()))?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(DeError::custom)
    }
}
