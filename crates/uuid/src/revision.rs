//! Time-prefixed revision identifiers for committed store documents.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};
use std::{fmt, str::FromStr};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";

/// A time-prefixed revision identifier.
///
/// Format: `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
///
/// Example: `20260111T143522.045Z-550e8400e29b41d4a716446655440000`
///
/// When generated with the previous revision of the same document, the timestamp is
/// strictly greater than the previous one (bumped by 1ms if the clock has not advanced).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RevisionId {
    timestamp: DateTime<Utc>,
    uuid: Uuid,
}

impl RevisionId {
    /// Generate a new revision id, strictly after `previous` when given.
    ///
    /// The timestamp is kept at millisecond precision so the rendered form orders the
    /// same way as the value.
    pub fn generate(previous: Option<&RevisionId>) -> Self {
        let now = Utc::now().trunc_subsecs(3);

        let timestamp = match previous {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        Self {
            timestamp,
            uuid: Uuid::new_v4(),
        }
    }

    /// Returns the timestamp component.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the UUID component.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl FromStr for RevisionId {
    type Err = UuidError;

    fn from_str(s: &str) -> UuidResult<Self> {
        let (ts_str, uuid_str) = s.split_once('-').ok_or_else(|| {
            UuidError::InvalidInput(format!("Invalid revision id format: '{}'", s))
        })?;

        let ts_no_z = ts_str.strip_suffix('Z').ok_or_else(|| {
            UuidError::InvalidInput(format!("Timestamp must end with 'Z': '{}'", ts_str))
        })?;

        let naive = NaiveDateTime::parse_from_str(ts_no_z, TIMESTAMP_FORMAT).map_err(|e| {
            UuidError::InvalidInput(format!("Invalid timestamp format '{}': {}", ts_str, e))
        })?;

        let uuid = crate::PatientId::parse(uuid_str)?.uuid();

        Ok(Self {
            timestamp: DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc),
            uuid,
        })
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Z-{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.uuid.simple()
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RevisionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RevisionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
