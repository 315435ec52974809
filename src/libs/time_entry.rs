//! Time entries and their identity fingerprints.
//!
//! An entry is identified by what it says, not by where it is stored: the
//! start time, end time and comment. [`IdentityHash`] condenses that tuple
//! into a stable string that serves as the natural key in the store and as
//! the dedup key during reconciliation. The row ID never takes part in it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of digest bytes kept in a fingerprint (128 bits).
const IDENTITY_HASH_BYTES: usize = 16;

/// Content fingerprint of a `(start, end, comment)` tuple.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityHash(String);

impl IdentityHash {
    /// Fingerprints the identifying fields of an entry.
    ///
    /// Each field is written with a fixed width or a length prefix, so no two
    /// distinct tuples share an encoding.
    pub fn compute(start_time: &DateTime<Utc>, end_time: &DateTime<Utc>, comment: &str) -> Self {
        let mut hasher = Sha256::new();
        for instant in [start_time, end_time] {
            hasher.update(instant.timestamp().to_be_bytes());
            hasher.update(instant.timestamp_subsec_nanos().to_be_bytes());
        }
        hasher.update((comment.len() as u64).to_be_bytes());
        hasher.update(comment.as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..IDENTITY_HASH_BYTES]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityHash({})", self.0)
    }
}

impl From<String> for IdentityHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A period of worked time.
///
/// Entries are append-only: once stored they are never changed or removed.
/// `duration` and `identity_hash` are derived from the other fields by
/// [`TimeEntry::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub comment: String,
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    pub identity_hash: IdentityHash,
    /// Import that first stored the entry.
    pub csv_import_id: Option<i64>,
}

impl TimeEntry {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>, comment: &str) -> Self {
        TimeEntry {
            id: None,
            start_time,
            end_time,
            comment: comment.to_string(),
            duration: end_time - start_time,
            identity_hash: IdentityHash::compute(&start_time, &end_time, comment),
            csv_import_id: None,
        }
    }

    /// Fingerprint recomputed from the identifying fields.
    pub fn compute_identity_hash(&self) -> IdentityHash {
        IdentityHash::compute(&self.start_time, &self.end_time, &self.comment)
    }
}

/// Sum of the durations of `entries`.
pub fn total_duration<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> Duration {
    entries.into_iter().fold(Duration::zero(), |acc, entry| acc + entry.duration)
}

/// Serializes a duration as signed nanoseconds.
pub mod duration_nanos {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        match duration.num_nanoseconds() {
            Some(nanos) => serializer.serialize_i64(nanos),
            None => Err(serde::ser::Error::custom("duration does not fit in nanoseconds")),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::nanoseconds(i64::deserialize(deserializer)?))
    }
}
