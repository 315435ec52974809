//! Time entry store.
//!
//! `identity_hash` is unique, so the store itself refuses duplicates. Inserts
//! go through `ON CONFLICT DO NOTHING` and never raise a uniqueness error:
//! a candidate that loses the race against another import is re-read and
//! reported as existing.

use crate::db::db::{from_sql_timestamp, to_sql_timestamp, Db};
use crate::libs::error::Result;
use crate::libs::time_entry::{IdentityHash, TimeEntry};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::{HashMap, HashSet};

const SELECT_COLUMNS: &str = "SELECT id, identity_hash, start_time, end_time, duration_nanos, comment, csv_import_id FROM time_entries";
const INSERT_ENTRY: &str = "INSERT INTO time_entries (identity_hash, start_time, end_time, duration_nanos, comment, csv_import_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(identity_hash) DO NOTHING
    RETURNING id";
const SELECT_RANGE: &str = "WHERE (?1 IS NULL OR start_time >= ?1) AND (?2 IS NULL OR start_time < ?2) ORDER BY start_time, id";

/// Upper bound on bound parameters per lookup query.
const LOOKUP_CHUNK: usize = 500;

/// Outcome of merging a batch into the store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reconciliation {
    /// Stored records matching a candidate, one per matching candidate.
    pub existing: Vec<TimeEntry>,
    /// Records inserted by this call.
    pub new: Vec<TimeEntry>,
}

impl Reconciliation {
    /// IDs of the stored records that candidates duplicated, without repeats.
    pub fn duplicate_ids(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        self.existing
            .iter()
            .filter_map(|entry| entry.id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Half-open `[from, to)` window on `start_time`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeEntryFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub struct TimeEntries {
    conn: Connection,
}

impl TimeEntries {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::from_db(Db::new()?))
    }

    pub fn from_db(db: Db) -> Self {
        Self { conn: db.conn }
    }

    pub fn find_by_identity_hashes(&self, hashes: &[IdentityHash]) -> Result<Vec<TimeEntry>> {
        find_by_identity_hashes(&self.conn, hashes)
    }

    /// Reconciles `entries` in one immediate transaction. New rows are
    /// attributed to `csv_import_id`.
    pub fn reconcile(&mut self, csv_import_id: Option<i64>, entries: &[TimeEntry]) -> Result<Reconciliation> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let reconciliation = reconcile(&tx, csv_import_id, entries)?;
        tx.commit()?;
        Ok(reconciliation)
    }

    /// Entries starting inside the filter window, in ascending start order.
    pub fn list(&self, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>> {
        list(&self.conn, filter)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM time_entries", [], |row| row.get(0))?)
    }
}

pub fn list(conn: &Connection, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>> {
    let mut stmt = conn.prepare(&format!("{} {}", SELECT_COLUMNS, SELECT_RANGE))?;
    let from = filter.from.as_ref().map(to_sql_timestamp);
    let to = filter.to.as_ref().map(to_sql_timestamp);
    let entries = stmt.query_map(params![from, to], map_entry)?.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

/// Batched exact-match lookup by fingerprint.
pub fn find_by_identity_hashes(conn: &Connection, hashes: &[IdentityHash]) -> Result<Vec<TimeEntry>> {
    let mut found = Vec::new();
    for chunk in hashes.chunks(LOOKUP_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("{} WHERE identity_hash IN ({}) ORDER BY id", SELECT_COLUMNS, placeholders);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter().map(IdentityHash::as_str)), map_entry)?;
        for entry in rows {
            found.push(entry?);
        }
    }
    Ok(found)
}

/// Merges `entries` into the store using the caller's transaction.
pub fn reconcile(conn: &Connection, csv_import_id: Option<i64>, entries: &[TimeEntry]) -> Result<Reconciliation> {
    let mut hashes: Vec<IdentityHash> = entries.iter().map(|entry| entry.identity_hash.clone()).collect();
    hashes.sort();
    hashes.dedup();

    let mut stored: HashMap<IdentityHash, TimeEntry> = find_by_identity_hashes(conn, &hashes)?
        .into_iter()
        .map(|entry| (entry.identity_hash.clone(), entry))
        .collect();
    tracing::debug!(candidates = entries.len(), matched = stored.len(), "looked up stored time entries");

    let mut result = Reconciliation::default();
    let mut insert = conn.prepare(INSERT_ENTRY)?;

    for candidate in entries {
        if let Some(entry) = stored.get(&candidate.identity_hash) {
            result.existing.push(entry.clone());
            continue;
        }

        let inserted: Option<i64> = insert
            .query_row(
                params![
                    candidate.identity_hash.as_str(),
                    to_sql_timestamp(&candidate.start_time),
                    to_sql_timestamp(&candidate.end_time),
                    duration_to_nanos(&candidate.duration),
                    candidate.comment,
                    csv_import_id,
                ],
                |row| row.get(0),
            )
            .optional()?;

        let entry = match inserted {
            Some(id) => {
                let entry = TimeEntry {
                    id: Some(id),
                    csv_import_id,
                    ..candidate.clone()
                };
                tracing::debug!(id, hash = %entry.identity_hash, "inserted time entry");
                result.new.push(entry.clone());
                entry
            }
            None => {
                // Stored concurrently after the lookup.
                let entry = find_by_identity_hashes(conn, std::slice::from_ref(&candidate.identity_hash))?
                    .into_iter()
                    .next()
                    .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
                tracing::debug!(hash = %entry.identity_hash, "time entry stored concurrently");
                result.existing.push(entry.clone());
                entry
            }
        };
        stored.insert(entry.identity_hash.clone(), entry);
    }

    Ok(result)
}

pub(crate) fn map_entry(row: &Row) -> rusqlite::Result<TimeEntry> {
    Ok(TimeEntry {
        id: row.get(0)?,
        identity_hash: IdentityHash::from(row.get::<_, String>(1)?),
        start_time: from_sql_timestamp(&row.get::<_, String>(2)?)?,
        end_time: from_sql_timestamp(&row.get::<_, String>(3)?)?,
        duration: Duration::nanoseconds(row.get(4)?),
        comment: row.get(5)?,
        csv_import_id: row.get(6)?,
    })
}

pub(crate) fn duration_to_nanos(duration: &Duration) -> i64 {
    duration.num_nanoseconds().unwrap_or(i64::MAX)
}
