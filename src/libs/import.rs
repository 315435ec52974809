//! Parse-and-store pipeline for one uploaded CSV file.
//!
//! The import record, the new entries and the duplicate audit are written in
//! a single immediate transaction: a failure anywhere leaves nothing behind.

use crate::db::csv_imports::{self, CsvImport};
use crate::db::db::Db;
use crate::db::time_entries;
use crate::libs::csv_parser::{ColumnMapping, CsvTimeEntryParser};
use crate::libs::error::Result;
use crate::libs::time_entry::TimeEntry;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportResult {
    /// The stored import, with duplicate IDs attached.
    pub csv_import: CsvImport,
    /// Stored records the file duplicated.
    pub existing: Vec<TimeEntry>,
    /// Records created by this import.
    pub new: Vec<TimeEntry>,
}

pub struct Importer {
    conn: Connection,
}

impl Importer {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::from_db(Db::new()?))
    }

    pub fn from_db(db: Db) -> Self {
        Self { conn: db.conn }
    }

    /// Stores `csv_import`, reconciles `entries` against the store and
    /// records which stored entries the file duplicated.
    pub fn reconcile_and_store(&mut self, csv_import: &CsvImport, entries: &[TimeEntry]) -> Result<ImportResult> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut stored = csv_imports::insert(&tx, csv_import)?;
        let csv_import_id = stored.id;
        let reconciliation = time_entries::reconcile(&tx, csv_import_id, entries)?;

        stored.duplicate_time_entry_ids = reconciliation.duplicate_ids();
        if let Some(id) = csv_import_id {
            csv_imports::set_duplicates(&tx, id, &stored.duplicate_time_entry_ids)?;
        }
        tx.commit()?;

        tracing::info!(
            file = %stored.file_name,
            new = reconciliation.new.len(),
            existing = reconciliation.existing.len(),
            "reconciled CSV import"
        );

        Ok(ImportResult {
            csv_import: stored,
            existing: reconciliation.existing,
            new: reconciliation.new,
        })
    }

    /// Parses `file_contents` and stores the result. Nothing is written when
    /// parsing fails.
    pub fn import(&mut self, file_name: &str, file_contents: &str, columns: &ColumnMapping, timezone: &str) -> Result<ImportResult> {
        let parser = CsvTimeEntryParser::with_timezone(columns.clone(), timezone)?;
        let entries = parser.parse(file_contents)?;
        self.reconcile_and_store(&CsvImport::new(file_name, file_contents), &entries)
    }
}
