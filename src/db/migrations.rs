//! Versioned schema migrations.
//!
//! Every migration runs once, in version order, inside one transaction
//! together with the rest of the pending batch. Applied versions are recorded
//! in the `migrations` table.
//!
//! ```rust
//! use timebill::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open_in_memory()?;
//! init_with_migrations(&mut conn)?;
//! assert!(get_db_version(&conn)? > 0);
//! # Ok::<(), timebill::libs::error::Error>(())
//! ```

use crate::libs::error::Result;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> rusqlite::Result<()>,
}

pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: time entries and the imports that produced them
        self.add_migration(1, "create_time_entries_and_imports", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS csv_imports (
                    id INTEGER PRIMARY KEY,
                    file_name TEXT NOT NULL,
                    file_contents TEXT NOT NULL,
                    duplicate_time_entry_ids TEXT NOT NULL DEFAULT '[]',
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS time_entries (
                    id INTEGER PRIMARY KEY,
                    identity_hash TEXT NOT NULL UNIQUE,
                    start_time TEXT NOT NULL,
                    end_time TEXT NOT NULL,
                    duration_nanos INTEGER NOT NULL,
                    comment TEXT NOT NULL DEFAULT '',
                    csv_import_id INTEGER REFERENCES csv_imports(id),
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_time_entries_start_time ON time_entries(start_time)", [])?;
            Ok(())
        });

        // Version 2: invoicing
        self.add_migration(2, "create_invoices", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS invoice_settings (
                    id INTEGER PRIMARY KEY,
                    slot TEXT NOT NULL UNIQUE,
                    hourly_rate REAL NOT NULL DEFAULT 0,
                    recipient TEXT NOT NULL DEFAULT '',
                    sender TEXT NOT NULL DEFAULT ''
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS invoices (
                    id INTEGER PRIMARY KEY,
                    invoice_settings_id INTEGER NOT NULL REFERENCES invoice_settings(id),
                    start_date DATE NOT NULL,
                    end_date DATE NOT NULL,
                    duration_nanos INTEGER NOT NULL,
                    amount_due REAL NOT NULL,
                    sent_to_client TEXT,
                    paid_by_client TEXT,
                    archived BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS invoice_time_entries (
                    invoice_id INTEGER NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
                    time_entry_id INTEGER NOT NULL REFERENCES time_entries(id),
                    position INTEGER NOT NULL,
                    PRIMARY KEY (invoice_id, time_entry_id)
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_invoices_archived ON invoices(archived)", [])?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> rusqlite::Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies every migration newer than the recorded version.
    ///
    /// The version is read under the write lock, so concurrent first opens of
    /// one database apply each migration exactly once.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(&tx)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            tx.commit()?;
            msg_debug!(Message::DatabaseUpToDate);
            return Ok(());
        }

        msg_debug!(Message::MigrationsFound(pending.len()));

        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));

            if let Err(e) = (migration.up)(&tx) {
                msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                return Err(e.into());
            }
            tx.execute(
                "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                params![migration.version, migration.name],
            )?;
            msg_debug!(Message::MigrationCompleted(migration.version));
        }

        tx.commit()?;
        msg_debug!(Message::AllMigrationsCompleted);
        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn
            .query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))
            .optional()?
            .flatten();
        Ok(version.unwrap_or(0))
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    Ok(manager.get_current_version(conn)? < manager.latest_version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrates_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_with_migrations(&mut conn).unwrap();
        init_with_migrations(&mut conn).unwrap();

        assert_eq!(get_db_version(&conn).unwrap(), MigrationManager::new().latest_version());
        assert!(!needs_migration(&conn).unwrap());

        let applied: i64 = conn.query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0)).unwrap();
        assert_eq!(applied as u32, MigrationManager::new().latest_version());
    }

    #[test]
    fn concurrent_first_opens_migrate_once() {
        use std::sync::{Arc, Barrier};
        use std::thread;
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("race.db");
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut conn = Connection::open(&path).unwrap();
                    conn.busy_timeout(Duration::from_secs(5)).unwrap();
                    barrier.wait();
                    init_with_migrations(&mut conn)
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        let applied: i64 = conn.query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0)).unwrap();
        assert_eq!(applied as u32, MigrationManager::new().latest_version());
    }
}
