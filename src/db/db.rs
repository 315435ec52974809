use crate::db::migrations::init_with_migrations;
use crate::libs::data_storage::DataStorage;
use crate::libs::error::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub const DB_FILE_NAME: &str = "timebill.db";

/// Fixed-width UTC text form of stored instants. Sorts chronologically.
pub const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database in the application data directory.
    pub fn new() -> anyhow::Result<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Ok(Self::open(&db_file_path)?)
    }

    /// Opens (or creates) the database at `path` and brings its schema up to date.
    pub fn open(path: &Path) -> Result<Db> {
        let conn = Connection::open(path)?;
        Self::prepare(conn)
    }

    pub fn open_in_memory() -> Result<Db> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(mut conn: Connection) -> Result<Db> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        init_with_migrations(&mut conn)?;
        Ok(Db { conn })
    }
}

pub fn to_sql_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format(SQL_TIMESTAMP_FORMAT).to_string()
}

pub fn from_sql_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, SQL_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

/// Reads an optional timestamp column.
pub fn get_timestamp(row: &rusqlite::Row, index: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(index)? {
        Some(value) => from_sql_timestamp(&value).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_keep_nanoseconds_and_order() {
        let early = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap() + chrono::Duration::nanoseconds(999_999_999);
        let late = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();

        let early_sql = to_sql_timestamp(&early);
        assert_eq!(early_sql, "2024-01-15 23:59:59.999999999");
        assert_eq!(to_sql_timestamp(&late), "2024-01-16 00:00:00.000000000");
        assert!(early_sql < to_sql_timestamp(&late));
        assert_eq!(from_sql_timestamp(&early_sql).unwrap(), early);
    }

    #[test]
    fn opens_with_schema() {
        let db = Db::open_in_memory().unwrap();
        let tables: i64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('time_entries', 'csv_imports', 'invoice_settings', 'invoices', 'invoice_time_entries')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 5);
    }
}
