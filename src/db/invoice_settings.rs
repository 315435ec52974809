//! The single invoice settings row.
//!
//! The `slot` column is unique and only ever holds [`SETTINGS_SLOT`], so at
//! most one row can exist. Reads create it with defaults on first use.

use crate::db::db::Db;
use crate::libs::error::Result;
use crate::libs::invoice::{InvoiceSettings, SETTINGS_SLOT};
use rusqlite::{params, Connection};

const INIT_SETTINGS: &str = "INSERT OR IGNORE INTO invoice_settings (slot, hourly_rate, recipient, sender) VALUES (?1, ?2, ?3, ?4)";
const UPSERT_SETTINGS: &str = "INSERT INTO invoice_settings (slot, hourly_rate, recipient, sender) VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(slot) DO UPDATE SET hourly_rate = excluded.hourly_rate, recipient = excluded.recipient, sender = excluded.sender";
const SELECT_SETTINGS: &str = "SELECT id, hourly_rate, recipient, sender FROM invoice_settings WHERE slot = ?1";

pub struct InvoiceSettingsStore {
    conn: Connection,
}

impl InvoiceSettingsStore {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::from_db(Db::new()?))
    }

    pub fn from_db(db: Db) -> Self {
        Self { conn: db.conn }
    }

    /// Current settings, initialized with defaults when none exist yet.
    pub fn get(&self) -> Result<InvoiceSettings> {
        get(&self.conn)
    }

    /// Validates and replaces the settings, keeping the row ID.
    pub fn set(&self, settings: &InvoiceSettings) -> Result<InvoiceSettings> {
        settings.validate()?;
        self.conn.execute(
            UPSERT_SETTINGS,
            params![SETTINGS_SLOT, settings.hourly_rate, settings.recipient, settings.sender],
        )?;
        tracing::debug!(hourly_rate = settings.hourly_rate, "stored invoice settings");
        get(&self.conn)
    }
}

pub fn get(conn: &Connection) -> Result<InvoiceSettings> {
    let default = InvoiceSettings::default();
    conn.execute(
        INIT_SETTINGS,
        params![SETTINGS_SLOT, default.hourly_rate, default.recipient, default.sender],
    )?;
    Ok(conn.query_row(SELECT_SETTINGS, params![SETTINGS_SLOT], map_settings)?)
}

fn map_settings(row: &rusqlite::Row) -> rusqlite::Result<InvoiceSettings> {
    Ok(InvoiceSettings {
        id: row.get(0)?,
        hourly_rate: row.get(1)?,
        recipient: row.get(2)?,
        sender: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::error::Error;

    #[test]
    fn get_initializes_once() {
        let store = InvoiceSettingsStore::from_db(Db::open_in_memory().unwrap());

        let first = store.get().unwrap();
        let second = store.get().unwrap();

        assert_eq!(first.hourly_rate, 0.0);
        assert!(first.id.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn set_replaces_the_singleton() {
        let store = InvoiceSettingsStore::from_db(Db::open_in_memory().unwrap());
        let initial = store.get().unwrap();

        store.set(&InvoiceSettings::new(40.0, "Acme", "Jo")).unwrap();
        let updated = store.set(&InvoiceSettings::new(55.5, "Acme Ltd", "Jo")).unwrap();

        assert_eq!(updated.id, initial.id);
        assert_eq!(updated.hourly_rate, 55.5);
        assert_eq!(updated.recipient, "Acme Ltd");
        let rows: i64 = store.conn.query_row("SELECT COUNT(*) FROM invoice_settings", [], |row| row.get(0)).unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn set_rejects_non_positive_rate() {
        let store = InvoiceSettingsStore::from_db(Db::open_in_memory().unwrap());
        assert!(matches!(store.set(&InvoiceSettings::new(-1.0, "", "")), Err(Error::InvalidSettings(_))));
    }
}
