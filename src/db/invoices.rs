//! Invoice store.
//!
//! An invoice row and its entry links are written in one transaction. After
//! that only `sent_to_client` and `paid_by_client` are ever updated.

use crate::db::db::{get_timestamp, to_sql_timestamp, Db};
use crate::db::time_entries::{duration_to_nanos, map_entry};
use crate::db::{invoice_settings, time_entries};
use crate::libs::error::{Error, Result};
use crate::libs::invoice::{Invoice, InvoiceFilter, InvoiceUpdate};
use crate::libs::time_entry::TimeEntry;
use crate::libs::zone::SourceZone;
use chrono::{Duration, NaiveDate};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, TransactionBehavior};

const INSERT_INVOICE: &str = "INSERT INTO invoices (invoice_settings_id, start_date, end_date, duration_nanos, amount_due, sent_to_client, paid_by_client, archived)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const INSERT_LINK: &str = "INSERT INTO invoice_time_entries (invoice_id, time_entry_id, position) VALUES (?1, ?2, ?3)";
const SELECT_INVOICES: &str =
    "SELECT id, invoice_settings_id, start_date, end_date, duration_nanos, amount_due, sent_to_client, paid_by_client, archived FROM invoices";
const SELECT_LINKED_ENTRIES: &str = "SELECT e.id, e.identity_hash, e.start_time, e.end_time, e.duration_nanos, e.comment, e.csv_import_id
    FROM time_entries e
    JOIN invoice_time_entries l ON l.time_entry_id = e.id
    WHERE l.invoice_id = ?1
    ORDER BY l.position";
const UPDATE_TIMESTAMPS: &str = "UPDATE invoices SET sent_to_client = ?2, paid_by_client = ?3 WHERE id = ?1";

pub struct Invoices {
    conn: Connection,
}

impl Invoices {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::from_db(Db::new()?))
    }

    pub fn from_db(db: Db) -> Self {
        Self { conn: db.conn }
    }

    /// Bills every stored entry starting between `start_date` and `end_date`
    /// (inclusive, calendar days in `zone`) at the current settings' rate.
    pub fn create_for_range(&mut self, start_date: NaiveDate, end_date: NaiveDate, zone: &SourceZone) -> Result<Invoice> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let settings = invoice_settings::get(&tx)?;
        settings.validate()?;

        let filter = time_entries::TimeEntryFilter {
            from: Some(zone.start_of_day(start_date)),
            to: Some(zone.start_of_day(end_date.succ_opt().unwrap_or(end_date))),
        };
        let entries = time_entries::list(&tx, &filter)?;

        let invoice = insert(&tx, &Invoice::calculate(&settings, start_date, end_date, entries)?)?;
        tx.commit()?;
        Ok(invoice)
    }

    /// Stores `invoice` and links its entries in order, all or nothing.
    pub fn create(&mut self, invoice: &Invoice) -> Result<Invoice> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let stored = insert(&tx, invoice)?;
        tx.commit()?;
        Ok(stored)
    }

    pub fn get(&self, id: i64) -> Result<Invoice> {
        get(&self.conn, id)
    }

    /// Invoices matching `filter`, ordered by ID.
    pub fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        let mut clauses = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if !filter.ids.is_empty() {
            clauses.push(format!("id IN ({})", vec!["?"; filter.ids.len()].join(", ")));
            values.extend(filter.ids.iter().map(|id| Value::Integer(*id)));
        }
        if let Some(archived) = filter.archived {
            clauses.push("archived = ?".to_string());
            values.push(Value::Integer(archived as i64));
        }

        let mut sql = SELECT_INVOICES.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut invoices = stmt.query_map(params_from_iter(values), map_invoice)?.collect::<rusqlite::Result<Vec<_>>>()?;
        for invoice in &mut invoices {
            if let Some(id) = invoice.id {
                invoice.time_entries = linked_entries(&self.conn, id)?;
            }
        }
        Ok(invoices)
    }

    /// Sets the requested client timestamps. Each may be set only once.
    pub fn update(&mut self, id: i64, update: &InvoiceUpdate) -> Result<Invoice> {
        if update.is_empty() {
            return Err(Error::NoUpdateRequested);
        }

        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut invoice = get(&tx, id)?;
        invoice.apply(update)?;
        tx.execute(
            UPDATE_TIMESTAMPS,
            params![
                id,
                invoice.sent_to_client.as_ref().map(to_sql_timestamp),
                invoice.paid_by_client.as_ref().map(to_sql_timestamp),
            ],
        )?;
        tx.commit()?;

        tracing::debug!(id, "updated invoice timestamps");
        Ok(invoice)
    }
}

fn insert(conn: &Connection, invoice: &Invoice) -> Result<Invoice> {
    conn.execute(
        INSERT_INVOICE,
        params![
            invoice.invoice_settings_id,
            invoice.start_date,
            invoice.end_date,
            duration_to_nanos(&invoice.duration),
            invoice.amount_due,
            invoice.sent_to_client.as_ref().map(to_sql_timestamp),
            invoice.paid_by_client.as_ref().map(to_sql_timestamp),
            invoice.archived,
        ],
    )?;
    let id = conn.last_insert_rowid();

    let mut link = conn.prepare(INSERT_LINK)?;
    for (position, entry) in invoice.time_entries.iter().enumerate() {
        let entry_id = entry.id.ok_or(rusqlite::Error::InvalidParameterName("time_entry_id".to_string()))?;
        link.execute(params![id, entry_id, position as i64])?;
    }

    tracing::info!(id, entries = invoice.time_entries.len(), amount_due = invoice.amount_due, "created invoice");
    Ok(Invoice {
        id: Some(id),
        ..invoice.clone()
    })
}

fn get(conn: &Connection, id: i64) -> Result<Invoice> {
    let mut invoice = conn
        .query_row(&format!("{} WHERE id = ?1", SELECT_INVOICES), params![id], map_invoice)
        .optional()?
        .ok_or(Error::NotFound { entity: "invoice", id })?;
    invoice.time_entries = linked_entries(conn, id)?;
    Ok(invoice)
}

fn linked_entries(conn: &Connection, invoice_id: i64) -> Result<Vec<TimeEntry>> {
    let mut stmt = conn.prepare(SELECT_LINKED_ENTRIES)?;
    let entries = stmt.query_map(params![invoice_id], map_entry)?.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

fn map_invoice(row: &rusqlite::Row) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: row.get(0)?,
        invoice_settings_id: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        duration: Duration::nanoseconds(row.get(4)?),
        amount_due: row.get(5)?,
        sent_to_client: get_timestamp(row, 6)?,
        paid_by_client: get_timestamp(row, 7)?,
        archived: row.get(8)?,
        time_entries: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::invoice::InvoiceSettings;
    use chrono::{TimeZone, Utc};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn unknown_invoice() {
        let mut invoices = Invoices::from_db(Db::open_in_memory().unwrap());
        let update = InvoiceUpdate {
            sent_to_client: Some(Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap()),
            paid_by_client: None,
        };

        assert!(matches!(invoices.update(7, &update), Err(Error::NotFound { entity: "invoice", id: 7 })));
        assert!(matches!(invoices.update(7, &InvoiceUpdate::default()), Err(Error::NoUpdateRequested)));
        assert!(matches!(invoices.get(7), Err(Error::NotFound { .. })));
    }

    #[test]
    fn creation_is_atomic() {
        let db = Db::open_in_memory().unwrap();
        let settings = invoice_settings::get(&db.conn).unwrap();
        let mut invoices = Invoices::from_db(db);

        let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        let dangling = TimeEntry {
            id: Some(999),
            ..TimeEntry::new(start, start + Duration::hours(1), "never stored")
        };
        let invoice = Invoice::calculate(&InvoiceSettings { hourly_rate: 10.0, ..settings }, date(1), date(14), vec![dangling]).unwrap();

        assert!(invoices.create(&invoice).is_err());
        assert!(invoices.list(&InvoiceFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn range_requires_a_rate() {
        let mut invoices = Invoices::from_db(Db::open_in_memory().unwrap());
        let result = invoices.create_for_range(date(1), date(14), &SourceZone::utc());
        assert!(matches!(result, Err(Error::InvalidSettings(_))));
    }
}
