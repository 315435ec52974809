//! SQLite persistence.
//!
//! Every store owns its own [`rusqlite::Connection`] opened through
//! [`db::Db`], which applies pending migrations first. Operations that must
//! share one transaction are also exposed as free functions taking a
//! `&Connection`, so callers can compose them inside their own transaction.
//!
//! ```rust,no_run
//! use timebill::db::{db::Db, time_entries::{TimeEntries, TimeEntryFilter}};
//!
//! let entries = TimeEntries::from_db(Db::new()?);
//! for entry in entries.list(&TimeEntryFilter::default())? {
//!     println!("{} {}", entry.start_time, entry.comment);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod csv_imports;
pub mod db;
pub mod invoice_settings;
pub mod invoices;
pub mod migrations;
pub mod time_entries;
