//! # Timebill - time-log import, reconciliation and invoicing
//!
//! A command-line utility that imports time-tracker CSV exports, keeps a
//! single copy of every interval no matter how often a file is re-imported,
//! groups the stored entries into billing periods and computes invoices.
//!
//! ## Features
//!
//! - **CSV import**: configurable column names and source timezone, with
//!   intervals split at local midnight
//! - **Deduplication**: identity fingerprints and an audit of which stored
//!   entries each import duplicated
//! - **Billing periods**: weekly, bi-weekly or monthly windows starting on
//!   the first day of the earliest entry's month
//! - **Invoices**: hours times rate, with write-once sent and paid timestamps
//! - **Export**: periods and invoices as CSV or JSON
//!
//! ## Usage
//!
//! ```rust,no_run
//! use timebill::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
