//! Domain logic and supporting utilities.
//!
//! The pipeline modules (`zone`, `splitter`, `time_entry`, `csv_parser`,
//! `billing`, `invoice`, `import`) are pure apart from `import`, which drives
//! the stores in [`crate::db`]. The rest is configuration and presentation.
//!
//! ```rust
//! use timebill::libs::billing::{aggregate, PeriodLength};
//! use timebill::libs::csv_parser::{parse_csv, ColumnMapping};
//! use timebill::libs::zone::SourceZone;
//!
//! let raw = "time started,time ended,comment\n2024-01-15 22:00:00,2024-01-16 02:00:00,night shift\n";
//! let entries = parse_csv(raw, &ColumnMapping::default(), "EST")?;
//! assert_eq!(entries.len(), 2);
//!
//! let periods = aggregate(&entries, PeriodLength::BiWeekly, &SourceZone::resolve("EST")?);
//! assert_eq!(periods.len(), 1);
//! # Ok::<(), timebill::libs::error::Error>(())
//! ```

pub mod billing;
pub mod config;
pub mod csv_parser;
pub mod data_storage;
pub mod error;
pub mod export;
pub mod formatter;
pub mod import;
pub mod invoice;
pub mod messages;
pub mod splitter;
pub mod time_entry;
pub mod view;
pub mod zone;
