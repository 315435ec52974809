//! Parses time-log CSV exports into time entries.
//!
//! The first row is a header; the start, end and comment columns are looked
//! up by the names in [`ColumnMapping`]. Timestamps are wall-clock values
//! (`YYYY-MM-DD HH:MM:SS`) in the configured zone. Rows crossing midnight are
//! split by [`splitter::split`]. Parsing is all-or-nothing: the first bad row
//! aborts the file and no entries are returned. No deduplication happens
//! here.

use crate::libs::error::{Error, Result};
use crate::libs::splitter;
use crate::libs::time_entry::TimeEntry;
use crate::libs::zone::SourceZone;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wall-clock format of the start and end cells.
pub const CSV_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Names of the columns holding each field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ColumnMapping {
    pub start_time: String,
    pub end_time: String,
    pub comment: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            start_time: "time started".to_string(),
            end_time: "time ended".to_string(),
            comment: "comment".to_string(),
        }
    }
}

pub struct CsvTimeEntryParser {
    columns: ColumnMapping,
    zone: SourceZone,
}

struct ColumnIndexes {
    start_time: usize,
    end_time: usize,
    comment: usize,
}

impl CsvTimeEntryParser {
    pub fn new(columns: ColumnMapping, zone: SourceZone) -> Self {
        CsvTimeEntryParser { columns, zone }
    }

    /// Resolves the timezone label first, failing with [`Error::UnknownTimezone`].
    pub fn with_timezone(columns: ColumnMapping, timezone: &str) -> Result<Self> {
        Ok(Self::new(columns, SourceZone::resolve(timezone)?))
    }

    pub fn zone(&self) -> &SourceZone {
        &self.zone
    }

    pub fn parse(&self, raw: &str) -> Result<Vec<TimeEntry>> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(raw.as_bytes());

        let indexes = self.resolve_columns(reader.headers()?)?;

        let mut entries = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let row = index + 1;

            let start_time = self.parse_time(&record, indexes.start_time, &self.columns.start_time, row)?;
            let end_time = self.parse_time(&record, indexes.end_time, &self.columns.end_time, row)?;
            if end_time <= start_time {
                return Err(Error::EmptyInterval { row });
            }
            let comment = record.get(indexes.comment).unwrap_or_default();

            entries.extend(
                splitter::split(start_time, end_time, comment, &self.zone)
                    .into_iter()
                    .map(|piece| TimeEntry::new(piece.start, piece.end, &piece.comment)),
            );
        }

        tracing::debug!(entries = entries.len(), zone = %self.zone, "parsed CSV time entries");
        Ok(entries)
    }

    fn resolve_columns(&self, headers: &StringRecord) -> Result<ColumnIndexes> {
        let header_map: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, name)| (name.trim(), i)).collect();

        let find = |column: &str| {
            header_map.get(column.trim()).copied().ok_or_else(|| Error::MissingColumn {
                column: column.to_string(),
            })
        };

        Ok(ColumnIndexes {
            start_time: find(&self.columns.start_time)?,
            end_time: find(&self.columns.end_time)?,
            comment: find(&self.columns.comment)?,
        })
    }

    fn parse_time(&self, record: &StringRecord, index: usize, column: &str, row: usize) -> Result<chrono::DateTime<chrono::Utc>> {
        let cell = record.get(index).unwrap_or_default().trim();
        let row_error = || Error::RowParse {
            row,
            column: column.to_string(),
            value: format!("{} {}", cell, self.zone),
        };

        let local = NaiveDateTime::parse_from_str(cell, CSV_TIME_FORMAT).map_err(|_| row_error())?;
        self.zone.to_utc(local).ok_or_else(row_error)
    }
}

/// Parses `raw` with the given mapping and timezone label.
pub fn parse_csv(raw: &str, columns: &ColumnMapping, timezone: &str) -> Result<Vec<TimeEntry>> {
    CsvTimeEntryParser::with_timezone(columns.clone(), timezone)?.parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn parse(raw: &str) -> Result<Vec<TimeEntry>> {
        parse_csv(raw, &ColumnMapping::default(), "UTC")
    }

    #[test]
    fn parses_rows_in_order() {
        let raw = "time started,time ended,comment\n\
                   2024-01-15 09:00:00,2024-01-15 10:00:00,standup\n\
                   2024-01-15 13:00:00,2024-01-15 15:30:00,review\n";

        let entries = parse(raw).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].comment, "standup");
        assert_eq!(entries[0].duration, Duration::hours(1));
        assert_eq!(entries[1].comment, "review");
        assert_eq!(entries[1].duration, Duration::minutes(150));
        assert_eq!(entries[1].identity_hash, entries[1].compute_identity_hash());
    }

    #[test]
    fn finds_columns_by_name_in_any_order() {
        let raw = "comment,project,time ended,time started\n\"a, b\",x,2024-01-15 10:00:00,2024-01-15 09:00:00\n";

        let entries = parse(raw).unwrap();

        assert_eq!(entries[0].comment, "a, b");
        assert_eq!(entries[0].duration, Duration::hours(1));
    }

    #[test]
    fn reports_missing_column() {
        let raw = "time started,time ended\n2024-01-15 09:00:00,2024-01-15 10:00:00\n";

        match parse(raw) {
            Err(Error::MissingColumn { column }) => assert_eq!(column, "comment"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn aborts_on_malformed_timestamp() {
        let raw = "time started,time ended,comment\n\
                   2024-01-15 09:00:00,2024-01-15 10:00:00,ok\n\
                   2024-01-15 11:00:00,noon-ish,bad\n";

        match parse(raw) {
            Err(Error::RowParse { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "time ended");
                assert_eq!(value, "noon-ish UTC");
            }
            other => panic!("expected row parse error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_rows_ending_before_they_start() {
        let raw = "time started,time ended,comment\n2024-01-15 10:00:00,2024-01-15 09:00:00,backwards\n";
        assert!(matches!(parse(raw), Err(Error::EmptyInterval { row: 1 })));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let raw = "time started,time ended,comment\n";
        assert!(matches!(parse_csv(raw, &ColumnMapping::default(), "Nowhere/Land"), Err(Error::UnknownTimezone(_))));
    }

    #[test]
    fn custom_mapping() {
        let columns = ColumnMapping {
            start_time: "From".to_string(),
            end_time: "To".to_string(),
            comment: "Notes".to_string(),
        };
        let raw = "\u{feff}From,To,Notes\n2024-01-15 09:00:00,2024-01-15 09:45:00,\n";

        let entries = parse_csv(raw, &columns, "PST").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].comment, "");
        assert_eq!(entries[0].start_time.to_rfc3339(), "2024-01-15T17:00:00+00:00");
    }
}
