//! Export of billing periods and invoices to CSV or JSON files.
//!
//! ```rust,no_run
//! use timebill::libs::export::{ExportFormat, Exporter};
//! use timebill::libs::zone::SourceZone;
//!
//! let exporter = Exporter::new(ExportFormat::Csv, None);
//! exporter.export_periods(&[], &SourceZone::utc())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::libs::billing::BillingPeriod;
use crate::libs::formatter::{format_amount, format_duration, format_local};
use crate::libs::invoice::{total_hours, Invoice};
use crate::libs::zone::SourceZone;
use anyhow::Result;
use chrono::{Duration, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportData {
    Periods,
    Invoices,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportPeriod {
    pub start: String,
    pub end: String,
    pub entries: usize,
    pub duration: String,
    pub hours: f64,
    pub time_entry_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportInvoice {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub hours: f64,
    pub amount_due: f64,
    pub sent_to_client: Option<String>,
    pub paid_by_client: Option<String>,
    pub archived: bool,
    pub time_entry_ids: Vec<i64>,
}

impl ExportPeriod {
    pub fn from_period(period: &BillingPeriod, zone: &SourceZone) -> Self {
        let duration = period.duration();
        ExportPeriod {
            start: format_local(&period.start_time, zone),
            end: format_local(&(period.end_time - Duration::nanoseconds(1)), zone),
            entries: period.entries.len(),
            duration: format_duration(&duration),
            hours: total_hours(&duration),
            time_entry_ids: period.entries.iter().filter_map(|entry| entry.id).collect(),
        }
    }
}

impl ExportInvoice {
    pub fn from_invoice(invoice: &Invoice, zone: &SourceZone) -> Self {
        ExportInvoice {
            id: invoice.id.unwrap_or(0),
            start_date: invoice.start_date.to_string(),
            end_date: invoice.end_date.to_string(),
            duration: format_duration(&invoice.duration),
            hours: total_hours(&invoice.duration),
            amount_due: invoice.amount_due,
            sent_to_client: invoice.sent_to_client.as_ref().map(|i| format_local(i, zone)),
            paid_by_client: invoice.paid_by_client.as_ref().map(|i| format_local(i, zone)),
            archived: invoice.archived,
            time_entry_ids: invoice.time_entries.iter().filter_map(|entry| entry.id).collect(),
        }
    }
}

pub struct Exporter {
    format: ExportFormat,
    output_path: PathBuf,
}

impl Exporter {
    /// Without an explicit path the file is named `timebill_export_<timestamp>.<ext>`
    /// in the working directory.
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>) -> Self {
        let default_name = format!("timebill_export_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let extension = match format {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        };
        let output_path = output_path.unwrap_or_else(|| PathBuf::from(format!("{}.{}", default_name, extension)));

        Self { format, output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn export_periods(&self, periods: &[BillingPeriod], zone: &SourceZone) -> Result<()> {
        let rows: Vec<ExportPeriod> = periods.iter().map(|period| ExportPeriod::from_period(period, zone)).collect();

        match self.format {
            ExportFormat::Json => self.write_json(&rows),
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_path(&self.output_path)?;
                wtr.write_record(["Start", "End", "Entries", "Duration", "Hours", "Entry IDs"])?;
                for row in &rows {
                    wtr.write_record([
                        row.start.clone(),
                        row.end.clone(),
                        row.entries.to_string(),
                        row.duration.clone(),
                        format!("{:.2}", row.hours),
                        join_ids(&row.time_entry_ids),
                    ])?;
                }
                wtr.flush()?;
                Ok(())
            }
        }
    }

    pub fn export_invoices(&self, invoices: &[Invoice], zone: &SourceZone) -> Result<()> {
        let rows: Vec<ExportInvoice> = invoices.iter().map(|invoice| ExportInvoice::from_invoice(invoice, zone)).collect();

        match self.format {
            ExportFormat::Json => self.write_json(&rows),
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_path(&self.output_path)?;
                wtr.write_record(["ID", "From", "To", "Duration", "Hours", "Amount Due", "Sent", "Paid", "Archived", "Entry IDs"])?;
                for row in &rows {
                    wtr.write_record([
                        row.id.to_string(),
                        row.start_date.clone(),
                        row.end_date.clone(),
                        row.duration.clone(),
                        format!("{:.2}", row.hours),
                        format_amount(row.amount_due),
                        row.sent_to_client.clone().unwrap_or_default(),
                        row.paid_by_client.clone().unwrap_or_default(),
                        row.archived.to_string(),
                        join_ids(&row.time_entry_ids),
                    ])?;
                }
                wtr.flush()?;
                Ok(())
            }
        }
    }

    fn write_json<T: Serialize>(&self, rows: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(rows)?;
        File::create(&self.output_path)?.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Space-separated IDs for a single CSV cell.
fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::billing::{aggregate, PeriodLength};
    use crate::libs::time_entry::TimeEntry;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn periods() -> Vec<BillingPeriod> {
        let start = Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap();
        let entries = vec![TimeEntry::new(start, start + Duration::minutes(90), "a, with comma")];
        aggregate(&entries, PeriodLength::Weekly, &SourceZone::utc())
    }

    #[test]
    fn default_name_has_extension() {
        let exporter = Exporter::new(ExportFormat::Json, None);
        let name = exporter.output_path().to_string_lossy().to_string();
        assert!(name.starts_with("timebill_export_"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn periods_to_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("periods.csv");

        Exporter::new(ExportFormat::Csv, Some(path.clone())).export_periods(&periods(), &SourceZone::utc()).unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "Start,End,Entries,Duration,Hours,Entry IDs");
        assert_eq!(lines[1], "2024-01-01 00:00:00,2024-01-07 23:59:59,1,01:30,1.50,");
    }

    #[test]
    fn periods_to_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("periods.json");

        Exporter::new(ExportFormat::Json, Some(path.clone())).export_periods(&periods(), &SourceZone::utc()).unwrap();

        let rows: Vec<ExportPeriod> = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hours, 1.5);
        assert_eq!(rows[0].duration, "01:30");
    }
}
