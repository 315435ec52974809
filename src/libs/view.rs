use super::billing::BillingPeriod;
use super::formatter::{format_amount, format_duration, format_hours, format_local, format_optional};
use super::invoice::{Invoice, InvoiceSettings};
use super::time_entry::{total_duration, TimeEntry};
use super::zone::SourceZone;
use chrono::Duration;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn time_entries(entries: &[TimeEntry], zone: &SourceZone) {
        let mut table = Table::new();

        table.add_row(row!["ID", "START", "END", "DURATION", "COMMENT"]);
        for entry in entries {
            table.add_row(row![
                entry.id.unwrap_or(0),
                format_local(&entry.start_time, zone),
                format_local(&entry.end_time, zone),
                format_duration(&entry.duration),
                entry.comment
            ]);
        }
        table.add_row(row!["", "", "TOTAL", format_duration(&total_duration(entries)), ""]);
        table.printstd();
    }

    pub fn periods(periods: &[BillingPeriod], zone: &SourceZone) {
        let mut table = Table::new();

        table.add_row(row!["#", "FROM", "TO", "ENTRIES", "DURATION", "HOURS"]);
        for (index, period) in periods.iter().enumerate() {
            let duration = period.duration();
            table.add_row(row![
                index + 1,
                zone.local_date(period.start_time),
                zone.local_date(period.end_time - Duration::nanoseconds(1)),
                period.entries.len(),
                format_duration(&duration),
                format_hours(&duration)
            ]);
        }
        table.printstd();
    }

    pub fn invoices(invoices: &[Invoice], zone: &SourceZone) {
        let mut table = Table::new();

        table.add_row(row!["ID", "FROM", "TO", "ENTRIES", "HOURS", "AMOUNT DUE", "SENT", "PAID", "ARCHIVED"]);
        for invoice in invoices {
            table.add_row(row![
                invoice.id.unwrap_or(0),
                invoice.start_date,
                invoice.end_date,
                invoice.time_entries.len(),
                format_hours(&invoice.duration),
                format_amount(invoice.amount_due),
                format_optional(&invoice.sent_to_client, zone),
                format_optional(&invoice.paid_by_client, zone),
                if invoice.archived { "yes" } else { "no" }
            ]);
        }
        table.printstd();
    }

    pub fn settings(settings: &InvoiceSettings) {
        let mut table = Table::new();

        table.add_row(row!["HOURLY RATE", format_amount(settings.hourly_rate)]);
        table.add_row(row!["RECIPIENT", settings.recipient]);
        table.add_row(row!["SENDER", settings.sender]);
        table.printstd();
    }
}
