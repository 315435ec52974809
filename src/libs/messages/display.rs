//! Text of every user-facing message.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleImport => "CSV import".to_string(),
            Message::ConfigModuleBilling => "Billing".to_string(),
            Message::PromptSelectModules => "Select sections to configure".to_string(),
            Message::PromptStartColumn => "Name of the start time column".to_string(),
            Message::PromptEndColumn => "Name of the end time column".to_string(),
            Message::PromptCommentColumn => "Name of the comment column".to_string(),
            Message::PromptTimezone => "Timezone of the CSV timestamps (e.g. EST, -05:00, America/New_York)".to_string(),
            Message::PromptPeriodLength => "Billing period length".to_string(),

            // === MIGRATION MESSAGES ===
            Message::DatabaseUpToDate => "Database is up to date".to_string(),
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All migrations completed".to_string(),

            // === IMPORT MESSAGES ===
            Message::ImportStarted(path) => format!("Importing {}", path),
            Message::ImportFileReadFailed(path, reason) => format!("Failed to read '{}': {}", path, reason),
            Message::ImportCompleted {
                csv_import_id,
                new,
                existing,
            } => format!("Import #{} finished: {} new, {} already stored", csv_import_id, new, existing),
            Message::ImportNoRows(path) => format!("'{}' contains no time entries", path),

            // === TIME ENTRY MESSAGES ===
            Message::TimeEntriesHeader => "Time entries".to_string(),
            Message::NoTimeEntries => "No time entries found".to_string(),
            Message::TimeEntriesTotal(count, total) => format!("{} entries, {} total", count, total),

            // === PERIOD MESSAGES ===
            Message::PeriodsHeader(length) => format!("Billing periods ({})", length),
            Message::NoPeriods => "No billing periods, import some time entries first".to_string(),

            // === SETTINGS MESSAGES ===
            Message::SettingsSaved => "Invoice settings saved".to_string(),
            Message::SettingsHeader => "Invoice settings".to_string(),
            Message::SettingsRateNotSet => "Hourly rate is not set, run 'timebill settings --hourly-rate <RATE>' first".to_string(),

            // === INVOICE MESSAGES ===
            Message::InvoiceCreated(id, amount) => format!("Invoice #{} created, amount due {}", id, amount),
            Message::InvoiceUpdated(id) => format!("Invoice #{} updated", id),
            Message::InvoicesHeader => "Invoices".to_string(),
            Message::NoInvoices => "No invoices found".to_string(),
            Message::NoEntriesInRange(from, to) => format!("No time entries between {} and {}", from, to),
            Message::InvalidDateRange(from, to) => format!("Invalid date range: {} is after {}", from, to),
            Message::InvalidTimestamp(value) => format!("Invalid timestamp '{}', expected RFC 3339 or YYYY-MM-DD HH:MM:SS", value),

            // === EXPORT MESSAGES ===
            Message::ExportCompleted(path) => format!("Export completed: {}", path),
            Message::NothingToExport => "Nothing to export".to_string(),
        };
        write!(f, "{}", s)
    }
}
