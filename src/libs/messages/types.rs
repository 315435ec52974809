#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigModuleImport,
    ConfigModuleBilling,
    PromptSelectModules,
    PromptStartColumn,
    PromptEndColumn,
    PromptCommentColumn,
    PromptTimezone,
    PromptPeriodLength,

    // === MIGRATION MESSAGES ===
    DatabaseUpToDate,
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,

    // === IMPORT MESSAGES ===
    ImportStarted(String),
    ImportFileReadFailed(String, String), // path, reason
    ImportCompleted { csv_import_id: i64, new: usize, existing: usize },
    ImportNoRows(String),

    // === TIME ENTRY MESSAGES ===
    TimeEntriesHeader,
    NoTimeEntries,
    TimeEntriesTotal(usize, String), // count, HH:MM

    // === PERIOD MESSAGES ===
    PeriodsHeader(String), // period length
    NoPeriods,

    // === SETTINGS MESSAGES ===
    SettingsSaved,
    SettingsHeader,
    SettingsRateNotSet,

    // === INVOICE MESSAGES ===
    InvoiceCreated(i64, String), // id, amount
    InvoiceUpdated(i64),
    InvoicesHeader,
    NoInvoices,
    NoEntriesInRange(String, String),
    InvalidDateRange(String, String),
    InvalidTimestamp(String),

    // === EXPORT MESSAGES ===
    ExportCompleted(String),
    NothingToExport,
}
