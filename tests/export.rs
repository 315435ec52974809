#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use timebill::db::db::Db;
    use timebill::db::invoice_settings::InvoiceSettingsStore;
    use timebill::db::invoices::Invoices;
    use timebill::db::time_entries::{TimeEntries, TimeEntryFilter};
    use timebill::libs::billing::{aggregate, PeriodLength};
    use timebill::libs::csv_parser::ColumnMapping;
    use timebill::libs::export::{ExportFormat, ExportInvoice, ExportPeriod, Exporter};
    use timebill::libs::import::Importer;
    use timebill::libs::invoice::{InvoiceFilter, InvoiceSettings};
    use timebill::libs::zone::SourceZone;

    const LOG: &str = "time started,time ended,comment\n\
                       2024-01-02 09:00:00,2024-01-02 12:30:00,design\n\
                       2024-01-20 22:00:00,2024-01-21 01:00:00,release\n";

    struct ExportTestContext {
        temp_dir: TempDir,
        entries: TimeEntries,
        invoices: Invoices,
        zone: SourceZone,
    }

    impl TestContext for ExportTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("timebill.db");
            Importer::from_db(Db::open(&db_path).unwrap())
                .import("log.csv", LOG, &ColumnMapping::default(), "EST")
                .unwrap();
            InvoiceSettingsStore::from_db(Db::open(&db_path).unwrap())
                .set(&InvoiceSettings::new(50.0, "ACME Corp", "Jane Doe"))
                .unwrap();
            ExportTestContext {
                entries: TimeEntries::from_db(Db::open(&db_path).unwrap()),
                invoices: Invoices::from_db(Db::open(&db_path).unwrap()),
                temp_dir,
                zone: SourceZone::resolve("EST").unwrap(),
            }
        }
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_periods_csv(ctx: &mut ExportTestContext) {
        let entries = ctx.entries.list(&TimeEntryFilter::default()).unwrap();
        let periods = aggregate(&entries, PeriodLength::BiWeekly, &ctx.zone);
        let output_path = ctx.temp_dir.path().join("periods.csv");

        let exporter = Exporter::new(ExportFormat::Csv, Some(output_path.clone()));
        exporter.export_periods(&periods, &ctx.zone).unwrap();

        assert_eq!(exporter.output_path(), output_path.as_path());
        let written = fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Start,End,Entries,Duration,Hours,Entry IDs");
        assert_eq!(lines[1], "2024-01-01 00:00:00,2024-01-14 23:59:59,1,03:30,3.50,1");
        assert_eq!(lines[2], "2024-01-15 00:00:00,2024-01-28 23:59:59,2,03:00,3.00,2 3");
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_periods_json(ctx: &mut ExportTestContext) {
        let entries = ctx.entries.list(&TimeEntryFilter::default()).unwrap();
        let periods = aggregate(&entries, PeriodLength::Monthly, &ctx.zone);
        let output_path = ctx.temp_dir.path().join("periods.json");

        Exporter::new(ExportFormat::Json, Some(output_path.clone()))
            .export_periods(&periods, &ctx.zone)
            .unwrap();

        let rows: Vec<ExportPeriod> = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entries, 3);
        assert_eq!(rows[0].hours, 6.5);
        assert_eq!(rows[0].time_entry_ids.len(), 3);
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_invoices_json(ctx: &mut ExportTestContext) {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        ctx.invoices.create_for_range(from, to, &ctx.zone).unwrap();
        let invoices = ctx.invoices.list(&InvoiceFilter::default()).unwrap();
        let output_path = ctx.temp_dir.path().join("invoices.json");

        Exporter::new(ExportFormat::Json, Some(output_path.clone()))
            .export_invoices(&invoices, &ctx.zone)
            .unwrap();

        let rows: Vec<ExportInvoice> = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_date, "2024-01-01");
        assert_eq!(rows[0].end_date, "2024-01-31");
        assert_eq!(rows[0].duration, "06:30");
        assert_eq!(rows[0].amount_due, 325.0);
        assert_eq!(rows[0].sent_to_client, None);
        assert!(!rows[0].archived);
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_invoices_csv(ctx: &mut ExportTestContext) {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();
        let invoice = ctx.invoices.create_for_range(from, to, &ctx.zone).unwrap();
        let output_path = ctx.temp_dir.path().join("invoices.csv");

        Exporter::new(ExportFormat::Csv, Some(output_path.clone()))
            .export_invoices(&[invoice], &ctx.zone)
            .unwrap();

        let written = fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "ID,From,To,Duration,Hours,Amount Due,Sent,Paid,Archived,Entry IDs");
        assert_eq!(lines[1], "1,2024-01-01,2024-01-14,03:30,3.50,175.00,,,false,1");
    }
}
