//! Writes billing periods or invoices to a CSV or JSON file.

use crate::{
    db::{
        invoices::Invoices,
        time_entries::{TimeEntries, TimeEntryFilter},
    },
    libs::{
        billing::{aggregate, PeriodLength},
        config::Config,
        export::{ExportData, ExportFormat, Exporter},
        invoice::InvoiceFilter,
        messages::Message,
    },
    msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// What to export
    #[arg(value_enum, default_value = "periods")]
    data: ExportData,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportFormat,

    /// Output file, defaults to `timebill_export_<timestamp>.<ext>`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Period length for period exports, defaults to the configured one
    #[arg(short, long, value_enum)]
    period: Option<PeriodLength>,
}

pub fn cmd(args: ExportArgs) -> Result<()> {
    let config = Config::read()?;
    let zone = config.import.zone()?;
    let exporter = Exporter::new(args.format, args.output);

    match args.data {
        ExportData::Periods => {
            let entries = TimeEntries::new()?.list(&TimeEntryFilter::default())?;
            let periods = aggregate(&entries, args.period.unwrap_or(config.billing.period), &zone);
            if periods.is_empty() {
                msg_info!(Message::NothingToExport);
                return Ok(());
            }
            exporter.export_periods(&periods, &zone)?;
        }
        ExportData::Invoices => {
            let invoices = Invoices::new()?.list(&InvoiceFilter::default())?;
            if invoices.is_empty() {
                msg_info!(Message::NothingToExport);
                return Ok(());
            }
            exporter.export_invoices(&invoices, &zone)?;
        }
    }

    msg_success!(Message::ExportCompleted(exporter.output_path().display().to_string()));
    Ok(())
}
