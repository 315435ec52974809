//! Invoice creation, listing and client-timestamp updates.

use crate::{
    db::invoices::Invoices,
    libs::{
        config::Config,
        csv_parser::CSV_TIME_FORMAT,
        formatter::format_amount,
        invoice::{InvoiceFilter, InvoiceUpdate},
        messages::Message,
        view::View,
        zone::SourceZone,
    },
    msg_bail_anyhow, msg_error_anyhow, msg_info, msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct InvoiceArgs {
    #[command(subcommand)]
    command: InvoiceCommand,
}

#[derive(Debug, Subcommand)]
enum InvoiceCommand {
    /// Bill every entry that starts within the given days
    Create {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// List invoices with optional filters
    List {
        /// Only these invoice IDs (comma separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,
        /// Only archived (true) or active (false) invoices
        #[arg(long)]
        archived: Option<bool>,
    },
    /// Record when the invoice was sent or paid
    Update {
        id: i64,
        /// Sent timestamp: RFC 3339, "YYYY-MM-DD HH:MM:SS" in the configured timezone, or "now"
        #[arg(long)]
        sent: Option<String>,
        /// Paid timestamp, same formats as --sent
        #[arg(long)]
        paid: Option<String>,
    },
}

pub fn cmd(args: InvoiceArgs) -> Result<()> {
    let zone = Config::read()?.import.zone()?;
    let mut invoices = Invoices::new()?;

    match args.command {
        InvoiceCommand::Create { from, to } => {
            if from > to {
                msg_bail_anyhow!(Message::InvalidDateRange(from.to_string(), to.to_string()));
            }

            let invoice = invoices.create_for_range(from, to, &zone)?;
            if invoice.time_entries.is_empty() {
                msg_warning!(Message::NoEntriesInRange(from.to_string(), to.to_string()));
            }
            msg_success!(Message::InvoiceCreated(invoice.id.unwrap_or(0), format_amount(invoice.amount_due)));
            View::invoices(&[invoice], &zone);
        }
        InvoiceCommand::List { ids, archived } => {
            let list = invoices.list(&InvoiceFilter { ids, archived })?;
            if list.is_empty() {
                msg_info!(Message::NoInvoices);
                return Ok(());
            }
            msg_print!(Message::InvoicesHeader, true);
            View::invoices(&list, &zone);
        }
        InvoiceCommand::Update { id, sent, paid } => {
            let update = InvoiceUpdate {
                sent_to_client: sent.as_deref().map(|value| parse_timestamp(value, &zone)).transpose()?,
                paid_by_client: paid.as_deref().map(|value| parse_timestamp(value, &zone)).transpose()?,
            };
            let invoice = invoices.update(id, &update)?;
            msg_success!(Message::InvoiceUpdated(id));
            View::invoices(&[invoice], &zone);
        }
    }

    Ok(())
}

/// Parses a client timestamp given on the command line.
pub fn parse_timestamp(value: &str, zone: &SourceZone) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("now") {
        return Ok(Utc::now());
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, CSV_TIME_FORMAT)
        .ok()
        .and_then(|local| zone.to_utc(local))
        .ok_or_else(|| msg_error_anyhow!(Message::InvalidTimestamp(value.to_string())))
}
