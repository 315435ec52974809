use crate::{
    db::time_entries::{TimeEntries, TimeEntryFilter},
    libs::{config::Config, formatter::format_duration, messages::Message, time_entry::total_duration, view::View},
    msg_bail_anyhow, msg_info, msg_print,
};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

#[derive(Debug, Args)]
pub struct EntriesArgs {
    /// First day to include (YYYY-MM-DD, configured timezone)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD, configured timezone)
    #[arg(long)]
    to: Option<NaiveDate>,
}

pub fn cmd(args: EntriesArgs) -> Result<()> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            msg_bail_anyhow!(Message::InvalidDateRange(from.to_string(), to.to_string()));
        }
    }

    let zone = Config::read()?.import.zone()?;
    let filter = TimeEntryFilter {
        from: args.from.map(|date| zone.start_of_day(date)),
        to: args.to.map(|date| zone.start_of_day(date.succ_opt().unwrap_or(date))),
    };
    let entries = TimeEntries::new()?.list(&filter)?;

    if entries.is_empty() {
        msg_info!(Message::NoTimeEntries);
        return Ok(());
    }

    msg_print!(Message::TimeEntriesHeader, true);
    View::time_entries(&entries, &zone);
    msg_print!(Message::TimeEntriesTotal(entries.len(), format_duration(&total_duration(&entries))));
    Ok(())
}
