use crate::{
    db::time_entries::{TimeEntries, TimeEntryFilter},
    libs::{billing::aggregate, billing::PeriodLength, config::Config, messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct PeriodsArgs {
    /// Period length, defaults to the configured one
    #[arg(short, long, value_enum)]
    period: Option<PeriodLength>,
}

pub fn cmd(args: PeriodsArgs) -> Result<()> {
    let config = Config::read()?;
    let zone = config.import.zone()?;
    let length = args.period.unwrap_or(config.billing.period);

    let entries = TimeEntries::new()?.list(&TimeEntryFilter::default())?;
    let periods = aggregate(&entries, length, &zone);

    if periods.is_empty() {
        msg_info!(Message::NoPeriods);
        return Ok(());
    }

    msg_print!(Message::PeriodsHeader(length.to_string()), true);
    View::periods(&periods, &zone);
    Ok(())
}
