//! Groups time entries into fixed-length billing periods.
//!
//! Periods are anchored at the first day of the month of the earliest entry
//! and advance in fixed steps of [`PeriodLength`] days from there. They are
//! not aligned to calendar weeks or months: "monthly" means two bi-weekly
//! spans, 28 days. Only periods that receive at least one entry are emitted.

use crate::libs::time_entry::{total_duration, TimeEntry};
use crate::libs::zone::SourceZone;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodLength {
    Weekly,
    #[default]
    BiWeekly,
    Monthly,
}

impl PeriodLength {
    pub fn days(self) -> i64 {
        match self {
            PeriodLength::Weekly => 7,
            PeriodLength::BiWeekly => 14,
            PeriodLength::Monthly => 2 * PeriodLength::BiWeekly.days(),
        }
    }
}

impl fmt::Display for PeriodLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodLength::Weekly => "weekly",
            PeriodLength::BiWeekly => "bi-weekly",
            PeriodLength::Monthly => "monthly",
        };
        write!(f, "{}", name)
    }
}

/// A window `[start_time, end_time)` and the entries starting inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingPeriod {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub entries: Vec<TimeEntry>,
}

impl BillingPeriod {
    fn open(start_date: NaiveDate, length: PeriodLength, zone: &SourceZone) -> Self {
        BillingPeriod {
            start_time: zone.start_of_day(start_date),
            end_time: zone.start_of_day(start_date + Duration::days(length.days())),
            entries: Vec::new(),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_time <= instant && instant < self.end_time
    }

    pub fn duration(&self) -> Duration {
        total_duration(&self.entries)
    }
}

/// Totals over a list of periods.
pub trait PeriodGroup {
    fn total_duration(&self) -> Duration;
    fn entry_count(&self) -> usize;
}

impl PeriodGroup for Vec<BillingPeriod> {
    fn total_duration(&self) -> Duration {
        self.iter().fold(Duration::zero(), |acc, period| acc + period.duration())
    }

    fn entry_count(&self) -> usize {
        self.iter().map(|period| period.entries.len()).sum()
    }
}

/// Partitions `entries` into billing periods of `length`, walking them in
/// ascending start order. Day boundaries are taken in `zone`.
pub fn aggregate(entries: &[TimeEntry], length: PeriodLength, zone: &SourceZone) -> Vec<BillingPeriod> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|entry| entry.start_time);

    let Some(first) = sorted.first() else {
        return Vec::new();
    };
    let first_date = zone.local_date(first.start_time);
    let mut start_date = first_date.with_day(1).unwrap_or(first_date);
    let mut current = BillingPeriod::open(start_date, length, zone);
    let mut periods = Vec::new();

    for entry in sorted {
        if entry.start_time >= current.end_time {
            if !current.entries.is_empty() {
                periods.push(current);
            }
            // Jump over empty stretches, then settle on the exact period.
            let gap_days = (zone.local_date(entry.start_time) - start_date).num_days();
            let skipped = (gap_days / length.days() - 1).max(1);
            start_date = start_date + Duration::days(skipped * length.days());
            current = BillingPeriod::open(start_date, length, zone);
            while entry.start_time >= current.end_time {
                start_date = start_date + Duration::days(length.days());
                current = BillingPeriod::open(start_date, length, zone);
            }
        }
        current.entries.push(entry);
    }

    if !current.entries.is_empty() {
        periods.push(current);
    }

    tracing::debug!(periods = periods.len(), length = %length, "aggregated billing periods");
    periods
}
