//! Timezone labels used by time-log exports.
//!
//! Exports carry wall-clock values without an offset; the configured label
//! says which zone they were recorded in. A label is either a common
//! abbreviation (`EST`, `PDT`, `UTC`), a numeric offset (`+05:30`, `-0800`)
//! or an IANA name (`America/New_York`). Abbreviations are fixed offsets and
//! do not follow daylight saving; IANA names do.

use crate::libs::error::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Abbreviation to UTC offset in seconds.
const ABBREVIATIONS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
    ("AKST", -9 * 3600),
    ("AKDT", -8 * 3600),
    ("HST", -10 * 3600),
    ("BST", 3600),
    ("CET", 3600),
    ("CEST", 2 * 3600),
    ("EET", 2 * 3600),
    ("EEST", 3 * 3600),
    ("IST", 5 * 3600 + 1800),
    ("JST", 9 * 3600),
    ("AEST", 10 * 3600),
    ("AEDT", 11 * 3600),
];

/// The zone in which imported wall-clock values are interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceZone {
    Fixed { label: String, offset: FixedOffset },
    Named(Tz),
}

impl SourceZone {
    /// Resolves a configured label, failing with [`Error::UnknownTimezone`].
    pub fn resolve(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let upper = trimmed.to_uppercase();

        if let Some((abbr, secs)) = ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == upper) {
            let offset = FixedOffset::east_opt(*secs).ok_or_else(|| Error::UnknownTimezone(label.to_string()))?;
            return Ok(SourceZone::Fixed {
                label: abbr.to_string(),
                offset,
            });
        }

        if let Some(offset) = parse_numeric_offset(trimmed) {
            return Ok(SourceZone::Fixed {
                label: trimmed.to_string(),
                offset,
            });
        }

        trimmed
            .parse::<Tz>()
            .map(SourceZone::Named)
            .map_err(|_| Error::UnknownTimezone(label.to_string()))
    }

    pub fn utc() -> Self {
        SourceZone::Fixed {
            label: "UTC".to_string(),
            offset: Utc.fix(),
        }
    }

    /// Wall-clock value of `instant` in this zone.
    pub fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            SourceZone::Fixed { offset, .. } => instant.with_timezone(offset).naive_local(),
            SourceZone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Calendar date of `instant` in this zone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(instant).date()
    }

    /// Instant of a wall-clock value. Ambiguous values resolve to the earlier
    /// instant; values inside a daylight-saving gap have no instant.
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            SourceZone::Fixed { offset, .. } => offset.from_local_datetime(&local).single().map(|dt| dt.with_timezone(&Utc)),
            SourceZone::Named(tz) => tz.from_local_datetime(&local).earliest().map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// First instant of `date` in this zone.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        // Zones that jump over midnight start the day at the first valid wall-clock value.
        (0..=3)
            .find_map(|hours| self.to_utc(midnight + Duration::hours(hours)))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    /// Last representable instant of `date` in this zone (23:59:59.999999999).
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let next = date.succ_opt().unwrap_or(date);
        self.start_of_day(next) - Duration::nanoseconds(1)
    }

    pub fn label(&self) -> String {
        match self {
            SourceZone::Fixed { label, .. } => label.clone(),
            SourceZone::Named(tz) => tz.name().to_string(),
        }
    }
}

impl fmt::Display for SourceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parses `+HH:MM`, `-HH:MM`, `+HHMM` and `-HH`.
fn parse_numeric_offset(value: &str) -> Option<FixedOffset> {
    let (sign, rest) = match value.chars().next()? {
        '+' => (1, &value[1..]),
        '-' => (-1, &value[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = if digits.len() <= 2 {
        (digits.parse::<i32>().ok()?, 0)
    } else {
        let split = digits.len() - 2;
        (digits[..split].parse::<i32>().ok()?, digits[split..].parse::<i32>().ok()?)
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
