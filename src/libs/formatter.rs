//! Display formatting for durations, instants and money.

use crate::libs::invoice::total_hours;
use crate::libs::zone::SourceZone;
use chrono::{DateTime, Duration, Utc};

/// Formats a duration as `HH:MM`, dropping seconds. Negative durations show as `00:00`.
///
/// ```rust
/// use timebill::libs::formatter::format_duration;
/// use chrono::Duration;
///
/// assert_eq!(format_duration(&Duration::minutes(90)), "01:30");
/// assert_eq!(format_duration(&Duration::hours(26)), "26:00");
/// assert_eq!(format_duration(&Duration::hours(-1)), "00:00");
/// ```
pub fn format_duration(duration: &Duration) -> String {
    let hours = duration.num_hours();
    let mins = duration.num_minutes() % 60;
    format!("{:02}:{:02}", hours.max(0), mins.max(0))
}

/// Fractional hours with two decimals.
pub fn format_hours(duration: &Duration) -> String {
    format!("{:.2}", total_hours(duration))
}

pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Wall-clock value of `instant` in `zone`, to the second.
pub fn format_local(instant: &DateTime<Utc>, zone: &SourceZone) -> String {
    zone.local_datetime(*instant).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_optional(instant: &Option<DateTime<Utc>>, zone: &SourceZone) -> String {
    instant.as_ref().map(|i| format_local(i, zone)).unwrap_or_else(|| "-".to_string())
}
