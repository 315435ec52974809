//! Splits logged intervals at calendar-day boundaries.
//!
//! A row such as `22:00 -> 02:00` belongs to two days. The first piece runs
//! to 23:59:59.999999999 of the start date; the last piece starts at 00:00 of
//! the end date and is sized by whatever duration remains, so the pieces
//! always add up to the original duration to the nanosecond. Intervals that
//! span more than one midnight are split day by day, full middle days running
//! from 00:00 to 23:59:59.999999999.
//!
//! Day boundaries are taken in the configured [`SourceZone`].

use crate::libs::zone::SourceZone;
use chrono::{DateTime, Duration, Utc};

/// A logged interval, or one piece of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub comment: String,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, comment: &str) -> Self {
        Interval {
            start,
            end,
            comment: comment.to_string(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Splits `[start, end)` so that no piece crosses a day boundary in `zone`.
///
/// Same-day intervals come back unchanged as the only element. An interval
/// ending exactly at midnight is treated as ending on the previous day.
/// `start` is expected to be before `end`; anything else is returned as is.
pub fn split(start: DateTime<Utc>, end: DateTime<Utc>, comment: &str, zone: &SourceZone) -> Vec<Interval> {
    if end <= start {
        return vec![Interval::new(start, end, comment)];
    }

    let end_date = zone.local_date(end);
    let last_day = if end == zone.start_of_day(end_date) {
        end_date.pred_opt().unwrap_or(end_date)
    } else {
        end_date
    };

    if zone.local_date(start) >= last_day {
        return vec![Interval::new(start, end, comment)];
    }

    let mut pieces = Vec::new();
    let mut cursor = start;
    let mut remaining = end - start;

    loop {
        let day = zone.local_date(cursor);
        if day >= last_day {
            pieces.push(Interval::new(cursor, cursor + remaining, comment));
            break;
        }

        let end_of_day = zone.end_of_day(day);
        pieces.push(Interval::new(cursor, end_of_day, comment));
        remaining = remaining - (end_of_day - cursor);

        match day.succ_opt() {
            Some(next) => cursor = zone.start_of_day(next),
            None => break,
        }
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn est() -> SourceZone {
        SourceZone::resolve("EST").unwrap()
    }

    fn local(zone: &SourceZone, value: &str) -> DateTime<Utc> {
        zone.to_utc(NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").unwrap()).unwrap()
    }

    #[test]
    fn keeps_same_day_intervals() {
        let zone = est();
        let start = local(&zone, "2024-01-15 09:00:00");
        let end = local(&zone, "2024-01-15 17:30:00");

        let pieces = split(start, end, "day shift", &zone);

        assert_eq!(pieces, vec![Interval::new(start, end, "day shift")]);
    }

    #[test]
    fn splits_night_shift_at_midnight() {
        let zone = est();
        let start = local(&zone, "2024-01-15 22:00:00");
        let end = local(&zone, "2024-01-16 02:00:00");

        let pieces = split(start, end, "night shift", &zone);

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].start, start);
        assert_eq!(pieces[0].end, local(&zone, "2024-01-15 23:59:59.999999999"));
        assert_eq!(pieces[1].start, local(&zone, "2024-01-16 00:00:00"));
        // Sized by the remaining duration, so it ends 1ns after the raw end.
        assert_eq!(pieces[1].end, local(&zone, "2024-01-16 02:00:00.000000001"));
        assert_eq!(pieces[1].end.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true), "2024-01-16T07:00:00.000000001Z");
        assert_eq!(pieces[0].duration() + pieces[1].duration(), end - start);
        assert!(pieces.iter().all(|p| p.comment == "night shift"));

        let total: Duration = pieces.iter().map(Interval::duration).fold(Duration::zero(), |acc, d| acc + d);
        assert_eq!(total, Duration::hours(4));
    }

    #[test]
    fn conserves_duration_to_the_nanosecond() {
        let zone = est();
        let start = local(&zone, "2024-03-09 23:59:59.123456789");
        let end = local(&zone, "2024-03-10 00:00:00.000000007");

        let pieces = split(start, end, "", &zone);

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].duration() + pieces[1].duration(), end - start);
    }

    #[test]
    fn interval_ending_at_midnight_is_not_split() {
        let zone = est();
        let start = local(&zone, "2024-01-15 20:00:00");
        let end = local(&zone, "2024-01-16 00:00:00");

        assert_eq!(split(start, end, "evening", &zone).len(), 1);
    }

    #[test]
    fn splits_multi_day_intervals_day_by_day() {
        let zone = est();
        let start = local(&zone, "2024-01-15 20:00:00");
        let end = local(&zone, "2024-01-17 04:00:00");

        let pieces = split(start, end, "on call", &zone);

        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[1].start, local(&zone, "2024-01-16 00:00:00"));
        assert_eq!(pieces[1].end, local(&zone, "2024-01-16 23:59:59.999999999"));
        assert_eq!(pieces[2].start, local(&zone, "2024-01-17 00:00:00"));
        for piece in &pieces {
            assert_eq!(zone.local_date(piece.start), zone.local_date(piece.end));
        }
        let total = pieces.iter().fold(Duration::zero(), |acc, p| acc + p.duration());
        assert_eq!(total, end - start);
    }
}
