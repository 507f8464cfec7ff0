//! Durations, distances and clock times as shown to riders.
//!
//! All rounding here is round-half-up so a 90 second leg reads as 2 minutes
//! and a 250 m walk as 0.3 km, wherever the figure appears.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Whole minutes in a duration given in seconds, rounded half up.
///
/// # Examples
///
/// ```
/// use mobile_server::domain::whole_minutes;
///
/// assert_eq!(whole_minutes(90.0), 2);
/// assert_eq!(whole_minutes(89.0), 1);
/// assert_eq!(whole_minutes(0.0), 0);
/// ```
pub fn whole_minutes(secs: f64) -> i64 {
    (secs / 60.0 + 0.5).floor() as i64
}

/// Distance in kilometres with one decimal, rounded half up.
///
/// # Examples
///
/// ```
/// use mobile_server::domain::kilometres;
///
/// assert_eq!(kilometres(250.0), "0.3");
/// assert_eq!(kilometres(1234.0), "1.2");
/// assert_eq!(kilometres(0.0), "0.0");
/// ```
pub fn kilometres(metres: f64) -> String {
    let tenths = (metres / 100.0 + 0.5).floor();
    format!("{:.1}", tenths / 10.0)
}

/// `HH:MM` (24-hour, zero padded) of an instant in the given time zone.
pub fn clock_time<Tz: TimeZone>(at: DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(zone).format("%H:%M").to_string()
}

/// Time until a passage, as shown on a stop's board.
///
/// `Passé` once it has gone, `<n> min` under an hour, `<h>h<mm>` beyond.
pub fn wait_label(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = at.signed_duration_since(now);
    if diff.num_milliseconds() < 0 {
        return "Passé".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{minutes} min");
    }

    format!("{}h{:02}", minutes / 60, minutes % 60)
}

/// Service day as the timetable API expects it (`YYYYMMDD`).
pub fn service_date_param(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Instant from epoch milliseconds, as the planner sends timestamps.
pub fn from_epoch_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    #[test]
    fn minutes_round_half_up() {
        assert_eq!(whole_minutes(29.0), 0);
        assert_eq!(whole_minutes(30.0), 1);
        assert_eq!(whole_minutes(90.0), 2);
        assert_eq!(whole_minutes(150.0), 3);
        assert_eq!(whole_minutes(3600.0), 60);
    }

    #[test]
    fn kilometres_round_half_up() {
        assert_eq!(kilometres(49.0), "0.0");
        assert_eq!(kilometres(50.0), "0.1");
        assert_eq!(kilometres(1450.0), "1.5");
        assert_eq!(kilometres(12_345.0), "12.3");
    }

    #[test]
    fn clock_time_in_zone() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 7, 5, 0).unwrap();
        assert_eq!(clock_time(at, &Utc), "07:05");

        let paris = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(clock_time(at, &paris), "08:05");

        let late = Utc.with_ymd_and_hms(2025, 3, 14, 23, 30, 0).unwrap();
        assert_eq!(clock_time(late, &paris), "00:30");
    }

    #[test]
    fn wait_labels() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();

        assert_eq!(wait_label(now - Duration::seconds(1), now), "Passé");
        assert_eq!(wait_label(now, now), "0 min");
        assert_eq!(wait_label(now + Duration::seconds(119), now), "1 min");
        assert_eq!(wait_label(now + Duration::minutes(59), now), "59 min");
        assert_eq!(wait_label(now + Duration::minutes(60), now), "1h00");
        assert_eq!(wait_label(now + Duration::minutes(135), now), "2h15");
    }

    #[test]
    fn service_date_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(service_date_param(date), "20250304");
    }

    #[test]
    fn epoch_millis() {
        let at = from_epoch_millis(1_700_000_000_000).unwrap();
        assert_eq!(at.timestamp(), 1_700_000_000);
    }
}
