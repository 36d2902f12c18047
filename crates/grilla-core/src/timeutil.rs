//! Calendar helpers shared by the merge engine, the loader, and the grid.
//!
//! Day names are internal identifiers: lowercase English, Monday-first,
//! matching the backend's `day_of_week` values. Display labels are a
//! presentation concern and live with the components.

use chrono::{Datelike, Local, NaiveDate, NaiveTime, Weekday};

/// Monday-first, the backend's week convention.
pub const DAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

pub fn day_name(weekday: Weekday) -> &'static str {
    DAY_NAMES[weekday.num_days_from_monday() as usize]
}

pub fn day_name_for(date: NaiveDate) -> &'static str {
    day_name(date.weekday())
}

/// Day name for the device clock. The merge engine and the loader both
/// take the day as an argument, so this is the only wall-clock read.
pub fn current_day_name() -> &'static str {
    day_name_for(Local::now().date_naive())
}

/// The Monday..Sunday dates of the week containing `date`.
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = date.week(Weekday::Mon).first_day();
    std::array::from_fn(|i| monday + chrono::Duration::days(i as i64))
}

/// Parse `HH:MM:SS` (seconds optional) into minutes since midnight.
/// Returns `None` for anything malformed — callers render degenerate
/// blocks instead of failing.
pub fn parse_hms(s: &str) -> Option<u32> {
    let mut parts = s.split(':');
    let h: u32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    if let Some(sec) = parts.next() {
        let sec: u32 = sec.parse().ok()?;
        if sec > 59 {
            return None;
        }
    }
    if parts.next().is_some() || h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

pub fn minutes_since_midnight(t: NaiveTime) -> u32 {
    use chrono::Timelike;
    t.hour() * 60 + t.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_names_monday_first() {
        assert_eq!(day_name(Weekday::Mon), "monday");
        assert_eq!(day_name(Weekday::Sun), "sunday");
        // 2024-01-03 was a Wednesday
        let d = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(day_name_for(d), "wednesday");
    }

    #[test]
    fn test_week_dates_contains_input_and_starts_monday() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(); // a Sunday
        let week = week_dates(d);
        assert_eq!(week[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(week[6], d);
        assert_eq!(day_name_for(week[0]), "monday");
    }

    #[test]
    fn test_parse_hms() {
        assert_eq!(parse_hms("00:00:00"), Some(0));
        assert_eq!(parse_hms("14:05:00"), Some(14 * 60 + 5));
        assert_eq!(parse_hms("23:59"), Some(23 * 60 + 59));
        assert_eq!(parse_hms("24:00:00"), None);
        assert_eq!(parse_hms("12:60:00"), None);
        assert_eq!(parse_hms("12:00:75"), None);
        assert_eq!(parse_hms(""), None);
        assert_eq!(parse_hms("noon"), None);
        assert_eq!(parse_hms("12:00:00:00"), None);
    }

    #[test]
    fn test_minutes_since_midnight() {
        let t = NaiveTime::from_hms_opt(14, 5, 30).unwrap();
        assert_eq!(minutes_since_midnight(t), 14 * 60 + 5);
    }
}
