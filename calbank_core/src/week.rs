//! Monday-anchored week date math.
//!
//! All ledger computation works over a single week identified by its Monday.
//! The current date is always supplied by the caller, never read from a
//! clock, so these helpers are trivially testable.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Number of days in a ledger week.
pub const DAYS_PER_WEEK: u32 = 7;

/// The Monday that anchors the week containing `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// The Sunday closing the week that starts at `week_start`.
pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start + Duration::days(6)
}

/// Whether `date` falls inside the week starting at `week_start`.
pub fn contains(week_start: NaiveDate, date: NaiveDate) -> bool {
    date >= week_start && date <= week_end(week_start)
}

/// Days left in the week, counting `today` as remaining.
///
/// Callers must have checked `contains(week_start, today)` first.
pub fn days_left(week_start: NaiveDate, today: NaiveDate) -> u32 {
    let elapsed = (today - week_start).num_days() as u32;
    DAYS_PER_WEEK - elapsed
}

/// All seven dates of the week in order.
pub fn dates_of_week(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..DAYS_PER_WEEK as i64)
        .map(|d| week_start + Duration::days(d))
        .collect()
}

/// Sanity check that a week anchor really is a Monday.
pub fn is_monday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_of_mid_week() {
        // 2026-08-27 is a Thursday
        assert_eq!(week_start_of(date(2026, 8, 27)), date(2026, 8, 24));
    }

    #[test]
    fn test_week_start_of_monday_is_identity() {
        assert_eq!(week_start_of(date(2026, 8, 24)), date(2026, 8, 24));
    }

    #[test]
    fn test_week_end() {
        assert_eq!(week_end(date(2026, 8, 24)), date(2026, 8, 30));
    }

    #[test]
    fn test_contains_bounds() {
        let monday = date(2026, 8, 24);
        assert!(contains(monday, monday));
        assert!(contains(monday, date(2026, 8, 30)));
        assert!(!contains(monday, date(2026, 8, 23)));
        assert!(!contains(monday, date(2026, 8, 31)));
    }

    #[test]
    fn test_days_left_counts_today() {
        let monday = date(2026, 8, 24);
        assert_eq!(days_left(monday, monday), 7);
        assert_eq!(days_left(monday, date(2026, 8, 28)), 3); // Friday
        assert_eq!(days_left(monday, date(2026, 8, 30)), 1); // Sunday
    }

    #[test]
    fn test_dates_of_week() {
        let days = dates_of_week(date(2026, 8, 24));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2026, 8, 24));
        assert_eq!(days[6], date(2026, 8, 30));
    }

    #[test]
    fn test_is_monday() {
        assert!(is_monday(date(2026, 8, 24)));
        assert!(!is_monday(date(2026, 8, 25)));
    }
}
