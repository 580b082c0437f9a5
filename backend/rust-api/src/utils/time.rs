use chrono::{Datelike, Duration, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a calendar date as YYYY-MM-DD, the key format used by the
/// progress and session stores.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn today_str() -> String {
    format_date(today())
}

pub fn yesterday_str() -> String {
    format_date(today() - Duration::days(1))
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The seven dates of the week starting at `start` (a Monday).
pub fn week_dates(start: NaiveDate) -> Vec<String> {
    (0..7)
        .map(|offset| format_date(start + Duration::days(offset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_and_parse_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(format_date(date), "2025-03-09");
        assert_eq!(parse_date("2025-03-09"), Some(date));
        assert_eq!(parse_date("not-a-date"), None);
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-03-09 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(format_date(week_start(sunday)), "2025-03-03");

        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn week_dates_are_consecutive() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let dates = week_dates(start);
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], "2025-03-03");
        assert_eq!(dates[6], "2025-03-09");
    }
}
