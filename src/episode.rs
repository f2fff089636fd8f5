use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static EPISODE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0*([1-9][0-9]*)$").expect("valid episode number pattern"));

static AIR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)-([0-9]+)-([0-9]+)$").expect("valid air date pattern")
});

/// Parses a feed `seasonnum` value: a positive integer, optionally
/// zero-padded, with nothing else around it.
pub fn parse_episode_number(raw: &str) -> Option<u32> {
    let caps = EPISODE_NUMBER.captures(raw)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Parses a feed `airdate` value (`year-month-day`) into epoch seconds at
/// midnight UTC. Dates that do not exist in the calendar are rejected.
pub fn parse_air_date(raw: &str) -> Option<i64> {
    let caps = AIR_DATE.captures(raw)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_numbers_strip_leading_zeros() {
        assert_eq!(parse_episode_number("007"), Some(7));
        assert_eq!(parse_episode_number("07"), Some(7));
        assert_eq!(parse_episode_number("7"), Some(7));
        assert_eq!(parse_episode_number("10"), Some(10));
    }

    #[test]
    fn episode_numbers_reject_non_positive_or_noisy_values() {
        assert_eq!(parse_episode_number("0"), None);
        assert_eq!(parse_episode_number("000"), None);
        assert_eq!(parse_episode_number("abc"), None);
        assert_eq!(parse_episode_number(""), None);
        assert_eq!(parse_episode_number(" 7"), None);
        assert_eq!(parse_episode_number("7a"), None);
        assert_eq!(parse_episode_number("-7"), None);
        assert_eq!(parse_episode_number("07\n"), None);
        assert_eq!(parse_episode_number("\u{667}"), None);
    }

    #[test]
    fn episode_number_overflow_is_rejected() {
        assert_eq!(parse_episode_number("99999999999"), None);
    }

    #[test]
    fn air_dates_convert_to_utc_midnight() {
        assert_eq!(parse_air_date("2020-1-15"), Some(1_579_046_400));
        assert_eq!(parse_air_date("2020-01-15"), Some(1_579_046_400));
        assert_eq!(parse_air_date("1970-1-1"), Some(0));
    }

    #[test]
    fn air_dates_reject_other_shapes() {
        assert_eq!(parse_air_date("2020/1/15"), None);
        assert_eq!(parse_air_date(""), None);
        assert_eq!(parse_air_date("2020-1"), None);
        assert_eq!(parse_air_date("2020-1-15 "), None);
        assert_eq!(parse_air_date("2020-1-15\n"), None);
        assert_eq!(parse_air_date("\u{662}\u{660}\u{662}\u{660}-1-15"), None);
        assert_eq!(parse_air_date("0000-00-00"), None);
    }

    #[test]
    fn air_dates_reject_impossible_calendar_dates() {
        assert_eq!(parse_air_date("2020-13-01"), None);
        assert_eq!(parse_air_date("2020-2-30"), None);
        assert_eq!(parse_air_date("2020-1-99"), None);
    }
}
