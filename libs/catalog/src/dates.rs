//! Lenient date parsing for filter bounds and release dates
//!
//! Accepted shapes: `YYYY-MM-DD`, a local `YYYY-MM-DDTHH:MM[:SS[.fff]]`
//! (also with a space separator) and RFC 3339. Anything else is `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use common::clock::{resolve_local, start_of_day};

const LOCAL_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar day named by `value`, as seen from `tz`.
pub fn parse_calendar_date_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(tz).date_naive());
    }

    parse_local_datetime(value).map(|local| local.date())
}

/// Instant named by `value`. Values without an offset are read in `tz`;
/// a bare date means local midnight.
pub fn parse_instant_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(start_of_day(tz, date));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    parse_local_datetime(value).map(|local| resolve_local(tz, local))
}

/// `YYYY-MM-DD` of `instant` in `tz`.
pub fn format_day_in<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String {
    instant
        .with_timezone(tz)
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

fn parse_local_datetime(value: &str) -> Option<NaiveDateTime> {
    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn calendar_date_accepts_plain_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2021, 7, 9);

        assert_eq!(parse_calendar_date_in("2021-07-09", &Utc), expected);
        assert_eq!(parse_calendar_date_in(" 2021-07-09T18:30:00 ", &Utc), expected);
        assert_eq!(parse_calendar_date_in("2021-07-09T18:30:00Z", &Utc), expected);
    }

    #[test]
    fn calendar_date_follows_the_zone_for_offset_timestamps() {
        let brasilia = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(
            parse_calendar_date_in("2021-07-10T01:00:00Z", &brasilia),
            NaiveDate::from_ymd_opt(2021, 7, 9)
        );
    }

    #[test]
    fn garbage_is_rejected() {
        for value in ["", "   ", "yesterday", "2021-13-01", "2021-02-30", "09/07/2021"] {
            assert_eq!(parse_calendar_date_in(value, &Utc), None, "{value}");
            assert_eq!(parse_instant_in(value, &Utc), None, "{value}");
        }
    }

    #[test]
    fn bare_date_instant_is_local_midnight() {
        let brasilia = FixedOffset::west_opt(3 * 3600).unwrap();
        let instant = parse_instant_in("2021-07-09", &brasilia).unwrap();
        assert_eq!(instant.to_rfc3339(), "2021-07-09T03:00:00+00:00");
        assert_eq!(format_day_in(&instant, &brasilia), "2021-07-09");
    }

    #[test]
    fn rfc3339_instant_keeps_its_offset() {
        let instant = parse_instant_in("2021-07-09T20:00:00-03:00", &Utc).unwrap();
        assert_eq!(instant.to_rfc3339(), "2021-07-09T23:00:00+00:00");
    }
}
