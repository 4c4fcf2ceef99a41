//! Time source used by the catalog and the reminder job
//!
//! Day boundaries are computed in the server's local calendar. Tests swap in
//! [`FixedClock`] to pin both the instant and the offset.

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};

/// Source of "now" and of the current local day.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Inclusive `[start, end]` instants of the local calendar day containing `now`.
    fn today_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>);
}

/// Wall clock in the process time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        day_bounds(&Local, Local::now().date_naive())
    }
}

/// A clock frozen at a given instant, observed from a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Frozen at `now`, with UTC as the local zone.
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self {
            now: now.fixed_offset(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }

    fn today_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        day_bounds(self.now.offset(), self.now.date_naive())
    }
}

/// First instant of `date` in `tz`.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

/// Last millisecond of `date` in `tz`.
pub fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_day(tz, next) - Duration::milliseconds(1),
        None => resolve_local(tz, date.and_time(NaiveTime::MIN) + Duration::days(1))
            - Duration::milliseconds(1),
    }
}

/// Inclusive bounds of `date` in `tz`.
pub fn day_bounds<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (start_of_day(tz, date), end_of_day(tz, date))
}

/// Map a local wall-clock time to an instant. Ambiguous times take the
/// earlier reading; times inside a DST gap move forward until they exist.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = local;
    for _ in 0..4 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                return dt.with_timezone(&Utc);
            }
            LocalResult::None => candidate += Duration::minutes(30),
        }
    }
    Utc.from_utc_datetime(&local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_day_bounds_cover_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let (start, end) = day_bounds(&Utc, date);

        assert_eq!(start.to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-15T23:59:59.999+00:00");
    }

    #[test]
    fn fixed_clock_uses_its_own_offset_for_today() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        // 01:30 UTC on the 16th is still the 15th at UTC-3.
        let now = offset.with_ymd_and_hms(2024, 3, 15, 22, 30, 0).unwrap();
        let clock = FixedClock::new(now);

        let (start, end) = clock.today_bounds();
        assert_eq!(start.to_rfc3339(), "2024-03-15T03:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-16T02:59:59.999+00:00");
        assert!(start <= clock.now() && clock.now() <= end);
    }

    #[test]
    fn system_clock_now_falls_inside_today() {
        let clock = SystemClock;
        let (start, end) = clock.today_bounds();
        let now = clock.now();
        assert!(start <= now && now <= end);
    }
}
