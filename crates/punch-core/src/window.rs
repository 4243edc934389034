//! Calendar-day windows in a fixed time zone.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
};
use chrono_tz::Tz;
use serde::Serialize;

/// One local calendar day as a half-open interval `[start, end)`.
///
/// `end` is always exactly 24 hours after `start`, even on days where a DST
/// transition makes the local day shorter or longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl DayWindow {
    /// Resolves local midnight-to-midnight for `date` in `tz`.
    pub fn resolve(date: NaiveDate, tz: Tz) -> Self {
        let start = localize(date.and_time(NaiveTime::MIN), tz);
        Self {
            start,
            end: start + Duration::hours(24),
        }
    }

    /// The time zone this window was resolved in.
    pub fn tz(&self) -> Tz {
        self.start.timezone()
    }

    /// Whether `instant` falls inside `[start, end)`.
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.start && *instant < self.end
    }

    /// Closes an open interval at `now`, but never past the end of the day.
    pub fn close_out(&self, now: DateTime<Tz>) -> DateTime<Tz> {
        now.min(self.end)
    }
}

/// Interprets a wall-clock reading as local time in `tz`.
///
/// Ambiguous readings (DST fall-back) take the earlier instant. Readings that
/// fall in a DST gap are shifted forward by the gap, using the offset in
/// effect before the transition.
pub(crate) fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            // Gaps are at most a few hours; a day earlier is safely before it.
            let before = tz.offset_from_utc_datetime(&(naive - Duration::days(1)));
            let utc = naive - Duration::seconds(i64::from(before.fix().local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::{America::Sao_Paulo, Asia::Tokyo, Europe::Berlin};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_spans_local_midnight_to_midnight() {
        let window = DayWindow::resolve(date(2025, 1, 15), Tokyo);
        assert_eq!(
            window.start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2025, 1, 14, 15, 0, 0).unwrap()
        );
        assert_eq!(window.end - window.start, Duration::hours(24));
        assert_eq!(window.end.naive_local(), date(2025, 1, 16).and_time(NaiveTime::MIN));
        assert_eq!(window.tz(), Tokyo);
    }

    #[test]
    fn window_is_half_open() {
        let window = DayWindow::resolve(date(2025, 1, 15), Tokyo);
        assert!(window.contains(&window.start));
        assert!(!window.contains(&window.end));
        assert!(window.contains(&(window.end - Duration::microseconds(1))));
    }

    #[test]
    fn window_is_24_hours_across_dst() {
        // Berlin springs forward on 2025-03-30; the window is still 24h long.
        let window = DayWindow::resolve(date(2025, 3, 30), Berlin);
        assert_eq!(window.end - window.start, Duration::hours(24));
        assert_eq!(
            window.start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2025, 3, 29, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn midnight_in_dst_gap_starts_after_the_gap() {
        // Sao Paulo skipped 00:00-01:00 on 2018-11-04.
        let window = DayWindow::resolve(date(2018, 11, 4), Sao_Paulo);
        assert_eq!(
            window.start.naive_local(),
            date(2018, 11, 4).and_hms_opt(1, 0, 0).unwrap()
        );
    }

    #[test]
    fn close_out_caps_at_day_end() {
        let window = DayWindow::resolve(date(2025, 1, 15), Tokyo);
        let midday = window.start + Duration::hours(12);
        assert_eq!(window.close_out(midday), midday);
        assert_eq!(window.close_out(window.end + Duration::hours(3)), window.end);
    }
}
