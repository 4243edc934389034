//! Per-user daily summaries.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use rayon::prelude::*;
use serde::Serialize;

use crate::breaks::{BreakInterval, break_intervals};
use crate::event::PunchLike;
use crate::normalize::normalize;
use crate::reducer::reduce;
use crate::types::UserName;
use crate::window::DayWindow;

/// Worked time for one user on one day.
///
/// Computed fresh from the punches on every request.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary<E> {
    pub date: NaiveDate,
    pub user: UserName,
    /// Worked hours rounded to two decimals.
    pub worked_hours: f64,
    #[serde(skip)]
    pub worked: Duration,
    pub breaks: Vec<BreakInterval>,
    /// The input punches, in their original order.
    pub events: Vec<E>,
}

/// Converts a duration to hours rounded to two decimals, ties to even.
#[allow(clippy::cast_precision_loss)]
pub fn round_hours(worked: Duration) -> f64 {
    let seconds = worked
        .num_microseconds()
        .map_or_else(|| worked.num_seconds() as f64, |us| us as f64 / 1e6);
    let hours = seconds.max(0.0) / 3600.0;
    (hours * 100.0).round_ties_even() / 100.0
}

/// Reconciles one user's punches for `date` in `tz`.
///
/// `events` must already be filtered to `user`. `now` closes a work interval
/// that is still open, capped at the end of the day.
pub fn summarize<E: PunchLike>(
    user: UserName,
    date: NaiveDate,
    tz: Tz,
    events: Vec<E>,
    now: DateTime<Utc>,
) -> DailySummary<E> {
    let window = DayWindow::resolve(date, tz);
    let normalized = normalize(&events, &window);
    let worked = reduce(&normalized, &window, now);
    let breaks = break_intervals(&normalized);
    let worked_hours = round_hours(worked);

    tracing::debug!(
        user = %user,
        %date,
        events = events.len(),
        worked_hours,
        "summarized day"
    );

    DailySummary {
        date,
        user,
        worked_hours,
        worked,
        breaks,
        events,
    }
}

/// One (user, day) pair to summarize.
#[derive(Debug, Clone)]
pub struct SummaryRequest<E> {
    pub user: UserName,
    pub date: NaiveDate,
    pub events: Vec<E>,
}

/// Summarizes independent (user, day) pairs in parallel.
///
/// Output order matches `requests`. All summaries share the same `now`.
pub fn summarize_many<E: PunchLike + Send>(
    requests: Vec<SummaryRequest<E>>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Vec<DailySummary<E>> {
    requests
        .into_par_iter()
        .map(|req| summarize(req.user, req.date, tz, req.events, now))
        .collect()
}

/// `today` and the `n - 1` days before it, newest first.
pub fn last_n_days(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n)
        .map_while(|offset| today.checked_sub_signed(Duration::days(i64::from(offset))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Punch;
    use crate::kind::PunchKind;
    use chrono::{NaiveDateTime, TimeZone};
    use chrono_tz::Asia::Tokyo;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn next_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 17, 0, 0, 0).unwrap()
    }

    fn user(name: &str) -> UserName {
        UserName::new(name).unwrap()
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "rounded to two decimals")]
    fn summary_keeps_input_events_untouched() {
        let events = vec![
            Punch::new(at(18, 0), PunchKind::ClockOut),
            Punch::new(at(9, 0), PunchKind::ClockIn),
            Punch::new(at(13, 0), PunchKind::BreakEnd),
            Punch::new(at(12, 0), PunchKind::BreakStart),
        ];
        let summary = summarize(user("tanaka"), day(), Tokyo, events.clone(), next_day());
        assert_eq!(summary.worked_hours, 8.0);
        assert_eq!(summary.worked, Duration::hours(8));
        assert_eq!(summary.events, events);
        assert_eq!(summary.breaks.len(), 1);
        assert_eq!(summary.user.as_str(), "tanaka");
        assert_eq!(summary.date, day());
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "rounded to two decimals")]
    fn rounds_to_two_decimals() {
        assert_eq!(round_hours(Duration::minutes(20)), 0.33);
        assert_eq!(round_hours(Duration::minutes(40)), 0.67);
        assert_eq!(round_hours(Duration::seconds(8 * 3600 + 17)), 8.0);
        assert_eq!(round_hours(Duration::zero()), 0.0);
        assert_eq!(round_hours(Duration::hours(-1)), 0.0);
        // Exact halves go to the even neighbour.
        assert_eq!(round_hours(Duration::seconds(450)), 0.12);
        assert_eq!(round_hours(Duration::seconds(1350)), 0.38);
        assert_eq!(round_hours(Duration::seconds(29250)), 8.12);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "rounded to two decimals")]
    fn half_hundredth_day_rounds_to_even() {
        let events = vec![
            Punch::new(at(9, 0), PunchKind::ClockIn),
            Punch::new(day().and_hms_opt(17, 7, 30).unwrap(), PunchKind::ClockOut),
        ];
        let summary = summarize(user("sato"), day(), Tokyo, events, next_day());
        assert_eq!(summary.worked, Duration::seconds(29250));
        assert_eq!(summary.worked_hours, 8.12);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "rounded to two decimals")]
    fn empty_day_is_zero() {
        let summary = summarize::<Punch>(user("ito"), day(), Tokyo, Vec::new(), next_day());
        assert_eq!(summary.worked_hours, 0.0);
        assert!(summary.breaks.is_empty());
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "rounded to two decimals")]
    fn many_preserves_request_order() {
        let requests = vec![
            SummaryRequest {
                user: user("a"),
                date: day(),
                events: vec![
                    Punch::new(at(9, 0), PunchKind::ClockIn),
                    Punch::new(at(10, 0), PunchKind::ClockOut),
                ],
            },
            SummaryRequest {
                user: user("b"),
                date: day(),
                events: vec![
                    Punch::new(at(9, 0), PunchKind::ClockIn),
                    Punch::new(at(12, 0), PunchKind::ClockOut),
                ],
            },
            SummaryRequest {
                user: user("c"),
                date: day(),
                events: Vec::new(),
            },
        ];
        let summaries = summarize_many(requests, Tokyo, next_day());
        let got: Vec<_> = summaries
            .iter()
            .map(|s| (s.user.as_str().to_string(), s.worked_hours))
            .collect();
        assert_eq!(
            got,
            vec![
                ("a".to_string(), 1.0),
                ("b".to_string(), 3.0),
                ("c".to_string(), 0.0)
            ]
        );
    }

    #[test]
    fn last_n_days_counts_back_from_today() {
        let days = last_n_days(day(), 3);
        assert_eq!(
            days,
            vec![
                day(),
                NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
            ]
        );
        assert!(last_n_days(day(), 0).is_empty());
    }

    #[test]
    fn summary_serializes_hours_and_events() {
        let events = vec![Punch::new(at(9, 0), PunchKind::ClockIn)];
        let summary = summarize(user("sato"), day(), Tokyo, events, next_day());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2025-01-15");
        assert_eq!(json["user"], "sato");
        assert_eq!(json["worked_hours"], 15.0);
        assert_eq!(json["events"][0]["kind"], "in");
        assert!(json.get("worked").is_none());
    }
}
