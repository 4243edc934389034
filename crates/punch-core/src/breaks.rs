//! Break intervals for display.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;

use crate::kind::PunchKind;
use crate::normalize::NormalizedPunch;

/// A closed break, from `BreakStart` to the following `BreakEnd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakInterval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl BreakInterval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Pairs each break start with the next break end.
///
/// While a break is open further starts are ignored, and ends with no open
/// break are dropped. A break still open at the end is not reported. This
/// looks only at break punches, so it can disagree with the reducer on
/// malformed days.
pub fn break_intervals(normalized: &[NormalizedPunch]) -> Vec<BreakInterval> {
    let mut intervals = Vec::new();
    let mut open: Option<DateTime<Tz>> = None;
    for punch in normalized {
        match (punch.kind, open) {
            (Some(PunchKind::BreakStart), None) => open = Some(punch.at),
            (Some(PunchKind::BreakEnd), Some(start)) => {
                intervals.push(BreakInterval {
                    start,
                    end: punch.at,
                });
                open = None;
            }
            _ => {}
        }
    }
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Punch;
    use crate::normalize::normalize;
    use crate::window::DayWindow;
    use chrono::{NaiveDate, NaiveDateTime};
    use chrono_tz::Asia::Tokyo;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn breaks(events: &[(NaiveDateTime, PunchKind)]) -> Vec<BreakInterval> {
        let window = DayWindow::resolve(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), Tokyo);
        let punches: Vec<_> = events.iter().map(|(t, k)| Punch::new(*t, *k)).collect();
        break_intervals(&normalize(&punches, &window))
    }

    #[test]
    fn pairs_start_with_next_end() {
        let result = breaks(&[
            (at(9, 0), PunchKind::ClockIn),
            (at(12, 0), PunchKind::BreakStart),
            (at(12, 45), PunchKind::BreakEnd),
            (at(15, 0), PunchKind::BreakStart),
            (at(15, 10), PunchKind::BreakEnd),
        ]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].start.naive_local(), at(12, 0));
        assert_eq!(result[0].duration(), Duration::minutes(45));
        assert_eq!(result[1].duration(), Duration::minutes(10));
    }

    #[test]
    fn first_start_wins_while_open() {
        let result = breaks(&[
            (at(12, 0), PunchKind::BreakStart),
            (at(12, 10), PunchKind::BreakStart),
            (at(13, 0), PunchKind::BreakEnd),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].duration(), Duration::hours(1));
    }

    #[test]
    fn unmatched_punches_are_dropped() {
        let result = breaks(&[
            (at(11, 0), PunchKind::BreakEnd),
            (at(12, 0), PunchKind::BreakStart),
        ]);
        assert!(result.is_empty());
    }
}
