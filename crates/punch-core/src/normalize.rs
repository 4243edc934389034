//! Maps raw punches into a day window and orders them.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::event::PunchLike;
use crate::kind::PunchKind;
use crate::window::DayWindow;

/// A punch resolved into its day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPunch {
    /// Time inside `[window.start, window.end)`.
    pub at: DateTime<Tz>,
    /// `None` when the tag isn't a known kind.
    pub kind: Option<PunchKind>,
    /// Position of the source event in the input slice.
    pub index: usize,
}

/// Brings a timestamp inside the half-open window.
///
/// Anything before the window snaps to `start`; anything at or after `end`
/// snaps to one microsecond before `end`.
pub fn clamp(at: DateTime<Tz>, window: &DayWindow) -> DateTime<Tz> {
    if at < window.start {
        window.start
    } else if at >= window.end {
        window.end - Duration::microseconds(1)
    } else {
        at
    }
}

/// Converts, clamps and stable-sorts `events` for reduction.
///
/// Every input event produces exactly one output; events with equal times
/// keep their input order.
pub fn normalize<E: PunchLike>(events: &[E], window: &DayWindow) -> Vec<NormalizedPunch> {
    let tz = window.tz();
    let mut normalized: Vec<NormalizedPunch> = events
        .iter()
        .enumerate()
        .map(|(index, event)| NormalizedPunch {
            at: clamp(event.punch_time().in_zone(tz), window),
            kind: PunchKind::recognize(event.kind_tag()),
            index,
        })
        .collect();
    // sort_by_key is stable
    normalized.sort_by_key(|p| p.at);
    normalized
}
