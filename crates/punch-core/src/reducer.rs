//! Worked-time reduction over a day's normalized punches.
//!
//! # Algorithm Summary
//!
//! 1. Start `Idle` with nothing accumulated
//! 2. Fold each punch through the transition table, crediting closed work intervals
//! 3. If still `Working` after the last punch, close at `min(now, window.end)`
//!
//! Punches that make no sense in the current state are skipped. The reducer
//! has no failure outcome: any sequence yields a non-negative duration.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::kind::PunchKind;
use crate::normalize::NormalizedPunch;
use crate::window::DayWindow;

/// Where the user stands at a point in the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftState {
    /// Not clocked in.
    #[default]
    Idle,
    /// Clocked in with an open work interval.
    Working { since: DateTime<Tz> },
    /// Clocked in, on break. No interval is open.
    OnBreak,
}

/// What a punch did to the accumulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Started a work interval.
    Open,
    /// Closed the open interval and immediately started a new one.
    Checkpoint { credited: Duration },
    /// Closed the open interval.
    Close { credited: Duration },
    /// Started a work interval after a break.
    Resume,
    /// The punch is not valid in the current state.
    Ignored,
}

impl Effect {
    /// Time added to the accumulator by this effect.
    pub fn credited(&self) -> Duration {
        match self {
            Self::Checkpoint { credited } | Self::Close { credited } => *credited,
            Self::Open | Self::Resume | Self::Ignored => Duration::zero(),
        }
    }
}

/// Result of feeding one punch to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ShiftState,
    pub effect: Effect,
}

/// Elapsed time from `since` to `until`, or zero if not strictly positive.
fn elapsed(since: DateTime<Tz>, until: DateTime<Tz>) -> Duration {
    if until > since {
        until - since
    } else {
        Duration::zero()
    }
}

/// The transition table.
///
/// Every `(state, kind)` pair is listed; `None` kinds (unrecognized tags)
/// leave the state untouched.
pub fn transition(state: ShiftState, kind: Option<PunchKind>, at: DateTime<Tz>) -> Transition {
    use PunchKind::{BreakEnd, BreakStart, ClockIn, ClockOut};
    use ShiftState::{Idle, OnBreak, Working};

    let (next, effect) = match (state, kind) {
        (Idle, Some(ClockIn)) => (Working { since: at }, Effect::Open),
        (Working { since }, Some(ClockIn)) => (
            Working { since: at },
            Effect::Checkpoint {
                credited: elapsed(since, at),
            },
        ),
        (OnBreak, Some(ClockIn | BreakEnd)) => (Working { since: at }, Effect::Resume),
        (Working { since }, Some(BreakStart)) => (
            OnBreak,
            Effect::Close {
                credited: elapsed(since, at),
            },
        ),
        (Working { since }, Some(ClockOut)) => (
            Idle,
            Effect::Close {
                credited: elapsed(since, at),
            },
        ),
        (Idle | OnBreak, Some(BreakStart))
        | (Idle | Working { .. }, Some(BreakEnd))
        | (Idle | OnBreak, Some(ClockOut))
        | (_, None) => (state, Effect::Ignored),
    };
    Transition { next, effect }
}

/// Accumulator for one reduction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducerState {
    pub state: ShiftState,
    pub accumulated: Duration,
}

impl Default for ReducerState {
    fn default() -> Self {
        Self {
            state: ShiftState::Idle,
            accumulated: Duration::zero(),
        }
    }
}

impl ReducerState {
    /// Feeds one punch through the transition table.
    #[must_use]
    pub fn apply(self, punch: &NormalizedPunch) -> Self {
        let Transition { next, effect } = transition(self.state, punch.kind, punch.at);
        if effect == Effect::Ignored {
            tracing::trace!(
                index = punch.index,
                kind = ?punch.kind,
                at = %punch.at,
                state = ?self.state,
                "ignoring punch"
            );
        }
        Self {
            state: next,
            accumulated: self.accumulated + effect.credited(),
        }
    }

    /// Closes a still-open work interval at `min(now, window.end)`.
    ///
    /// An open break is never credited.
    #[must_use]
    pub fn finish(self, window: &DayWindow, now: DateTime<Utc>) -> Duration {
        match self.state {
            ShiftState::Working { since } => {
                let tail_end = window.close_out(now.with_timezone(&window.tz()));
                self.accumulated + elapsed(since, tail_end)
            }
            ShiftState::Idle | ShiftState::OnBreak => self.accumulated,
        }
    }
}

/// Total worked time for a day's normalized punches.
///
/// `normalized` must be sorted and inside `window` (see [`crate::normalize()`]).
/// `now` is read once by the caller so repeated calls agree.
pub fn reduce(normalized: &[NormalizedPunch], window: &DayWindow, now: DateTime<Utc>) -> Duration {
    normalized
        .iter()
        .fold(ReducerState::default(), ReducerState::apply)
        .finish(window, now)
}
