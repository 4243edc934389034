//! Core domain logic for the attendance clock.
//!
//! This crate turns one user's punches for one calendar day into a worked
//! total, tolerating missing, duplicated and out-of-order punches:
//! - Window: resolving a date and time zone into `[start, end)`
//! - Normalize: clamping punches into the window and ordering them
//! - Reducer: the idle/working/on-break state machine that accumulates time

mod breaks;
pub mod event;
pub mod kind;
pub mod normalize;
pub mod reducer;
mod summary;
pub mod types;
pub mod window;

pub use breaks::{BreakInterval, break_intervals};
pub use event::{Punch, PunchLike, PunchTime};
pub use kind::{PunchKind, UnknownPunchKind};
pub use normalize::{NormalizedPunch, normalize};
pub use reducer::{ReducerState, ShiftState, reduce};
pub use summary::{
    DailySummary, SummaryRequest, last_n_days, round_hours, summarize, summarize_many,
};
pub use types::{UserName, ValidationError};
pub use window::DayWindow;

pub use chrono_tz::Tz;
