//! Today command: every user's worked hours for one day.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use punch_core::{DailySummary, SummaryRequest, summarize_many};
use punch_db::{Database, PunchRecord};

use super::util::{day_bounds, format_duration, local_date, punch_list};

/// Summarizes all registered users for `date`, ordered by name.
pub fn collect(
    db: &Database,
    tz: Tz,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<DailySummary<PunchRecord>>> {
    let (start, end) = day_bounds(date, tz);
    let mut requests = Vec::new();
    for user in db.list_users()? {
        let events = db.punches_for_user_in_range(&user.id, start, end)?;
        requests.push(SummaryRequest {
            user: user.name,
            date,
            events,
        });
    }
    Ok(summarize_many(requests, tz, now))
}

pub fn format_summaries(
    date: NaiveDate,
    tz: Tz,
    summaries: &[DailySummary<PunchRecord>],
) -> String {
    let mut output = String::new();
    writeln!(output, "Attendance for {date} ({tz})").unwrap();
    writeln!(output).unwrap();

    if summaries.is_empty() {
        writeln!(output, "No users registered.").unwrap();
        return output;
    }

    let width = summaries
        .iter()
        .map(|s| s.user.as_ref().chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    writeln!(
        output,
        "{:<width$}  {:>6}  {:>7}  PUNCHES",
        "NAME", "HOURS", "BREAKS"
    )
    .unwrap();
    for summary in summaries {
        let breaks = summary
            .breaks
            .iter()
            .fold(Duration::zero(), |acc, b| acc + b.duration());
        writeln!(
            output,
            "{:<width$}  {:>6.2}  {:>7}  {}",
            summary.user.as_ref(),
            summary.worked_hours,
            format_duration(breaks),
            punch_list(&summary.events, tz)
        )
        .unwrap();
    }
    output
}

/// Runs the today command. `date` defaults to the current local date.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    tz: Tz,
    date: Option<NaiveDate>,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let date = date.unwrap_or_else(|| local_date(now, tz));
    let summaries = collect(db, tz, date, now)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summaries)?)?;
    } else {
        write!(writer, "{}", format_summaries(date, tz, &summaries))?;
    }
    Ok(())
}
