//! Me command: one user's worked hours over recent days.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use punch_core::{DailySummary, SummaryRequest, UserName, last_n_days, summarize_many};
use punch_db::{Database, PunchRecord};

use super::util::{day_bounds, format_duration, local_date, punch_list};

/// Builds summaries for `name` over the last `days` days, newest first.
pub fn collect(
    db: &Database,
    tz: Tz,
    name: &str,
    days: u32,
    now: DateTime<Utc>,
) -> Result<Vec<DailySummary<PunchRecord>>> {
    let name = UserName::new(name).context("invalid user name")?;
    let Some(user) = db.find_user(&name)? else {
        anyhow::bail!("unknown user: {name}");
    };

    let mut requests = Vec::new();
    for date in last_n_days(local_date(now, tz), days) {
        let (start, end) = day_bounds(date, tz);
        let events = db.punches_for_user_in_range(&user.id, start, end)?;
        requests.push(SummaryRequest {
            user: user.name.clone(),
            date,
            events,
        });
    }
    Ok(summarize_many(requests, tz, now))
}

/// Formats the per-day table.
pub fn format_summaries(name: &str, tz: Tz, summaries: &[DailySummary<PunchRecord>]) -> String {
    let mut output = String::new();
    writeln!(output, "Worked hours for {name} ({tz})").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "{:<10}  {:>6}  {:>7}  PUNCHES", "DATE", "HOURS", "BREAKS").unwrap();

    let mut total = Duration::zero();
    for summary in summaries {
        total += summary.worked;
        let breaks = summary
            .breaks
            .iter()
            .fold(Duration::zero(), |acc, b| acc + b.duration());
        writeln!(
            output,
            "{:<10}  {:>6.2}  {:>7}  {}",
            summary.date.format("%Y-%m-%d").to_string(),
            summary.worked_hours,
            format_duration(breaks),
            punch_list(&summary.events, tz)
        )
        .unwrap();
    }
    writeln!(output).unwrap();
    writeln!(
        output,
        "Total: {:.2}h over {} days",
        punch_core::round_hours(total),
        summaries.len()
    )
    .unwrap();
    output
}

/// Runs the me command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    tz: Tz,
    name: &str,
    days: u32,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let summaries = collect(db, tz, name, days, now)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summaries)?)?;
    } else {
        let name = summaries
            .first()
            .map_or_else(|| name.trim().to_string(), |s| s.user.to_string());
        write!(writer, "{}", format_summaries(&name, tz, &summaries))?;
    }
    Ok(())
}
