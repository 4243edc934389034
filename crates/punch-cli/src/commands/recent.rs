//! Recent command: today's latest punches across all users.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use punch_db::Database;

use super::util::{day_bounds, format_local, local_date};

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    tz: Tz,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<()> {
    let (start, end) = day_bounds(local_date(now, tz), tz);
    let punches = db.recent_punches(start, end, limit)?;

    if punches.is_empty() {
        writeln!(writer, "No punches recorded today.")?;
        return Ok(());
    }

    for named in punches {
        writeln!(
            writer,
            "{}  {}  {}",
            format_local(named.punch.timestamp, tz, "%H:%M:%S"),
            named.user,
            named.punch.kind
        )?;
    }
    Ok(())
}
