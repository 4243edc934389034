//! Record command: one press of the clock terminal.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use punch_core::{PunchKind, UserName};
use punch_db::{Database, PunchRecord};

use super::util::{format_local, local_date, parse_datetime};

/// Validates and stores a punch, then confirms it on `writer`.
///
/// Unlike the reducer, recording is strict: unknown kinds are rejected here.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    tz: Tz,
    name: &str,
    kind: &str,
    at: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PunchRecord> {
    let name = UserName::new(name).context("invalid user name")?;
    let kind: PunchKind = kind.parse()?;
    let at = match at {
        Some(s) => parse_datetime(s, tz, now)?,
        None => now,
    };

    let user = db.ensure_user(&name)?;
    let record = db.insert_punch(&user, kind, at)?;

    let when = if local_date(at, tz) == local_date(now, tz) {
        format_local(at, tz, "%H:%M:%S")
    } else {
        format_local(at, tz, "%Y-%m-%d %H:%M:%S")
    };
    writeln!(writer, "Recorded {kind} for {name} ({when})")?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Asia::Tokyo;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 3, 4, 5).unwrap()
    }

    fn record(db: &Database, name: &str, kind: &str, at: Option<&str>) -> Result<String> {
        let mut output = Vec::new();
        run(&mut output, db, Tokyo, name, kind, at, now())?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn records_at_now_by_default() {
        let db = Database::open_in_memory().unwrap();
        let output = record(&db, " tanaka ", "in", None).unwrap();
        assert_eq!(output, "Recorded in for tanaka (12:04:05)\n");

        let user = db
            .find_user(&UserName::new("tanaka").unwrap())
            .unwrap()
            .unwrap();
        let (start, end) = (now() - Duration::hours(1), now() + Duration::hours(1));
        let punches = db
            .punches_for_user_in_range(&user.id, start, end)
            .unwrap();
        assert_eq!(punches.len(), 1);
        assert_eq!(punches[0].timestamp, now());
        assert_eq!(punches[0].kind, "in");
    }

    #[test]
    fn accepts_aliases_and_stores_canonical_tag() {
        let db = Database::open_in_memory().unwrap();
        record(&db, "sato", "break_start", None).unwrap();
        assert_eq!(db.punch_count().unwrap(), 1);
        let (start, end) = (now() - Duration::hours(1), now() + Duration::hours(1));
        let punches = db.punches_in_range(start, end).unwrap();
        assert_eq!(punches[0].punch.kind, "break_in");
    }

    #[test]
    fn backdated_punch_on_another_day_shows_date() {
        let db = Database::open_in_memory().unwrap();
        let output = record(&db, "ito", "out", Some("2025-01-14 18:30")).unwrap();
        assert_eq!(output, "Recorded out for ito (2025-01-14 18:30:00)\n");
    }

    #[test]
    fn rejects_unknown_kind_without_writing() {
        let db = Database::open_in_memory().unwrap();
        let err = record(&db, "tanaka", "lunch", None).unwrap_err();
        assert!(err.to_string().contains("unknown punch kind: lunch"));
        assert_eq!(db.punch_count().unwrap(), 0);
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn rejects_blank_name() {
        let db = Database::open_in_memory().unwrap();
        let err = record(&db, "   ", "in", None).unwrap_err();
        assert!(err.to_string().contains("invalid user name"));
    }
}
