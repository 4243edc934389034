//! Export command: raw punches as CSV for spreadsheet tools.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use punch_db::Database;

use super::util::{day_bounds, format_local};

/// Byte order mark so spreadsheet tools detect UTF-8 names.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes punches for every day in `from..=to` to `writer`, returning the row count.
///
/// Swapped bounds are accepted. Rows are grouped by local day, oldest first.
pub fn write_csv<W: Write>(
    mut writer: W,
    db: &Database,
    tz: Tz,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<usize> {
    let (from, to) = if from > to { (to, from) } else { (from, to) };

    writer.write_all(UTF8_BOM)?;
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["date", "name", "kind", "timestamp"])?;

    let mut count = 0;
    for date in from.iter_days().take_while(|d| *d <= to) {
        let (start, end) = day_bounds(date, tz);
        let date = date.format("%Y-%m-%d").to_string();
        for named in db.punches_in_range(start, end)? {
            csv.write_record([
                date.as_str(),
                named.user.as_ref(),
                named.punch.kind.as_str(),
                format_local(named.punch.timestamp, tz, "%Y-%m-%d %H:%M:%S").as_str(),
            ])?;
            count += 1;
        }
    }
    csv.flush()?;

    tracing::debug!(%from, %to, count, "exported punches");
    Ok(count)
}

pub fn default_file_name(from: NaiveDate, to: NaiveDate) -> String {
    format!("attendance_{from}_{to}.csv")
}

/// Runs the export command.
///
/// Without `output` the CSV goes to `writer`. A directory output receives
/// a file named after the date range.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    tz: Tz,
    from: NaiveDate,
    to: NaiveDate,
    output: Option<&Path>,
) -> Result<()> {
    let Some(output) = output else {
        write_csv(writer, db, tz, from, to)?;
        return Ok(());
    };

    let path: PathBuf = if output.is_dir() {
        output.join(default_file_name(from.min(to), from.max(to)))
    } else {
        output.to_path_buf()
    };
    let file = File::create(&path)
        .with_context(|| format!("failed to create export file: {}", path.display()))?;
    let count = write_csv(file, db, tz, from, to)?;
    writeln!(writer, "Exported {count} punches to {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Asia::Tokyo;
    use punch_core::{PunchKind, UserName};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn tokyo(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Tokyo
            .with_ymd_and_hms(2025, 1, d, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        let tanaka = db.ensure_user(&UserName::new("田中").unwrap()).unwrap();
        let sato = db.ensure_user(&UserName::new("sato").unwrap()).unwrap();
        db.insert_punch(&tanaka, PunchKind::ClockIn, tokyo(14, 9, 0)).unwrap();
        db.insert_punch(&sato, PunchKind::ClockIn, tokyo(14, 8, 30)).unwrap();
        db.insert_punch(&tanaka, PunchKind::ClockOut, tokyo(15, 18, 0)).unwrap();
        db.insert_punch(&sato, PunchKind::ClockOut, tokyo(20, 18, 0)).unwrap();
        db
    }

    #[test]
    fn writes_bom_header_and_rows_by_day() {
        let db = seeded();
        let mut buffer = Vec::new();
        let count = write_csv(&mut buffer, &db, Tokyo, date(14), date(15)).unwrap();
        assert_eq!(count, 3);
        assert!(buffer.starts_with(UTF8_BOM));

        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text,
            "date,name,kind,timestamp\n\
             2025-01-14,sato,in,2025-01-14 08:30:00\n\
             2025-01-14,田中,in,2025-01-14 09:00:00\n\
             2025-01-15,田中,out,2025-01-15 18:00:00\n"
        );
    }

    #[test]
    fn swapped_range_is_accepted() {
        let db = seeded();
        let count = write_csv(Vec::new(), &db, Tokyo, date(20), date(14)).unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn writes_into_directory_with_default_name() {
        let db = seeded();
        let temp = tempfile::tempdir().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, Tokyo, date(15), date(14), Some(temp.path())).unwrap();

        let expected = temp.path().join("attendance_2025-01-14_2025-01-15.csv");
        assert!(expected.exists());
        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            format!("Exported 3 punches to {}\n", expected.display())
        );
    }

    #[test]
    fn without_output_writes_csv_to_writer() {
        let db = seeded();
        let mut output = Vec::new();
        run(&mut output, &db, Tokyo, date(20), date(20), None).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("2025-01-20,sato,out,2025-01-20 18:00:00\n"));
    }
}
