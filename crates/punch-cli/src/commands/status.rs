//! Status command for showing where data lives and how much of it there is.

use std::io::Write;

use anyhow::Result;

use punch_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let users = db.list_users()?;
    let punches = db.punch_count()?;

    writeln!(writer, "Attendance clock status")?;
    writeln!(writer, "Database:  {}", config.database_path.display())?;
    writeln!(writer, "Time zone: {}", config.timezone)?;
    writeln!(writer, "Users:     {}", users.len())?;
    writeln!(writer, "Punches:   {punches}")?;

    Ok(())
}
