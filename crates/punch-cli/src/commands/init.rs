//! Init command for creating the database.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

/// Runs the init command. The database is created when it is opened.
pub fn run<W: Write>(writer: &mut W, database_path: &Path) -> Result<()> {
    writeln!(writer, "Database ready: {}", database_path.display())?;
    Ok(())
}
