use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use punch_cli::commands::{export, init, me, recent, record, status, today};
use punch_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(punch_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db =
        punch_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init avoids a panic if tracing is already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    // One instant for the whole invocation so every summary closes at the same time.
    let now = Utc::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Init) => {
            let (_db, config) = open_database(cli.config.as_deref())?;
            init::run(&mut out, &config.database_path)?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut out, &db, &config)?;
        }
        Some(Commands::Record { name, kind, at }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            record::run(
                &mut out,
                &db,
                config.tz()?,
                name,
                kind,
                at.as_deref(),
                now,
            )?;
        }
        Some(Commands::Me { name, days, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            me::run(&mut out, &db, config.tz()?, name, *days, *json, now)?;
        }
        Some(Commands::Today { date, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            today::run(&mut out, &db, config.tz()?, *date, *json, now)?;
        }
        Some(Commands::Recent) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            recent::run(&mut out, &db, config.tz()?, config.recent_limit, now)?;
        }
        Some(Commands::Export { from, to, output }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            export::run(&mut out, &db, config.tz()?, *from, *to, output.as_deref())?;
        }
        None => {
            use clap::CommandFactory;
            writeln!(out, "{}", Cli::command().render_help())?;
        }
    }

    out.flush()?;
    Ok(())
}
