//! `cyclelog` command-line entry point.
//!
//! # Responsibility
//! - Drive the ledger service against one SQLite file per invocation.
//! - Render results as text, or as JSON with `--json`.

mod args;
mod output;

use args::{Cli, Command};
use clap::Parser;
use cyclelog_core::db::{open_db, DbError};
use cyclelog_core::{
    core_version, init_logging, Clock, CoreConfig, FixedClock, LedgerService, ServiceError,
    SystemClock,
};
use log::info;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Debug)]
enum CliError {
    Db(DbError),
    Service(ServiceError),
    Io(io::Error),
    Json(serde_json::Error),
    Inconsistent(usize),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Json(err) => write!(f, "json: {err}"),
            Self::Inconsistent(count) => write!(f, "{count} inconsistent cycle length(s)"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<io::Error> for CliError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CoreConfig::from_env();
    start_logging(&config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(cli, &config, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(config: &CoreConfig) {
    let Some(log_dir) = config.log_dir.as_deref() else {
        return;
    };
    if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn run(cli: Cli, config: &CoreConfig, out: &mut dyn Write) -> Result<(), CliError> {
    let Cli {
        db,
        today,
        json,
        command,
    } = cli;
    if command == Command::Version {
        return Ok(writeln!(out, "cyclelog {}", core_version())?);
    }

    let conn = open_db(db.as_ref().unwrap_or(&config.db_path))?;
    match today {
        Some(day) => execute(
            &LedgerService::new(&conn, FixedClock::at_day(day)),
            command,
            json,
            out,
        ),
        None => execute(&LedgerService::new(&conn, SystemClock), command, json, out),
    }
}

fn execute<C: Clock>(
    service: &LedgerService<'_, C>,
    command: Command,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&command)
    );

    match command {
        Command::Add { date, notes } => {
            let entry = service.add_entry(date, notes)?;
            emit(out, json, &entry, |out| output::added(out, &entry))
        }
        Command::Delete { ids } => {
            let plan = service.delete_entries(&ids)?;
            emit(out, json, &plan, |out| output::deleted(out, &plan))
        }
        Command::List => {
            let entries = service.snapshot()?.into_entries();
            emit(out, json, &entries, |out| output::entries(out, &entries))
        }
        Command::Recent { limit } => {
            let entries = service.recent(limit)?;
            emit(out, json, &entries, |out| output::entries(out, &entries))
        }
        Command::Series { limit } => {
            let series = service.cycle_series(limit)?;
            emit(out, json, &series, |out| output::series(out, &series))
        }
        Command::Import { path, dry_run } => {
            let text = std::fs::read_to_string(&path)?;
            if dry_run {
                let preview = service.preview_import(&text)?;
                emit(out, json, &preview, |out| output::preview(out, &preview))
            } else {
                let outcome = service.import_text(&text)?;
                emit(out, json, &outcome, |out| output::imported(out, &outcome))
            }
        }
        Command::Export { path } => {
            let text = service.export_text()?;
            match path {
                Some(path) => Ok(std::fs::write(path, text)?),
                None => Ok(out.write_all(text.as_bytes())?),
            }
        }
        Command::Forecast => {
            let forecast = service.forecast()?;
            emit(out, json, &forecast, |out| {
                output::forecast(out, forecast.as_ref())
            })
        }
        Command::Stats => {
            let stats = service.statistics()?;
            emit(out, json, &stats, |out| output::statistics(out, stats.as_ref()))
        }
        Command::Check => {
            let violations = service.check()?;
            emit(out, json, &violations, |out| {
                output::violations(out, &violations)
            })?;
            if violations.is_empty() {
                Ok(())
            } else {
                Err(CliError::Inconsistent(violations.len()))
            }
        }
        Command::Version => Ok(writeln!(out, "cyclelog {}", core_version())?),
    }
}

fn emit<T: Serialize + ?Sized>(
    out: &mut dyn Write,
    json: bool,
    value: &T,
    human: impl FnOnce(&mut dyn Write) -> io::Result<()>,
) -> Result<(), CliError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
    } else {
        human(out)?;
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Add { .. } => "add",
        Command::Delete { .. } => "delete",
        Command::List => "list",
        Command::Recent { .. } => "recent",
        Command::Series { .. } => "series",
        Command::Import { dry_run: true, .. } => "import_preview",
        Command::Import { .. } => "import",
        Command::Export { .. } => "export",
        Command::Forecast => "forecast",
        Command::Stats => "stats",
        Command::Check => "check",
        Command::Version => "version",
    }
}
