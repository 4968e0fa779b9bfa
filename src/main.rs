use clap::Parser;
use sqlbatch::batch::{BatchRunner, ReportOptions};
use sqlbatch::config::{resolve_config, Config};
use sqlbatch::core::db::{Database, MEMORY_TARGET};
use sqlbatch::core::{BatchError, Result};
use sqlbatch::results_grid::OutputFormat;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "sqlbatch", version)]
#[command(about = "Run every statement of a SQL file against SQLite, reporting each outcome", long_about = None)]
struct Args {
    /// SQL file holding `;`-separated statements
    sql_file: PathBuf,

    /// SQLite database file, or :memory:
    #[arg(short, long)]
    database: Option<String>,

    /// Output format for result sets (table, csv, json, markdown)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Show at most this many rows per result set in table format
    #[arg(long)]
    max_rows: Option<usize>,

    /// Configuration file (defaults to <config dir>/sqlbatch/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sqlbatch: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    init_logging(&config, args.verbose)?;

    info!("Starting sqlbatch...");

    let sql = fs::read_to_string(&args.sql_file).map_err(|e| {
        BatchError::Io(io::Error::new(
            e.kind(),
            format!("{}: {}", args.sql_file.display(), e),
        ))
    })?;

    let target = args
        .database
        .or_else(|| config.database.path.clone())
        .unwrap_or_else(|| MEMORY_TARGET.to_string());
    let database = Database::open(&target, &config.database.pragmas)?;

    let options = ReportOptions {
        format: args.format.unwrap_or(config.output.format),
        max_rows: args.max_rows.or(config.output.max_rows),
    };
    let source = args.sql_file.display().to_string();

    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        BatchRunner::new(&database).run_and_report(&source, &sql, &mut out, options)?;
        out.flush()?;
    }

    database.close()
}

/// Installs the stderr subscriber; stdout carries only the report.
fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let from_flags = match verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let level = config.logging.level_filter()?.max(from_flags);

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
    Ok(())
}
