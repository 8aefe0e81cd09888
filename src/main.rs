//! csvload - Batch CSV loader with type inference

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use csvload::config::{Config, OutputFormat, DEFAULT_DATABASE, DEFAULT_TABLE_NAME};
use csvload::output::{render_to_stdout, TerminalOutput};
use csvload::pipeline::Pipeline;
use csvload::sink::SqliteSink;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Clean a CSV file and load it into a SQLite table
#[derive(Parser, Debug)]
#[command(name = "csvload")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Delimited input file (.csv, .tsv, .txt)
    #[arg(env = "CSV_FILE")]
    input_file: PathBuf,

    /// Destination table name
    #[arg(short, long, env = "TABLE_NAME", default_value = DEFAULT_TABLE_NAME)]
    table: String,

    /// SQLite database file receiving the table
    #[arg(short, long, env = "DB_PATH", default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    /// Field delimiter, overriding the one implied by the file extension
    #[arg(long)]
    delimiter: Option<char>,

    /// Values sampled per column for type inference
    #[arg(long, default_value_t = csvload::config::DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,

    /// Seed for type-inference sampling
    #[arg(long, default_value_t = csvload::config::DEFAULT_SEED)]
    seed: u64,

    /// Report format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Clean and report without writing to the database
    #[arg(long)]
    no_load: bool,

    /// Log filter (e.g. "debug", "csvload=info"); RUST_LOG takes precedence
    #[arg(long, default_value = "csvload=info")]
    log_level: String,
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1), // Pipeline failed
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::new(cli.input_file)
        .with_table_name(cli.table)
        .with_database(cli.database)
        .with_sample_size(cli.sample_size)
        .with_seed(cli.seed)
        .with_output_format(cli.format.into())
        .with_dry_run(cli.no_load);

    if let Some(delimiter) = cli.delimiter {
        if !delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
        }
        config = config.with_delimiter(delimiter as u8);
    }

    if config.sample_size == 0 {
        bail!("--sample-size must be at least 1");
    }

    // dry runs stop before the load step
    let sink = if config.dry_run {
        SqliteSink::open_in_memory()
    } else {
        SqliteSink::open(&config.database)
    };
    let mut sink = match sink {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!("ETL pipeline failed: {}", e);
            return Ok(false);
        }
    };

    let pipeline = Pipeline::new(config.clone());
    let outcome = pipeline.run(&mut sink);

    if let (Some(report), Some(table)) = (&outcome.report, &outcome.table) {
        render_to_stdout(report, table, &config.input_file, config.output_format)?;
    }

    if config.output_format == OutputFormat::Terminal && !(config.dry_run && outcome.success) {
        TerminalOutput::new().write_status(
            outcome.success,
            outcome.rows_loaded,
            &config.table_name,
        )?;
    }

    Ok(outcome.success)
}
