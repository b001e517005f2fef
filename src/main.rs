//! Frontline CLI
//!
//! Command-line interface for territorial-control metrics:
//! - Compute a metric over a date window
//! - Show summary statistics
//! - Look up a snapshot description
//! - Generate a default config file

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frontline::config::{generate_default_config, Config, LoggingConfig, SourceKind};
use frontline::query::{MetricExecutor, MetricRequest, MetricResult};
use frontline::report::{describe, ResultTable, SummaryStats};
use frontline::series::RawRow;
use frontline::source::{
    create_file, CsvRowSource, CsvSink, JsonSink, ResultSink, RowSource, SnapshotSource, TextSink,
};

#[derive(Parser)]
#[command(name = "frontline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Territorial-control metrics over daily, weekly and monthly windows")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, csv)
    #[arg(short, long, global = true)]
    pub format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute a metric over a date window
    Compute {
        /// Window start (YYYY-MM-DD or DD.MM.YYYY, default: first record)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Window end (YYYY-MM-DD or DD.MM.YYYY, default: latest record)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        /// Daily, Weekly, Monthly, "Last 30 days" or "23.02.2022 to date"
        #[arg(short, long)]
        granularity: Option<String>,
        /// "Pace of change", "Area change", "Average pace" or "Top 5 Changes"
        #[arg(short, long)]
        metric: Option<String>,
        /// Raw rows (CSV export or JSON history export)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print a one-line description of the result
        #[arg(long)]
        describe: bool,
    },

    /// Show headline statistics of the whole series
    Summary {
        /// Raw rows (CSV export or JSON history export)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the English description of a snapshot in a JSON history export
    Describe {
        /// Snapshot id
        id: String,
        /// JSON history export (default: source.path from the config)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging)?;

    let format = cli
        .format
        .clone()
        .unwrap_or_else(|| config.output.format.clone())
        .to_lowercase();

    match cli.command {
        Commands::Compute {
            from,
            to,
            granularity,
            metric,
            input,
            output,
            describe: with_description,
        } => {
            let rows = read_rows(&config, input.as_deref())?;
            let executor = MetricExecutor::from_rows(&rows);

            let (first, last) = match (executor.series().first(), executor.series().last()) {
                (Some(first), Some(last)) => (first.day(), last.day()),
                _ => bail!("No raw data available"),
            };

            let request = MetricRequest::parse(
                from.unwrap_or(first),
                to.unwrap_or(last),
                granularity.as_deref().unwrap_or(&config.query.granularity),
                metric.as_deref().unwrap_or(&config.query.metric),
            )?;
            tracing::info!(
                metric = %request.metric,
                granularity = %request.granularity,
                from = %request.from,
                to = %request.to,
                "computing metric"
            );

            let result = executor.execute(&request)?;
            let description = if with_description {
                Some(describe(&result)?)
            } else {
                None
            };

            let output = output.or_else(|| config.output.path.as_ref().map(PathBuf::from));
            write_result(&result, description, &format, output.as_deref())?;
        }

        Commands::Summary { input } => {
            let rows = read_rows(&config, input.as_deref())?;
            let executor = MetricExecutor::from_rows(&rows);
            let stats = SummaryStats::from_records(executor.series())?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Summary as of {}", stats.as_of.format("%d.%m.%Y"));
                for [label, value] in stats.rows() {
                    println!("  {:<42} {}", label, value);
                }
            }
        }

        Commands::Describe { id, input } => {
            let path = input_path(&config, input.as_deref())?;
            let description = SnapshotSource::from_path(&path)
                .description_for(&id)
                .with_context(|| format!("reading snapshots from {}", path.display()))?;
            println!("{}", description.as_deref().unwrap_or("Description not found."));
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("frontline={}", config.level).into());

    // Results go to stdout, so logs default to stderr
    let writer = match &config.file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let registry = tracing_subscriber::registry().with(filter);
    if config.format.eq_ignore_ascii_case("json") {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
    Ok(())
}

fn input_path(config: &Config, input: Option<&Path>) -> anyhow::Result<PathBuf> {
    match (input, config.source.path.as_deref()) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, Some(path)) => Ok(PathBuf::from(path)),
        (None, None) => bail!("No input given: pass --input or set source.path in the config"),
    }
}

fn read_rows(config: &Config, input: Option<&Path>) -> anyhow::Result<Vec<RawRow>> {
    let path = input_path(config, input)?;

    let mut source: Box<dyn RowSource> = match config.source.resolved_kind(&path) {
        SourceKind::Csv => {
            Box::new(CsvRowSource::from_path(&path).with_header(config.source.has_header))
        }
        SourceKind::Json => Box::new(SnapshotSource::from_path(&path)),
    };

    let rows = source
        .read_rows()
        .with_context(|| format!("reading {} rows from {}", source.name(), path.display()))?;
    tracing::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn write_result(
    result: &MetricResult,
    description: Option<String>,
    format: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let table = ResultTable::from_result(result);

    let mut sink: Box<dyn ResultSink> = match format {
        "csv" => Box::new(CsvSink::new(open_output(output)?)),
        "json" => {
            let mut sink = JsonSink::new(open_output(output)?)
                .with_field("metric", result.metric.to_string())
                .with_field("granularity", result.granularity().to_string())
                .with_field("from", result.window.from_date().to_string())
                .with_field("to", result.window.to_date().to_string())
                .with_field("generated_at", Local::now().to_rfc3339());
            if let Some(description) = description {
                sink = sink.with_field("description", description);
            }
            Box::new(sink)
        }
        "table" => {
            let mut sink = TextSink::new(open_output(output)?);
            if let Some(description) = description {
                sink = sink.with_footer(description);
            }
            Box::new(sink.with_footer(format!(
                "Last updated: {}",
                Local::now().format("%d.%m.%Y %H:%M:%S")
            )))
        }
        other => bail!("Unknown output format: {}. Use: table, csv, json", other),
    };

    sink.write_table(&table)?;
    if let Some(path) = output {
        println!("Result written to {:?}", path);
    }
    Ok(())
}

fn open_output(output: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(create_file(path)?),
        None => Box::new(std::io::stdout()),
    };
    Ok(writer)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .map_err(|_| format!("Invalid date: {}. Use YYYY-MM-DD or DD.MM.YYYY", s))
}
