//! Grid aggregator CLI.
//!
//! Runs the temporal aggregation engine over one tile buffer (a JSON array of
//! integers) and writes the resulting feature collections as JSON.

mod input;

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use temporal_grid::{aggregate, AggregatedTile, AggregationConfig};

#[derive(Parser, Debug)]
#[command(name = "grid-aggregator")]
#[command(about = "Aggregate a heatmap tile buffer into GeoJSON features")]
struct Args {
    /// Tile buffer: a JSON array of unsigned integers ("-" reads stdin)
    #[arg(short, long)]
    input: String,

    /// JSON file with aggregation parameters (camelCase keys)
    #[arg(short, long, env = "GRID_AGGREGATOR_PARAMS")]
    params: Option<PathBuf>,

    /// Parameter override as key=value, e.g. --param delta=31 (repeatable)
    #[arg(long = "param", value_parser = input::parse_key_val)]
    param: Vec<(String, String)>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "GRID_AGGREGATOR_JSON_LOGS")]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Stdout carries the output JSON.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn write_output(tile: &AggregatedTile, output: Option<&PathBuf>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(tile)?
    } else {
        serde_json::to_string(tile)?
    };

    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write output {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let params = input::load_params(args.params.as_deref(), &args.param)?;
    let config = AggregationConfig::try_from(params).context("Invalid aggregation parameters")?;
    let buffer = input::read_buffer(&args.input)?;

    let start = Instant::now();
    let tile = aggregate(&buffer, &config).with_context(|| {
        format!("Failed to aggregate tile {} from {}", config.tile(), args.input)
    })?;

    info!(
        tile = %config.tile(),
        mode = %config.mode().kind(),
        delta = config.delta(),
        buffer_len = buffer.len(),
        features = tile.len(),
        interactive = tile.interactive.is_some(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Aggregated tile"
    );

    write_output(&tile, args.output.as_ref(), args.pretty)
}
