//! CLI entry point for the parking hotspots tool.
//!
//! Provides subcommands for running the hotspot pipeline over a violations
//! export, inspecting the resulting artifacts, and showing a run's manifest.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parking_hotspots::hotspots::pipeline::run_pipeline;
use parking_hotspots::hotspots::types::RunManifest;
use parking_hotspots::hotspots::writetos3::S3Sink;
use parking_hotspots::output::{ArtifactSink, LocalDirSink, MANIFEST_FILE, print_json};
use parking_hotspots::report::{ArtifactReader, map_midpoint, sorted_locations};
use parking_hotspots::{CoordinatePolicy, PipelineConfig, Threshold};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "parking_hotspots")]
#[command(about = "Find parking-ticket hotspots by total fines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a violations export and write the hotspot artifacts
    Run {
        /// Path or URL of the violations CSV
        #[arg(short, long, value_name = "FILE_OR_URL", default_value = "cache/final_cuse_parking_violations.csv")]
        input: String,

        /// Directory to write artifacts to
        #[arg(short, long, default_value = "cache")]
        output_dir: String,

        /// Minimum total fines for a location to qualify
        #[arg(short, long, default_value_t = Threshold::DEFAULT)]
        threshold: Threshold,

        /// Fail if records for one location disagree on coordinates
        #[arg(long, default_value_t = false)]
        strict_coordinates: bool,

        /// Optional: S3 bucket to upload artifacts to instead of writing locally
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Key prefix for uploaded artifacts
        #[arg(long, default_value = "hotspots")]
        s3_prefix: String,

        /// Gzip compress artifacts before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Show hotspot breakdowns from previously written artifacts
    Report {
        /// Directory containing the artifacts
        #[arg(short, long, default_value = "cache")]
        output_dir: String,

        /// Location to break down (repeatable); lists all hotspots when omitted
        #[arg(short, long)]
        location: Vec<String>,
    },
    /// Print the manifest of the last run
    Summary {
        /// Directory containing the artifacts
        #[arg(short, long, default_value = "cache")]
        output_dir: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/parking_hotspots.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("parking_hotspots.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            threshold,
            strict_coordinates,
            s3_bucket,
            s3_prefix,
            gzip,
        } => {
            let config = PipelineConfig {
                threshold,
                coordinates: if strict_coordinates {
                    CoordinatePolicy::Strict
                } else {
                    CoordinatePolicy::FirstOccurrence
                },
            };

            let sink: Box<dyn ArtifactSink> = match s3_bucket {
                Some(bucket) => {
                    info!(bucket = %bucket, prefix = %s3_prefix, gzip, "S3 upload enabled");
                    Box::new(S3Sink::from_env(&bucket, &s3_prefix, gzip).await)
                }
                None => Box::new(LocalDirSink::new(&output_dir)),
            };

            let manifest = run_pipeline(&input, &config, sink.as_ref()).await?;
            info!(
                hotspots = manifest.location_summary_rows,
                tickets = manifest.filtered_ticket_rows,
                "Run complete"
            );
        }
        Commands::Report {
            output_dir,
            location,
        } => {
            report(&output_dir, &location)?;
        }
        Commands::Summary { output_dir } => {
            let path = Path::new(&output_dir).join(MANIFEST_FILE);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let manifest: RunManifest = serde_json::from_str(&content)?;
            print_json(&manifest)?;
        }
    }

    Ok(())
}

/// Logs per-location breakdowns, or the hotspot list and map midpoint when
/// no location is given.
#[tracing::instrument(skip(locations))]
fn report(output_dir: &str, locations: &[String]) -> Result<()> {
    let mut reader = ArtifactReader::new(output_dir);

    if locations.is_empty() {
        let summaries = reader.summaries()?;
        let mappable = reader.mappable()?;

        match map_midpoint(&mappable) {
            Some((lat, lon)) => info!(lat, lon, "Map midpoint"),
            None => warn!("No hotspot has coordinates"),
        }

        for name in sorted_locations(&summaries) {
            info!(location = name, "Hotspot");
        }
        info!(total = summaries.len(), "Hotspot list complete");
        return Ok(());
    }

    for location in locations {
        let report = reader.location_report(location)?;
        info!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
