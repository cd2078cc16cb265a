//! Tollway - Main Entry Point

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use storage::{CsvSink, HistorySink, JsonSink};
use tollway::logging::parse_level;
use tollway::{init_logging, AppConfig, OutputFormat, Pipeline, ReplayScript};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "tollway", about = "Lane-aware vehicle toll accounting from recorded detections")]
struct Cli {
    /// Replay script with recorded segments, detections and tracks
    #[arg(long)]
    script: PathBuf,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for history exports
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Export format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json_logs;

    init_logging(parse_level(&config.logging.level), config.logging.json);
    info!("=== Tollway v{} ===", env!("CARGO_PKG_VERSION"));

    let script = ReplayScript::load(&cli.script).context("loading replay script")?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing current frame");
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    let sink: Box<dyn HistorySink + Send> = match config.output.format {
        OutputFormat::Csv => Box::new(CsvSink::new(&config.output.dir)),
        OutputFormat::Json => Box::new(JsonSink::new(&config.output.dir)),
    };

    // Billed history is flushed even when a collaborator fails mid-run
    let summary = tokio::task::spawn_blocking(move || {
        let mut pipeline = Pipeline::new(&config, script.into_collaborators())?;
        pipeline.run_and_flush(&stop, sink.as_ref())
    })
    .await
    .context("pipeline task panicked")?
    .context("running toll pipeline")?;

    info!(
        "Processed {} frames, billed {} vehicles{}",
        summary.frames,
        summary.billed,
        if summary.stopped { " (stopped early)" } else { "" }
    );

    Ok(())
}
