use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Keeps the structured log writer flushing until dropped.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Installs the global subscriber: warnings and errors on stderr, plus JSON
/// lines in `telemetry.jsonl` beside the summary when structured logging is on.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    if !logging.enable_structured {
        let subscriber = tracing_subscriber::registry().with(stderr_layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
        return Ok(None);
    }

    let telemetry_dir = outputs.summary_dir();
    fs::create_dir_all(&telemetry_dir).with_context(|| {
        format!(
            "creating telemetry directory at {}",
            telemetry_dir.display()
        )
    })?;

    let telemetry_path = telemetry_dir.join("telemetry.jsonl");
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .with_filter(filter);

    let subscriber = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer);

    // A subscriber may already be installed (integration tests).
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::event!(
        target: "kolkhoz_bench::logging",
        Level::INFO,
        run_id,
        path = %telemetry_path.display(),
        "structured logging enabled"
    );

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}
