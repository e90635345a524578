use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{OutputPaths, TelemetryConfig};

/// Keeps the background writer alive; dropping it flushes `telemetry.jsonl`.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Routes decision, turn and estimate events into a JSON lines file.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(
    telemetry: &TelemetryConfig,
    outputs: &OutputPaths,
) -> Result<Option<LoggingGuard>> {
    if !telemetry.enabled {
        return Ok(None);
    }

    fs::create_dir_all(&outputs.dir)
        .with_context(|| format!("creating output directory at {}", outputs.dir.display()))?;
    let telemetry_path = outputs.telemetry_jsonl.clone();
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(file);

    let level = telemetry.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(writer)
        .finish();

    // A second run in the same process keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}
