use crate::config::LogFormat;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `level`; with a
/// `path` everything goes to that file instead of stdout.
pub fn init_logging(level: &str, format: LogFormat, path: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, ansi) = match path {
        Some(path) => (BoxMakeWriter::new(Arc::new(open_log_file(path)?)), false),
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer).with_ansi(false))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(writer).with_ansi(ansi))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(writer).with_ansi(ansi))
            .try_init(),
    }
    .context("failed to install the log subscriber")?;

    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}
