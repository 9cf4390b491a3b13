use anyhow::Context;
use std::io;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "monitor";
const LOG_RETENTION_DAYS: usize = 7;

pub(crate) struct LogOptions {
    pub(crate) dir: PathBuf,
    pub(crate) to_stderr: bool,
    /// The full-screen UI owns the terminal, so stderr output is dropped there.
    pub(crate) interactive: bool,
}

pub(crate) fn init_tracing(
    options: &LogOptions,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(&options.dir)
        .with_context(|| format!("failed to create log dir {}", options.dir.display()))?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(LOG_RETENTION_DAYS)
        .build(&options.dir)
        .context("failed to open log file")?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_target(false)
        .json();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if options.to_stderr && !options.interactive {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .compact();
        registry.with(stderr_layer).init();
    } else {
        registry.init();
    }

    Ok(file_guard)
}
