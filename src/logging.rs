use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_STDOUT_FILTER: &str = "info,db_query=warn,web_request=info,sqlx=off";
const DEFAULT_FILE_FILTER: &str = "info,db_query=debug,listing=debug,refresh=debug,sqlx=warn";

/// Installs the global subscriber: stdout plus a daily rolling file under
/// `log_dir`. `RUST_LOG` replaces the stdout filter. Keep the returned guard
/// alive until shutdown so buffered file output is flushed.
pub fn configure_logging(log_dir: &str) -> WorkerGuard {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_STDOUT_FILTER));

    // Stdout log configuration
    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(stdout_filter);

    // File log configuration
    let file_appender = rolling::daily(log_dir, "newsroom.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new(DEFAULT_FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();

    guard
}
