use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with file and console logging
///
/// - Console (stdout): filtered by `RUST_LOG`, `info` when unset
/// - File: `<log_dir>/skillset.log.<date>`, rotated daily, DEBUG and above
///
/// The returned WorkerGuard owns the non-blocking file writer. Keep it alive
/// for the whole program; dropping it flushes buffered lines.
pub fn init_tracing(log_dir: &str) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = rolling::daily(log_dir, "skillset.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug"));

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(log_dir, "Tracing initialized (console=RUST_LOG, file=DEBUG+)");

    guard
}
