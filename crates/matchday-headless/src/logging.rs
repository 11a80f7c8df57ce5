use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use matchday_core::config::{AppConfig, LoggingConfig};

/// Install the global subscriber: stderr plus an optional daily log file.
///
/// `RUST_LOG` overrides the configured filter. Keep the returned guard alive
/// until exit or buffered file lines are lost.
pub fn init(config: &LoggingConfig, verbose: bool) -> Option<WorkerGuard> {
    let filter = if verbose {
        EnvFilter::new("matchday=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
    };

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if !config.file {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(AppConfig::log_dir(), "matchday.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Some(guard)
}
