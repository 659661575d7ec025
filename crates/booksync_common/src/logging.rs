//! Logging setup shared by every booksync binary.
//!
//! Installs a `tracing` subscriber with an env filter, a stdout formatter and,
//! when a log directory is configured, a daily rolling file writer.

use booksync_config::LoggingConfig;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber from the logging section of the config.
///
/// `RUST_LOG` is honoured; on top of it a `booksync=<level>` directive is added for
/// all booksync crates. Returns the file writer guard, which must be kept alive for
/// as long as file logging is wanted. Calling this twice is harmless: the second
/// subscriber is simply not installed.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("booksync={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "booksync.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }

    guard
}
