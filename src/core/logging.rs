/// Structured Logging and Signal Reporting
///
/// Output format is controlled by environment variables:
/// - LOG_LEVEL: ERROR, WARN, INFO, DEBUG, TRACE (default: INFO)
/// - LOG_FORMAT: json, pretty, compact (default: json)
/// - RUST_LOG: overrides filtering entirely (env_logger syntax)
///
/// Logs are always written to stderr; stdout belongs to the STDIO transport.
/// Actix Web's request logger uses the `log` facade and is bridged into
/// tracing by the subscriber.

use std::env;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format for structured logging (machine-readable)
    Json,
    /// Pretty format with colors and indentation (human-readable)
    Pretty,
    /// Compact format with colors but minimal spacing (terminal-friendly)
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

fn parse_level(s: &str) -> Level {
    match s.to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "DEBUG" => Level::DEBUG,
        "TRACE" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Initialize logging with an explicit level and format.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(level: Level, format: LogFormat) {
    let filter = match env::var("RUST_LOG") {
        Ok(rust_log) => EnvFilter::new(rust_log),
        // Reduce noise from the server internals
        Err(_) => EnvFilter::new(format!("{},actix_server=warn,mio=warn", level)),
    };

    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(fmt::layer().pretty().with_ansi(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => subscriber
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Initialize logging from LOG_LEVEL / LOG_FORMAT.
pub fn init_default_logging() {
    let level = parse_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()));
    let format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()));
    init_logging(level, format);
}

/// Wait for a termination signal and return its name.
pub async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                return tokio::select! {
                    _ = sigint.recv() => "SIGINT",
                    _ = sigterm.recv() => "SIGTERM",
                };
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Unix signal handlers unavailable, using ctrl-c only");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => "SIGINT",
        Err(e) => {
            tracing::warn!(error = %e, "Unable to listen for ctrl-c");
            std::future::pending().await
        }
    }
}

/// Spawn a background task that logs the first termination signal received.
///
/// Shutdown itself is left to the transport (Actix Web handles its own).
pub fn spawn_signal_logger() -> tokio::task::JoinHandle<()> {
    tokio::spawn(async {
        let signal = shutdown_signal().await;
        tracing::info!(signal, "Received termination signal, shutting down");
    })
}
