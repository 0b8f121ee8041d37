/// Echo MCP Server Entry Point
///
/// Loads configuration from the environment (and an optional `.env` file),
/// sets up logging, then starts the transport selected by MCP_TRANSPORT_MODE.
/// See `core::config` for the recognised variables and `core::logging` for
/// LOG_LEVEL / LOG_FORMAT.

use mcp_echo::core::config::{ServerConfig, TransportMode};
use mcp_echo::core::server::{self, AppState};
use mcp_echo::core::{logging, stdio};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is normal; variables may come from the environment
    let dotenv = dotenvy::dotenv();

    logging::init_default_logging();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let state = AppState::new(config.name.clone(), config.version.clone());
    let registry = server::initialize_tools();

    match config.transport {
        TransportMode::Stdio => {
            // Nothing else owns shutdown here, so a signal ends the server
            tokio::select! {
                result = stdio::run_server_stdio(state, registry) => result,
                signal = logging::shutdown_signal() => {
                    tracing::info!(signal, "Received termination signal, shutting down");
                    Ok(())
                }
            }
        }
        TransportMode::Http => {
            // Actix Web performs the graceful shutdown itself
            let signal_logger = logging::spawn_signal_logger();
            let result = server::run_server_http(&config, state, registry).await;
            signal_logger.abort();
            result
        }
        TransportMode::Both => {
            let signal_logger = logging::spawn_signal_logger();

            // STDIO in the background so MCP Inspector can attach while HTTP serves
            let stdio_state = state.clone();
            let stdio_registry = registry.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = stdio::run_server_stdio(stdio_state, stdio_registry).await {
                    tracing::error!(error = %e, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(&config, state, registry).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();
            signal_logger.abort();

            http_result
        }
    }
}
