/// Core Server Framework Module
///
/// This module contains the server plumbing around the tools:
/// - server.rs: JSON-RPC types, tool registry, dispatch and the HTTP transport
/// - stdio.rs: line-delimited STDIO transport
/// - reporter.rs: progress notification sinks handed to tools
/// - config.rs: environment configuration
/// - logging.rs: tracing setup and termination signal logging
/// - error.rs: error types

pub mod config;
pub mod error;
pub mod logging;
pub mod reporter;
pub mod server;
pub mod stdio;
