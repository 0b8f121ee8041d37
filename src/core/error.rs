/// Error Types
///
/// Tool invocation errors are local to a single call and are reported back to
/// the client; configuration errors abort startup.

use thiserror::Error;

/// Error raised while resolving or executing a tool call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// A required argument was not supplied
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// An argument was supplied with the wrong JSON type
    #[error("Invalid parameter '{field}': expected {expected}")]
    InvalidParameter { field: String, expected: &'static str },

    /// The requested tool is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool produced a result that could not be encoded as JSON
    #[error("Failed to encode tool result: {0}")]
    Encode(String),
}

impl ToolError {
    pub fn missing(field: &str) -> Self {
        Self::MissingParameter(field.to_string())
    }

    pub fn invalid(field: &str, expected: &'static str) -> Self {
        Self::InvalidParameter {
            field: field.to_string(),
            expected,
        }
    }

    /// True for argument validation failures (as opposed to routing failures).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingParameter(_) | Self::InvalidParameter { .. })
    }
}

/// Error raised while loading server configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid transport mode '{0}'. Must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}
