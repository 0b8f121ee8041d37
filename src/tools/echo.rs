/// echo_message Tool
///
/// Echoes a message back, optionally uppercased, with its length and a
/// timestamp.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::ToolError;
use crate::core::reporter::{Reporter, preview};
use crate::core::server::{MCPTool, Tool};
use crate::tools::models::{EchoMessageResponse, now_iso8601};
use crate::tools::{optional_bool, required_str, to_result};

pub const NAME: &str = "echo_message";

/// Build the echo result for `message`.
///
/// Uppercasing follows Unicode case mapping (`ß` becomes `SS`), so the echoed
/// text may be longer than the original; `message_length` always counts the
/// original's characters.
pub fn echo_message(message: &str, uppercase: bool) -> EchoMessageResponse {
    let echoed_message = if uppercase {
        message.to_uppercase()
    } else {
        message.to_string()
    };

    EchoMessageResponse {
        original_message: message.to_string(),
        echoed_message,
        uppercase_applied: uppercase,
        message_length: message.chars().count(),
        timestamp: now_iso8601(),
    }
}

pub struct EchoMessageTool;

#[async_trait]
impl Tool for EchoMessageTool {
    fn definition(&self) -> MCPTool {
        MCPTool {
            name: NAME.to_string(),
            description: "Echo back a message with optional formatting.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "The message to echo back"
                    },
                    "uppercase": {
                        "type": "boolean",
                        "description": "Whether to convert the message to uppercase",
                        "default": false
                    }
                },
                "required": ["message"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "original_message": {"type": "string"},
                    "echoed_message": {"type": "string"},
                    "uppercase_applied": {"type": "boolean"},
                    "message_length": {"type": "integer"},
                    "timestamp": {"type": "string", "format": "date-time"}
                },
                "required": [
                    "original_message",
                    "echoed_message",
                    "uppercase_applied",
                    "message_length",
                    "timestamp"
                ]
            })),
        }
    }

    async fn call(&self, args: Value, reporter: &dyn Reporter) -> Result<Value, ToolError> {
        let message = required_str(&args, "message")?;
        let uppercase = optional_bool(&args, "uppercase", false)?;

        reporter.info(&format!(
            "Echoing message (uppercase={}): {}...",
            uppercase,
            preview(message, 50)
        ));

        let response = echo_message(message, uppercase);
        to_result(response)
    }
}
