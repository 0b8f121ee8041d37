/// echo_with_delay Tool
///
/// Echoes a message after pausing for a bounded time, reporting how long the
/// pause really took. The pause is a tokio timer so other calls keep running,
/// and dropping the future (client disconnect or cancellation) abandons it.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

use crate::core::error::ToolError;
use crate::core::reporter::{Reporter, preview};
use crate::core::server::{MCPTool, Tool};
use crate::tools::models::{EchoDelayResponse, iso8601};
use crate::tools::{optional_f64, required_str, to_result};

pub const NAME: &str = "echo_with_delay";

/// Upper bound on the induced pause, in seconds
pub const MAX_DELAY_SECONDS: f64 = 5.0;

pub const DEFAULT_DELAY_SECONDS: f64 = 1.0;

/// Clamp a requested delay into `[0, MAX_DELAY_SECONDS]`.
pub fn effective_delay(requested: f64) -> f64 {
    requested.clamp(0.0, MAX_DELAY_SECONDS)
}

/// Pause for the clamped delay, then echo `message` with timing details.
pub async fn echo_with_delay(message: &str, delay_seconds: f64) -> EchoDelayResponse {
    let delay = effective_delay(delay_seconds);

    let start_time = Utc::now();
    let started = Instant::now();
    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    let actual_delay = started.elapsed().as_secs_f64();
    let end_time = Utc::now();

    EchoDelayResponse {
        original_message: message.to_string(),
        echoed_message: message.to_string(),
        requested_delay: delay,
        actual_delay,
        start_time: iso8601(start_time),
        end_time: iso8601(end_time),
        timestamp: iso8601(end_time),
    }
}

pub struct EchoWithDelayTool;

#[async_trait]
impl Tool for EchoWithDelayTool {
    fn definition(&self) -> MCPTool {
        MCPTool {
            name: NAME.to_string(),
            description: "Echo back a message after a simulated delay (max 5 seconds).".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "The message to echo back"
                    },
                    "delay_seconds": {
                        "type": "number",
                        "description": "Delay duration in seconds (max 5.0 seconds)",
                        "default": DEFAULT_DELAY_SECONDS
                    }
                },
                "required": ["message"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "original_message": {"type": "string"},
                    "echoed_message": {"type": "string"},
                    "requested_delay": {"type": "number"},
                    "actual_delay": {"type": "number"},
                    "start_time": {"type": "string", "format": "date-time"},
                    "end_time": {"type": "string", "format": "date-time"},
                    "timestamp": {"type": "string", "format": "date-time"}
                },
                "required": [
                    "original_message",
                    "echoed_message",
                    "requested_delay",
                    "actual_delay",
                    "start_time",
                    "end_time",
                    "timestamp"
                ]
            })),
        }
    }

    async fn call(&self, args: Value, reporter: &dyn Reporter) -> Result<Value, ToolError> {
        let message = required_str(&args, "message")?;
        let delay_seconds = optional_f64(&args, "delay_seconds", DEFAULT_DELAY_SECONDS)?;

        reporter.info(&format!(
            "Echoing with {:?}s delay: {}...",
            effective_delay(delay_seconds),
            preview(message, 50)
        ));

        let response = echo_with_delay(message, delay_seconds).await;
        to_result(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reporter::{NoopReporter, NotificationReporter};
    use proptest::prelude::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn short_delay_is_honoured() {
        let result = echo_with_delay("Delayed message", 0.1).await;
        assert_eq!(result.original_message, "Delayed message");
        assert_eq!(result.echoed_message, "Delayed message");
        assert_eq!(result.requested_delay, 0.1);
        assert!(result.actual_delay >= 0.1);
        assert_eq!(result.timestamp, result.end_time);
    }

    #[tokio::test(start_paused = true)]
    async fn long_delay_is_clamped_to_five_seconds() {
        let result = echo_with_delay("Long delay test", 10.0).await;
        assert_eq!(result.requested_delay, 5.0);
        assert!(result.actual_delay >= 5.0);
        assert!(result.actual_delay < 10.0);
        assert_eq!(result.echoed_message, "Long delay test");
    }

    #[tokio::test]
    async fn negative_delay_is_clamped_to_zero() {
        let result = echo_with_delay("now", -3.0).await;
        assert_eq!(result.requested_delay, 0.0);
        assert!(result.actual_delay >= 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_defaults_to_one_second() {
        let value = EchoWithDelayTool
            .call(json!({"message": "default"}), &NoopReporter)
            .await
            .unwrap();
        assert_eq!(value["requested_delay"], 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_note_keeps_decimal_point() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = NotificationReporter::new(tx);

        EchoWithDelayTool
            .call(json!({"message": "default"}), &reporter)
            .await
            .unwrap();
        EchoWithDelayTool
            .call(json!({"message": "capped", "delay_seconds": 8}), &reporter)
            .await
            .unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first["params"]["data"], "Echoing with 1.0s delay: default...");
        let second = rx.try_recv().unwrap();
        assert_eq!(second["params"]["data"], "Echoing with 5.0s delay: capped...");
    }

    #[tokio::test]
    async fn rejects_non_numeric_delay() {
        let err = EchoWithDelayTool
            .call(json!({"message": "x", "delay_seconds": "soon"}), &NoopReporter)
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::invalid("delay_seconds", "a number"));

        let err = EchoWithDelayTool
            .call(json!({"delay_seconds": 0.1}), &NoopReporter)
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::missing("message"));
    }

    #[tokio::test]
    async fn concurrent_calls_do_not_serialize() {
        let started = std::time::Instant::now();
        let (a, b) = tokio::join!(echo_with_delay("a", 0.3), echo_with_delay("b", 0.3));
        assert_eq!(a.echoed_message, "a");
        assert_eq!(b.echoed_message, "b");
        assert!(started.elapsed() < Duration::from_millis(550));
    }

    proptest! {
        #[test]
        fn effective_delay_is_min_of_request_and_cap(d in 0.0f64..1000.0) {
            prop_assert_eq!(effective_delay(d), d.min(MAX_DELAY_SECONDS));
        }

        #[test]
        fn effective_delay_never_negative(d in -1000.0f64..0.0) {
            prop_assert_eq!(effective_delay(d), 0.0);
        }
    }
}
