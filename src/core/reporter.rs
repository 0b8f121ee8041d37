/// Reporting Channel
///
/// Tools may emit progress/log notifications while they run. The transport
/// decides where those go: the HTTP transport logs them server-side, the STDIO
/// transport forwards them to the client as MCP `notifications/message`.
/// Callers that do not care pass `NoopReporter`.

use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;

/// Logger name attached to notifications sent to the client
const LOGGER_NAME: &str = "mcp-echo";

/// Sink for progress notifications emitted during a tool invocation.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
}

/// Reporter that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn info(&self, _message: &str) {}
}

/// Reporter that writes notifications to the server log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!(target: "mcp_echo::tools", "{}", message);
    }
}

/// Reporter that forwards notifications to the client as JSON-RPC
/// `notifications/message` messages through the transport's outgoing queue.
#[derive(Debug, Clone)]
pub struct NotificationReporter {
    outgoing: UnboundedSender<Value>,
}

impl NotificationReporter {
    pub fn new(outgoing: UnboundedSender<Value>) -> Self {
        Self { outgoing }
    }
}

impl Reporter for NotificationReporter {
    fn info(&self, message: &str) {
        let notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/message",
            "params": {
                "level": "info",
                "logger": LOGGER_NAME,
                "data": message
            }
        });
        // Receiver gone means the transport is shutting down
        if self.outgoing.send(notification).is_err() {
            tracing::debug!("Dropped notification, output channel closed");
        }
    }
}

/// Return at most `max_chars` characters of `text`, on a char boundary.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn notification_reporter_emits_message_notifications() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = NotificationReporter::new(tx);

        reporter.info("Echoing message");

        let sent = rx.try_recv().expect("notification should be queued");
        assert_eq!(sent["method"], "notifications/message");
        assert_eq!(sent["params"]["level"], "info");
        assert_eq!(sent["params"]["data"], "Echoing message");
        assert!(sent.get("id").is_none());
    }

    #[test]
    fn notification_reporter_tolerates_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        NotificationReporter::new(tx).info("nobody listening");
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        assert_eq!(preview("hello", 50), "hello");
        assert_eq!(preview("hello", 2), "he");
        assert_eq!(preview("héllo wörld", 4), "héll");
        assert_eq!(preview("", 3), "");
    }
}
