/// STDIO Transport
///
/// Line-delimited JSON-RPC over stdin/stdout for MCP Inspector and local
/// clients. Every request runs in its own task so a slow tool call never
/// holds up the next line; a single writer task owns stdout and emits one
/// JSON message per line. All logging goes to stderr.

use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::core::reporter::NotificationReporter;
use crate::core::server::{AppState, ToolRegistry, handle_request, parse_request};

/// Run the MCP server over the process's stdin/stdout.
pub async fn run_server_stdio(state: AppState, registry: Arc<ToolRegistry>) -> io::Result<()> {
    tracing::info!(
        name = %state.server_name,
        version = %state.server_version,
        "MCP server starting (STDIO mode)"
    );

    // 8KB buffers balance memory usage with I/O efficiency
    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve(stdin, stdout, state, registry).await?;

    tracing::info!("STDIO input closed, shutting down");
    Ok(())
}

/// Serve JSON-RPC requests read line by line from `reader`, writing responses
/// and notifications to `writer`.
///
/// Returns the writer once input is exhausted and every in-flight request has
/// completed or been cancelled.
pub async fn serve<R, W>(
    reader: R,
    writer: W,
    state: AppState,
    registry: Arc<ToolRegistry>,
) -> io::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outgoing, queue) = mpsc::unbounded_channel::<Value>();
    let writer_task = tokio::spawn(write_messages(queue, writer));

    // Request id (serialized) -> running task, for notifications/cancelled
    let mut in_flight: HashMap<String, JoinHandle<()>> = HashMap::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request = match parse_request(line.as_bytes()) {
            Ok(req) => req,
            Err(error_response) => {
                tracing::warn!("Rejected malformed JSON-RPC line");
                match serde_json::to_value(&error_response) {
                    Ok(value) => {
                        let _ = outgoing.send(value);
                    }
                    Err(e) => tracing::error!(error = %e, "Error serializing response"),
                }
                continue;
            }
        };

        if request.method == "notifications/cancelled" {
            cancel_request(&mut in_flight, request.params.as_ref());
            continue;
        }

        in_flight.retain(|_, handle| !handle.is_finished());

        let key = request.id.as_ref().map(Value::to_string);
        let state = state.clone();
        let registry = Arc::clone(&registry);
        let outgoing = outgoing.clone();
        let handle = tokio::spawn(async move {
            let reporter = NotificationReporter::new(outgoing.clone());
            if let Some(response) = handle_request(&state, &registry, request, &reporter).await {
                match serde_json::to_value(&response) {
                    Ok(value) => {
                        let _ = outgoing.send(value);
                    }
                    Err(e) => tracing::error!(error = %e, "Error serializing response"),
                }
            }
        });

        if let Some(key) = key {
            in_flight.insert(key, handle);
        }
    }

    // Input closed: let outstanding requests finish before closing the queue
    for (_, handle) in in_flight.drain() {
        let _ = handle.await;
    }
    drop(outgoing);

    writer_task.await.map_err(io::Error::other)?
}

/// Abort the in-flight request named by a `notifications/cancelled` message.
fn cancel_request(in_flight: &mut HashMap<String, JoinHandle<()>>, params: Option<&Value>) {
    let Some(request_id) = params.and_then(|p| p.get("requestId")) else {
        tracing::debug!("Cancellation without requestId ignored");
        return;
    };

    match in_flight.remove(&request_id.to_string()) {
        Some(handle) => {
            handle.abort();
            tracing::info!(request_id = %request_id, "Request cancelled by client");
        }
        None => tracing::debug!(request_id = %request_id, "Cancellation for unknown request"),
    }
}

/// Drain the outgoing queue to the writer, one JSON message per line.
///
/// Flushes after each message so responses are delivered immediately.
async fn write_messages<W>(mut queue: UnboundedReceiver<Value>, mut writer: W) -> io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = queue.recv().await {
        let mut line = match serde_json::to_vec(&message) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "Error serializing message");
                continue;
            }
        };
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    writer.flush().await?;
    Ok(writer)
}
