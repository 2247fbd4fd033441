//! Newline-delimited JSON-RPC transport.
//!
//! One line in, at most one line out per request. Requests run concurrently
//! on their own tasks; a single writer task serialises the responses so
//! lines never interleave. Each in-flight request owns a
//! [`CancellationToken`] that `notifications/cancelled` or shutdown trips.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use varbi_core::traits::ApiClient;

use crate::handler::McpHandler;
use crate::protocol::{
    CancelledParams, INVALID_REQUEST, JsonRpcError, JsonRpcRequest, JsonRpcResponse, PARSE_ERROR,
};

const CANCELLED_NOTIFICATION: &str = "notifications/cancelled";

/// A request that has been dispatched but not answered.
struct Pending {
    /// Distinguishes reuse of the same id by the client.
    seq: u64,
    token: CancellationToken,
}

/// Pending requests keyed by their serialized id.
#[derive(Clone, Default)]
struct InFlight {
    inner: Arc<Mutex<HashMap<String, Pending>>>,
}

impl InFlight {
    /// Acquires the table lock, recovering from poison if necessary.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Pending>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovered from poisoned in-flight table");
            poisoned.into_inner()
        })
    }
}

/// MCP server bound to a job handler.
pub struct McpServer<C: ApiClient> {
    handler: Arc<McpHandler<C>>,
}

impl<C: ApiClient + 'static> McpServer<C> {
    pub fn new(handler: McpHandler<C>) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Serve until the reader reaches EOF or `shutdown` is cancelled.
    ///
    /// On EOF, requests already in flight finish and their responses are
    /// written. On shutdown they are cancelled and produce no output.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        writer: W,
        shutdown: CancellationToken,
    ) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        // Parent of every request token. Cancelled by shutdown, or when the
        // output side is gone and nothing can be answered any more.
        let requests = shutdown.child_token();
        let in_flight = InFlight::default();
        let mut tasks = JoinSet::new();
        let mut next_seq: u64 = 0;
        let mut lines = BufReader::new(reader).lines();

        tracing::info!("MCP server listening on stdio");

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                () = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                () = tx.closed() => {
                    tracing::warn!("Output closed; no further responses can be written");
                    requests.cancel();
                    break;
                }
            };
            let Some(line) = line else {
                tracing::info!("Input closed");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let request = match parse_line(&line) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(response) => {
                    if tx.send(response).is_err() {
                        tracing::warn!("Output closed; dropping error response");
                        requests.cancel();
                        break;
                    }
                    continue;
                }
            };

            if request.method == CANCELLED_NOTIFICATION {
                cancel_request(&in_flight, request.params);
                continue;
            }

            if request.is_notification() {
                self.handler.handle_notification(&request);
                continue;
            }

            let key = request_key(request.id.as_ref().unwrap_or(&Value::Null));
            let token = requests.child_token();
            let seq = next_seq;
            next_seq += 1;
            let pending = Pending {
                seq,
                token: token.clone(),
            };
            if let Some(previous) = in_flight.lock().insert(key.clone(), pending) {
                tracing::warn!(id = %key, "Duplicate request id; cancelling earlier request");
                previous.token.cancel();
            }

            let handler = Arc::clone(&self.handler);
            let tx = tx.clone();
            let in_flight = in_flight.clone();
            tasks.spawn(async move {
                let response = tokio::select! {
                    response = handler.handle_request(request) => Some(response),
                    () = token.cancelled() => None,
                };

                {
                    let mut table = in_flight.lock();
                    // A duplicate id may have replaced our entry already.
                    if table.get(&key).is_some_and(|p| p.seq == seq) {
                        table.remove(&key);
                    }
                }

                match response {
                    Some(response) => {
                        if tx.send(response).is_err() {
                            tracing::warn!(id = %key, "Output closed; dropping response");
                        }
                    }
                    None => tracing::info!(id = %key, "Request cancelled"),
                }
            });

            // Reap finished tasks so the set does not grow unbounded.
            while let Some(result) = tasks.try_join_next() {
                log_task_result(result);
            }
        }

        while let Some(result) = tasks.join_next().await {
            log_task_result(result);
        }

        drop(tx);
        match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        }
    }
}

fn log_task_result(result: Result<(), JoinError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "Request task panicked");
    }
}

/// Decode one input line.
///
/// `Ok(None)` means the line is a response from the client, which this
/// server never solicits, and is dropped.
fn parse_line(line: &str) -> Result<Option<JsonRpcRequest>, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        tracing::warn!(error = %e, "Unparseable message");
        JsonRpcResponse::failure(
            Value::Null,
            JsonRpcError::new(PARSE_ERROR, format!("Parse error: {e}")),
        )
    })?;

    if value.get("method").is_none()
        && (value.get("result").is_some() || value.get("error").is_some())
    {
        tracing::debug!("Ignoring client response");
        return Ok(None);
    }

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::failure(
            id.clone(),
            JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {e}")),
        )
    })?;

    if request.jsonrpc != crate::protocol::JSONRPC_VERSION {
        return Err(JsonRpcResponse::failure(
            id,
            JsonRpcError::new(
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version '{}'", request.jsonrpc),
            ),
        ));
    }

    Ok(Some(request))
}

fn cancel_request(in_flight: &InFlight, params: Option<Value>) {
    let Some(params) = params.and_then(|p| serde_json::from_value::<CancelledParams>(p).ok())
    else {
        tracing::warn!("Malformed cancellation notification");
        return;
    };

    let key = request_key(&params.request_id);
    match in_flight.lock().remove(&key) {
        Some(pending) => {
            tracing::info!(id = %key, reason = ?params.reason, "Cancelling request");
            pending.token.cancel();
        }
        None => tracing::debug!(id = %key, "Cancellation for unknown or finished request"),
    }
}

/// Table key for a request id. `1` and `"1"` stay distinct.
fn request_key(id: &Value) -> String {
    id.to_string()
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response).map_err(std::io::Error::other)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}
