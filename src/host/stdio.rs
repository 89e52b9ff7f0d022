//! Newline-delimited JSON gateway to a backend child process.
//!
//! Writes `CommandEnvelope` lines to the backend's stdin and reads
//! `ResponseEnvelope` and `EventEnvelope` lines from its stdout. Responses are
//! matched to pending calls by `request_id`; events go to the broadcast
//! channel. The backend's stderr is inherited so its logs stay visible.

use crate::error::{DeskError, Result};
use crate::host::contract::{CommandEnvelope, CommandName, EventEnvelope, ResponseEnvelope};
use crate::host::gateway::{BackendGateway, BackendReply, Rejection};
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, broadcast, oneshot};
use tokio::task::JoinHandle;

type PendingMap = Arc<StdMutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Gateway over a pair of byte streams speaking the JSON-lines contract.
pub struct StdioGateway {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    event_tx: broadcast::Sender<EventEnvelope>,
    reader_handle: JoinHandle<()>,
    child: Option<StdMutex<tokio::process::Child>>,
}

impl StdioGateway {
    /// Spawn the backend process and connect to its stdin/stdout.
    pub fn spawn(program: &str, args: &[String], event_capacity: usize) -> Result<Self> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DeskError::Channel("backend stdin was not captured".to_owned()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DeskError::Channel("backend stdout was not captured".to_owned()))?;

        tracing::info!(program, "spawned backend process");
        let mut gateway = Self::from_streams(stdout, stdin, event_capacity);
        gateway.child = Some(StdMutex::new(child));
        Ok(gateway)
    }

    /// Connect to an already-open reader/writer pair.
    pub fn from_streams<R, W>(reader: R, writer: W, event_capacity: usize) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (event_tx, _event_rx) = broadcast::channel(event_capacity.max(1));
        let pending: PendingMap = Arc::new(StdMutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let reader_handle = tokio::spawn(run_reader(
            reader,
            Arc::clone(&pending),
            Arc::clone(&closed),
            event_tx.clone(),
        ));

        Self {
            writer: Mutex::new(Box::new(writer)),
            pending,
            closed,
            event_tx,
            reader_handle,
            child: None,
        }
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn write_envelope(&self, envelope: &CommandEnvelope) -> Result<()> {
        let json = serde_json::to_string(envelope)
            .map_err(|e| DeskError::Protocol(format!("failed to serialize command: {e}")))?;
        let mut writer = self.writer.lock().await;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

impl Drop for StdioGateway {
    fn drop(&mut self) {
        self.reader_handle.abort();
        if let Some(child) = &self.child {
            let mut child = child.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = child.start_kill();
        }
    }
}

#[async_trait]
impl BackendGateway for StdioGateway {
    async fn call(
        &self,
        command: CommandName,
        args: Vec<serde_json::Value>,
    ) -> Result<BackendReply> {
        let envelope = CommandEnvelope::new(uuid::Uuid::new_v4().to_string(), command, args);
        envelope
            .validate()
            .map_err(|e| DeskError::Protocol(format!("invalid command {command}: {e}")))?;

        let (response_tx, response_rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(envelope.request_id.clone(), response_tx);
        let _entry = PendingEntry {
            pending: &self.pending,
            request_id: &envelope.request_id,
        };
        if self.closed.load(Ordering::SeqCst) {
            return Err(Rejection::text("backend closed before replying").into());
        }

        if let Err(e) = self.write_envelope(&envelope).await {
            tracing::warn!(error = %e, %command, "failed to write command to backend");
            return Err(Rejection::text(format!("backend unreachable: {e}")).into());
        }

        let response = response_rx
            .await
            .map_err(|_| Rejection::text("backend closed before replying"))?;

        if response.ok {
            Ok(BackendReply::from_payload(response.payload))
        } else {
            Err(Rejection::new(response.error.unwrap_or(serde_json::Value::Null)).into())
        }
    }

    fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.event_tx.subscribe()
    }
}

/// Removes a call's pending slot however the call ends, including when the
/// caller drops the future before the backend replies.
struct PendingEntry<'a> {
    pending: &'a PendingMap,
    request_id: &'a str,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.request_id);
    }
}

/// One decoded stdout line.
#[derive(Debug, PartialEq)]
enum InboundLine {
    Response(ResponseEnvelope),
    Event(EventEnvelope),
}

fn decode_line(line: &str) -> std::result::Result<InboundLine, String> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}"))?;
    if value.get("event").is_some() {
        serde_json::from_value(value)
            .map(InboundLine::Event)
            .map_err(|e| format!("invalid event envelope: {e}"))
    } else {
        serde_json::from_value(value)
            .map(InboundLine::Response)
            .map_err(|e| format!("invalid response envelope: {e}"))
    }
}

async fn run_reader<R>(
    reader: R,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    event_tx: broadcast::Sender<EventEnvelope>,
) where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("backend stdout closed");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read backend stdout");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match decode_line(trimmed) {
            Ok(InboundLine::Event(event)) => {
                let _ = event_tx.send(event);
            }
            Ok(InboundLine::Response(response)) => {
                let waiter = pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&response.request_id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => tracing::debug!(
                        request_id = %response.request_id,
                        "response for unknown request; dropping"
                    ),
                }
            }
            Err(e) => tracing::warn!(error = %e, raw_line = %trimmed, "skipping backend line"),
        }
    }

    // Dropping the senders fails every call still waiting; later calls see
    // the flag.
    closed.store(true, Ordering::SeqCst);
    pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}
