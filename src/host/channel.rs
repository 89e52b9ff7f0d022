//! In-process backend channel and router.
//!
//! Pairs a [`ChannelGateway`] (frontend side, implements [`BackendGateway`])
//! with a [`BackendServer`] that routes envelopes to a [`BackendHandler`].
//! Used to embed a backend in the same process and to drive the controller
//! in tests.

use crate::error::{DeskError, Result};
use crate::host::contract::{CommandEnvelope, CommandName, EventEnvelope, ResponseEnvelope};
use crate::host::gateway::{BackendGateway, BackendReply, Rejection};
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Backend-side implementation of the operations.
///
/// `Ok(payload)` is delivered as the `{success, ...}` reply object.
/// `Err(reason)` rejects the call; `reason` may be any JSON value.
pub trait BackendHandler: Send + Sync + 'static {
    fn handle(
        &self,
        command: CommandName,
        args: &[serde_json::Value],
    ) -> std::result::Result<serde_json::Value, serde_json::Value>;
}

struct BackendRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<ResponseEnvelope>,
}

#[derive(Clone)]
pub struct ChannelGateway {
    request_tx: mpsc::Sender<BackendRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl ChannelGateway {
    async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            DeskError::Protocol(format!(
                "invalid backend command envelope {}: {}",
                envelope.request_id, e
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(BackendRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| Rejection::text(format!("backend unavailable: {e}")))?;

        response_rx
            .await
            .map_err(|e| DeskError::from(Rejection::text(format!("backend response dropped: {e}"))))
    }
}

#[async_trait]
impl BackendGateway for ChannelGateway {
    async fn call(
        &self,
        command: CommandName,
        args: Vec<serde_json::Value>,
    ) -> Result<BackendReply> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let response = self
            .send(CommandEnvelope::new(request_id, command, args))
            .await?;
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

pub struct BackendServer<H: BackendHandler> {
    request_rx: mpsc::Receiver<BackendRequest>,
    handler: H,
}

/// Create a gateway/server pair with a fresh event channel.
#[must_use]
pub fn backend_channel<H: BackendHandler>(
    request_capacity: usize,
    event_capacity: usize,
    handler: H,
) -> (ChannelGateway, BackendServer<H>) {
    let (event_tx, _event_rx) = broadcast::channel(event_capacity.max(1));
    backend_channel_with_events(request_capacity, event_tx, handler)
}

/// Create a gateway/server pair using an existing event broadcast sender.
///
/// Lets the handler hold a clone of the sender and publish push events
/// (download progress) on the same stream the gateway exposes.
#[must_use]
pub fn backend_channel_with_events<H: BackendHandler>(
    request_capacity: usize,
    event_tx: broadcast::Sender<EventEnvelope>,
    handler: H,
) -> (ChannelGateway, BackendServer<H>) {
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));
    (
        ChannelGateway {
            request_tx,
            event_tx,
        },
        BackendServer {
            request_rx,
            handler,
        },
    )
}

impl<H: BackendHandler> BackendServer<H> {
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let response = self.route(&request.envelope);
            let _ = request.response_tx.send(response);
        }
    }

    /// Route a command envelope to the handler.
    pub fn route(&self, envelope: &CommandEnvelope) -> ResponseEnvelope {
        match self.handler.handle(envelope.command, &envelope.args) {
            Ok(payload) => ResponseEnvelope::ok(envelope.request_id.clone(), payload),
            Err(reason) => {
                tracing::debug!(
                    command = %envelope.command,
                    request_id = %envelope.request_id,
                    "backend handler rejected call"
                );
                ResponseEnvelope::rejected(envelope.request_id.clone(), reason)
            }
        }
    }
}

/// Publish a push event on a backend event channel.
pub fn emit_event(
    event_tx: &broadcast::Sender<EventEnvelope>,
    event: &str,
    payload: serde_json::Value,
) {
    let event_id = uuid::Uuid::new_v4().to_string();
    let _ = event_tx.send(EventEnvelope::new(event_id, event, payload));
}
