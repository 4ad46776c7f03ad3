//! Host-side IPC: renderer handles, request envelopes and the channel router
//!
//! Surfaces hold an `IpcRenderer`; the host owns one `IpcMain` and serves the
//! shared inbox. Every request carries its own oneshot reply slot, so
//! overlapping calls never share state.

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::bridge::{EvaluatorError, ScanVerdict};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// Evaluator failure, passed through untouched
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
    #[error("No handler registered for '{0}'")]
    NoHandler(String),
    #[error("IPC channel disconnected")]
    Disconnected,
}

pub type IpcReply = Result<ScanVerdict, BridgeError>;

// =============================================================================
// Envelope + handler seam
// =============================================================================

/// One in-flight request. Dropping it without replying rejects the caller.
#[derive(Debug)]
pub struct IpcRequest {
    pub channel: String,
    pub payload: String,
    reply: oneshot::Sender<IpcReply>,
}

#[async_trait]
pub trait IpcHandler: Send + Sync {
    async fn handle(&self, payload: String) -> IpcReply;
}

pub type IpcInbox = mpsc::UnboundedReceiver<IpcRequest>;

/// Create a connected renderer handle and host inbox
pub fn ipc_channel() -> (IpcRenderer, IpcInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IpcRenderer { tx }, rx)
}

// =============================================================================
// IpcRenderer (surface side)
// =============================================================================

#[derive(Debug, Clone)]
pub struct IpcRenderer {
    tx: mpsc::UnboundedSender<IpcRequest>,
}

impl IpcRenderer {
    /// Send `payload` on `channel` and wait for the host's reply.
    ///
    /// No timeout and no cancellation: a handler that never finishes leaves
    /// this pending.
    pub async fn invoke(&self, channel: &str, payload: impl Into<String>) -> IpcReply {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(IpcRequest {
                channel: channel.to_string(),
                payload: payload.into(),
                reply,
            })
            .map_err(|_| BridgeError::Disconnected)?;

        response.await.map_err(|_| BridgeError::Disconnected)?
    }

    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

// =============================================================================
// IpcMain (host side)
// =============================================================================

#[derive(Default)]
pub struct IpcMain {
    handlers: HashMap<String, Arc<dyn IpcHandler>>,
}

impl IpcMain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `channel`, returning any handler it replaces
    pub fn handle(
        &mut self,
        channel: &str,
        handler: Arc<dyn IpcHandler>,
    ) -> Option<Arc<dyn IpcHandler>> {
        self.handlers.insert(channel.to_string(), handler)
    }

    pub fn remove_handler(&mut self, channel: &str) -> Option<Arc<dyn IpcHandler>> {
        self.handlers.remove(channel)
    }

    pub fn channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        channels.sort_unstable();
        channels
    }

    /// Route a single payload to the handler registered for `channel`
    pub async fn dispatch(&self, channel: &str, payload: String) -> IpcReply {
        match self.handlers.get(channel) {
            Some(handler) => handler.handle(payload).await,
            None => Err(BridgeError::NoHandler(channel.to_string())),
        }
    }

    async fn respond(&self, request: IpcRequest) {
        let IpcRequest {
            channel,
            payload,
            reply,
        } = request;
        let result = self.dispatch(&channel, payload).await;
        // Caller gone; the reply has nowhere to go
        let _ = reply.send(result);
    }

    /// Serve the inbox until every renderer handle is dropped.
    ///
    /// Requests are handled concurrently; replies go out in completion order.
    pub async fn serve(&self, mut inbox: IpcInbox) {
        let mut inflight = FuturesUnordered::new();
        loop {
            tokio::select! {
                request = inbox.recv() => match request {
                    Some(request) => inflight.push(self.respond(request)),
                    None => break,
                },
                Some(()) = inflight.next(), if !inflight.is_empty() => {}
            }
        }
        while inflight.next().await.is_some() {}
        log::debug!("ipc inbox closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl IpcHandler for Echo {
        async fn handle(&self, payload: String) -> IpcReply {
            Ok(ScanVerdict::new(json!({ "echo": payload })))
        }
    }

    struct Parked(tokio::sync::Mutex<Option<oneshot::Receiver<()>>>);

    #[async_trait]
    impl IpcHandler for Parked {
        async fn handle(&self, payload: String) -> IpcReply {
            if let Some(gate) = self.0.lock().await.take() {
                let _ = gate.await;
            }
            Ok(ScanVerdict::new(json!(payload)))
        }
    }

    #[tokio::test]
    async fn test_invoke_round_trip() {
        let mut main = IpcMain::new();
        main.handle("echo", Arc::new(Echo));
        let (renderer, inbox) = ipc_channel();

        let client = async move {
            let reply = renderer.invoke("echo", "hello").await;
            drop(renderer);
            reply
        };
        let ((), reply) = tokio::join!(main.serve(inbox), client);

        assert_eq!(reply.unwrap().into_value(), json!({ "echo": "hello" }));
    }

    #[tokio::test]
    async fn test_unknown_channel_is_rejected() {
        let main = IpcMain::new();
        let reply = main.dispatch("open-file", "/etc/passwd".into()).await;
        assert_eq!(reply, Err(BridgeError::NoHandler("open-file".into())));
    }

    #[tokio::test]
    async fn test_invoke_without_host_is_disconnected() {
        let (renderer, inbox) = ipc_channel();
        drop(inbox);

        assert!(!renderer.is_connected());
        assert_eq!(
            renderer.invoke("echo", "x").await,
            Err(BridgeError::Disconnected)
        );
    }

    #[tokio::test]
    async fn test_dropped_request_rejects_caller() {
        let (renderer, mut inbox) = ipc_channel();

        let host = async move {
            let request = inbox.recv().await.unwrap();
            assert_eq!(request.channel, "echo");
            drop(request);
        };
        let ((), reply) = tokio::join!(host, renderer.invoke("echo", "x"));

        assert_eq!(reply, Err(BridgeError::Disconnected));
    }

    #[tokio::test]
    async fn test_overlapping_calls_do_not_block_each_other() {
        let (release, gate) = oneshot::channel();
        let mut main = IpcMain::new();
        main.handle("slow", Arc::new(Parked(tokio::sync::Mutex::new(Some(gate)))));
        main.handle("echo", Arc::new(Echo));
        let (renderer, inbox) = ipc_channel();

        let client = async move {
            let slow = renderer.invoke("slow", "first");
            let fast = async {
                let reply = renderer.invoke("echo", "second").await;
                // The fast call finished while the slow one is still parked
                let _ = release.send(());
                reply
            };
            let (slow, fast) = tokio::join!(slow, fast);
            drop(renderer);
            (slow, fast)
        };
        let ((), (slow, fast)) = tokio::join!(main.serve(inbox), client);

        assert_eq!(slow.unwrap().into_value(), json!("first"));
        assert_eq!(fast.unwrap().into_value(), json!({ "echo": "second" }));
    }

    #[test]
    fn test_handle_replaces_and_lists_channels() {
        let mut main = IpcMain::new();
        assert!(main.handle("b", Arc::new(Echo)).is_none());
        assert!(main.handle("a", Arc::new(Echo)).is_none());
        assert!(main.handle("a", Arc::new(Echo)).is_some());
        assert_eq!(main.channels(), vec!["a", "b"]);

        assert!(main.remove_handler("a").is_some());
        assert_eq!(main.channels(), vec!["b"]);
    }
}
