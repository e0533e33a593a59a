//! Request/response bridge between the application and the network.
//!
//! Calls are executed by a worker task that shares nothing with callers:
//! requests go in over one channel, replies come back over another. Every
//! request carries a fresh id, and replies are matched to their caller by
//! that id, so concurrent calls may settle in any order.

use crate::protocol::{envelope_failed, envelope_message, ActionResponse};
use crate::routing::{self, RouteError};
use crate::transport::{Transport, TransportError};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Failure of a bridged call, always tagged with its action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("{action}: {source}")]
    Route { action: String, source: RouteError },

    #[error("{action}: {source}")]
    Transport {
        action: String,
        source: TransportError,
    },

    #[error("{action}: {message}")]
    Rejected { action: String, message: String },

    #[error("{action}: bridge closed before the call settled")]
    Closed { action: String },
}

impl BridgeError {
    pub fn action(&self) -> &str {
        match self {
            BridgeError::Route { action, .. }
            | BridgeError::Transport { action, .. }
            | BridgeError::Rejected { action, .. }
            | BridgeError::Closed { action } => action,
        }
    }
}

/// Message into the worker
#[derive(Debug)]
struct BridgeRequest {
    id: Uuid,
    action: String,
    payload: Value,
}

/// Message out of the worker
#[derive(Debug)]
struct BridgeReply {
    id: Uuid,
    action: String,
    outcome: Result<Value, BridgeError>,
}

/// A call waiting for its reply
struct PendingRequest {
    action: String,
    reply: oneshot::Sender<Result<ActionResponse, BridgeError>>,
}

/// Handle to a running bridge
pub struct Bridge {
    requests: mpsc::UnboundedSender<BridgeRequest>,
    pending: Arc<DashMap<Uuid, PendingRequest>>,
    closed: AtomicBool,
    worker: JoinHandle<()>,
    router: JoinHandle<()>,
}

impl Bridge {
    /// Start the worker and reply router. Must be called inside a Tokio
    /// runtime.
    pub fn spawn(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let pending = Arc::new(DashMap::new());

        let worker = tokio::spawn(run_worker(base_url.into(), transport, request_rx, reply_tx));
        let router = tokio::spawn(run_router(reply_rx, Arc::clone(&pending)));

        Self {
            requests: request_tx,
            pending,
            closed: AtomicBool::new(false),
            worker,
            router,
        }
    }

    /// Issue `action` and wait for its correlated outcome.
    pub async fn send(&self, action: &str, payload: Value) -> Result<ActionResponse, BridgeError> {
        let id = Uuid::new_v4();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.insert(
            id,
            PendingRequest {
                action: action.to_string(),
                reply: reply_tx,
            },
        );
        // checked after inserting so a concurrent shutdown always sees the entry
        if self.closed.load(Ordering::SeqCst) {
            self.pending.remove(&id);
            return Err(closed(action));
        }

        debug!(request_id = %id, action, "Dispatching action");
        let request = BridgeRequest {
            id,
            action: action.to_string(),
            payload,
        };
        if self.requests.send(request).is_err() {
            self.pending.remove(&id);
            return Err(closed(action));
        }

        reply_rx.await.unwrap_or_else(|_| Err(closed(action)))
    }

    /// Number of calls still waiting for a reply
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Stop the worker and fail every outstanding call.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.worker.abort();
        self.router.abort();

        let ids: Vec<Uuid> = self.pending.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, pending)) = self.pending.remove(&id) {
                let _ = pending.reply.send(Err(closed(&pending.action)));
            }
        }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn closed(action: &str) -> BridgeError {
    BridgeError::Closed {
        action: action.to_string(),
    }
}

/// The isolated side: turns requests into network calls, one task each.
async fn run_worker(
    base_url: String,
    transport: Arc<dyn Transport>,
    mut requests: mpsc::UnboundedReceiver<BridgeRequest>,
    replies: mpsc::UnboundedSender<BridgeReply>,
) {
    while let Some(request) = requests.recv().await {
        let base_url = base_url.clone();
        let transport = Arc::clone(&transport);
        let replies = replies.clone();

        tokio::spawn(async move {
            let BridgeRequest {
                id,
                action,
                payload,
            } = request;
            let outcome = execute(&base_url, transport.as_ref(), &action, payload).await;
            if replies.send(BridgeReply { id, action, outcome }).is_err() {
                debug!(request_id = %id, "Reply dropped, bridge is shut down");
            }
        });
    }
}

async fn execute(
    base_url: &str,
    transport: &dyn Transport,
    action: &str,
    payload: Value,
) -> Result<Value, BridgeError> {
    let call = routing::build_call(base_url, action, payload).map_err(|source| {
        BridgeError::Route {
            action: action.to_string(),
            source,
        }
    })?;

    // Run the call on its own task so a panicking transport still settles
    let body = match tokio::spawn(transport.execute(call)).await {
        Ok(result) => result,
        Err(e) => Err(TransportError::Network(format!("transport task failed: {}", e))),
    }
    .map_err(|source| BridgeError::Transport {
        action: action.to_string(),
        source,
    })?;

    if envelope_failed(&body) {
        return Err(BridgeError::Rejected {
            action: action.to_string(),
            message: envelope_message(&body).unwrap_or_else(|| "API request failed".to_string()),
        });
    }
    Ok(body)
}

/// Match replies to pending calls by id.
async fn run_router(
    mut replies: mpsc::UnboundedReceiver<BridgeReply>,
    pending: Arc<DashMap<Uuid, PendingRequest>>,
) {
    while let Some(reply) = replies.recv().await {
        let Some((_, waiting)) = pending.remove(&reply.id) else {
            warn!(request_id = %reply.id, action = %reply.action, "Reply for unknown request");
            continue;
        };
        if waiting.action != reply.action {
            error!(
                request_id = %reply.id,
                expected = %waiting.action,
                got = %reply.action,
                "Reply action does not match request"
            );
        }

        let response = reply.outcome.map(|data| ActionResponse {
            request_id: reply.id,
            action: reply.action,
            data,
        });
        if let Err(e) = &response {
            warn!(request_id = %reply.id, error = %e, "Action failed");
        }
        // the caller may have given up waiting
        let _ = waiting.reply.send(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HttpCall;
    use futures_util::future::BoxFuture;
    use serde_json::json;

    /// Echoes the call back as the response body
    struct EchoTransport;

    impl Transport for EchoTransport {
        fn execute(&self, call: HttpCall) -> BoxFuture<'static, Result<Value, TransportError>> {
            Box::pin(async move {
                Ok(json!({
                    "url": call.url.as_str(),
                    "body": call.body,
                }))
            })
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn execute(&self, _call: HttpCall) -> BoxFuture<'static, Result<Value, TransportError>> {
            Box::pin(async { Err(TransportError::Network("connection refused".to_string())) })
        }
    }

    #[tokio::test]
    async fn test_send_returns_correlated_response() {
        let bridge = Bridge::spawn("http://api.test", Arc::new(EchoTransport));
        let response = bridge
            .send("joinRoom", json!({"resource": "rooms", "roomId": 3}))
            .await
            .unwrap();

        assert_eq!(response.action, "joinRoom");
        assert_eq!(response.data["url"], json!("http://api.test/rooms?action=joinRoom"));
        assert_eq!(response.data["body"], json!({"roomId": 3}));
        assert_eq!(bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_route_error_carries_action() {
        let bridge = Bridge::spawn("http://api.test", Arc::new(EchoTransport));
        let err = bridge.send("getPoints", json!({})).await.unwrap_err();
        assert_eq!(err.action(), "getPoints");
        assert!(matches!(
            err,
            BridgeError::Route {
                source: RouteError::MissingNamespace,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_carries_action() {
        let bridge = Bridge::spawn("http://api.test", Arc::new(FailingTransport));
        let err = bridge
            .send("submitHand", json!({"resource": "thirteen"}))
            .await
            .unwrap_err();
        assert_eq!(err.action(), "submitHand");
        assert_eq!(err.to_string(), "submitHand: Network error: connection refused");
    }

    #[tokio::test]
    async fn test_shutdown_settles_callers() {
        let bridge = Bridge::spawn("http://api.test", Arc::new(EchoTransport));
        bridge.shutdown();
        let err = bridge
            .send("getPoints", json!({"resource": "user"}))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Closed { .. }));
        assert_eq!(bridge.pending_count(), 0);
    }
}
