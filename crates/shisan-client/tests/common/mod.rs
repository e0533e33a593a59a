//! In-memory transports for driving the bridge and poller under paused time.

#![allow(dead_code)]

use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use shisan_client::{HttpCall, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted reply
pub struct Step {
    pub delay: Duration,
    pub reply: Result<Value, TransportError>,
}

impl Step {
    pub fn ok(body: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: Ok(body),
        }
    }

    pub fn err(error: TransportError) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Replays a script, then answers every further call with `fallback`.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    fallback: Value,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            fallback: poll_body("matching", json!([])),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, call: HttpCall) -> BoxFuture<'static, Result<Value, TransportError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(call.url.to_string());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Step::ok(self.fallback.clone()));
        Box::pin(async move {
            if !step.delay.is_zero() {
                tokio::time::sleep(step.delay).await;
            }
            step.reply
        })
    }
}

pub fn poll_body(status: &str, players: Value) -> Value {
    json!({"success": true, "gameStatus": status, "players": players})
}
