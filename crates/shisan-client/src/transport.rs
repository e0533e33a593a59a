//! The network capability the bridge and poller run on.

use crate::protocol::envelope_message;
use crate::routing::{HttpCall, Method};
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Body(String),
}

/// Executes a resolved call and yields the decoded JSON body.
///
/// Implementations only report transport-level failures; interpreting the
/// body's own `success` flag is left to the caller.
pub trait Transport: Send + Sync + 'static {
    fn execute(&self, call: HttpCall) -> BoxFuture<'static, Result<Value, TransportError>>;
}

/// [`Transport`] over HTTP with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, call: HttpCall) -> BoxFuture<'static, Result<Value, TransportError>> {
        let client = self.client.clone();
        Box::pin(async move {
            debug!(method = ?call.method, url = %call.url, "HTTP call");
            let request = match call.method {
                Method::Get => client.get(call.url),
                Method::Post => client
                    .post(call.url)
                    .json(&call.body.unwrap_or(Value::Object(Default::default()))),
            };

            let response = request
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let body = serde_json::from_str::<Value>(&text);

            if !status.is_success() {
                let message = body
                    .ok()
                    .as_ref()
                    .and_then(envelope_message)
                    .unwrap_or_else(|| "API request failed".to_string());
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            body.map_err(|e| TransportError::Body(e.to_string()))
        })
    }
}
