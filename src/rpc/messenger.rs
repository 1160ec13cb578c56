//! JSON-RPC messenger with timeout and error handling.
//!
//! # Responsibilities
//! - Send `{jsonrpc, id, method, params}` requests to one endpoint
//! - Decode replies and map node error objects onto [`RpcError`]
//! - Number requests with a per-messenger query id
//! - Hand request/response bodies to an optional debug hook

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::observability::metrics;
use crate::rpc::error::{RpcError, RpcErrorCode};

/// JSON-RPC protocol version sent with every request.
pub const JSON_RPC_VERSION: &str = "2.0";

/// A decoded JSON-RPC reply object (`jsonrpc`, `id`, `result`).
pub type Reply = Map<String, Value>;

/// Request/response body handed to a debug hook.
#[derive(Debug, Clone, Copy)]
pub enum RpcTrace<'a> {
    Request { endpoint: &'a str, body: &'a str },
    Response { endpoint: &'a str, body: &'a str },
}

/// Injected debug sink for raw RPC traffic.
pub type DebugHook = Arc<dyn Fn(RpcTrace<'_>) + Send + Sync>;

/// Capability to exchange JSON-RPC messages with one node endpoint.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Call `method` with positional `params`.
    async fn send_rpc(&self, method: &str, params: Vec<Value>) -> Result<Reply, RpcError>;

    /// The endpoint this messenger talks to.
    fn endpoint(&self) -> &str;
}

/// Extract the `result` field of a reply.
pub fn reply_result<'a>(reply: &'a Reply, method: &str) -> Result<&'a Value, RpcError> {
    reply
        .get("result")
        .ok_or_else(|| RpcError::malformed(method, "reply has no result field"))
}

/// HTTP transport for [`Messenger`].
pub struct HttpMessenger {
    endpoint: String,
    client: reqwest::Client,
    query_id: AtomicU64,
    debug_hook: Option<DebugHook>,
}

impl HttpMessenger {
    /// Create a messenger for `endpoint` with its own HTTP client.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport {
                method: String::new(),
                endpoint: endpoint.to_string(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Self::with_client(endpoint, client)
    }

    /// Create a messenger reusing an existing HTTP client.
    pub fn with_client(endpoint: &str, client: reqwest::Client) -> Result<Self, RpcError> {
        let _: url::Url = endpoint.parse().map_err(|e| RpcError::Transport {
            method: String::new(),
            endpoint: endpoint.to_string(),
            message: format!("invalid RPC URL: {}", e),
        })?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            query_id: AtomicU64::new(0),
            debug_hook: None,
        })
    }

    /// Install a hook that receives every raw request and response body.
    pub fn with_debug_hook(mut self, hook: DebugHook) -> Self {
        self.debug_hook = Some(hook);
        self
    }

    fn next_query_id(&self) -> u64 {
        self.query_id.fetch_add(1, Ordering::SeqCst)
    }

    fn trace(&self, event: RpcTrace<'_>) {
        if let Some(hook) = &self.debug_hook {
            hook(event);
        }
    }

    fn transport_error(&self, method: &str, message: String) -> RpcError {
        RpcError::Transport {
            method: method.to_string(),
            endpoint: self.endpoint.clone(),
            message,
        }
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn send_rpc(&self, method: &str, params: Vec<Value>) -> Result<Reply, RpcError> {
        let id = self.next_query_id();
        let body = json!({
            "jsonrpc": JSON_RPC_VERSION,
            "id": id,
            "method": method,
            "params": params,
        })
        .to_string();

        tracing::trace!(endpoint = %self.endpoint, method, id, "Sending RPC request");
        self.trace(RpcTrace::Request {
            endpoint: &self.endpoint,
            body: &body,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                metrics::record_rpc_call(method, "transport_error");
                self.transport_error(method, e.to_string())
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            metrics::record_rpc_call(method, "transport_error");
            self.transport_error(method, e.to_string())
        })?;

        self.trace(RpcTrace::Response {
            endpoint: &self.endpoint,
            body: &text,
        });

        let decoded: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) if !status.is_success() => {
                metrics::record_rpc_call(method, "transport_error");
                return Err(self.transport_error(method, format!("HTTP {}: {}", status, e)));
            }
            Err(e) => {
                metrics::record_rpc_call(method, "malformed");
                return Err(RpcError::malformed(method, format!("invalid JSON: {}", e)));
            }
        };

        let Value::Object(reply) = decoded else {
            metrics::record_rpc_call(method, "malformed");
            return Err(RpcError::malformed(method, "reply is not a JSON object"));
        };

        if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            tracing::debug!(endpoint = %self.endpoint, method, code, %message, "Node returned RPC error");
            metrics::record_rpc_call(method, "node_error");
            return Err(RpcError::Node {
                method: method.to_string(),
                code: RpcErrorCode::from_code(code),
                message,
            });
        }

        metrics::record_rpc_call(method, "ok");
        Ok(reply)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMessenger")
            .field("endpoint", &self.endpoint)
            .field("query_id", &self.query_id.load(Ordering::SeqCst))
            .field("debug_hook", &self.debug_hook.is_some())
            .finish()
    }
}

/// Builds messengers for shard endpoints discovered at runtime.
pub trait Connector: Send + Sync {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn Messenger>, RpcError>;
}

/// [`Connector`] producing [`HttpMessenger`]s that share one HTTP client.
#[derive(Clone)]
pub struct HttpConnector {
    client: reqwest::Client,
    debug_hook: Option<DebugHook>,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport {
                method: String::new(),
                endpoint: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            debug_hook: None,
        })
    }

    pub fn with_debug_hook(mut self, hook: DebugHook) -> Self {
        self.debug_hook = Some(hook);
        self
    }
}

impl Connector for HttpConnector {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn Messenger>, RpcError> {
        let mut messenger = HttpMessenger::with_client(endpoint, self.client.clone())?;
        if let Some(hook) = &self.debug_hook {
            messenger = messenger.with_debug_hook(hook.clone());
        }
        Ok(Arc::new(messenger))
    }
}
