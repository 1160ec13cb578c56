//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::primitives::{keccak256, Address};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use hmy_transfer::rpc::{Connector, Messenger, Reply, RpcError, RpcErrorCode};
use hmy_transfer::signer::{DeviceError, HardwareDevice, LocalSigner};

/// Well-known development keys with their hex and bech32 addresses.
pub const KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ADDR_0_HEX: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const ADDR_0_ONE: &str = "one17w0adeg64ky0daxwd2ugyuneellmjgnxvu4nql";

pub const KEY_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const ADDR_1_ONE: &str = "one1wzvhjux9rqfdcwspp37srdgwp5tac7wgyh3v5e";

pub const KEY_2: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";
pub const ADDR_2_ONE: &str = "one183zvmhdk4yq0526cthffncpaztay9yau5hmc38";

/// Receiver used by most scenarios.
pub const RECEIVER_ONE: &str = "one1pdv9lrdwl0rg5vglh4xtyrv3wjk3wsqket7zxy";

pub const TX_HASH: &str = "0x5b9f0c3c8a0e5fbb0b6e8a9d5f3c3f2fd3c5b8e7a1d2c3b4a5968778695a4b3c";

pub fn address(hex: &str) -> Address {
    hex.parse().unwrap()
}

pub fn key(hex: &str) -> PrivateKeySigner {
    hex.parse().unwrap()
}

pub fn local_signer(hex: &str) -> LocalSigner {
    LocalSigner::from_private_key(hex).unwrap()
}

/// `getShardingStructure` result for `count` shards at `http://s<i>.local:9500`.
pub fn sharding_structure(count: u32) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                json!({
                    "shardID": i,
                    "http": shard_endpoint(i),
                    "ws": format!("ws://s{}.local:9800", i),
                    "current": i == 0
                })
            })
            .collect(),
    )
}

pub fn shard_endpoint(shard: u32) -> String {
    format!("http://s{}.local:9500", shard)
}

/// One atto-ONE amount as a hex quantity.
pub fn hex_quantity(value: u128) -> Value {
    json!(format!("0x{:x}", value))
}

pub const ONE: u128 = 1_000_000_000_000_000_000;
pub const GWEI: u128 = 1_000_000_000;

#[derive(Clone)]
enum Scripted {
    Result(Value),
    Error(RpcError),
}

/// In-memory node: per-method scripted replies plus a call log.
///
/// Queued replies are consumed in order; the last one sticks.
pub struct ScriptedMessenger {
    endpoint: String,
    replies: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedMessenger {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue `result` as the next reply to `method`.
    pub fn reply(&self, method: &str, result: Value) -> &Self {
        self.push(method, Scripted::Result(result));
        self
    }

    /// Queue a node error object as the next reply to `method`.
    pub fn fail(&self, method: &str, code: i64, message: &str) -> &Self {
        self.push(
            method,
            Scripted::Error(RpcError::Node {
                method: method.to_string(),
                code: RpcErrorCode::from_code(code),
                message: message.to_string(),
            }),
        );
        self
    }

    /// Queue a transport failure as the next reply to `method`.
    pub fn unreachable(&self, method: &str) -> &Self {
        self.push(
            method,
            Scripted::Error(RpcError::Transport {
                method: method.to_string(),
                endpoint: self.endpoint.clone(),
                message: "connection refused".to_string(),
            }),
        );
        self
    }

    fn push(&self, method: &str, reply: Scripted) {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls().iter().filter(|(m, _)| m == method).count()
    }

    pub fn params_of(&self, method: &str) -> Vec<Vec<Value>> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn send_rpc(&self, method: &str, params: Vec<Value>) -> Result<Reply, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        let scripted = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(method) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match scripted {
            Some(Scripted::Result(result)) => {
                let mut reply = Map::new();
                reply.insert("jsonrpc".into(), json!("2.0"));
                reply.insert("id".into(), json!(0));
                reply.insert("result".into(), result);
                Ok(reply)
            }
            Some(Scripted::Error(err)) => Err(err),
            None => Err(RpcError::Node {
                method: method.to_string(),
                code: RpcErrorCode::MethodNotFound,
                message: format!("the method {} does not exist", method),
            }),
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Hands out pre-built [`ScriptedMessenger`]s by endpoint and records
/// which endpoints were asked for.
#[derive(Default)]
pub struct RecordingConnector {
    nodes: Mutex<HashMap<String, Arc<ScriptedMessenger>>>,
    connected: Mutex<Vec<String>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node and return it for scripting.
    pub fn node(&self, endpoint: &str) -> Arc<ScriptedMessenger> {
        self.nodes
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_insert_with(|| Arc::new(ScriptedMessenger::new(endpoint)))
            .clone()
    }

    pub fn connected(&self) -> Vec<String> {
        self.connected.lock().unwrap().clone()
    }
}

impl Connector for RecordingConnector {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn Messenger>, RpcError> {
        self.connected.lock().unwrap().push(endpoint.to_string());
        let node = self.nodes.lock().unwrap().get(endpoint).cloned();
        match node {
            Some(node) => Ok(node as Arc<dyn Messenger>),
            None => Err(RpcError::Transport {
                method: String::new(),
                endpoint: endpoint.to_string(),
                message: "no such node".to_string(),
            }),
        }
    }
}

/// Hardware wallet stand-in that signs with an in-memory key.
pub struct KeyDevice(pub PrivateKeySigner);

#[async_trait]
impl HardwareDevice for KeyDevice {
    async fn sign_raw_payload(&self, payload: &[u8]) -> Result<[u8; 65], DeviceError> {
        let signature = self
            .0
            .sign_hash_sync(&keccak256(payload))
            .map_err(|e| DeviceError::Transport(e.to_string()))?;
        Ok(signature.as_bytes())
    }
}

/// Start a JSON-RPC backend on a free local port; `handler` maps each
/// request object to the full reply body.
pub async fn start_rpc_backend<F>(handler: F) -> SocketAddr
where
    F: Fn(Value) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_request_body(&mut socket).await else {
                            return;
                        };
                        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                        let (status, reply) = handler(request);
                        let status_text = match status {
                            200 => "200 OK",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            reply.len(),
                            reply
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Some(buf[header_end..].to_vec())
}

/// A successful JSON-RPC reply echoing the request id.
pub fn rpc_result(request: &Value, result: Value) -> (u16, String) {
    let reply = json!({"jsonrpc": "2.0", "id": request["id"], "result": result});
    (200, reply.to_string())
}

/// A JSON-RPC error reply echoing the request id.
pub fn rpc_error(request: &Value, code: i64, message: &str) -> (u16, String) {
    let reply = json!({
        "jsonrpc": "2.0",
        "id": request["id"],
        "error": {"code": code, "message": message}
    });
    (200, reply.to_string())
}
