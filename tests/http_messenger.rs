//! HTTP messenger against a local JSON-RPC backend.

mod common;

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::*;
use hmy_transfer::rpc::{
    reply_result, Connector, DebugHook, HttpConnector, HttpMessenger, Messenger, Namespace,
    RpcError, RpcErrorCode, RpcTrace,
};
use hmy_transfer::sharding::ShardDirectory;

#[tokio::test]
async fn test_request_shape_and_result() {
    let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
    let recorder = seen.clone();
    let addr = start_rpc_backend(move |request| {
        recorder.lock().unwrap().push(request.clone());
        rpc_result(&request, json!("0xde0b6b3a7640000"))
    })
    .await;

    let messenger = HttpMessenger::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let reply = messenger
        .send_rpc("hmy_getBalance", vec![json!(ADDR_0_ONE), json!("latest")])
        .await
        .unwrap();
    assert_eq!(
        reply_result(&reply, "hmy_getBalance").unwrap(),
        &json!("0xde0b6b3a7640000")
    );

    messenger.send_rpc("hmy_blockNumber", vec![]).await.unwrap();

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["jsonrpc"], "2.0");
    assert_eq!(requests[0]["method"], "hmy_getBalance");
    assert_eq!(requests[0]["params"], json!([ADDR_0_ONE, "latest"]));
    assert_eq!(requests[0]["id"], json!(0));
    assert_eq!(requests[1]["id"], json!(1));
}

#[tokio::test]
async fn test_node_error_maps_to_code() {
    let addr = start_rpc_backend(|request| rpc_error(&request, -26, "nonce too low")).await;
    let messenger = HttpMessenger::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

    let err = messenger
        .send_rpc("hmy_sendRawTransaction", vec![json!("0x00")])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RpcError::Node {
            method: "hmy_sendRawTransaction".into(),
            code: RpcErrorCode::VerifyRejected,
            message: "nonce too low".into(),
        }
    );
}

#[tokio::test]
async fn test_http_failure_without_json_is_transport_error() {
    let addr = start_rpc_backend(|_| (502, "bad gateway".to_string())).await;
    let messenger = HttpMessenger::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

    let err = messenger.send_rpc("hmy_getBalance", vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::Transport { .. }));
}

#[tokio::test]
async fn test_non_object_reply_is_malformed() {
    let addr = start_rpc_backend(|_| (200, "[1, 2, 3]".to_string())).await;
    let messenger = HttpMessenger::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

    let err = messenger.send_rpc("hmy_getBalance", vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::MalformedReply { .. }));
}

#[tokio::test]
async fn test_debug_hook_sees_both_bodies() {
    let addr = start_rpc_backend(|request| rpc_result(&request, json!(42))).await;

    let traces = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = traces.clone();
    let hook: DebugHook = Arc::new(move |trace: RpcTrace<'_>| {
        let line = match trace {
            RpcTrace::Request { body, .. } => format!("request {}", body),
            RpcTrace::Response { body, .. } => format!("response {}", body),
        };
        sink.lock().unwrap().push(line);
    });

    let connector = HttpConnector::new(Duration::from_secs(5))
        .unwrap()
        .with_debug_hook(hook);
    let messenger = connector.connect(&format!("http://{}", addr)).unwrap();
    messenger.send_rpc("hmy_blockNumber", vec![]).await.unwrap();

    let traces = traces.lock().unwrap().clone();
    assert_eq!(traces.len(), 2);
    assert!(traces[0].starts_with("request ") && traces[0].contains("hmy_blockNumber"));
    assert!(traces[1].starts_with("response ") && traces[1].contains("42"));
}

#[tokio::test]
async fn test_resolve_directory_over_http() {
    let addr = start_rpc_backend(|request| match request["method"].as_str() {
        Some("hmy_getShardingStructure") => rpc_result(&request, sharding_structure(4)),
        _ => rpc_error(&request, -32601, "method not found"),
    })
    .await;

    let messenger = HttpMessenger::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let directory = ShardDirectory::resolve(&messenger, Namespace::Hmy).await.unwrap();
    assert_eq!(directory.shard_count(), 4);
    assert_eq!(directory.origin_endpoint(3, 0).unwrap(), shard_endpoint(3));
}
