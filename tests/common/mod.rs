//! Shared helpers for the integration tests: spawning the calculator behind
//! a real HTTP listener and reading MCP responses out of SSE bodies.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use actix_web::{App, HttpServer, web};
use arithmo_mcp_server::{Calculator, LocalSessionManager, Presentation, StreamableHttpService};
use futures::StreamExt;
use reqwest::Response;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

pub const ACCEPT_BOTH: &str = "application/json, text/event-stream";

/// Starts an HTTP server on an ephemeral port with the calculator mounted at
/// `/mcp`, and returns the endpoint URL.
pub async fn spawn_calculator(
    presentation: Presentation,
    stateful_mode: bool,
) -> (String, JoinHandle<()>) {
    let service = StreamableHttpService::builder()
        .service_factory(Arc::new(move || Ok(Calculator::new(presentation))))
        .session_manager(Arc::new(LocalSessionManager::default()))
        .stateful_mode(stateful_mode)
        .build();
    spawn_service(service).await
}

/// Starts an HTTP server on an ephemeral port serving `service` at `/mcp`.
pub async fn spawn_service(
    service: StreamableHttpService<Calculator, LocalSessionManager>,
) -> (String, JoinHandle<()>) {
    let server = HttpServer::new(move || {
        App::new().service(web::scope("/mcp").service(service.clone().scope()))
    })
    .workers(1)
    .bind("127.0.0.1:0")
    .expect("Failed to bind server");

    let addr: SocketAddr = *server.addrs().first().unwrap();
    let server_handle = server.run();
    let server_task = tokio::spawn(async move {
        let _ = server_handle.await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    (format!("http://{addr}/mcp"), server_task)
}

/// Runs `initialize` and `notifications/initialized`, returning the session id.
pub async fn open_session(client: &reqwest::Client, url: &str) -> String {
    let response = post(client, url, None, &initialize_request(1)).await;
    assert_eq!(response.status(), 200);
    let session_id = response
        .headers()
        .get("Mcp-Session-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("session id header");
    read_sse_message(response).await.expect("initialize response");

    let response = post(
        client,
        url,
        Some(&session_id),
        &json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;
    assert_eq!(response.status(), 202);

    session_id
}

/// Collects the raw body of an event stream until `pattern` shows up or the
/// timeout passes.
pub async fn read_until(response: Response, pattern: &str, timeout: Duration) -> String {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    let _ = tokio::time::timeout(timeout, async {
        while let Some(Ok(bytes)) = stream.next().await {
            body.extend_from_slice(&bytes);
            if String::from_utf8_lossy(&body).contains(pattern) {
                break;
            }
        }
    })
    .await;

    String::from_utf8_lossy(&body).into_owned()
}

pub async fn post(
    client: &reqwest::Client,
    url: &str,
    session_id: Option<&str>,
    body: &Value,
) -> Response {
    let mut request = client
        .post(url)
        .header("Accept", ACCEPT_BOTH)
        .header("Content-Type", "application/json")
        .json(body);
    if let Some(session_id) = session_id {
        request = request.header("Mcp-Session-Id", session_id);
    }
    request.send().await.expect("Failed to send request")
}

/// Reads the first SSE `data:` payload of `response` as JSON.
pub async fn read_sse_message(response: Response) -> Option<Value> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    let _ = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(Ok(bytes)) = stream.next().await {
            body.extend_from_slice(&bytes);
            if body.ends_with(b"\n\n") || body.len() > 4096 {
                break;
            }
        }
    })
    .await;

    let body_str = String::from_utf8_lossy(&body);
    body_str
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .find_map(|json_str| serde_json::from_str(json_str).ok())
}

pub fn initialize_request(id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    })
}

pub fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {
            "name": name,
            "arguments": arguments
        }
    })
}

/// Text of the first content item of a `tools/call` result.
pub fn tool_text(message: &Value) -> Option<&str> {
    message.pointer("/result/content/0/text")?.as_str()
}
