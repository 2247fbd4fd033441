use std::net::SocketAddr;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::http::Uri;
use axum::routing::get;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use varbi_client::{ClientConfig, ReqwestApiClient};
use varbi_core::JobService;
use varbi_mcp::{McpHandler, McpServer};

/// Upper bound for any single response in these tests.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

fn upstream_router() -> Router {
    let v1 = Router::new()
        .route(
            "/jobs/taxonomies/occupation-field",
            get(|| async {
                Json(json!({"data": [
                    {"id": "1", "attributes": {"name": "IT"}},
                    {"id": "2", "attributes": {"name": "Healthcare"}}
                ]}))
            }),
        )
        .route("/jobs", get(search))
        .route(
            "/jobs/{id}/ad",
            get(|Path(id): Path<i64>| async move {
                Json(json!({"data": {"attributes": {"texts": {"descriptions": {
                    "combined": format!("<h1>Job {id}</h1>")
                }}}}}))
            }),
        );

    Router::new().nest("/v1", v1)
}

/// Taxonomy `slow` stalls far longer than any test waits.
async fn search(uri: Uri) -> Json<Value> {
    if uri.query().unwrap_or_default().contains("=slow&") {
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
    Json(json!({"data": [{
        "id": "31",
        "attributes": {
            "translations": {"texts": {"title": "Site Reliability Engineer"}},
            "dates": {"deadline": "2027-01-15"}
        },
        "links": {"apply": "https://apply.example/31"}
    }]}))
}

pub async fn spawn_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, upstream_router())
            .await
            .expect("Mock upstream crashed");
    });
    addr
}

/// A running server wired to in-memory pipes.
pub struct McpSession {
    input: Option<DuplexStream>,
    output: Lines<BufReader<DuplexStream>>,
    pub shutdown: CancellationToken,
    server: JoinHandle<std::io::Result<()>>,
}

impl McpSession {
    pub async fn start() -> Self {
        let addr = spawn_upstream().await;
        let config = ClientConfig::default().with_base_url(format!("http://{addr}/v1"));
        let client = ReqwestApiClient::with_config(config).expect("Failed to build client");
        let server = McpServer::new(McpHandler::new(JobService::new(client)));

        let (client_in, server_in) = tokio::io::duplex(64 * 1024);
        let (server_out, client_out) = tokio::io::duplex(64 * 1024);
        let shutdown = CancellationToken::new();

        let token = shutdown.clone();
        let server =
            tokio::spawn(async move { server.serve(server_in, server_out, token).await });

        Self {
            input: Some(client_in),
            output: BufReader::new(client_out).lines(),
            shutdown,
            server,
        }
    }

    pub async fn send_raw(&mut self, line: &str) {
        let input = self.input.as_mut().expect("input already closed");
        input.write_all(line.as_bytes()).await.unwrap();
        input.write_all(b"\n").await.unwrap();
    }

    pub async fn send(&mut self, message: Value) {
        self.send_raw(&message.to_string()).await;
    }

    pub async fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        self.recv().await
    }

    /// Next output line as JSON; panics on timeout or EOF.
    pub async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(RESPONSE_TIMEOUT, self.output.next_line())
            .await
            .expect("Timed out waiting for response")
            .unwrap()
            .expect("Server closed output");
        serde_json::from_str(&line).unwrap()
    }

    /// Close the input and return every remaining output line.
    pub async fn finish(mut self) -> Vec<Value> {
        drop(self.input.take());
        let mut rest = Vec::new();
        while let Some(line) = tokio::time::timeout(RESPONSE_TIMEOUT, self.output.next_line())
            .await
            .expect("Timed out draining output")
            .unwrap()
        {
            rest.push(serde_json::from_str(&line).unwrap());
        }
        self.server.await.unwrap().unwrap();
        rest
    }

    pub async fn initialize(&mut self) -> Value {
        let response = self
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "integration-test", "version": "0.0.0"}
                }),
            )
            .await;
        self.send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        response
    }
}
