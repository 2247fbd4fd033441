use std::net::SocketAddr;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{OriginalUri, Path};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use varbi_client::{ClientConfig, ReqwestApiClient};

/// How long the `/v1/slow` route waits before answering.
pub const SLOW_ROUTE_DELAY: Duration = Duration::from_secs(3);

/// Routes mimicking the Varbi API, mounted under `/v1`.
fn upstream_router() -> Router {
    let v1 = Router::new()
        .route(
            "/jobs/taxonomies/occupation-field",
            get(|| async { Json(json!({"data": [{"id": "1", "attributes": {"name": "IT"}}]})) }),
        )
        .route("/jobs", get(search))
        .route("/jobs/{id}/ad", get(ad))
        .route("/echo", get(echo))
        .route(
            "/error",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"data": []}))) }),
        )
        .route(
            "/not-json",
            get(|| async { "<html><body>maintenance</body></html>" }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(SLOW_ROUTE_DELAY).await;
                Json(json!({"data": []}))
            }),
        );

    Router::new().nest("/v1", v1)
}

/// Echoes the raw query so tests can assert on the encoded filter.
///
/// Taxonomy `empty` yields no jobs; taxonomy `slow` answers after
/// [`SLOW_ROUTE_DELAY`].
async fn search(uri: Uri) -> Json<Value> {
    let query = uri.query().unwrap_or_default().to_string();
    if query.contains("filter%5Btaxonomy%5D=slow") {
        tokio::time::sleep(SLOW_ROUTE_DELAY).await;
    }
    let data = if query.contains("filter%5Btaxonomy%5D=empty") {
        json!([])
    } else {
        json!([{
            "id": 900,
            "attributes": {
                "translations": {"texts": {"title": "Data Engineer"}},
                "dates": {"deadline": "2026-12-24"}
            },
            "links": {}
        }])
    };
    Json(json!({"data": data, "query": query}))
}

async fn ad(Path(id): Path<String>) -> impl IntoResponse {
    if id == "404" {
        return (StatusCode::NOT_FOUND, Json(json!({"errors": ["not found"]})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "data": {"attributes": {"texts": {"descriptions": {
                "combined": format!("<p>Ad <b>{id}</b></p>")
            }}}}
        })),
    )
}

/// Reports the full request path, including the `/v1` prefix that nesting
/// strips from the plain `Uri` extractor.
async fn echo(OriginalUri(uri): OriginalUri, headers: HeaderMap) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "path": uri.path(),
        "query": uri.query(),
        "user_agent": header("user-agent"),
        "accept": header("accept"),
        "accept_language": header("accept-language"),
    }))
}

/// Start the mock upstream on a random port and return its address.
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

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    addr
}

pub fn client_for(addr: SocketAddr) -> ReqwestApiClient {
    client_with_timeout(addr, Duration::from_secs(30))
}

pub fn client_with_timeout(addr: SocketAddr, timeout: Duration) -> ReqwestApiClient {
    let config = ClientConfig::default()
        .with_base_url(format!("http://{addr}/v1"))
        .with_timeout(timeout);
    ReqwestApiClient::with_config(config).expect("Failed to build client")
}
