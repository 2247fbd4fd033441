//! Test utilities: a scripted in-memory [`ApiClient`].
//!
//! Handwritten mock for dependency injection in unit tests. State sits
//! behind `Arc<Mutex<_>>` so clones share the script and the request log.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::Absent;
use crate::traits::ApiClient;

// ---------------------------------------------------------------------------
// MockApiClient
// ---------------------------------------------------------------------------

/// Mock client that replays queued responses and records requested paths.
#[derive(Clone, Default)]
pub struct MockApiClient {
    /// Queue of responses. Each call pops the first element.
    /// If empty, every call returns `Absent`.
    responses: Arc<Mutex<Vec<Result<Value, Absent>>>>,
    /// Resource paths in call order.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockApiClient {
    pub fn new(body: Value) -> Self {
        Self::with_responses(vec![Ok(body)])
    }

    pub fn absent() -> Self {
        Self::with_responses(vec![Err(Absent)])
    }

    pub fn with_responses(responses: Vec<Result<Value, Absent>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Paths requested so far.
    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl ApiClient for MockApiClient {
    async fn fetch(&self, resource: &str) -> Result<Value, Absent> {
        self.requests.lock().unwrap().push(resource.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(Absent)
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

/// A taxonomy envelope with one record per `(id, name)` pair.
pub fn taxonomy_body(categories: &[(&str, &str)]) -> Value {
    let data: Vec<Value> = categories
        .iter()
        .map(|(id, name)| serde_json::json!({"id": id, "attributes": {"name": name}}))
        .collect();
    serde_json::json!({ "data": data })
}

/// A single job search record.
pub fn job_record(id: &str, title: &str, deadline: &str, apply: Option<&str>) -> Value {
    let links = match apply {
        Some(url) => serde_json::json!({"apply": url}),
        None => serde_json::json!({}),
    };
    serde_json::json!({
        "id": id,
        "attributes": {
            "translations": {"texts": {"title": title}},
            "dates": {"deadline": deadline}
        },
        "links": links
    })
}

/// A job ad envelope whose combined description is `html`.
pub fn ad_body(html: &str) -> Value {
    serde_json::json!({
        "data": {
            "attributes": {"texts": {"descriptions": {"combined": html}}}
        }
    })
}
