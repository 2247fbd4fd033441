use std::future::Future;

use crate::error::Absent;

/// Issues GET requests against the upstream job API.
///
/// `resource` is a path fragment, query string included, relative to the
/// client's base URL. Implementations collapse every failure into [`Absent`].
pub trait ApiClient: Send + Sync + Clone {
    fn fetch(
        &self,
        resource: &str,
    ) -> impl Future<Output = Result<serde_json::Value, Absent>> + Send;
}
