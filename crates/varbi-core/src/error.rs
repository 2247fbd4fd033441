use thiserror::Error;

/// Failure of a single upstream fetch.
///
/// Connection errors, timeouts, non-2xx statuses and undecodable bodies all
/// collapse into this one value. Callers cannot tell them apart.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("upstream response unavailable")]
pub struct Absent;

/// Application-wide error types for the Varbi adapter.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream answered with an envelope, but a record inside it lacks a
    /// required field or has the wrong shape.
    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
