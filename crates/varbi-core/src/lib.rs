pub mod error;
pub mod format;
pub mod models;
pub mod service;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::{Absent, AppError};
pub use models::{Category, JobDescription, JobSummary};
pub use service::JobService;
pub use traits::ApiClient;
