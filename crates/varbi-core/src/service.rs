use crate::error::AppError;
use crate::format;
use crate::models::{Category, JobDescription, JobSummary, decode_list, envelope_data};
use crate::traits::ApiClient;

/// Taxonomy listing every occupation field.
pub const CATEGORIES_RESOURCE: &str = "/jobs/taxonomies/occupation-field";

pub const CATEGORIES_UNAVAILABLE: &str = "Unable to fetch job categories.";
pub const JOBS_UNAVAILABLE: &str = "Unable to fetch jobs, or no jobs were found.";
pub const DESCRIPTION_UNAVAILABLE: &str = "Unable to fetch job description.";

/// Resource path for a job search. The `[taxonomy]` brackets are sent
/// percent-encoded; the arguments are interpolated as given.
pub fn jobs_by_category_resource(category_id: &str, limit: i64) -> String {
    format!("/jobs?filter%5Btaxonomy%5D={category_id}&limit={limit}")
}

pub fn job_ad_resource(job_id: i64) -> String {
    format!("/jobs/{job_id}/ad")
}

/// The three read-only job operations.
///
/// Each operation performs one upstream call. An unavailable upstream or an
/// envelope without `data` yields the operation's fixed fallback text;
/// a present but malformed payload is returned as
/// [`AppError::MalformedPayload`].
#[derive(Clone)]
pub struct JobService<C: ApiClient> {
    client: C,
}

impl<C: ApiClient> JobService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn list_categories(&self) -> Result<String, AppError> {
        let response = self.client.fetch(CATEGORIES_RESOURCE).await;
        let Some(data) = envelope_data(response) else {
            tracing::debug!("Category listing unavailable");
            return Ok(CATEGORIES_UNAVAILABLE.to_string());
        };

        let categories = decode_list(data, Category::from_record)?;
        tracing::debug!(count = categories.len(), "Listed categories");
        Ok(format::category_listing(&categories))
    }

    pub async fn search_jobs(&self, category_id: &str, limit: i64) -> Result<String, AppError> {
        let resource = jobs_by_category_resource(category_id, limit);
        let response = self.client.fetch(&resource).await;
        let Some(data) = envelope_data(response) else {
            tracing::debug!(%category_id, limit, "Job search unavailable");
            return Ok(JOBS_UNAVAILABLE.to_string());
        };

        let jobs = decode_list(data, JobSummary::from_record)?;
        tracing::debug!(%category_id, count = jobs.len(), "Found jobs");
        Ok(format::job_listing(&jobs))
    }

    pub async fn job_description(&self, job_id: i64) -> Result<String, AppError> {
        let response = self.client.fetch(&job_ad_resource(job_id)).await;
        let Some(data) = envelope_data(response) else {
            tracing::debug!(job_id, "Job description unavailable");
            return Ok(DESCRIPTION_UNAVAILABLE.to_string());
        };

        Ok(JobDescription::from_record(data)?.html)
    }
}
