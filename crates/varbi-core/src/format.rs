//! Plain-text rendering of decoded records.

use crate::models::{Category, JobSummary};

/// Separator placed between consecutive records in a listing.
pub const RECORD_SEPARATOR: &str = "\n---\n";

/// Sentence that opens the category listing.
pub const CATEGORY_LEAD_IN: &str =
    "Here is a list of all available categories when searching for published jobs:\n\n";

/// Placeholder shown for a job without an application form link.
pub const NO_APPLY_LINK: &str = "None";

pub fn category(category: &Category) -> String {
    format!("ID: {}\nName: {}", category.id, category.name)
}

pub fn job_summary(job: &JobSummary) -> String {
    format!(
        "ID: {}\nTitle: {}\nDeadline: {}\nLink to application form: {}",
        job.id,
        job.title,
        job.deadline,
        job.apply_link.as_deref().unwrap_or(NO_APPLY_LINK)
    )
}

/// Lead-in sentence followed by every category block.
pub fn category_listing(categories: &[Category]) -> String {
    let blocks: Vec<String> = categories.iter().map(category).collect();
    format!("{CATEGORY_LEAD_IN}{}", blocks.join(RECORD_SEPARATOR))
}

/// Job blocks joined by [`RECORD_SEPARATOR`]. An empty slice renders as "".
pub fn job_listing(jobs: &[JobSummary]) -> String {
    jobs.iter()
        .map(job_summary)
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}
