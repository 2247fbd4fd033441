//! Tools and resources advertised by the server.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const TOOL_JOBS_BY_CATEGORY: &str = "get_jobs_by_category";
pub const TOOL_JOB_DESCRIPTION: &str = "get_job_description";
pub const RESOURCE_CATEGORIES_URI: &str = "resource://jobs/categories";

/// Entry of a `tools/list` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Entry of a `resources/list` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Callable tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTool {
    JobsByCategory,
    JobDescription,
}

impl JobTool {
    pub const ALL: [JobTool; 2] = [JobTool::JobsByCategory, JobTool::JobDescription];

    pub fn name(self) -> &'static str {
        match self {
            JobTool::JobsByCategory => TOOL_JOBS_BY_CATEGORY,
            JobTool::JobDescription => TOOL_JOB_DESCRIPTION,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            JobTool::JobsByCategory => (
                "Find jobs matching a given category.",
                json!({
                    "type": "object",
                    "properties": {
                        "category_id": {
                            "type": "string",
                            "title": "Category Id",
                            "description": "ID for a job category."
                        },
                        "limit": {
                            "type": "integer",
                            "title": "Limit",
                            "description": "The maximum number of jobs to return."
                        }
                    },
                    "required": ["category_id", "limit"]
                }),
            ),
            JobTool::JobDescription => (
                "Retrieves the description of a job, in HTML.",
                json!({
                    "type": "object",
                    "properties": {
                        "job_id": {
                            "type": "integer",
                            "title": "Job Id",
                            "description": "ID for a job."
                        }
                    },
                    "required": ["job_id"]
                }),
            ),
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Readable resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobResource {
    Categories,
}

impl JobResource {
    pub const ALL: [JobResource; 1] = [JobResource::Categories];

    pub fn uri(self) -> &'static str {
        match self {
            JobResource::Categories => RESOURCE_CATEGORIES_URI,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|resource| resource.uri() == uri)
    }

    pub fn definition(self) -> ResourceDefinition {
        match self {
            JobResource::Categories => ResourceDefinition {
                uri: self.uri().to_string(),
                name: "Categories".to_string(),
                description: "A list of labels used to categorize published job offers."
                    .to_string(),
                mime_type: "text/plain".to_string(),
            },
        }
    }
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    JobTool::ALL.into_iter().map(JobTool::definition).collect()
}

pub fn resource_definitions() -> Vec<ResourceDefinition> {
    JobResource::ALL
        .into_iter()
        .map(JobResource::definition)
        .collect()
}
