use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use varbi_core::JobService;
use varbi_core::error::AppError;
use varbi_core::traits::ApiClient;

use crate::protocol::{
    CallToolParams, CallToolResult, INTERNAL_ERROR, InitializeParams, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, RESOURCE_NOT_FOUND, ReadResourceParams, ResourceContents,
};
use crate::registry::{JobResource, JobTool, resource_definitions, tool_definitions};

pub const SERVER_NAME: &str = "Job Offers";

/// Newest first; the first entry is offered when the client asks for a
/// version we do not know.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

const INSTRUCTIONS: &str = "Read resource://jobs/categories to find a category ID, \
search it with get_jobs_by_category, then fetch an ad with get_job_description.";

#[derive(Deserialize)]
struct JobsByCategoryArgs {
    category_id: String,
    limit: i64,
}

#[derive(Deserialize)]
struct JobDescriptionArgs {
    job_id: i64,
}

/// Maps MCP methods onto the job operations.
#[derive(Clone)]
pub struct McpHandler<C: ApiClient> {
    service: JobService<C>,
}

impl<C: ApiClient> McpHandler<C> {
    pub fn new(service: JobService<C>) -> Self {
        Self { service }
    }

    /// Answer a request that carries an `id`.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.unwrap_or(Value::Null);
        match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                tracing::debug!(method = %request.method, code = error.code, "Request failed");
                JsonRpcResponse::failure(id, error)
            }
        }
    }

    /// Notifications never produce output. Cancellation is handled by the
    /// transport before it reaches this point.
    pub fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => tracing::info!("Client initialized"),
            other => tracing::debug!(method = %other, "Ignoring notification"),
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => Ok(self.initialize(optional_params(params)?)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => {
                let result = self.call_tool(required_params(params)?).await;
                serde_json::to_value(result)
                    .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))
            }
            "resources/list" => Ok(json!({ "resources": resource_definitions() })),
            "resources/templates/list" => Ok(json!({ "resourceTemplates": [] })),
            "resources/read" => self.read_resource(required_params(params)?).await,
            "prompts/list" => Ok(json!({ "prompts": [] })),
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn initialize(&self, params: InitializeParams) -> Value {
        let requested = params.protocol_version.as_deref().unwrap_or_default();
        let version = SUPPORTED_PROTOCOL_VERSIONS
            .into_iter()
            .find(|v| *v == requested)
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        tracing::info!(
            requested = %requested,
            negotiated = %version,
            client = ?params.client_info,
            "Initialize"
        );

        json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": {"listChanged": false},
                "resources": {"subscribe": false, "listChanged": false},
                "prompts": {"listChanged": false}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": INSTRUCTIONS
        })
    }

    /// Run a tool. Every outcome, including unknown tools and bad
    /// arguments, is reported inside the result rather than as a protocol
    /// error.
    pub async fn call_tool(&self, params: CallToolParams) -> CallToolResult {
        let Some(tool) = JobTool::from_name(&params.name) else {
            return CallToolResult::error(format!("Unknown tool: {}", params.name));
        };
        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        tracing::info!(tool = tool.name(), %arguments, "Calling tool");

        let outcome = match tool {
            JobTool::JobsByCategory => match tool_arguments::<JobsByCategoryArgs>(tool, arguments) {
                Ok(args) => self.service.search_jobs(&args.category_id, args.limit).await,
                Err(result) => return result,
            },
            JobTool::JobDescription => match tool_arguments::<JobDescriptionArgs>(tool, arguments) {
                Ok(args) => self.service.job_description(args.job_id).await,
                Err(result) => return result,
            },
        };

        match outcome {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                tracing::error!(tool = tool.name(), error = %e, "Tool failed");
                CallToolResult::error(format!("Error executing tool {}: {e}", tool.name()))
            }
        }
    }

    async fn read_resource(&self, params: ReadResourceParams) -> Result<Value, JsonRpcError> {
        let Some(resource) = JobResource::from_uri(&params.uri) else {
            return Err(JsonRpcError {
                code: RESOURCE_NOT_FOUND,
                message: "Resource not found".to_string(),
                data: Some(json!({ "uri": params.uri })),
            });
        };
        tracing::info!(uri = %params.uri, "Reading resource");

        let text = match resource {
            JobResource::Categories => self.service.list_categories().await,
        }
        .map_err(|e: AppError| {
            tracing::error!(uri = %params.uri, error = %e, "Resource read failed");
            JsonRpcError::new(
                INTERNAL_ERROR,
                format!("Error reading resource {}: {e}", params.uri),
            )
        })?;

        let contents = ResourceContents {
            uri: params.uri,
            mime_type: resource.definition().mime_type,
            text,
        };
        Ok(json!({ "contents": [contents] }))
    }
}

fn required_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let value = params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?;
    serde_json::from_value(value).map_err(JsonRpcError::invalid_params)
}

fn optional_params<T: DeserializeOwned + Default>(
    params: Option<Value>,
) -> Result<T, JsonRpcError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(JsonRpcError::invalid_params),
    }
}

fn tool_arguments<T: DeserializeOwned>(tool: JobTool, arguments: Value) -> Result<T, CallToolResult> {
    serde_json::from_value(arguments).map_err(|e| {
        CallToolResult::error(format!("Invalid arguments for tool {}: {e}", tool.name()))
    })
}
