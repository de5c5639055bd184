//! MCP server implementation for profile optimization.

use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::orchestrator::ProfileOrchestrator;
use crate::protocol::{
    error_codes, McpRequest, McpResponse, PromptCapabilities, ResourceCapabilities,
    ServerCapabilities, ServerInfo, ToolCapabilities,
};
use crate::tools::{self, ToolRegistry};

/// LinkedIn profile MCP server.
pub struct ProfileMcpServer {
    /// Tool registry.
    registry: ToolRegistry,
    /// Server info.
    server_info: ServerInfo,
    /// Whether the server is initialized.
    initialized: bool,
}

impl ProfileMcpServer {
    /// Create a new MCP server.
    pub fn new(orchestrator: Arc<ProfileOrchestrator>) -> Self {
        Self {
            registry: ToolRegistry::new(orchestrator),
            server_info: ServerInfo::default(),
            initialized: false,
        }
    }

    /// Run the server on stdio.
    ///
    /// Logs go to stderr; stdout carries protocol frames exclusively.
    pub async fn run_stdio(&mut self) -> Result<()> {
        info!("Starting LinkedIn MCP server on stdio");

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let reader = BufReader::new(stdin.lock());

        for line in reader.lines() {
            let line = line.map_err(Error::Io)?;
            if line.is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            let response = self.handle_message(&line).await;
            let response_json = serde_json::to_string(&response)?;

            debug!("Sending: {}", response_json);

            writeln!(stdout, "{}", response_json).map_err(Error::Io)?;
            stdout.flush().map_err(Error::Io)?;
        }

        Ok(())
    }

    /// Handle a single message.
    async fn handle_message(&mut self, message: &str) -> McpResponse {
        let request: McpRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return McpResponse::error(None, error_codes::PARSE_ERROR, e.to_string());
            }
        };

        match request.method.as_str() {
            "initialize" => self.handle_initialize(&request),
            "initialized" => self.handle_initialized(&request),
            "tools/list" => self.handle_tools_list(&request),
            "tools/call" => self.handle_tools_call(&request).await,
            "resources/list" => self.handle_resources_list(&request),
            "resources/read" => self.handle_resources_read(&request),
            "prompts/list" => self.handle_prompts_list(&request),
            "prompts/get" => self.handle_prompts_get(&request),
            "ping" => self.handle_ping(&request),
            _ => McpResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("unknown method: {}", request.method),
            ),
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&mut self, request: &McpRequest) -> McpResponse {
        info!("Initializing MCP server");

        let capabilities = ServerCapabilities {
            tools: Some(ToolCapabilities {
                list_changed: false,
            }),
            resources: Some(ResourceCapabilities {
                subscribe: false,
                list_changed: false,
            }),
            prompts: Some(PromptCapabilities {
                list_changed: false,
            }),
        };

        McpResponse::success(
            request.id.clone(),
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": capabilities,
                "serverInfo": self.server_info
            }),
        )
    }

    /// Handle initialized notification.
    fn handle_initialized(&mut self, request: &McpRequest) -> McpResponse {
        self.initialized = true;
        info!("MCP server initialized");

        McpResponse::success(request.id.clone(), json!({}))
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, request: &McpRequest) -> McpResponse {
        let tools = self.registry.definitions();

        McpResponse::success(request.id.clone(), json!({ "tools": tools }))
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, request: &McpRequest) -> McpResponse {
        let name = request.params.get("name").and_then(|v| v.as_str());
        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or(json!({}));

        let name = match name {
            Some(n) => n,
            None => {
                return McpResponse::error(
                    request.id.clone(),
                    error_codes::INVALID_PARAMS,
                    "missing tool name",
                );
            }
        };

        info!("Calling tool: {}", name);

        match self.registry.execute(name, arguments).await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(value) => McpResponse::success(request.id.clone(), value),
                Err(e) => McpResponse::error(
                    request.id.clone(),
                    error_codes::INTERNAL_ERROR,
                    e.to_string(),
                ),
            },
            Err(e) => {
                error!("Tool execution failed: {}", e);
                let code = match e {
                    Error::InvalidInput(_) | Error::InvalidParams(_) => {
                        error_codes::INVALID_PARAMS
                    }
                    _ => error_codes::INTERNAL_ERROR,
                };
                McpResponse::error(request.id.clone(), code, e.to_string())
            }
        }
    }

    /// Handle resources/list request.
    fn handle_resources_list(&self, request: &McpRequest) -> McpResponse {
        McpResponse::success(
            request.id.clone(),
            json!({ "resources": tools::resource_definitions() }),
        )
    }

    /// Handle resources/read request.
    fn handle_resources_read(&self, request: &McpRequest) -> McpResponse {
        let uri = request.params.get("uri").and_then(|v| v.as_str());

        let uri = match uri {
            Some(u) => u,
            None => {
                return McpResponse::error(
                    request.id.clone(),
                    error_codes::INVALID_PARAMS,
                    "missing resource uri",
                );
            }
        };

        match tools::read_resource(uri) {
            Ok(contents) => {
                McpResponse::success(request.id.clone(), json!({ "contents": [contents] }))
            }
            Err(e) => {
                McpResponse::error(request.id.clone(), error_codes::INVALID_PARAMS, e.to_string())
            }
        }
    }

    /// Handle prompts/list request.
    fn handle_prompts_list(&self, request: &McpRequest) -> McpResponse {
        McpResponse::success(
            request.id.clone(),
            json!({ "prompts": tools::prompt_definitions() }),
        )
    }

    /// Handle prompts/get request.
    fn handle_prompts_get(&self, request: &McpRequest) -> McpResponse {
        let name = request.params.get("name").and_then(|v| v.as_str());
        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or(json!({}));

        let name = match name {
            Some(n) => n,
            None => {
                return McpResponse::error(
                    request.id.clone(),
                    error_codes::INVALID_PARAMS,
                    "missing prompt name",
                );
            }
        };

        match tools::get_prompt(name, arguments) {
            Ok(messages) => {
                McpResponse::success(request.id.clone(), json!({ "messages": messages }))
            }
            Err(e) => {
                McpResponse::error(request.id.clone(), error_codes::INVALID_PARAMS, e.to_string())
            }
        }
    }

    /// Handle ping request.
    fn handle_ping(&self, request: &McpRequest) -> McpResponse {
        McpResponse::success(request.id.clone(), json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> ProfileMcpServer {
        ProfileMcpServer::new(Arc::new(ProfileOrchestrator::new(None)))
    }

    #[tokio::test]
    async fn test_initialize_then_tools_list() {
        let mut server = server();

        let init = server
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await;
        let result = init.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "linkedin-ai");

        let list = server
            .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}}"#)
            .await;
        let tools = list.result.unwrap();
        assert_eq!(tools["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_tools_call_round_trip() {
        let mut server = server();
        let response = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"optimize_linkedin_headline","arguments":{"current_headline":"Student","target_role":"Backend Developer"}}}"#,
            )
            .await;

        let result = response.result.unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Improved headline:"));
    }

    #[tokio::test]
    async fn test_invalid_input_maps_to_invalid_params() {
        let mut server = server();
        let response = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"optimize_linkedin_headline","arguments":{"target_role":""}}}"#,
            )
            .await;

        assert_eq!(
            response.error.unwrap().code,
            error_codes::INVALID_PARAMS
        );
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":5,"method":"bogus","params":{}}"#)
            .await;
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let mut server = server();
        let response = server.handle_message("not json").await;
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_resources_and_prompts() {
        let mut server = server();

        let list = server
            .handle_message(r#"{"jsonrpc":"2.0","id":6,"method":"resources/list","params":{}}"#)
            .await;
        let resources = list.result.unwrap();
        assert_eq!(
            resources["resources"][0]["uri"],
            "linkedin://best-practices"
        );

        let read = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":7,"method":"resources/read","params":{"uri":"linkedin://best-practices"}}"#,
            )
            .await;
        assert!(read.result.is_some());

        let prompt = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":8,"method":"prompts/get","params":{"name":"optimize_profile_for_role","arguments":{"target_role":"Data Analyst"}}}"#,
            )
            .await;
        let messages = prompt.result.unwrap();
        assert_eq!(messages["messages"][0]["role"], "user");
    }
}
