//! MCP tool definitions for linkedin-agent-mcp.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::orchestrator::ProfileOrchestrator;
use crate::profile::{OptimizationResponse, Profile, ToolKind, ToolResult};
use crate::protocol::{
    PromptArgument, PromptDefinition, PromptMessage, ResourceContents, ResourceDefinition,
    ToolCallResult, ToolDefinition,
};

/// Tool trait for implementing MCP tools.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: Value, context: &ToolContext) -> Result<ToolCallResult>;
}

/// Context passed to tools during execution.
pub struct ToolContext {
    /// Profile orchestrator.
    pub orchestrator: Arc<ProfileOrchestrator>,
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    context: Arc<ToolContext>,
}

impl ToolRegistry {
    /// Create a new tool registry with the default tools.
    pub fn new(orchestrator: Arc<ProfileOrchestrator>) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            context: Arc::new(ToolContext { orchestrator }),
        };
        registry.register(Arc::new(OptimizeHeadlineTool));
        registry.register(Arc::new(RewriteSummaryTool));
        registry.register(Arc::new(OptimizeProfileTool));
        registry
    }

    /// Register a tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name.clone();
        self.tools.insert(name, tool);
    }

    /// Get all tool definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, arguments: Value) -> Result<ToolCallResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::InvalidParams(format!("unknown tool: {}", name)))?;

        tool.execute(arguments, &self.context).await
    }
}

fn require_role(target_role: &str) -> Result<()> {
    if target_role.trim().is_empty() {
        return Err(Error::InvalidInput("target_role must not be empty".into()));
    }
    Ok(())
}

// =============================================================================
// Tool Implementations
// =============================================================================

/// Tool for improving a LinkedIn headline.
pub struct OptimizeHeadlineTool;

#[derive(Debug, Deserialize)]
struct HeadlineArgs {
    #[serde(default)]
    current_headline: String,
    target_role: String,
}

#[async_trait::async_trait]
impl Tool for OptimizeHeadlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "optimize_linkedin_headline".into(),
            description: "Improve a LinkedIn headline to better match a target job role. \
                          Use when the user's role and specialization should be clearer \
                          in the headline."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "current_headline": {
                        "type": "string",
                        "description": "The current headline text (may be empty)"
                    },
                    "target_role": {
                        "type": "string",
                        "description": "The job role to optimize for"
                    }
                },
                "required": ["target_role"]
            }),
        }
    }

    async fn execute(&self, arguments: Value, context: &ToolContext) -> Result<ToolCallResult> {
        let args: HeadlineArgs =
            serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))?;
        require_role(&args.target_role)?;

        let profile = Profile::new(args.current_headline, "", args.target_role);
        let result = context
            .orchestrator
            .optimize_field(ToolKind::Headline, &profile)
            .await?;

        Ok(ToolCallResult::text(format!(
            "Improved headline: {}\nExplanation: {}",
            result.text, result.explanation
        )))
    }
}

/// Tool for rewriting a LinkedIn summary.
pub struct RewriteSummaryTool;

#[derive(Debug, Deserialize)]
struct SummaryArgs {
    #[serde(default)]
    current_summary: String,
    target_role: String,
}

#[async_trait::async_trait]
impl Tool for RewriteSummaryTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "rewrite_linkedin_summary".into(),
            description: "Rewrite a LinkedIn Summary section to align with a target job \
                          role. Use when the summary does not sufficiently reflect the \
                          user's role, experience level, or relevant keywords."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "current_summary": {
                        "type": "string",
                        "description": "The current summary text (may be empty)"
                    },
                    "target_role": {
                        "type": "string",
                        "description": "The job role to optimize for"
                    }
                },
                "required": ["target_role"]
            }),
        }
    }

    async fn execute(&self, arguments: Value, context: &ToolContext) -> Result<ToolCallResult> {
        let args: SummaryArgs =
            serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))?;
        require_role(&args.target_role)?;

        let profile = Profile::new("", args.current_summary, args.target_role);
        let result = context
            .orchestrator
            .optimize_field(ToolKind::Summary, &profile)
            .await?;

        Ok(ToolCallResult::text(format!(
            "Improved summary: {}\nExplanation: {}",
            result.text, result.explanation
        )))
    }
}

/// Tool running the full decide-and-optimize pipeline.
pub struct OptimizeProfileTool;

#[derive(Debug, Deserialize)]
struct ProfileArgs {
    #[serde(default)]
    current_headline: String,
    #[serde(default)]
    current_summary: String,
    target_role: String,
}

#[async_trait::async_trait]
impl Tool for OptimizeProfileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "optimize_linkedin_profile".into(),
            description: "Decide which parts of a LinkedIn profile need rewriting for a \
                          target role, run only the needed tools, and return the results \
                          together with an explainable decision trace."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "current_headline": {
                        "type": "string",
                        "description": "The current headline text (may be empty)"
                    },
                    "current_summary": {
                        "type": "string",
                        "description": "The current summary text (may be empty)"
                    },
                    "target_role": {
                        "type": "string",
                        "description": "The job role to optimize for"
                    }
                },
                "required": ["target_role"]
            }),
        }
    }

    async fn execute(&self, arguments: Value, context: &ToolContext) -> Result<ToolCallResult> {
        let args: ProfileArgs =
            serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))?;
        require_role(&args.target_role)?;

        let profile = Profile::new(args.current_headline, args.current_summary, args.target_role);
        let response = context.orchestrator.optimize(&profile).await;

        Ok(ToolCallResult::text(render_response(&response)))
    }
}

/// Render an optimization response as readable markdown for MCP clients.
fn render_response(response: &OptimizationResponse) -> String {
    let mut out = String::from("# Profile Optimization\n\n## Decision Trace\n\n");

    for candidate in &response.decision_trace.candidates {
        let verdict = if candidate.selected { "selected" } else { "skipped" };
        let reasons = if candidate.reasons.is_empty() {
            "no findings".to_string()
        } else {
            candidate.reasons.join(", ")
        };
        out.push_str(&format!(
            "- `{}`: score {} ({}) - {}\n",
            candidate.tool, candidate.score, verdict, reasons
        ));
    }

    if response.results.is_empty() {
        out.push_str("\nThe profile already fits the target role; no tools were run.\n");
        return out;
    }

    for result in &response.results {
        out.push_str(&format!("\n## {}\n\n", result.tool));
        out.push_str(&render_result(result));
    }

    out.push_str(&format!(
        "\n**LLM used:** {}\n",
        if response.any_llm_used { "yes" } else { "no" }
    ));
    out
}

fn render_result(result: &ToolResult) -> String {
    if let Some(reason) = &result.unavailable {
        return format!("Unavailable: {}\n", reason);
    }

    let source = if result.used_llm {
        "LLM-generated"
    } else {
        "rule-based fallback"
    };
    format!(
        "{}\n\n_Explanation ({}): {}_\n",
        result.text, source, result.explanation
    )
}

// =============================================================================
// Resources & Prompts
// =============================================================================

/// Static reference for LinkedIn profile best practices, served as an MCP
/// resource for contextual guidance.
pub const BEST_PRACTICES_URI: &str = "linkedin://best-practices";

const BEST_PRACTICES: &str = "\
LinkedIn profile best practices:

- Headline: state the target role plus one clear specialization; keep it \
under 120 characters; avoid bare labels like 'Student' or 'Engineer'.
- Summary: 2-4 short paragraphs; lead with role and experience level; \
include the keywords recruiters search for in the target role.
- Keep wording truthful to actual experience; specifics beat adjectives.
- Mirror the vocabulary of the job descriptions you are targeting.
";

/// Resource definitions for resources/list.
pub fn resource_definitions() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition {
        uri: BEST_PRACTICES_URI.into(),
        name: "LinkedIn best practices".into(),
        description: "Short, static reference for LinkedIn profile best practices.".into(),
        mime_type: "text/plain".into(),
    }]
}

/// Read a resource by URI.
pub fn read_resource(uri: &str) -> Result<ResourceContents> {
    if uri == BEST_PRACTICES_URI {
        Ok(ResourceContents {
            uri: uri.into(),
            mime_type: "text/plain".into(),
            text: BEST_PRACTICES.into(),
        })
    } else {
        Err(Error::InvalidParams(format!("unknown resource: {}", uri)))
    }
}

/// Prompt definitions for prompts/list.
pub fn prompt_definitions() -> Vec<PromptDefinition> {
    vec![PromptDefinition {
        name: "optimize_profile_for_role".into(),
        description: "Guide a model through optimizing a LinkedIn profile for a role.".into(),
        arguments: vec![
            PromptArgument {
                name: "target_role".into(),
                description: "The job role to optimize for".into(),
                required: true,
            },
            PromptArgument {
                name: "current_headline".into(),
                description: "The current headline text".into(),
                required: false,
            },
            PromptArgument {
                name: "current_summary".into(),
                description: "The current summary text".into(),
                required: false,
            },
        ],
    }]
}

#[derive(Debug, Deserialize)]
struct ProfilePromptArgs {
    target_role: String,
    #[serde(default)]
    current_headline: String,
    #[serde(default)]
    current_summary: String,
}

/// Build a prompt by name for prompts/get.
pub fn get_prompt(name: &str, arguments: Value) -> Result<Vec<PromptMessage>> {
    if name != "optimize_profile_for_role" {
        return Err(Error::InvalidParams(format!("unknown prompt: {}", name)));
    }

    let args: ProfilePromptArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))?;
    require_role(&args.target_role)?;

    let mut parts = vec![format!(
        "Optimize this LinkedIn profile for the role: **{}**.",
        args.target_role
    )];
    if !args.current_headline.is_empty() {
        parts.push(format!("Current headline: {}", args.current_headline));
    }
    if !args.current_summary.is_empty() {
        let excerpt: String = args.current_summary.chars().take(200).collect();
        parts.push(format!("Current summary (excerpt): {}...", excerpt));
    }
    parts.push(
        "Use the available tools to improve clarity, role alignment, and relevance of the \
         headline and summary."
            .to_string(),
    );

    Ok(vec![PromptMessage {
        role: "user".into(),
        content: crate::protocol::ContentItem::text(parts.join("\n")),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(ProfileOrchestrator::new(None)))
    }

    #[test]
    fn test_registry_lists_all_tools() {
        let names: Vec<String> = registry()
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();

        assert_eq!(names.len(), 3);
        assert!(names.iter().any(|n| n == "optimize_linkedin_headline"));
        assert!(names.iter().any(|n| n == "rewrite_linkedin_summary"));
        assert!(names.iter().any(|n| n == "optimize_linkedin_profile"));
    }

    #[tokio::test]
    async fn test_headline_tool_round_trip() {
        let result = registry()
            .execute(
                "optimize_linkedin_headline",
                json!({"current_headline": "Student", "target_role": "Backend Developer"}),
            )
            .await
            .unwrap();

        assert!(!result.is_error);
        let crate::protocol::ContentItem::Text { text } = &result.content[0];
        assert!(text.contains("Improved headline:"));
        assert!(text.contains("Backend Developer | APIs & Server-Side Systems"));
    }

    #[tokio::test]
    async fn test_profile_tool_renders_trace() {
        let result = registry()
            .execute(
                "optimize_linkedin_profile",
                json!({
                    "current_headline": "",
                    "current_summary": "Experienced engineer",
                    "target_role": "Senior Backend Engineer"
                }),
            )
            .await
            .unwrap();

        let crate::protocol::ContentItem::Text { text } = &result.content[0];
        assert!(text.contains("Decision Trace"));
        assert!(text.contains("optimize_headline"));
        assert!(text.contains("headline missing"));
        assert!(text.contains("**LLM used:** no"));
    }

    #[tokio::test]
    async fn test_missing_role_rejected() {
        let err = registry()
            .execute(
                "optimize_linkedin_profile",
                json!({"current_headline": "x", "target_role": "  "}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_tool_rejected() {
        let err = registry()
            .execute("no_such_tool", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn test_resource_read() {
        let contents = read_resource(BEST_PRACTICES_URI).unwrap();
        assert!(contents.text.contains("Headline"));
        assert!(read_resource("linkedin://nope").is_err());
    }

    #[test]
    fn test_prompt_build() {
        let messages = get_prompt(
            "optimize_profile_for_role",
            json!({"target_role": "Data Analyst", "current_headline": "Student"}),
        )
        .unwrap();

        let crate::protocol::ContentItem::Text { text } = &messages[0].content;
        assert!(text.contains("Data Analyst"));
        assert!(text.contains("Current headline: Student"));
    }
}
