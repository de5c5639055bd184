//! Request-scoped data model for profile optimization.
//!
//! Everything here is a value object created fresh per request and never
//! mutated after creation. Nothing persists between requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A LinkedIn profile snapshot plus the role it should be optimized for.
///
/// Headline and summary may be empty strings; an empty field is treated as
/// missing and scores maximally for optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Current headline text.
    #[serde(default)]
    pub headline: String,
    /// Current About/Summary text.
    #[serde(default)]
    pub summary: String,
    /// The job role the profile should be optimized towards.
    pub target_role: String,
}

impl Profile {
    /// Create a profile from owned field values.
    pub fn new(
        headline: impl Into<String>,
        summary: impl Into<String>,
        target_role: impl Into<String>,
    ) -> Self {
        Self {
            headline: headline.into(),
            summary: summary.into(),
            target_role: target_role.into(),
        }
    }
}

/// The optimization capabilities the decision engine can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Headline rewrite.
    #[serde(rename = "optimize_headline")]
    Headline,
    /// Summary rewrite.
    #[serde(rename = "rewrite_summary")]
    Summary,
}

impl ToolKind {
    /// All tool kinds, in the order they appear in decision traces.
    pub fn all() -> [ToolKind; 2] {
        [ToolKind::Headline, ToolKind::Summary]
    }

    /// Stable identifier used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Headline => "optimize_headline",
            ToolKind::Summary => "rewrite_summary",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score, reasons and selection verdict for one candidate tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The tool being scored.
    pub tool: ToolKind,
    /// Total score accumulated from the scoring rules.
    pub score: u32,
    /// Human-readable reason per contributing rule.
    pub reasons: Vec<String>,
    /// True iff `score` reached the tool's threshold.
    pub selected: bool,
}

/// Ordered, explainable record of the per-tool scoring for one request.
///
/// Candidates appear in `ToolKind::all()` order. The trace is created once by
/// the decision engine and handed read-only to the orchestrator and caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionTrace {
    /// One candidate per known tool.
    pub candidates: Vec<ScoredCandidate>,
}

impl DecisionTrace {
    /// Candidates whose tools were selected to run.
    pub fn selected(&self) -> impl Iterator<Item = &ScoredCandidate> {
        self.candidates.iter().filter(|c| c.selected)
    }

    /// Look up a candidate by tool.
    pub fn candidate(&self, tool: ToolKind) -> Option<&ScoredCandidate> {
        self.candidates.iter().find(|c| c.tool == tool)
    }
}

/// Output of a single tool invocation.
///
/// `used_llm` and `fallback_used` are mutually exclusive when the tool ran.
/// Both are false only when the tool failed entirely, in which case
/// `unavailable` carries the reason and `text` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The tool that produced this result.
    pub tool: ToolKind,
    /// Proposed replacement text.
    pub text: String,
    /// Human-readable rationale for the rewrite.
    pub explanation: String,
    /// True when an LLM produced the text.
    pub used_llm: bool,
    /// True when the deterministic rule-based rewrite produced the text.
    pub fallback_used: bool,
    /// Reason the tool could not produce a result, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<String>,
}

impl ToolResult {
    /// Result produced by the LLM path.
    pub fn llm(tool: ToolKind, text: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            tool,
            text: text.into(),
            explanation: explanation.into(),
            used_llm: true,
            fallback_used: false,
            unavailable: None,
        }
    }

    /// Result produced by the rule-based fallback path.
    pub fn fallback(
        tool: ToolKind,
        text: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            tool,
            text: text.into(),
            explanation: explanation.into(),
            used_llm: false,
            fallback_used: true,
            unavailable: None,
        }
    }

    /// Result recording that the tool failed and produced no text.
    pub fn unavailable(tool: ToolKind, reason: impl Into<String>) -> Self {
        Self {
            tool,
            text: String::new(),
            explanation: String::new(),
            used_llm: false,
            fallback_used: false,
            unavailable: Some(reason.into()),
        }
    }
}

/// Aggregated outcome of one optimization request.
///
/// `results` holds entries for selected tools only, in decision-trace order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    /// The explainability trace the selection was based on.
    pub decision_trace: DecisionTrace,
    /// One result per selected tool, in trace order.
    pub results: Vec<ToolResult>,
    /// OR over `used_llm` across `results`.
    pub any_llm_used: bool,
}

impl OptimizationResponse {
    /// Assemble a response, deriving the aggregate LLM-usage flag.
    pub fn new(decision_trace: DecisionTrace, results: Vec<ToolResult>) -> Self {
        let any_llm_used = results.iter().any(|r| r.used_llm);
        Self {
            decision_trace,
            results,
            any_llm_used,
        }
    }
}
