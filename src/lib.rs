//! LinkedIn Profile Optimization MCP Server
//!
//! This crate decides whether a LinkedIn profile's headline and/or summary
//! should be rewritten for a target role, and if so invokes isolated
//! optimization tools (optionally backed by an LLM) to produce replacement
//! text. It exposes this behavior through two interchangeable interfaces:
//! an MCP stdio server for AI-agent consumption (primary) and a small HTTP
//! API for manual testing (secondary).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │           AI agent (MCP stdio)  /  curl (HTTP)              │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     linkedin-agent-mcp                      │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐   │
//! │  │ Decision     │─▶│ Orchestrator │─▶│ Field optimizers │   │
//! │  │ Engine       │  │              │  │ headline/summary │   │
//! │  └──────────────┘  └──────────────┘  └────────┬─────────┘   │
//! └────────────────────────────────────────────────┼────────────┘
//!                                                  ▼
//!                                    ┌──────────────────────────┐
//!                                    │ LLM (optional), with     │
//!                                    │ deterministic fallback   │
//!                                    └──────────────────────────┘
//! ```
//!
//! The decision engine scores each candidate tool from deterministic rules
//! and records a per-tool trace of scores and reasons. The orchestrator runs
//! only the selected tools and attaches the trace to the response, so every
//! rewrite is explainable.
//!
//! # MCP Tools
//!
//! | Tool | Description |
//! |------|-------------|
//! | `optimize_linkedin_headline` | Improve a headline for a target role |
//! | `rewrite_linkedin_summary` | Rewrite a summary for a target role |
//! | `optimize_linkedin_profile` | Full decide-and-optimize pipeline |

pub mod config;
pub mod decision;
pub mod error;
pub mod generate;
pub mod http;
pub mod optimizer;
pub mod orchestrator;
pub mod profile;
pub mod protocol;
pub mod server;
pub mod tools;

pub use decision::{DecisionConfig, DecisionEngine};
pub use error::{Error, Result};
pub use orchestrator::ProfileOrchestrator;
pub use profile::{DecisionTrace, OptimizationResponse, Profile, ToolKind, ToolResult};
pub use protocol::{McpRequest, McpResponse};
pub use server::ProfileMcpServer;
