//! Orchestrator for the decide-then-optimize pipeline.
//!
//! One invocation per request: score the profile, run exactly the selected
//! optimizers, and reassemble their results in trace order. Everything is
//! request-scoped; concurrent requests share nothing mutable.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use crate::decision::{DecisionConfig, DecisionEngine};
use crate::error::{Error, Result};
use crate::generate::TextGenerator;
use crate::optimizer::{FieldOptimizer, HeadlineOptimizer, SummaryOptimizer};
use crate::profile::{OptimizationResponse, Profile, ToolKind, ToolResult};

/// Runs the optimization pipeline for one profile at a time.
pub struct ProfileOrchestrator {
    engine: DecisionEngine,
    optimizers: Vec<Arc<dyn FieldOptimizer>>,
}

impl ProfileOrchestrator {
    /// Create an orchestrator with the default engine and both field
    /// optimizers sharing one generator.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self::with_parts(
            DecisionEngine::new(DecisionConfig::default()),
            vec![
                Arc::new(HeadlineOptimizer::new(generator.clone())),
                Arc::new(SummaryOptimizer::new(generator)),
            ],
        )
    }

    /// Create an orchestrator from explicit parts.
    pub fn with_parts(engine: DecisionEngine, optimizers: Vec<Arc<dyn FieldOptimizer>>) -> Self {
        Self { engine, optimizers }
    }

    fn optimizer(&self, kind: ToolKind) -> Option<Arc<dyn FieldOptimizer>> {
        self.optimizers.iter().find(|o| o.kind() == kind).cloned()
    }

    /// Run the full pipeline: decide, invoke the selected tools, aggregate.
    ///
    /// Non-selected tools are never invoked and never appear in the results.
    /// A failing tool is recorded as unavailable and does not abort its
    /// siblings; the response itself always materializes.
    pub async fn optimize(&self, profile: &Profile) -> OptimizationResponse {
        let request_id = Uuid::new_v4();
        let trace = self.engine.decide(profile);

        info!(
            %request_id,
            target_role = %profile.target_role,
            selected = trace.selected().count(),
            "running selected optimization tools"
        );

        // Selected tools run concurrently; join_all keeps trace order.
        let invocations = trace.selected().map(|candidate| {
            let tool = candidate.tool;
            let optimizer = self.optimizer(tool);
            async move {
                match optimizer {
                    Some(optimizer) => optimizer.optimize(profile).await.unwrap_or_else(|e| {
                        warn!(%request_id, tool = %tool, "tool failed: {}", e);
                        ToolResult::unavailable(tool, e.to_string())
                    }),
                    None => {
                        warn!(%request_id, tool = %tool, "no optimizer registered");
                        ToolResult::unavailable(tool, "no optimizer registered for tool")
                    }
                }
            }
        });
        let results = join_all(invocations).await;

        let response = OptimizationResponse::new(trace, results);
        info!(
            %request_id,
            results = response.results.len(),
            any_llm_used = response.any_llm_used,
            "optimization complete"
        );
        response
    }

    /// Invoke a single tool directly, bypassing the decision engine.
    ///
    /// Backs the per-field endpoints, which always run their tool.
    pub async fn optimize_field(&self, kind: ToolKind, profile: &Profile) -> Result<ToolResult> {
        let optimizer = self
            .optimizer(kind)
            .ok_or_else(|| Error::ToolUnavailable(format!("no optimizer registered: {kind}")))?;
        optimizer.optimize(profile).await
    }
}

impl Default for ProfileOrchestrator {
    fn default() -> Self {
        Self::new(None)
    }
}
