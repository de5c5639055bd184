//! Secondary HTTP interface.
//!
//! Provided for local testing and manual usage; the primary interface is the
//! MCP stdio server. No business logic lives here: handlers validate input,
//! call the orchestrator, and serialize its output.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::error::{Error, Result};
use crate::orchestrator::ProfileOrchestrator;
use crate::profile::{OptimizationResponse, Profile, ToolKind};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Error::InvalidInput(_) | Error::InvalidParams(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            Error::ToolUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "TOOL_UNAVAILABLE"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

/// Request body for the per-field headline endpoint.
#[derive(Debug, Deserialize)]
pub struct HeadlineRequest {
    /// Current headline text.
    #[serde(default)]
    pub current_headline: String,
    /// Role to optimize for.
    pub target_role: String,
}

/// Response body for the per-field headline endpoint.
#[derive(Debug, Serialize)]
pub struct HeadlineResponse {
    /// Proposed headline.
    pub improved_headline: String,
    /// Human-readable rationale.
    pub explanation: String,
    /// Whether an LLM produced the text.
    pub llm_used: bool,
}

/// Request body for the per-field summary endpoint.
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    /// Current summary text.
    #[serde(default)]
    pub current_summary: String,
    /// Role to optimize for.
    pub target_role: String,
}

/// Response body for the per-field summary endpoint.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Proposed summary.
    pub improved_summary: String,
    /// Human-readable rationale.
    pub explanation: String,
    /// Whether an LLM produced the text.
    pub llm_used: bool,
}

/// Request body for the full optimization endpoint.
#[derive(Debug, Deserialize)]
pub struct OptimizeProfileRequest {
    /// Current headline text.
    #[serde(default)]
    pub current_headline: String,
    /// Current summary text.
    #[serde(default)]
    pub current_summary: String,
    /// Role to optimize for.
    pub target_role: String,
}

fn validated_profile(headline: String, summary: String, target_role: String) -> Result<Profile> {
    if target_role.trim().is_empty() {
        return Err(Error::InvalidInput("target_role must not be empty".into()));
    }
    Ok(Profile::new(headline, summary, target_role))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn optimize_headline_handler(
    State(orchestrator): State<Arc<ProfileOrchestrator>>,
    Json(body): Json<HeadlineRequest>,
) -> Result<Json<HeadlineResponse>> {
    let profile = validated_profile(body.current_headline, String::new(), body.target_role)?;
    let result = orchestrator
        .optimize_field(ToolKind::Headline, &profile)
        .await?;

    Ok(Json(HeadlineResponse {
        improved_headline: result.text,
        explanation: result.explanation,
        llm_used: result.used_llm,
    }))
}

async fn rewrite_summary_handler(
    State(orchestrator): State<Arc<ProfileOrchestrator>>,
    Json(body): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>> {
    let profile = validated_profile(String::new(), body.current_summary, body.target_role)?;
    let result = orchestrator
        .optimize_field(ToolKind::Summary, &profile)
        .await?;

    Ok(Json(SummaryResponse {
        improved_summary: result.text,
        explanation: result.explanation,
        llm_used: result.used_llm,
    }))
}

async fn optimize_profile_handler(
    State(orchestrator): State<Arc<ProfileOrchestrator>>,
    Json(body): Json<OptimizeProfileRequest>,
) -> Result<Json<OptimizationResponse>> {
    let profile = validated_profile(
        body.current_headline,
        body.current_summary,
        body.target_role,
    )?;
    Ok(Json(orchestrator.optimize(&profile).await))
}

/// Build the HTTP router.
pub fn build_router(orchestrator: Arc<ProfileOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/tools/optimize-headline", post(optimize_headline_handler))
        .route("/tools/rewrite-summary", post(rewrite_summary_handler))
        .route("/ai/optimize-linkedin", post(optimize_profile_handler))
        .with_state(orchestrator)
}

/// Serve the HTTP interface until the process is stopped.
pub async fn serve(orchestrator: Arc<ProfileOrchestrator>, port: u16) -> Result<()> {
    let app = build_router(orchestrator)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("HTTP interface listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await.map_err(Error::Io)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn router() -> Router {
        build_router(Arc::new(ProfileOrchestrator::new(None)))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_optimize_headline_endpoint() {
        let response = router()
            .oneshot(post_json(
                "/tools/optimize-headline",
                json!({"current_headline": "Student", "target_role": "Backend Developer"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["improved_headline"],
            "Backend Developer | APIs & Server-Side Systems"
        );
        assert_eq!(body["llm_used"], false);
    }

    #[tokio::test]
    async fn test_optimize_profile_endpoint() {
        let response = router()
            .oneshot(post_json(
                "/ai/optimize-linkedin",
                json!({
                    "current_headline": "",
                    "current_summary": "Experienced engineer",
                    "target_role": "Senior Backend Engineer"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        let trace = body["decision_trace"].as_array().unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0]["tool"], "optimize_headline");
        assert_eq!(trace[0]["selected"], true);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results[0]["fallback_used"], true);
        assert_eq!(body["any_llm_used"], false);
    }

    #[tokio::test]
    async fn test_missing_role_is_bad_request() {
        let response = router()
            .oneshot(post_json(
                "/ai/optimize-linkedin",
                json!({"current_headline": "x", "target_role": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }
}
