//! HTTP surface of the quiz service.

mod explanation;
mod messages;
mod quiz;
mod scores;
mod server;
mod state;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;

pub use explanation::{parse_explanation_request, ExplanationInput, EXPLANATION_SCOPE, MAX_CONTENT_CHARS};
pub use messages::explanation_failure;
pub use scores::parse_score_submission;
pub use server::HttpServer;
pub use state::AppState;

/// Page size when the client sends none or an unparsable one.
pub const DEFAULT_LIMIT: usize = 10;
/// Largest page size served.
pub const MAX_LIMIT: usize = 100;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/explanation", post(explanation::explain))
        .route("/api/quiz", get(quiz::list_quizzes))
        .route("/api/score", post(scores::submit_score))
        .route("/api/ranking", get(scores::ranking))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// `{success: false, error}` with the given status.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

/// Parse a `limit` query value, clamped to `1..=MAX_LIMIT`.
pub(crate) fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .map(|n| n.clamp(1, MAX_LIMIT))
        .unwrap_or(DEFAULT_LIMIT)
}
