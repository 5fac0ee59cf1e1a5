//! `POST /api/explanation`: admission-controlled explanation generation.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use super::messages::{self, explanation_failure};
use super::state::AppState;
use super::error_response;
use crate::ratelimit::{client_address, RateLimitKey};

/// Registry scope for this route.
pub const EXPLANATION_SCOPE: &str = "explanation";

/// Longest quiz content accepted, in characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// A validated explanation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationInput {
    pub content: String,
    pub is_scam: bool,
    pub scam_points: Vec<String>,
}

/// Validate the raw JSON body. Errors carry the message returned to the client.
pub fn parse_explanation_request(body: &Value) -> Result<ExplanationInput, &'static str> {
    let content = body.get("content").unwrap_or(&Value::Null);
    let is_scam = body.get("isScam").and_then(Value::as_bool);

    let is_scam = match is_scam {
        Some(flag) if !is_falsy(content) => flag,
        _ => return Err(messages::INVALID_BODY),
    };

    let content = match content.as_str() {
        Some(text) if text.chars().count() <= MAX_CONTENT_CHARS => text.to_string(),
        _ => return Err(messages::CONTENT_INVALID),
    };

    let scam_points = match body.get("scamPoints") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|p| p.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or(messages::INVALID_BODY)?,
        Some(_) => return Err(messages::INVALID_BODY),
    };

    Ok(ExplanationInput {
        content,
        is_scam,
        scam_points,
    })
}

/// Values a client might send to mean "nothing".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Handle an explanation request.
///
/// Validation runs before admission so malformed requests never spend quota.
#[instrument(skip(state, headers, body))]
pub async fn explain(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "Rejected explanation request with invalid JSON");
            return error_response(StatusCode::BAD_REQUEST, messages::INVALID_JSON);
        }
    };

    let input = match parse_explanation_request(&body) {
        Ok(input) => input,
        Err(message) => {
            debug!(reason = message, "Rejected invalid explanation request");
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    let key = RateLimitKey::new(EXPLANATION_SCOPE, &client_address(&headers));
    let identifier = key.to_identifier();
    let decision = state.admission.check(&identifier, &state.explanation_policy);

    if !decision.allowed {
        let retry_after = decision.retry_after_secs(state.admission.now_millis());
        debug!(identifier = %identifier, retry_after_secs = retry_after, "Explanation request rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [
                ("Retry-After", retry_after.to_string()),
                ("X-RateLimit-Remaining", "0".to_string()),
            ],
            Json(json!({
                "success": false,
                "error": messages::TOO_MANY_REQUESTS,
                "retryAfter": retry_after,
            })),
        )
            .into_response();
    }

    match state
        .gateway
        .generate_explanation(&input.content, input.is_scam, &input.scam_points)
        .await
    {
        Ok(explanation) => (
            StatusCode::OK,
            [("X-RateLimit-Remaining", decision.remaining.to_string())],
            Json(json!({ "success": true, "explanation": explanation })),
        )
            .into_response(),
        Err(e) => {
            error!(identifier = %identifier, kind = ?e.kind(), error = %e, "Explanation generation failed");
            let (status, message) = explanation_failure(&e);
            error_response(status, message)
        }
    }
}
