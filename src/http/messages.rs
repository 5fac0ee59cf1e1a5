//! User-facing messages for failed requests.

use axum::http::StatusCode;

use crate::retry::{ProviderError, ProviderErrorKind};

pub const INVALID_JSON: &str = "Invalid JSON body";
pub const INVALID_BODY: &str = "Invalid request body";
pub const CONTENT_INVALID: &str = "Content too long or invalid";
pub const TOO_MANY_REQUESTS: &str = "Too many requests. Please try again later.";
pub const MISSING_FIELDS: &str = "Missing required fields";
pub const INVALID_FIELD_TYPES: &str = "Invalid field types";
pub const SCORE_SAVE_FAILED: &str = "Failed to save score";
pub const RANKING_FETCH_FAILED: &str = "Failed to fetch ranking";

pub const PROVIDER_BUSY: &str = "AI 서비스가 바쁩니다. 잠시 후 다시 시도해주세요.";
pub const PROVIDER_EMPTY: &str = "AI 응답이 비어있습니다. 다시 시도해주세요.";
pub const PROVIDER_TIMEOUT: &str = "응답 시간이 초과되었습니다. 다시 시도해주세요.";
pub const PROVIDER_FAILED: &str = "AI 응답 생성에 실패했습니다. 다시 시도해주세요.";

/// Status and message for an explanation that could not be generated.
///
/// Only provider throttling is reported as 429; everything else is a 500.
pub fn explanation_failure(error: &ProviderError) -> (StatusCode, &'static str) {
    match error.kind() {
        ProviderErrorKind::RateLimited => (StatusCode::TOO_MANY_REQUESTS, PROVIDER_BUSY),
        ProviderErrorKind::EmptyResponse => (StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_EMPTY),
        ProviderErrorKind::Timeout | ProviderErrorKind::ServerError(504) => {
            (StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_TIMEOUT)
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_FAILED),
    }
}
