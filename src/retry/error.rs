//! Classified failures from the text-generation provider.

use thiserror::Error;

/// Category of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// The provider throttled the call (HTTP 429)
    RateLimited,
    /// The call or the provider timed out
    Timeout,
    /// The provider answered with a 5xx status
    ServerError(u16),
    /// Connection-level failure before a response arrived
    Network,
    /// The provider answered but the payload was empty
    EmptyResponse,
    /// Anything else, e.g. bad request or rejected credentials
    Permanent,
}

impl ProviderErrorKind {
    /// Whether a failure of this kind is likely transient.
    pub fn is_retryable(self) -> bool {
        !matches!(self, ProviderErrorKind::Permanent)
    }

    /// Classify an HTTP status returned by the provider. `None` for success codes.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            429 => Some(ProviderErrorKind::RateLimited),
            408 => Some(ProviderErrorKind::Timeout),
            500..=599 => Some(ProviderErrorKind::ServerError(status)),
            _ => Some(ProviderErrorKind::Permanent),
        }
    }
}

/// A provider failure with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    /// Create an error of a known kind.
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create an error that only carries text, classifying it from the text.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify_message(&message),
            message,
        }
    }

    /// The provider returned nothing usable.
    pub fn empty_response() -> Self {
        Self::new(ProviderErrorKind::EmptyResponse, "Empty response received")
    }

    /// Get the failure category.
    pub fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    /// Get the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the failure is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Classify free text by the indicators providers put in their messages.
///
/// Matching is case-insensitive. Text without any indicator is permanent.
pub fn classify_message(message: &str) -> ProviderErrorKind {
    let lower = message.to_lowercase();

    if lower.contains("rate limit") || lower.contains("429") {
        return ProviderErrorKind::RateLimited;
    }
    if lower.contains("timeout") || lower.contains("timed out") {
        return ProviderErrorKind::Timeout;
    }
    for code in [500u16, 502, 503, 504] {
        if lower.contains(&code.to_string()) {
            return ProviderErrorKind::ServerError(code);
        }
    }
    if lower.contains("network")
        || lower.contains("fetch failed")
        || lower.contains("econnreset")
        || lower.contains("socket")
    {
        return ProviderErrorKind::Network;
    }
    if lower.contains("empty response") {
        return ProviderErrorKind::EmptyResponse;
    }

    ProviderErrorKind::Permanent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_transient_indicators() {
        assert_eq!(classify_message("Rate limit reached for requests"), ProviderErrorKind::RateLimited);
        assert_eq!(classify_message("HTTP 429"), ProviderErrorKind::RateLimited);
        assert_eq!(classify_message("Request Timeout"), ProviderErrorKind::Timeout);
        assert_eq!(classify_message("operation timed out"), ProviderErrorKind::Timeout);
        assert_eq!(
            classify_message("503 Service Unavailable"),
            ProviderErrorKind::ServerError(503)
        );
        assert_eq!(classify_message("502 Bad Gateway"), ProviderErrorKind::ServerError(502));
        assert_eq!(classify_message("Network unreachable"), ProviderErrorKind::Network);
        assert_eq!(classify_message("fetch failed"), ProviderErrorKind::Network);
        assert_eq!(classify_message("read ECONNRESET"), ProviderErrorKind::Network);
        assert_eq!(classify_message("socket hang up"), ProviderErrorKind::Network);
    }

    #[test]
    fn test_classify_permanent() {
        assert_eq!(classify_message("invalid api key"), ProviderErrorKind::Permanent);
        assert_eq!(classify_message("400 Bad Request"), ProviderErrorKind::Permanent);
        assert!(!ProviderError::from_message("invalid api key").is_retryable());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProviderErrorKind::from_status(200), None);
        assert_eq!(ProviderErrorKind::from_status(429), Some(ProviderErrorKind::RateLimited));
        assert_eq!(ProviderErrorKind::from_status(408), Some(ProviderErrorKind::Timeout));
        assert_eq!(
            ProviderErrorKind::from_status(504),
            Some(ProviderErrorKind::ServerError(504))
        );
        assert_eq!(ProviderErrorKind::from_status(401), Some(ProviderErrorKind::Permanent));
    }

    #[test]
    fn test_empty_response_is_retryable_with_fixed_message() {
        let err = ProviderError::empty_response();
        assert_eq!(err.to_string(), "Empty response received");
        assert_eq!(err.kind(), ProviderErrorKind::EmptyResponse);
        assert!(err.is_retryable());
        assert_eq!(classify_message(err.message()), ProviderErrorKind::EmptyResponse);
    }
}
