//! Identifier keys for admission state.

use axum::http::HeaderMap;

/// Fallback client address when no forwarding header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// A key that uniquely identifies one client at one call site.
///
/// The scope keeps different endpoints from sharing a window for the same
/// client address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    /// The call site this key belongs to
    pub scope: String,
    /// The client identity, usually an address
    pub client: String,
}

impl RateLimitKey {
    /// Create a new key from a scope and client identity.
    pub fn new(scope: &str, client: &str) -> Self {
        Self {
            scope: scope.to_string(),
            client: client.to_string(),
        }
    }

    /// Convert the key to the identifier stored in the registry.
    pub fn to_identifier(&self) -> String {
        format!("{}:{}", self.scope, self.client)
    }
}

impl std::fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.scope, self.client)
    }
}

/// Derive the client address from proxy headers.
///
/// Uses the first hop of `x-forwarded-for`, then `x-real-ip`, then
/// [`UNKNOWN_CLIENT`].
pub fn client_address(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(addr) = forwarded {
        return addr.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
