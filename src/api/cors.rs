//! Per-connection dynamic origin-echo CORS, distinct from `tower-http`'s
//! static `CorsLayer` because the allowed set
//! and the credentials flag are both driven by runtime configuration and
//! the echoed `Access-Control-Allow-Origin` must match the request's own
//! `Origin` header, not a wildcard.

use axum::http::{HeaderMap, HeaderValue};
use tracing::warn;

/// Whether an origin is allowed, and whether credentialed requests are
/// permitted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsDecision {
    pub allow: bool,
    pub credentials: bool,
}

/// A pluggable CORS policy evaluated against the request's `Origin` header.
pub trait CorsAdapter: Send + Sync {
    fn policy(&self, origin: &str) -> CorsDecision;
}

/// Allows any origin in a configured allow-list.
pub struct AllowListCors {
    allowed_origins: Vec<String>,
    allow_credentials: bool,
}

impl AllowListCors {
    pub fn new(allowed_origins: Vec<String>, allow_credentials: bool) -> Self {
        Self {
            allowed_origins,
            allow_credentials,
        }
    }
}

impl CorsAdapter for AllowListCors {
    fn policy(&self, origin: &str) -> CorsDecision {
        let allow = self.allowed_origins.iter().any(|allowed| allowed == origin);
        CorsDecision {
            allow,
            credentials: allow && self.allow_credentials,
        }
    }
}

/// Apply `adapter`'s decision for the request's `Origin` header to
/// `headers`. If the origin is missing or disallowed, no
/// CORS headers are added and the request proceeds without them; a
/// disallowed cross-origin request is logged, not rejected outright — the
/// browser enforces the actual block.
pub fn apply_cors(adapter: &dyn CorsAdapter, request_headers: &HeaderMap, response_headers: &mut HeaderMap) {
    let Some(origin) = request_headers.get("Origin").and_then(|v| v.to_str().ok()) else {
        return;
    };

    let decision = adapter.policy(origin);
    if !decision.allow {
        warn!(origin, "CORS origin not in allow-list");
        return;
    }

    if let Ok(value) = HeaderValue::from_str(origin) {
        response_headers.insert("Access-Control-Allow-Origin", value);
    }
    response_headers.insert("Access-Control-Allow-Methods", HeaderValue::from_static("GET, OPTIONS"));
    response_headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type, Authorization, X-Requested-With, Accept, Origin, Cache-Control"),
    );
    response_headers.insert("Access-Control-Max-Age", HeaderValue::from_static("3600"));
    if decision.credentials {
        response_headers.insert("Access-Control-Allow-Credentials", HeaderValue::from_static("true"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_permits_listed_origin_only() {
        let cors = AllowListCors::new(vec!["https://app.example".to_string()], false);
        assert!(cors.policy("https://app.example").allow);
        assert!(!cors.policy("https://evil.example").allow);
    }

    #[test]
    fn credentials_only_set_when_allowed_and_origin_matches() {
        let cors = AllowListCors::new(vec!["https://app.example".to_string()], true);
        assert!(cors.policy("https://app.example").credentials);
        assert!(!cors.policy("https://evil.example").credentials);
    }

    #[test]
    fn apply_cors_no_ops_without_origin_header() {
        let cors = AllowListCors::new(vec!["https://app.example".to_string()], false);
        let request = HeaderMap::new();
        let mut response = HeaderMap::new();
        apply_cors(&cors, &request, &mut response);
        assert!(response.is_empty());
    }

    #[test]
    fn apply_cors_echoes_allowed_origin() {
        let cors = AllowListCors::new(vec!["https://app.example".to_string()], true);
        let mut request = HeaderMap::new();
        request.insert("Origin", HeaderValue::from_static("https://app.example"));
        let mut response = HeaderMap::new();
        apply_cors(&cors, &request, &mut response);

        assert_eq!(
            response.get("Access-Control-Allow-Origin").unwrap(),
            "https://app.example"
        );
        assert_eq!(response.get("Access-Control-Allow-Credentials").unwrap(), "true");
    }

    #[test]
    fn apply_cors_skips_disallowed_origin() {
        let cors = AllowListCors::new(vec!["https://app.example".to_string()], false);
        let mut request = HeaderMap::new();
        request.insert("Origin", HeaderValue::from_static("https://evil.example"));
        let mut response = HeaderMap::new();
        apply_cors(&cors, &request, &mut response);

        assert!(response.get("Access-Control-Allow-Origin").is_none());
    }
}
