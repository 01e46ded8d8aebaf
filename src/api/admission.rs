//! Decides whether a subscriber's connection attempt is allowed to proceed,
//! before any channel is touched.

use axum::http::HeaderMap;
use futures_util::future::BoxFuture;

use crate::auth::{SessionManager, User};

/// Outcome of an admission check.
#[derive(Debug, Clone)]
pub enum AdmissionDecision {
    Allow(IdentityScope),
    Deny(String),
}

/// The identity attached to an admitted connection, if any. `bypass` mode
/// and anonymous admission both admit with `user: None`.
#[derive(Debug, Clone, Default)]
pub struct IdentityScope {
    pub user: Option<User>,
}

/// A pluggable admission policy, evaluated once per subscribe request
/// before the channel is resolved.
pub trait AdmissionAdapter: Send + Sync {
    fn authorize<'a>(&'a self, headers: &'a HeaderMap) -> BoxFuture<'a, AdmissionDecision>;
}

/// Admits every request unconditionally. Used when
/// `sse.bypass_authentication = true`.
pub struct BypassAdmission;

impl AdmissionAdapter for BypassAdmission {
    fn authorize<'a>(&'a self, _headers: &'a HeaderMap) -> BoxFuture<'a, AdmissionDecision> {
        Box::pin(async move { AdmissionDecision::Allow(IdentityScope::default()) })
    }
}

/// Admits requests carrying a live session id, either as
/// `Authorization: Bearer <id>` or a `sse_session=<id>` cookie.
pub struct SessionAdmission {
    sessions: SessionManager,
}

impl SessionAdmission {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    fn extract_session_id(headers: &HeaderMap) -> Option<String> {
        if let Some(auth) = headers.get("Authorization") {
            if let Ok(auth) = auth.to_str() {
                if let Some(id) = auth.strip_prefix("Bearer ") {
                    return Some(id.to_string());
                }
            }
        }

        if let Some(cookie) = headers.get("Cookie") {
            if let Ok(cookie) = cookie.to_str() {
                for part in cookie.split(';') {
                    if let Some(id) = part.trim().strip_prefix("sse_session=") {
                        return Some(id.to_string());
                    }
                }
            }
        }

        None
    }
}

impl AdmissionAdapter for SessionAdmission {
    fn authorize<'a>(&'a self, headers: &'a HeaderMap) -> BoxFuture<'a, AdmissionDecision> {
        Box::pin(async move {
            let Some(session_id) = Self::extract_session_id(headers) else {
                return AdmissionDecision::Deny("missing session credentials".to_string());
            };

            match self.sessions.get_session(&session_id).await {
                Some(session) => AdmissionDecision::Allow(IdentityScope { user: Some(session.user) }),
                None => AdmissionDecision::Deny("invalid or expired session".to_string()),
            }
        })
    }
}
