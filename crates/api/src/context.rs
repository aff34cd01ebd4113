use axum::http::{HeaderMap, Method, Uri};

use craftlens_audit::{ActorSnapshot, RequestContext};
use craftlens_identity::User;

/// The authenticated user for this request, re-read from the store by the
/// authentication gate so revocations take effect immediately.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub User);

impl AuthedUser {
    pub fn user(&self) -> &User {
        &self.0
    }

    /// Denormalized actor snapshot for audit writes.
    pub fn actor(&self) -> ActorSnapshot {
        ActorSnapshot {
            user_id: self.0.id,
            name: self.0.name.clone(),
            email: self.0.email.clone(),
            role: self.0.role.as_str().to_string(),
        }
    }
}

/// Transport details captured once per request for audit metadata.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub path: String,
    pub method: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        Self {
            path: uri.path().to_string(),
            method: method.to_string(),
            ip: client_ip(headers),
            user_agent: headers
                .get(axum::http::header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    pub fn request_context(&self) -> RequestContext {
        RequestContext {
            ip_address: self.ip.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// First hop of `x-forwarded-for`, when a proxy supplied one.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
