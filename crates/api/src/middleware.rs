//! Authentication gates.
//!
//! Both gates verify the bearer token, re-read the user from the store, and
//! enforce the account-status policy before the handler runs: only active
//! accounts pass. The admin gate additionally rejects customer accounts,
//! with an audit entry.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use craftlens_audit::{ActivityAction, ActivityActionType, NewActivity, log_activity};
use craftlens_auth::{JwtError, JwtValidator, TokenValidationError};
use craftlens_identity::{AccountStatus, AccountType};

use crate::app::errors::json_error;
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Gate for customer endpoints.
pub async fn customer_auth(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let (user, meta) = authenticate(&state, &req)?;

    if user.0.account_type != AccountType::Customer {
        return Err(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "This endpoint is for customer accounts.",
        ));
    }
    match user.0.status {
        AccountStatus::Active => {}
        AccountStatus::Suspended => {
            return Err(json_error(
                StatusCode::FORBIDDEN,
                "account_suspended",
                "Your account has been suspended. Please contact support.",
            ));
        }
        AccountStatus::Banned => {
            return Err(json_error(
                StatusCode::FORBIDDEN,
                "account_banned",
                "Your account has been banned.",
            ));
        }
        _ => {
            return Err(json_error(
                StatusCode::FORBIDDEN,
                "account_inactive",
                "Your account is not active. Please contact support.",
            ));
        }
    }

    req.extensions_mut().insert(user);
    req.extensions_mut().insert(meta);
    Ok(next.run(req).await)
}

/// Gate for back-office endpoints.
pub async fn admin_auth(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let (user, meta) = authenticate(&state, &req)?;

    if user.0.account_type != AccountType::Admin {
        // Audit the attempt before rejecting.
        log_activity(
            &state.services.activity_logs,
            NewActivity::new(
                user.actor(),
                ActivityAction::Login,
                ActivityActionType::Auth,
                "Unauthorized admin access attempt",
            )
            .request(meta.request_context())
            .failed("User is not an admin"),
            Utc::now(),
        );
        return Err(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Access denied. Admin privileges required.",
        ));
    }

    match user.0.status {
        AccountStatus::Active => {}
        AccountStatus::Suspended => {
            return Err(json_error(
                StatusCode::FORBIDDEN,
                "account_suspended",
                "Your account has been suspended. Please contact support.",
            ));
        }
        AccountStatus::Banned => {
            return Err(json_error(
                StatusCode::FORBIDDEN,
                "account_banned",
                "Your account has been banned.",
            ));
        }
        _ => {
            return Err(json_error(
                StatusCode::FORBIDDEN,
                "account_inactive",
                "Your account is not active. Please contact support.",
            ));
        }
    }

    req.extensions_mut().insert(user);
    req.extensions_mut().insert(meta);
    Ok(next.run(req).await)
}

/// Shared half of both gates: bearer token → claims → user record.
fn authenticate(
    state: &AuthState,
    req: &axum::http::Request<axum::body::Body>,
) -> Result<(AuthedUser, RequestMeta), Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "No authentication token, access denied",
        )
    })?;

    let claims = state
        .services
        .tokens
        .validate(token, Utc::now())
        .map_err(|err| {
            let message = match err {
                JwtError::Claims(TokenValidationError::Expired) => "Token expired",
                _ => "Invalid token",
            };
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
        })?;

    let user = state.services.users.get(claims.sub).ok_or_else(|| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "User not found, token invalid",
        )
    })?;

    let meta = RequestMeta::from_parts(req.method(), req.uri(), req.headers());
    Ok((AuthedUser(user), meta))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
