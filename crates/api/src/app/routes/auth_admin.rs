//! Back-office login and session endpoints.

use std::sync::Arc;

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use craftlens_audit::{
    ActivityAction, ActivityActionType, ActorSnapshot, NewActivity, log_activity,
};
use craftlens_auth::{Role, resolve_permissions};
use craftlens_identity::{
    AccountStatus, AccountType, User, hash_password, validate_password, verify_password,
};

use crate::app::errors::{domain_error_to_response, json_error};
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

const BAD_ADMIN_CREDENTIALS: &str = "Invalid credentials or insufficient privileges";

/// POST /v1/auth/admin/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Response {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Email and password are required",
        );
    };

    let now = Utc::now();
    let meta = RequestMeta::from_parts(&method, &uri, &headers);

    // Unknown email and non-admin accounts get the same answer; the audit
    // entry keeps the attempted email either way.
    let user = match services.users.get_by_email(&email) {
        Some(user) if user.account_type == AccountType::Admin => user,
        _ => {
            log_activity(
                &services.activity_logs,
                NewActivity::new(
                    ActorSnapshot::unknown(email.trim().to_lowercase()),
                    ActivityAction::Login,
                    ActivityActionType::Auth,
                    "Failed admin login attempt",
                )
                .request(meta.request_context())
                .failed(BAD_ADMIN_CREDENTIALS),
                now,
            );
            return json_error(StatusCode::UNAUTHORIZED, "unauthorized", BAD_ADMIN_CREDENTIALS);
        }
    };

    if services.lockout.is_locked(&user.lockout, now) {
        let minutes = user
            .lockout
            .locked_until
            .map(|until| (until - now).num_minutes().max(1))
            .unwrap_or(1);
        return json_error(
            StatusCode::LOCKED,
            "account_locked",
            format!(
                "Account is locked due to too many failed login attempts. Try again in {minutes} minutes."
            ),
        );
    }

    if !verify_password(&password, &user.password_hash) {
        services
            .users
            .record_failed_login(user.id, &services.lockout, now);
        log_activity(
            &services.activity_logs,
            NewActivity::new(
                actor_of(&user),
                ActivityAction::Login,
                ActivityActionType::Auth,
                "Failed admin login attempt",
            )
            .request(meta.request_context())
            .failed("Invalid credentials"),
            now,
        );
        return json_error(StatusCode::UNAUTHORIZED, "unauthorized", BAD_ADMIN_CREDENTIALS);
    }

    match user.status {
        AccountStatus::Active => {}
        AccountStatus::Suspended => {
            return json_error(
                StatusCode::FORBIDDEN,
                "account_suspended",
                "Your account has been suspended. Please contact support.",
            );
        }
        AccountStatus::Banned => {
            return json_error(
                StatusCode::FORBIDDEN,
                "account_banned",
                "Your account has been banned.",
            );
        }
        _ => {
            return json_error(
                StatusCode::FORBIDDEN,
                "account_inactive",
                "Your account is not active. Please contact support.",
            );
        }
    }

    let user = services
        .users
        .record_login(user.id, meta.ip.clone(), now)
        .unwrap_or(user);

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            actor_of(&user),
            ActivityAction::Login,
            ActivityActionType::Auth,
            "Admin login",
        )
        .request(meta.request_context()),
        now,
    );

    let token = match services.tokens.issue(user.id, now) {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(error = %err, "token issue failed");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "Login failed, please try again",
            );
        }
    };

    Json(json!({
        "success": true,
        "token": token,
        "user": admin_identity_json(&services, &user),
    }))
    .into_response()
}

/// GET /v1/auth/admin/me
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
) -> Response {
    Json(json!({
        "success": true,
        "user": admin_identity_json(&services, user.user()),
    }))
    .into_response()
}

/// POST /v1/auth/admin/logout
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
) -> Response {
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::Logout,
            ActivityActionType::Auth,
            "Admin logout",
        )
        .request(meta.request_context()),
        Utc::now(),
    );
    Json(json!({ "success": true, "message": "Logged out successfully" })).into_response()
}

/// POST /v1/auth/admin/change-password
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<ChangePasswordBody>,
) -> Response {
    let (Some(current), Some(new)) = (body.current_password, body.new_password) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Current and new password are required",
        );
    };
    if !verify_password(&current, &user.0.password_hash) {
        return json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Current password is incorrect",
        );
    }
    if let Err(err) = validate_password(&new) {
        return domain_error_to_response(err);
    }
    let hash = match hash_password(&new) {
        Ok(hash) => hash,
        Err(err) => return domain_error_to_response(err),
    };

    let now = Utc::now();
    let mut updated = user.0.clone();
    updated.password_hash = hash;
    updated.updated_at = now;
    if let Err(err) = services.users.update(updated) {
        return domain_error_to_response(err);
    }

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::PasswordReset,
            ActivityActionType::Auth,
            "Admin changed own password",
        )
        .request(meta.request_context()),
        now,
    );

    Json(json!({ "success": true, "message": "Password changed successfully" })).into_response()
}

/// Login/me payload, with the resolved effective permissions.
fn admin_identity_json(services: &AppServices, user: &User) -> Value {
    let permissions: Vec<String> = match user.role {
        Role::SuperAdmin => vec!["*".into()],
        role => resolve_permissions(role, |id| {
            services.roles.get(id).map(|role| role.permissions)
        })
        .map(|set| {
            set.as_sorted_vec()
                .iter()
                .map(|p| p.as_str().to_string())
                .collect()
        })
        .unwrap_or_else(|_| {
            tracing::warn!(user_id = %user.id, "dangling custom role reference");
            Vec::new()
        }),
    };
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "accountType": user.account_type,
        "role": user.role.as_str(),
        "permissions": permissions,
        "lastLogin": user.last_login,
    })
}

fn actor_of(user: &User) -> ActorSnapshot {
    ActorSnapshot {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
    }
}
