//! Customer signup, login, and session endpoints.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use serde_json::json;

use craftlens_audit::{
    ActivityAction, ActivityActionType, ActorSnapshot, NewActivity, TargetModel, log_activity,
};
use craftlens_identity::{
    AccountStatus, AccountType, User, VERIFICATION_TOKEN_TTL_HOURS, hash_password,
    validate_password, verify_password,
};
use craftlens_notifications::{NewNotification, NotificationKind, create_notification};

use crate::app::dto::customer_json;
use crate::app::errors::{domain_error_to_response, json_error};
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResendBody {
    pub email: Option<String>,
}

/// POST /v1/auth/customer/signup
pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<SignupBody>,
) -> Response {
    let (Some(name), Some(email), Some(password)) = (body.name, body.email, body.password) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Name, email and password are required",
        );
    };
    if let Err(err) = validate_password(&password) {
        return domain_error_to_response(err);
    }
    let hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(err) => return domain_error_to_response(err),
    };

    let now = Utc::now();
    let token = verification_token();
    let user = match User::new_customer(name, &email, hash, token.clone(), now) {
        Ok(user) => user,
        Err(err) => return domain_error_to_response(err),
    };

    if services.users.insert(user.clone()).is_err() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "conflict",
            "Email already registered. Please login instead.",
        );
    }

    let meta = RequestMeta::from_parts(&method, &uri, &headers);
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            snapshot(&user),
            ActivityAction::Signup,
            ActivityActionType::Auth,
            "New customer account created",
        )
        .target(TargetModel::User, Some(user.id.into()), Some(user.name.clone()))
        .request(meta.request_context()),
        now,
    );
    create_notification(
        &services.notifications,
        NewNotification::new(
            user.id,
            NotificationKind::Welcome,
            "Welcome to CraftLens!",
            "Thank you for joining CraftLens. Please verify your email to get started.",
        ),
        now,
    );

    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Account created. Please verify your email to activate it.",
            "user": customer_json(&user),
            "verificationToken": token,
        })),
    )
        .into_response()
}

/// POST /v1/auth/customer/login
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

    let Some(user) = services.users.get_by_email(&email) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": "No account found with this email. Please sign up.",
                "action": "signup",
            })),
        )
            .into_response();
    };
    if user.account_type != AccountType::Customer {
        return json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "This endpoint is for customer accounts.",
        );
    }

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
        let updated = services
            .users
            .record_failed_login(user.id, &services.lockout, now);
        log_activity(
            &services.activity_logs,
            NewActivity::new(
                snapshot(&user),
                ActivityAction::Login,
                ActivityActionType::Auth,
                "Failed customer login attempt",
            )
            .request(meta.request_context())
            .failed("Invalid credentials"),
            now,
        );
        let remaining = updated
            .map(|u| {
                services
                    .lockout
                    .max_attempts
                    .saturating_sub(u.lockout.failed_attempts)
            })
            .unwrap_or(0);
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "message": "Invalid credentials",
                "attemptsRemaining": remaining,
            })),
        )
            .into_response();
    }

    if !user.is_email_verified {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "success": false,
                "message": "Please verify your email before logging in.",
                "action": "verify_email",
            })),
        )
            .into_response();
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
            snapshot(&user),
            ActivityAction::Login,
            ActivityActionType::Auth,
            "Customer login",
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
        "user": customer_json(&user),
    }))
    .into_response()
}

/// GET /v1/auth/customer/verify-email/:token
pub async fn verify_email(
    Extension(services): Extension<Arc<AppServices>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Response {
    let Some(mut user) = services.users.get_by_verification_token(&token) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "invalid_token",
            "Invalid or expired verification token",
        );
    };

    let now = Utc::now();
    if user.verification_token_expired(now) {
        return json_error(
            StatusCode::BAD_REQUEST,
            "invalid_token",
            "Invalid or expired verification token",
        );
    }
    user.verify_email(now);
    if let Err(err) = services.users.update(user.clone()) {
        return domain_error_to_response(err);
    }

    let meta = RequestMeta::from_parts(&method, &uri, &headers);
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            snapshot(&user),
            ActivityAction::EmailVerification,
            ActivityActionType::Auth,
            "Customer email verified",
        )
        .request(meta.request_context()),
        now,
    );

    Json(json!({
        "success": true,
        "message": "Email verified successfully. You can now log in.",
    }))
    .into_response()
}

/// POST /v1/auth/customer/resend-verification
///
/// Regenerates the token; the previous one stops working.
pub async fn resend_verification(
    Extension(services): Extension<Arc<AppServices>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<ResendBody>,
) -> Response {
    let Some(email) = body.email else {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "Email is required");
    };

    let user = services
        .users
        .get_by_email(&email)
        .filter(|u| u.account_type == AccountType::Customer);
    let Some(mut user) = user else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": "No account found with this email",
                "action": "signup",
            })),
        )
            .into_response();
    };
    if user.is_email_verified {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Email already verified. You can login now.",
                "action": "login",
            })),
        )
            .into_response();
    }

    let now = Utc::now();
    let token = verification_token();
    user.email_verification_token = Some(token.clone());
    user.email_verification_expires =
        Some(now + chrono::Duration::hours(VERIFICATION_TOKEN_TTL_HOURS));
    user.updated_at = now;
    if let Err(err) = services.users.update(user.clone()) {
        return domain_error_to_response(err);
    }

    let meta = RequestMeta::from_parts(&method, &uri, &headers);
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            snapshot(&user),
            ActivityAction::EmailVerification,
            ActivityActionType::Auth,
            format!("Verification token reissued for {}", user.email),
        )
        .request(meta.request_context()),
        now,
    );

    Json(json!({
        "success": true,
        "message": "Verification email sent! Please check your inbox.",
        "verificationToken": token,
    }))
    .into_response()
}

/// GET /v1/auth/customer/me
pub async fn me(Extension(user): Extension<AuthedUser>) -> Response {
    Json(json!({
        "success": true,
        "user": customer_json(user.user()),
    }))
    .into_response()
}

/// POST /v1/auth/customer/logout
///
/// Stateless tokens cannot be revoked server-side; the endpoint exists for
/// the audit trail.
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
            "Customer logout",
        )
        .request(meta.request_context()),
        Utc::now(),
    );
    Json(json!({ "success": true, "message": "Logged out successfully" })).into_response()
}

fn snapshot(user: &User) -> ActorSnapshot {
    ActorSnapshot {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
    }
}

fn verification_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
