//! Back-office admin-account management.

use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use craftlens_audit::{ActivityAction, ActivityActionType, NewActivity, TargetModel, log_activity};
use craftlens_auth::{Permission, Role};
use craftlens_core::{CustomRoleId, UserId};
use craftlens_identity::{
    AccountStatus, AccountType, User, hash_password, normalize_email, validate_password,
};
use craftlens_notifications::{NewNotification, NotificationKind, Priority, create_notification};

use crate::app::dto::{admin_user_json, pagination_json, parse_back_office_role};
use crate::app::errors::{domain_error_to_response, json_error};
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};
use crate::rbac::check_permission;

use craftlens_infra::repos::UserFilter;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<AccountStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub custom_role_id: Option<CustomRoleId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub custom_role_id: Option<CustomRoleId>,
    pub status: Option<AccountStatus>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SuspendBody {
    pub reason: Option<String>,
}

/// GET /v1/admin/users
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Query(query): Query<ListQuery>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("users.view")],
        false,
    )?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.limit.unwrap_or(20).clamp(1, 100);
    let filter = UserFilter {
        status: query.status,
        search: query.search,
        ..UserFilter::admins()
    };
    let (users, total) = services.users.list(&filter, page, per_page);

    Ok(Json(json!({
        "success": true,
        "users": users.iter().map(admin_user_json).collect::<Vec<_>>(),
        "pagination": pagination_json(page, per_page, total),
    }))
    .into_response())
}

/// GET /v1/admin/users/:id
pub async fn get(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("users.view")],
        false,
    )?;

    let target = load_admin(&services, id)?;
    Ok(Json(json!({ "success": true, "user": admin_user_json(&target) })).into_response())
}

/// POST /v1/admin/users
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<CreateBody>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("users.create")],
        false,
    )?;

    let (Some(name), Some(email), Some(password), Some(role_name)) =
        (body.name, body.email, body.password, body.role)
    else {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Name, email, password and role are required",
        ));
    };
    validate_password(&password).map_err(domain_error_to_response)?;
    let role = parse_back_office_role(&role_name, body.custom_role_id, |id| {
        services.roles.get(id).is_some()
    })?;
    let hash = hash_password(&password).map_err(domain_error_to_response)?;

    let now = Utc::now();
    let new_user = User::new_admin(name, &email, hash, role, now).map_err(domain_error_to_response)?;
    services
        .users
        .insert(new_user.clone())
        .map_err(domain_error_to_response)?;

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::UserCreated,
            ActivityActionType::Create,
            format!("Created admin user {}", new_user.email),
        )
        .target(
            TargetModel::User,
            Some(new_user.id.into()),
            Some(new_user.name.clone()),
        )
        .metadata(json!({ "role": new_user.role.as_str() }))
        .request(meta.request_context()),
        now,
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": admin_user_json(&new_user) })),
    )
        .into_response())
}

/// PUT /v1/admin/users/:id
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateBody>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("users.edit")],
        false,
    )?;

    let mut target = load_admin(&services, id)?;
    let now = Utc::now();

    if let Some(name) = body.name {
        let trimmed = name.trim().to_string();
        if trimmed.is_empty() {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "name is required",
            ));
        }
        target.name = trimmed;
    }
    if let Some(email) = body.email {
        target.email = normalize_email(&email).map_err(domain_error_to_response)?;
    }
    if let Some(role_name) = body.role {
        target.role = parse_back_office_role(&role_name, body.custom_role_id, |id| {
            services.roles.get(id).is_some()
        })?;
    }
    if let Some(status) = body.status {
        target.status = status;
    }
    target.updated_at = now;

    services
        .users
        .update(target.clone())
        .map_err(domain_error_to_response)?;

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::UserUpdated,
            ActivityActionType::Update,
            format!("Updated admin user {}", target.email),
        )
        .target(TargetModel::User, Some(target.id.into()), Some(target.name.clone()))
        .request(meta.request_context()),
        now,
    );

    Ok(Json(json!({ "success": true, "user": admin_user_json(&target) })).into_response())
}

/// DELETE /v1/admin/users/:id
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("users.delete")],
        false,
    )?;

    if id == user.0.id {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "You cannot delete your own account",
        ));
    }
    let target = load_admin(&services, id)?;
    if target.role == Role::SuperAdmin && user.0.role != Role::SuperAdmin {
        return Err(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Only super admin can delete another super admin",
        ));
    }
    services.users.delete(id);

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::UserDeleted,
            ActivityActionType::Delete,
            format!("Deleted admin user {}", target.email),
        )
        .target(TargetModel::User, Some(target.id.into()), Some(target.name.clone()))
        .request(meta.request_context()),
        Utc::now(),
    );

    Ok(Json(json!({ "success": true, "message": "User deleted successfully" })).into_response())
}

/// POST /v1/admin/users/:id/suspend
///
/// Targets any account, back office or customer. Super admins cannot be
/// suspended.
pub async fn suspend(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
    body: Option<Json<SuspendBody>>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("users.suspend")],
        false,
    )?;

    let mut target = load_any(&services, id)?;
    if target.role == Role::SuperAdmin {
        return Err(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Cannot suspend super admin",
        ));
    }
    if id == user.0.id {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "You cannot suspend your own account",
        ));
    }

    let reason = body.and_then(|Json(b)| b.reason);
    let now = Utc::now();
    target.status = AccountStatus::Suspended;
    target.updated_at = now;
    services
        .users
        .update(target.clone())
        .map_err(domain_error_to_response)?;

    let description = match &reason {
        Some(reason) => format!("Suspended user: {} - Reason: {reason}", target.email),
        None => format!("Suspended user: {}", target.email),
    };
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::UserSuspended,
            ActivityActionType::Update,
            description,
        )
        .target(TargetModel::User, Some(target.id.into()), Some(target.name.clone()))
        .metadata(json!({ "reason": &reason }))
        .request(meta.request_context()),
        now,
    );
    create_notification(
        &services.notifications,
        NewNotification::new(
            target.id,
            NotificationKind::AccountSuspended,
            "Account Suspended",
            reason.unwrap_or_else(|| {
                "Your account has been suspended. Please contact support for more information."
                    .to_string()
            }),
        )
        .priority(Priority::Urgent),
        now,
    );

    Ok(Json(json!({ "success": true, "user": admin_user_json(&target) })).into_response())
}

/// POST /v1/admin/users/:id/activate
pub async fn activate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("users.activate")],
        false,
    )?;

    let mut target = load_any(&services, id)?;
    let now = Utc::now();
    target.status = AccountStatus::Active;
    target.updated_at = now;
    services
        .users
        .update(target.clone())
        .map_err(domain_error_to_response)?;

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::UserActivated,
            ActivityActionType::Update,
            format!("Activated user: {}", target.email),
        )
        .target(TargetModel::User, Some(target.id.into()), Some(target.name.clone()))
        .request(meta.request_context()),
        now,
    );
    create_notification(
        &services.notifications,
        NewNotification::new(
            target.id,
            NotificationKind::AccountActivated,
            "Account Activated",
            "Your account has been activated. You can now access all features.",
        )
        .priority(Priority::High),
        now,
    );

    Ok(Json(json!({ "success": true, "user": admin_user_json(&target) })).into_response())
}

/// Fetch an admin account or 404. Customer accounts are invisible here.
fn load_admin(services: &AppServices, id: UserId) -> Result<User, Response> {
    services
        .users
        .get(id)
        .filter(|u| u.account_type == AccountType::Admin)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "not_found", "User not found"))
}

fn load_any(services: &AppServices, id: UserId) -> Result<User, Response> {
    services
        .users
        .get(id)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "not_found", "User not found"))
}
