//! Custom-role management.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use craftlens_audit::{ActivityAction, ActivityActionType, NewActivity, TargetModel, log_activity};
use craftlens_auth::{CATALOG, Permission};
use craftlens_core::CustomRoleId;
use craftlens_identity::CustomRole;
use craftlens_identity::custom_role::normalize_role_name;

use crate::app::dto::custom_role_json;
use crate::app::errors::{domain_error_to_response, json_error};
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};
use crate::rbac::check_permission;

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// GET /v1/admin/roles/permissions/available
pub async fn available_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("roles.view")],
        false,
    )?;

    let permissions: Vec<&str> = CATALOG.iter().map(Permission::as_str).collect();
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for name in &permissions {
        let resource = name.split('.').next().unwrap_or(name);
        grouped.entry(resource).or_default().push(name);
    }
    Ok(Json(json!({
        "success": true,
        "permissions": permissions,
        "groupedPermissions": grouped,
    }))
    .into_response())
}

/// GET /v1/admin/roles
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("roles.view")],
        false,
    )?;

    let roles: Vec<_> = services
        .roles
        .list()
        .into_iter()
        .map(|role| {
            let mut value = custom_role_json(&role);
            value["userCount"] = services.users.count_custom_role_users(role.id).into();
            value
        })
        .collect();

    Ok(Json(json!({ "success": true, "roles": roles })).into_response())
}

/// GET /v1/admin/roles/:id
pub async fn get(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<CustomRoleId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("roles.view")],
        false,
    )?;

    let role = load_role(&services, id)?;
    let mut value = custom_role_json(&role);
    value["userCount"] = services.users.count_custom_role_users(role.id).into();
    Ok(Json(json!({ "success": true, "role": value })).into_response())
}

/// POST /v1/admin/roles
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
        &[Permission::from_static("roles.create")],
        false,
    )?;

    let (Some(name), Some(permissions)) = (body.name, body.permissions) else {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Name and permissions are required",
        ));
    };
    let permissions: Vec<Permission> = permissions.into_iter().map(Permission::new).collect();

    let now = Utc::now();
    let role = CustomRole::new(&name, body.description, permissions, user.0.id, now)
        .map_err(domain_error_to_response)?;
    services
        .roles
        .insert(role.clone())
        .map_err(domain_error_to_response)?;

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::RoleCreated,
            ActivityActionType::Create,
            format!("Created custom role {}", role.name),
        )
        .target(
            TargetModel::CustomRole,
            Some(role.id.into()),
            Some(role.name.clone()),
        )
        .metadata(json!({ "permissions": role.permissions }))
        .request(meta.request_context()),
        now,
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "role": custom_role_json(&role) })),
    )
        .into_response())
}

/// PUT /v1/admin/roles/:id
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<CustomRoleId>,
    Json(body): Json<UpdateBody>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("roles.edit")],
        false,
    )?;

    let mut role = load_role(&services, id)?;
    let now = Utc::now();

    if let Some(name) = body.name {
        role.name = normalize_role_name(&name).map_err(domain_error_to_response)?;
    }
    if let Some(description) = body.description {
        role.description = Some(description);
    }
    if let Some(permissions) = body.permissions {
        let permissions: Vec<Permission> = permissions.into_iter().map(Permission::new).collect();
        role.set_permissions(permissions, user.0.id, now)
            .map_err(domain_error_to_response)?;
    }
    if let Some(is_active) = body.is_active {
        role.is_active = is_active;
    }
    role.updated_by = Some(user.0.id);
    role.updated_at = now;

    services
        .roles
        .update(role.clone())
        .map_err(domain_error_to_response)?;

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::RoleUpdated,
            ActivityActionType::Update,
            format!("Updated custom role {}", role.name),
        )
        .target(
            TargetModel::CustomRole,
            Some(role.id.into()),
            Some(role.name.clone()),
        )
        .metadata(json!({ "permissions": role.permissions }))
        .request(meta.request_context()),
        now,
    );

    Ok(Json(json!({ "success": true, "role": custom_role_json(&role) })).into_response())
}

/// DELETE /v1/admin/roles/:id
///
/// Deletion is blocked while any admin account still references the role;
/// orphaned references would fail closed on every request.
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<CustomRoleId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("roles.delete")],
        false,
    )?;

    let role = load_role(&services, id)?;
    let assigned = services.users.count_custom_role_users(id);
    if assigned > 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": format!(
                    "Cannot delete role. {assigned} user(s) currently have this role."
                ),
                "usersWithRole": assigned,
            })),
        )
            .into_response());
    }

    services.roles.delete(id);
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::RoleDeleted,
            ActivityActionType::Delete,
            format!("Deleted custom role {}", role.name),
        )
        .target(
            TargetModel::CustomRole,
            Some(role.id.into()),
            Some(role.name.clone()),
        )
        .request(meta.request_context()),
        Utc::now(),
    );

    Ok(Json(json!({ "success": true, "message": "Role deleted successfully" })).into_response())
}

fn load_role(services: &AppServices, id: CustomRoleId) -> Result<CustomRole, Response> {
    services
        .roles
        .get(id)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "not_found", "Role not found"))
}
