//! Response JSON mapping helpers.
//!
//! The wire format is camelCase, hand-assembled with `json!` so domain
//! types never leak their internal field names into the API.

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{Value, json};

use craftlens_auth::Role;
use craftlens_core::CustomRoleId;
use craftlens_identity::{CustomRole, User};

use crate::app::errors::json_error;

/// Customer-facing self view.
pub fn customer_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "plan": user.plan,
        "analysisCount": user.analysis_count,
        "analysisLimit": user.analysis_limit,
        "monthlyResetDate": user.monthly_reset_date,
        "subscriptionStatus": user.subscription_status,
    })
}

/// Back-office listing row for an admin account.
pub fn admin_user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role.as_str(),
        "customRoleId": custom_role_id(user.role),
        "status": user.status,
        "lastLogin": user.last_login,
        "createdAt": user.created_at,
    })
}

/// Back-office detail row for a customer account.
pub fn admin_customer_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "status": user.status,
        "plan": user.plan,
        "analysisCount": user.analysis_count,
        "analysisLimit": user.analysis_limit,
        "subscriptionStatus": user.subscription_status,
        "isEmailVerified": user.is_email_verified,
        "lastLogin": user.last_login,
        "createdAt": user.created_at,
    })
}

pub fn custom_role_json(role: &CustomRole) -> Value {
    json!({
        "id": role.id,
        "name": role.name,
        "description": role.description,
        "permissions": role.permissions,
        "isActive": role.is_active,
        "createdAt": role.created_at,
        "updatedAt": role.updated_at,
    })
}

/// The standard list-endpoint pagination block.
pub fn pagination_json(page: usize, per_page: usize, total: usize) -> Value {
    let total_pages = if per_page == 0 { 0 } else { total.div_ceil(per_page) };
    json!({
        "currentPage": page,
        "totalPages": total_pages,
        "totalItems": total,
        "itemsPerPage": per_page,
    })
}

/// Parse a back-office role from request input.
///
/// Unknown names are a 400; `custom` requires a `customRoleId` and the
/// referenced role must exist.
pub fn parse_back_office_role(
    name: &str,
    custom_role_id: Option<CustomRoleId>,
    role_exists: impl FnOnce(CustomRoleId) -> bool,
) -> Result<Role, Response> {
    match name {
        "super_admin" => Ok(Role::SuperAdmin),
        "admin" => Ok(Role::Admin),
        "moderator" => Ok(Role::Moderator),
        "viewer" => Ok(Role::Viewer),
        "custom" => {
            let id = custom_role_id.ok_or_else(|| {
                json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    "customRoleId is required for custom roles",
                )
            })?;
            if !role_exists(id) {
                return Err(json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    "custom role not found",
                ));
            }
            Ok(Role::Custom(id))
        }
        other => Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("unknown role: {other}"),
        )),
    }
}

fn custom_role_id(role: Role) -> Option<CustomRoleId> {
    match role {
        Role::Custom(id) => Some(id),
        _ => None,
    }
}
