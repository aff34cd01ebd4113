//! Authorization guards for back-office handlers.
//!
//! Handlers call these after the admin gate has attached [`AuthedUser`].
//! Every denial writes an `unauthorized_access` audit entry before the 403
//! goes out, so the trail shows who tried what.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use craftlens_audit::{ActivityAction, ActivityActionType, NewActivity, log_activity};
use craftlens_auth::{Permission, PermissionSet, ResolveError, Role, resolve_permissions};

use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};

/// Resolve the caller's effective permissions.
///
/// Fails closed when the user references a deleted custom role: the
/// misconfiguration is logged and the caller gets a 403 rather than a
/// silently empty grant.
pub fn effective_permissions(
    services: &AppServices,
    user: &AuthedUser,
) -> Result<PermissionSet, Response> {
    resolve_permissions(user.0.role, |id| {
        services.roles.get(id).map(|role| role.permissions)
    })
    .map_err(|err| {
        let ResolveError::UnresolvedCustomRole(id) = &err;
        tracing::warn!(user_id = %user.0.id, custom_role_id = %id, "dangling custom role reference");
        json_403(
            "You do not have permission to perform this action",
            json!({}),
        )
    })
}

/// Require at least one (or all, with `require_all`) of the listed
/// permissions. Super admins pass unconditionally.
pub fn check_permission(
    services: &AppServices,
    user: &AuthedUser,
    meta: &RequestMeta,
    required: &[Permission],
    require_all: bool,
) -> Result<(), Response> {
    if user.0.role == Role::SuperAdmin {
        return Ok(());
    }

    let permissions = effective_permissions(services, user)?;
    let granted = if require_all {
        permissions.grants_all(required)
    } else {
        permissions.grants_any(required)
    };
    if granted {
        return Ok(());
    }

    let required_names: Vec<&str> = required.iter().map(Permission::as_str).collect();
    let held: Vec<String> = permissions
        .as_sorted_vec()
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::UnauthorizedAccess,
            ActivityActionType::Auth,
            format!(
                "Attempted to access resource requiring: {}",
                required_names.join(", ")
            ),
        )
        .metadata(json!({
            "requiredPermissions": required_names,
            "userPermissions": held,
            "requestedPath": meta.path,
            "requestedMethod": meta.method,
        }))
        .request(meta.request_context())
        .failed("Insufficient permissions"),
        Utc::now(),
    );

    Err(json_403(
        "You do not have permission to perform this action",
        json!({ "requiredPermissions": required_names }),
    ))
}

/// Require that the caller's role is one of `allowed`. No super-admin
/// bypass here: lists that should admit super admins name them.
pub fn check_role(
    services: &AppServices,
    user: &AuthedUser,
    meta: &RequestMeta,
    allowed: &[Role],
) -> Result<(), Response> {
    if allowed.contains(&user.0.role) {
        return Ok(());
    }

    let allowed_names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::UnauthorizedAccess,
            ActivityActionType::Auth,
            format!(
                "Attempted to access resource requiring role: {}",
                allowed_names.join(", ")
            ),
        )
        .metadata(json!({
            "requiredRoles": allowed_names,
            "userRole": user.0.role.as_str(),
            "requestedPath": meta.path,
            "requestedMethod": meta.method,
        }))
        .request(meta.request_context())
        .failed("Insufficient role"),
        Utc::now(),
    );

    Err(json_403(
        "You do not have the required role to perform this action",
        json!({ "requiredRoles": allowed_names }),
    ))
}

/// Shorthand for endpoints restricted to the super admin.
pub fn super_admin_only(
    services: &AppServices,
    user: &AuthedUser,
    meta: &RequestMeta,
) -> Result<(), Response> {
    check_role(services, user, meta, &[Role::SuperAdmin])
}

fn json_403(message: &str, extra: serde_json::Value) -> Response {
    let mut body = json!({
        "success": false,
        "message": message,
    });
    if let (Some(obj), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::build_services;
    use craftlens_audit::ActivityAction;
    use craftlens_identity::{CustomRole, User};
    use craftlens_infra::repos::LogFilter;

    fn admin(services: &AppServices, email: &str, role: Role) -> AuthedUser {
        let user = User::new_admin("Ops", email, "hash", role, Utc::now()).unwrap();
        services.users.insert(user.clone()).unwrap();
        AuthedUser(user)
    }

    fn perms(names: &[&'static str]) -> Vec<Permission> {
        names.iter().map(|n| Permission::from_static(n)).collect()
    }

    #[test]
    fn super_admin_bypasses_permission_checks() {
        let services = build_services("secret");
        let user = admin(&services, "root@example.com", Role::SuperAdmin);
        let meta = RequestMeta::default();

        assert!(
            check_permission(&services, &user, &meta, &perms(&["users.delete"]), false).is_ok()
        );
        // and no denial entry was written
        assert_eq!(services.activity_logs.count(&LogFilter::default()), 0);
    }

    #[test]
    fn denial_writes_an_unauthorized_access_entry() {
        let services = build_services("secret");
        let user = admin(&services, "vera@example.com", Role::Viewer);
        let meta = RequestMeta {
            path: "/v1/admin/users/abc".into(),
            method: "DELETE".into(),
            ..Default::default()
        };

        assert!(check_permission(&services, &user, &meta, &perms(&["users.view"]), false).is_ok());
        assert!(
            check_permission(&services, &user, &meta, &perms(&["users.delete"]), false).is_err()
        );

        let filter = LogFilter {
            action: Some(ActivityAction::UnauthorizedAccess),
            ..Default::default()
        };
        let page = services.activity_logs.list(&filter, 1, 10);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].metadata["requiredPermissions"][0], "users.delete");
        assert_eq!(page.items[0].metadata["requestedMethod"], "DELETE");
    }

    #[test]
    fn require_all_needs_every_permission() {
        let services = build_services("secret");
        let user = admin(&services, "mo@example.com", Role::Moderator);
        let meta = RequestMeta::default();

        // moderators hold users.view but not users.edit
        assert!(
            check_permission(
                &services,
                &user,
                &meta,
                &perms(&["users.view", "users.edit"]),
                false
            )
            .is_ok()
        );
        assert!(
            check_permission(
                &services,
                &user,
                &meta,
                &perms(&["users.view", "users.edit"]),
                true
            )
            .is_err()
        );
    }

    #[test]
    fn role_checks_have_no_super_admin_bypass() {
        let services = build_services("secret");
        let root = admin(&services, "root@example.com", Role::SuperAdmin);
        let meta = RequestMeta::default();

        assert!(check_role(&services, &root, &meta, &[Role::Admin]).is_err());
        assert!(check_role(&services, &root, &meta, &[Role::Admin, Role::SuperAdmin]).is_ok());
        assert!(super_admin_only(&services, &root, &meta).is_ok());

        let viewer = admin(&services, "vera@example.com", Role::Viewer);
        assert!(super_admin_only(&services, &viewer, &meta).is_err());
    }

    #[test]
    fn dangling_custom_role_fails_closed() {
        let services = build_services("secret");
        let role = CustomRole::new(
            "temp",
            None,
            vec![Permission::from_static("logs.view")],
            craftlens_core::UserId::new(),
            Utc::now(),
        )
        .unwrap();
        let user = admin(&services, "temp@example.com", Role::Custom(role.id));
        let meta = RequestMeta::default();

        // role never inserted: resolution must deny, not grant empty
        assert!(effective_permissions(&services, &user).is_err());
        assert!(check_permission(&services, &user, &meta, &perms(&["logs.view"]), false).is_err());

        services.roles.insert(role).unwrap();
        assert!(check_permission(&services, &user, &meta, &perms(&["logs.view"]), false).is_ok());
    }
}
