//! Role model.
//!
//! Roles are a closed enum rather than free-form strings: unknown role names
//! fail at the deserialization boundary, and a custom role carries its id so
//! the reference cannot drift apart from a separate "role kind" field.

use craftlens_core::CustomRoleId;
use serde::{Deserialize, Serialize};

use crate::permission::{Permission, PermissionSet};

/// Account role.
///
/// `Customer` is the self-service role; the rest are back-office roles. A
/// `Custom` role's permissions live on the referenced custom-role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "custom_role_id", rename_all = "snake_case")]
pub enum Role {
    Customer,
    SuperAdmin,
    Admin,
    Moderator,
    Viewer,
    Custom(CustomRoleId),
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Viewer => "viewer",
            Role::Custom(_) => "custom",
        }
    }

    /// Whether this role may pass the admin authentication gate.
    pub fn is_back_office(&self) -> bool {
        !matches!(self, Role::Customer)
    }

    /// Built-in permission grants, if this role has a fixed table.
    ///
    /// `SuperAdmin` and `Custom` are resolved elsewhere (wildcard and
    /// custom-role lookup respectively); `Customer` has no back-office
    /// permissions at all.
    pub fn builtin_permissions(&self) -> Option<&'static [Permission]> {
        match self {
            Role::Admin => Some(ADMIN_PERMISSIONS),
            Role::Moderator => Some(MODERATOR_PERMISSIONS),
            Role::Viewer => Some(VIEWER_PERMISSIONS),
            Role::Customer => Some(&[]),
            Role::SuperAdmin | Role::Custom(_) => None,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::from_static("users.view"),
    Permission::from_static("users.create"),
    Permission::from_static("users.edit"),
    Permission::from_static("users.delete"),
    Permission::from_static("customers.view"),
    Permission::from_static("customers.edit"),
    Permission::from_static("customers.plans"),
    Permission::from_static("analytics.view"),
    Permission::from_static("logs.view"),
    Permission::from_static("settings.edit"),
];

const MODERATOR_PERMISSIONS: &[Permission] = &[
    Permission::from_static("users.view"),
    Permission::from_static("customers.view"),
    Permission::from_static("customers.edit"),
    Permission::from_static("analytics.view"),
    Permission::from_static("logs.view"),
];

const VIEWER_PERMISSIONS: &[Permission] = &[
    Permission::from_static("users.view"),
    Permission::from_static("customers.view"),
    Permission::from_static("analytics.view"),
    Permission::from_static("logs.view"),
];

/// Convenience: the built-in tables as a `PermissionSet`.
pub(crate) fn builtin_set(permissions: &'static [Permission]) -> PermissionSet {
    permissions.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_reference_known_permissions_only() {
        for table in [ADMIN_PERMISSIONS, MODERATOR_PERMISSIONS, VIEWER_PERMISSIONS] {
            for p in table {
                assert!(p.is_known(), "unknown permission in builtin table: {p}");
            }
        }
    }

    #[test]
    fn viewer_is_a_subset_of_moderator_is_a_subset_of_admin() {
        let admin = builtin_set(ADMIN_PERMISSIONS);
        let moderator = builtin_set(MODERATOR_PERMISSIONS);
        for p in VIEWER_PERMISSIONS {
            assert!(moderator.grants(p));
        }
        for p in MODERATOR_PERMISSIONS {
            assert!(admin.grants(p));
        }
    }

    #[test]
    fn role_serialization_is_tagged() {
        let json = serde_json::to_value(Role::Admin).unwrap();
        assert_eq!(json["kind"], "admin");

        let id = CustomRoleId::new();
        let json = serde_json::to_value(Role::Custom(id)).unwrap();
        assert_eq!(json["kind"], "custom");
        assert_eq!(json["custom_role_id"], id.to_string());
    }

    #[test]
    fn unknown_role_kind_fails_deserialization() {
        let result: Result<Role, _> =
            serde_json::from_value(serde_json::json!({ "kind": "owner" }));
        assert!(result.is_err());
    }

    #[test]
    fn back_office_classification() {
        assert!(!Role::Customer.is_back_office());
        assert!(Role::Viewer.is_back_office());
        assert!(Role::Custom(CustomRoleId::new()).is_back_office());
    }
}
