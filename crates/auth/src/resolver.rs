//! Effective-permission resolution.
//!
//! - No IO
//! - No panics
//! - No business logic beyond the role → permission mapping
//!
//! Custom-role permissions are supplied by the caller through a lookup
//! closure so storage stays out of this crate.

use craftlens_core::CustomRoleId;
use thiserror::Error;

use crate::permission::{Permission, PermissionSet};
use crate::role::{Role, builtin_set};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The user references a custom role that no longer exists.
    ///
    /// Callers must fail closed on this: a deleted role silently granting
    /// an empty permission set would hide the misconfiguration.
    #[error("custom role {0} could not be resolved")]
    UnresolvedCustomRole(CustomRoleId),
}

/// Resolve a role into its effective permission set.
///
/// `lookup` fetches the permission list of a custom role by id, returning
/// `None` when no such role exists.
pub fn resolve_permissions<F>(role: Role, lookup: F) -> Result<PermissionSet, ResolveError>
where
    F: FnOnce(CustomRoleId) -> Option<Vec<Permission>>,
{
    match role {
        Role::SuperAdmin => Ok(PermissionSet::wildcard()),
        Role::Custom(id) => match lookup(id) {
            Some(permissions) => Ok(permissions.into_iter().collect()),
            None => Err(ResolveError::UnresolvedCustomRole(id)),
        },
        other => {
            // builtin_permissions covers every remaining variant
            let table = other.builtin_permissions().unwrap_or(&[]);
            Ok(builtin_set(table))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_lookup(_: CustomRoleId) -> Option<Vec<Permission>> {
        panic!("lookup must not be called for non-custom roles")
    }

    #[test]
    fn super_admin_resolves_to_wildcard() {
        let set = resolve_permissions(Role::SuperAdmin, no_lookup).unwrap();
        assert!(set.contains_wildcard());
    }

    #[test]
    fn builtin_roles_resolve_without_lookup() {
        let set = resolve_permissions(Role::Moderator, no_lookup).unwrap();
        assert!(set.grants(&Permission::from_static("customers.edit")));
        assert!(!set.grants(&Permission::from_static("users.delete")));
    }

    #[test]
    fn customer_resolves_to_empty_set() {
        let set = resolve_permissions(Role::Customer, no_lookup).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn custom_role_uses_lookup() {
        let id = CustomRoleId::new();
        let set = resolve_permissions(Role::Custom(id), |requested| {
            assert_eq!(requested, id);
            Some(vec![Permission::from_static("logs.view")])
        })
        .unwrap();
        assert!(set.grants(&Permission::from_static("logs.view")));
        assert!(!set.contains_wildcard());
    }

    #[test]
    fn dangling_custom_role_is_an_error() {
        let id = CustomRoleId::new();
        let err = resolve_permissions(Role::Custom(id), |_| None).unwrap_err();
        assert_eq!(err, ResolveError::UnresolvedCustomRole(id));
    }
}
