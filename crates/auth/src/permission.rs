//! Permission identifiers and the fixed permission catalog.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are dot-separated `resource.action` strings (e.g.
/// `"users.view"`). A special wildcard permission `"*"` means "allow all" and
/// is only ever granted through the super-admin role, never stored on a
/// custom role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// The `resource` half of a `resource.action` permission, if present.
    pub fn resource(&self) -> Option<&str> {
        self.as_str().split_once('.').map(|(resource, _)| resource)
    }

    /// Whether this permission is part of the grantable catalog.
    pub fn is_known(&self) -> bool {
        CATALOG.iter().any(|p| p.as_str() == self.as_str())
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The complete set of grantable permissions.
///
/// Custom-role create/update validates every requested permission against
/// this slice. The wildcard is deliberately absent: it is reserved for the
/// super-admin role.
pub const CATALOG: &[Permission] = &[
    // User management
    Permission::from_static("users.view"),
    Permission::from_static("users.create"),
    Permission::from_static("users.edit"),
    Permission::from_static("users.delete"),
    Permission::from_static("users.suspend"),
    Permission::from_static("users.activate"),
    // Customer management
    Permission::from_static("customers.view"),
    Permission::from_static("customers.create"),
    Permission::from_static("customers.edit"),
    Permission::from_static("customers.delete"),
    Permission::from_static("customers.suspend"),
    Permission::from_static("customers.activate"),
    Permission::from_static("customers.verify"),
    Permission::from_static("customers.plans"),
    // Role management
    Permission::from_static("roles.view"),
    Permission::from_static("roles.create"),
    Permission::from_static("roles.edit"),
    Permission::from_static("roles.delete"),
    // Analytics
    Permission::from_static("analytics.view"),
    Permission::from_static("analytics.export"),
    // Activity logs
    Permission::from_static("logs.view"),
    Permission::from_static("logs.export"),
    Permission::from_static("logs.delete"),
    // Settings
    Permission::from_static("settings.view"),
    Permission::from_static("settings.edit"),
    // Notifications
    Permission::from_static("notifications.view"),
    Permission::from_static("notifications.send"),
    Permission::from_static("notifications.delete"),
    // System
    Permission::from_static("system.backup"),
    Permission::from_static("system.restore"),
    Permission::from_static("system.maintenance"),
];

/// A resolved set of effective permissions for one principal.
///
/// A permission is granted on exact match, through the universal `"*"`
/// wildcard, or through a resource-level `resource.*` entry covering every
/// action on that resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionSet {
    permissions: HashSet<Permission>,
}

impl PermissionSet {
    pub fn new(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// The "allow all" set (super-admin).
    pub fn wildcard() -> Self {
        Self::new([Permission::from_static("*")])
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    pub fn contains_wildcard(&self) -> bool {
        self.permissions.iter().any(Permission::is_wildcard)
    }

    /// Whether this set grants a single permission.
    pub fn grants(&self, required: &Permission) -> bool {
        if self.contains_wildcard() || self.permissions.contains(required) {
            return true;
        }
        let Some(resource) = required.resource() else {
            return false;
        };
        self.permissions
            .iter()
            .any(|held| held.as_str().strip_suffix(".*").is_some_and(|r| r == resource))
    }

    /// Whether this set grants *every* listed permission.
    pub fn grants_all(&self, required: &[Permission]) -> bool {
        required.iter().all(|p| self.grants(p))
    }

    /// Whether this set grants *any* of the listed permissions.
    pub fn grants_any(&self, required: &[Permission]) -> bool {
        required.iter().any(|p| self.grants(p))
    }

    /// Stable, sorted view for responses and audit metadata.
    pub fn as_sorted_vec(&self) -> Vec<Permission> {
        let mut out: Vec<Permission> = self.permissions.iter().cloned().collect();
        out.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        out
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(s: &'static str) -> Permission {
        Permission::from_static(s)
    }

    #[test]
    fn catalog_entries_are_unique_and_well_formed() {
        let mut seen = HashSet::new();
        for p in CATALOG {
            assert!(seen.insert(p.as_str()), "duplicate catalog entry: {p}");
            assert!(p.resource().is_some(), "catalog entry missing resource: {p}");
            assert!(!p.is_wildcard());
        }
    }

    #[test]
    fn wildcard_grants_everything() {
        let set = PermissionSet::wildcard();
        assert!(set.grants(&perm("users.delete")));
        assert!(set.grants_all(&[perm("logs.view"), perm("system.backup")]));
    }

    #[test]
    fn exact_match_without_wildcards() {
        let set = PermissionSet::new([perm("users.view")]);
        assert!(set.grants(&perm("users.view")));
        assert!(!set.grants(&perm("users.edit")));
        assert!(!set.grants(&perm("customers.view")));
    }

    #[test]
    fn resource_wildcard_covers_every_action_on_that_resource() {
        let set = PermissionSet::new([perm("logs.*")]);
        assert!(set.grants(&perm("logs.view")));
        assert!(set.grants(&perm("logs.export")));
        assert!(set.grants(&perm("logs.delete")));
        assert!(!set.grants(&perm("users.view")));
        // the resource entry itself is not the universal wildcard
        assert!(!set.contains_wildcard());
    }

    #[test]
    fn grants_any_vs_grants_all() {
        let set = PermissionSet::new([perm("logs.view"), perm("logs.export")]);
        let required = [perm("logs.view"), perm("logs.delete")];
        assert!(set.grants_any(&required));
        assert!(!set.grants_all(&required));
    }

    #[test]
    fn empty_set_grants_nothing() {
        let set = PermissionSet::default();
        assert!(!set.grants(&perm("users.view")));
        assert!(!set.grants_any(&[perm("users.view")]));
        // vacuous truth matches the "all of nothing" contract
        assert!(set.grants_all(&[]));
    }

    #[test]
    fn known_vs_unknown_permissions() {
        assert!(perm("customers.plans").is_known());
        assert!(!perm("users.impersonate").is_known());
        assert!(!perm("*").is_known());
    }
}
