//! Admin-defined custom roles.

use chrono::{DateTime, Utc};
use craftlens_auth::permission::Permission;
use craftlens_core::{CustomRoleId, DomainError, DomainResult, UserId};
use serde::{Deserialize, Serialize};

/// A named bundle of permissions that admin accounts can be assigned.
///
/// # Invariants
/// - `name` is stored normalized (lowercased, whitespace collapsed to `_`)
///   and is unique.
/// - Every permission is a member of the fixed catalog; the wildcard can
///   never be granted through a custom role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRole {
    pub id: CustomRoleId,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<Permission>,
    pub is_active: bool,
    pub created_by: UserId,
    pub updated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomRole {
    pub fn new(
        name: &str,
        description: Option<String>,
        permissions: Vec<Permission>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = normalize_role_name(name)?;
        validate_permissions(&permissions)?;
        Ok(Self {
            id: CustomRoleId::new(),
            name,
            description,
            permissions,
            is_active: true,
            created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the permission list, re-validating against the catalog.
    pub fn set_permissions(
        &mut self,
        permissions: Vec<Permission>,
        updated_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        validate_permissions(&permissions)?;
        self.permissions = permissions;
        self.updated_by = Some(updated_by);
        self.updated_at = now;
        Ok(())
    }
}

/// Lowercase and collapse whitespace runs to underscores.
pub fn normalize_role_name(name: &str) -> DomainResult<String> {
    let normalized = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    if normalized.is_empty() {
        return Err(DomainError::validation("role name is required"));
    }
    Ok(normalized)
}

fn validate_permissions(permissions: &[Permission]) -> DomainResult<()> {
    let invalid: Vec<&str> = permissions
        .iter()
        .filter(|p| !p.is_known())
        .map(Permission::as_str)
        .collect();
    if !invalid.is_empty() {
        return Err(DomainError::validation(format!(
            "invalid permissions: {}",
            invalid.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_normalized() {
        let role = CustomRole::new(
            "  Support   Agent ",
            None,
            vec![Permission::from_static("customers.view")],
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(role.name, "support_agent");
        assert!(role.is_active);
    }

    #[test]
    fn unknown_permissions_are_rejected() {
        let err = CustomRole::new(
            "auditor",
            None,
            vec![
                Permission::from_static("logs.view"),
                Permission::new("logs.rewrite"),
            ],
            UserId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("logs.rewrite"));
    }

    #[test]
    fn wildcard_cannot_be_granted() {
        let err = CustomRole::new(
            "god-mode",
            None,
            vec![Permission::from_static("*")],
            UserId::new(),
            Utc::now(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn set_permissions_revalidates_and_stamps_updater() {
        let mut role = CustomRole::new(
            "auditor",
            None,
            vec![Permission::from_static("logs.view")],
            UserId::new(),
            Utc::now(),
        )
        .unwrap();

        let editor = UserId::new();
        role.set_permissions(
            vec![Permission::from_static("logs.export")],
            editor,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(role.updated_by, Some(editor));

        let err = role.set_permissions(vec![Permission::new("nope")], editor, Utc::now());
        assert!(err.is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(normalize_role_name("   ").is_err());
    }
}
