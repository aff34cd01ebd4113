//! Custom-role repository.

use std::sync::Arc;

use craftlens_core::{CustomRoleId, DomainError, DomainResult};
use craftlens_identity::CustomRole;
use craftlens_identity::custom_role::normalize_role_name;

use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct RolesRepo {
    store: Arc<InMemoryStore<CustomRoleId, CustomRole>>,
}

impl RolesRepo {
    pub fn new(store: Arc<InMemoryStore<CustomRoleId, CustomRole>>) -> Self {
        Self { store }
    }

    /// Insert a role, enforcing name uniqueness atomically.
    pub fn insert(&self, role: CustomRole) -> DomainResult<()> {
        self.store.with_write(|map| {
            if map.values().any(|r| r.name == role.name) {
                return Err(DomainError::conflict("role with this name already exists"));
            }
            map.insert(role.id, role);
            Ok(())
        })
    }

    pub fn get(&self, id: CustomRoleId) -> Option<CustomRole> {
        self.store.with_read(|map| map.get(&id).cloned())
    }

    /// Lookup by normalized name.
    pub fn get_by_name(&self, name: &str) -> Option<CustomRole> {
        let name = normalize_role_name(name).ok()?;
        self.store
            .with_read(|map| map.values().find(|r| r.name == name).cloned())
    }

    pub fn update(&self, role: CustomRole) -> DomainResult<()> {
        self.store.with_write(|map| {
            if !map.contains_key(&role.id) {
                return Err(DomainError::not_found());
            }
            if map.values().any(|r| r.id != role.id && r.name == role.name) {
                return Err(DomainError::conflict("role with this name already exists"));
            }
            map.insert(role.id, role);
            Ok(())
        })
    }

    pub fn delete(&self, id: CustomRoleId) -> Option<CustomRole> {
        self.store.with_write(|map| map.remove(&id))
    }

    /// All roles, sorted by name.
    pub fn list(&self) -> Vec<CustomRole> {
        let mut roles: Vec<CustomRole> = self.store.with_read(|map| map.values().cloned().collect());
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use craftlens_auth::Permission;
    use craftlens_core::UserId;

    fn repo() -> RolesRepo {
        RolesRepo::new(Arc::new(InMemoryStore::new()))
    }

    fn role(name: &str) -> CustomRole {
        CustomRole::new(
            name,
            None,
            vec![Permission::from_static("logs.view")],
            UserId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn name_uniqueness_covers_normalization() {
        let repo = repo();
        repo.insert(role("Support Agent")).unwrap();
        // normalizes to the same "support_agent"
        let err = repo.insert(role("support   agent")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn lookup_by_display_name() {
        let repo = repo();
        repo.insert(role("Support Agent")).unwrap();
        assert!(repo.get_by_name("Support Agent").is_some());
        assert!(repo.get_by_name("support_agent").is_some());
        assert!(repo.get_by_name("missing").is_none());
    }

    #[test]
    fn rename_collision_is_rejected() {
        let repo = repo();
        repo.insert(role("auditor")).unwrap();
        let mut second = role("helper");
        repo.insert(second.clone()).unwrap();

        second.name = "auditor".into();
        let err = repo.update(second).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn list_is_sorted_by_name() {
        let repo = repo();
        repo.insert(role("zeta")).unwrap();
        repo.insert(role("alpha")).unwrap();
        let names: Vec<_> = repo.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
