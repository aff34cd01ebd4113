//! Infrastructure wiring shared by all handlers.

use std::sync::Arc;

use chrono::Utc;

use craftlens_auth::{Hs256TokenService, LockoutPolicy, Role};
use craftlens_identity::{User, hash_password};
use craftlens_infra::InMemoryStore;
use craftlens_infra::repos::{
    ActivityLogsRepo, AnalysesRepo, NotificationsRepo, RolesRepo, SettingsRepo, UsersRepo,
};

/// Application-wide services: repositories plus the token service and the
/// lockout policy. Cheap to clone behind an `Arc`.
pub struct AppServices {
    pub users: UsersRepo,
    pub roles: RolesRepo,
    pub activity_logs: ActivityLogsRepo,
    pub notifications: NotificationsRepo,
    pub analyses: AnalysesRepo,
    pub settings: SettingsRepo,
    pub tokens: Arc<Hs256TokenService>,
    pub lockout: LockoutPolicy,
}

/// Build the in-memory service graph.
pub fn build_services(jwt_secret: &str) -> AppServices {
    AppServices {
        users: UsersRepo::new(Arc::new(InMemoryStore::new())),
        roles: RolesRepo::new(Arc::new(InMemoryStore::new())),
        activity_logs: ActivityLogsRepo::new(Arc::new(InMemoryStore::new())),
        notifications: NotificationsRepo::new(Arc::new(InMemoryStore::new())),
        analyses: AnalysesRepo::new(Arc::new(InMemoryStore::new())),
        settings: SettingsRepo::new(),
        tokens: Arc::new(Hs256TokenService::new(jwt_secret.as_bytes())),
        lockout: LockoutPolicy::default(),
    }
}

impl AppServices {
    /// Provision the initial super-admin account if the email is free.
    ///
    /// Called at startup from environment configuration; a deployment with
    /// no admin account cannot bootstrap itself otherwise.
    pub fn seed_super_admin(&self, name: &str, email: &str, password: &str) {
        if self.users.get_by_email(email).is_some() {
            return;
        }
        let hash = match hash_password(password) {
            Ok(hash) => hash,
            Err(err) => {
                tracing::warn!(error = %err, "super-admin seed skipped: hashing failed");
                return;
            }
        };
        match User::new_admin(name, email, hash, Role::SuperAdmin, Utc::now()) {
            Ok(user) => {
                if let Err(err) = self.users.insert(user) {
                    tracing::warn!(error = %err, "super-admin seed skipped");
                } else {
                    tracing::info!(email, "seeded super-admin account");
                }
            }
            Err(err) => tracing::warn!(error = %err, "super-admin seed skipped: invalid input"),
        }
    }
}
