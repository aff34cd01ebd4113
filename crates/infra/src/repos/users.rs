//! User repository.
//!
//! The email-uniqueness check and both counters (analysis quota, login
//! attempts) run as single critical sections; see
//! [`InMemoryStore::with_write`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use craftlens_auth::{LockoutPolicy, Role};
use craftlens_core::{CustomRoleId, DomainError, DomainResult, UserId};
use craftlens_identity::{AccountStatus, AccountType, Plan, SubscriptionStatus, User};

use crate::store::InMemoryStore;

/// Query filter for admin user/customer listings.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub account_type: Option<AccountType>,
    pub status: Option<AccountStatus>,
    pub plan: Option<Plan>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub is_email_verified: Option<bool>,
    /// Case-insensitive substring match on name or email.
    pub search: Option<String>,
}

impl UserFilter {
    pub fn customers() -> Self {
        Self {
            account_type: Some(AccountType::Customer),
            ..Default::default()
        }
    }

    pub fn admins() -> Self {
        Self {
            account_type: Some(AccountType::Admin),
            ..Default::default()
        }
    }

    fn matches(&self, user: &User) -> bool {
        if self.account_type.is_some_and(|t| user.account_type != t) {
            return false;
        }
        if self.status.is_some_and(|s| user.status != s) {
            return false;
        }
        if self.plan.is_some_and(|p| user.plan != p) {
            return false;
        }
        if self
            .subscription_status
            .is_some_and(|s| user.subscription_status != s)
        {
            return false;
        }
        if self
            .is_email_verified
            .is_some_and(|v| user.is_email_verified != v)
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !user.name.to_lowercase().contains(&needle) && !user.email.contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsumeQuotaError {
    #[error("user not found")]
    NotFound,

    #[error("analysis limit reached ({used}/{limit})")]
    QuotaExceeded { used: u32, limit: u32 },
}

/// Typed wrapper over the user store.
#[derive(Clone)]
pub struct UsersRepo {
    store: Arc<InMemoryStore<UserId, User>>,
}

impl UsersRepo {
    pub fn new(store: Arc<InMemoryStore<UserId, User>>) -> Self {
        Self { store }
    }

    /// Insert a new user, enforcing email uniqueness atomically.
    pub fn insert(&self, user: User) -> DomainResult<()> {
        self.store.with_write(|map| {
            if map.values().any(|u| u.email == user.email) {
                return Err(DomainError::conflict("email already registered"));
            }
            map.insert(user.id, user);
            Ok(())
        })
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.store.with_read(|map| map.get(&id).cloned())
    }

    pub fn get_by_email(&self, email: &str) -> Option<User> {
        let email = email.trim().to_lowercase();
        self.store
            .with_read(|map| map.values().find(|u| u.email == email).cloned())
    }

    pub fn get_by_verification_token(&self, token: &str) -> Option<User> {
        self.store.with_read(|map| {
            map.values()
                .find(|u| u.email_verification_token.as_deref() == Some(token))
                .cloned()
        })
    }

    /// Persist an already-validated mutation of an existing user.
    pub fn update(&self, user: User) -> DomainResult<()> {
        self.store.with_write(|map| {
            if !map.contains_key(&user.id) {
                return Err(DomainError::not_found());
            }
            if map
                .values()
                .any(|u| u.id != user.id && u.email == user.email)
            {
                return Err(DomainError::conflict("email already registered"));
            }
            map.insert(user.id, user);
            Ok(())
        })
    }

    pub fn delete(&self, id: UserId) -> Option<User> {
        self.store.with_write(|map| map.remove(&id))
    }

    /// Atomically check the quota and consume one analysis. The monthly
    /// rollover is applied first, inside the same critical section.
    ///
    /// Two concurrent calls at `limit - 1` admit exactly one.
    pub fn try_consume_analysis(
        &self,
        id: UserId,
        now: DateTime<Utc>,
    ) -> Result<User, ConsumeQuotaError> {
        self.store.with_write(|map| {
            let user = map.get_mut(&id).ok_or(ConsumeQuotaError::NotFound)?;
            user.reset_monthly_count(now);
            if !user.can_analyze() {
                return Err(ConsumeQuotaError::QuotaExceeded {
                    used: user.analysis_count,
                    limit: user.analysis_limit,
                });
            }
            user.analysis_count += 1;
            user.updated_at = now;
            Ok(user.clone())
        })
    }

    /// Atomically register a failed login attempt. Returns the updated user.
    pub fn record_failed_login(
        &self,
        id: UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Option<User> {
        self.store.with_write(|map| {
            let user = map.get_mut(&id)?;
            user.lockout = policy.register_failure(&user.lockout, now);
            user.updated_at = now;
            Some(user.clone())
        })
    }

    /// Clear the lockout counter and stamp the login on success.
    pub fn record_login(&self, id: UserId, ip: Option<String>, now: DateTime<Utc>) -> Option<User> {
        self.store.with_write(|map| {
            let user = map.get_mut(&id)?;
            user.record_login(ip, now);
            Some(user.clone())
        })
    }

    /// Reset the analysis counter (admin support action).
    pub fn reset_usage(&self, id: UserId, now: DateTime<Utc>) -> Option<User> {
        self.store.with_write(|map| {
            let user = map.get_mut(&id)?;
            user.analysis_count = 0;
            user.updated_at = now;
            Some(user.clone())
        })
    }

    /// Filtered listing, newest first, with total count before paging.
    pub fn list(&self, filter: &UserFilter, page: usize, per_page: usize) -> (Vec<User>, usize) {
        let mut matching: Vec<User> = self
            .store
            .with_read(|map| map.values().filter(|u| filter.matches(u)).cloned().collect());
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matching.len();
        let page = page.max(1);
        let items = matching
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();
        (items, total)
    }

    pub fn count(&self, filter: &UserFilter) -> usize {
        self.store
            .with_read(|map| map.values().filter(|u| filter.matches(u)).count())
    }

    pub fn count_created_since(&self, filter: &UserFilter, since: DateTime<Utc>) -> usize {
        self.store.with_read(|map| {
            map.values()
                .filter(|u| filter.matches(u) && u.created_at >= since)
                .count()
        })
    }

    /// How many admin accounts reference a custom role.
    pub fn count_custom_role_users(&self, role_id: CustomRoleId) -> usize {
        self.store.with_read(|map| {
            map.values()
                .filter(|u| u.role == Role::Custom(role_id))
                .count()
        })
    }
}
