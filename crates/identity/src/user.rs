//! User account entity.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use craftlens_auth::{LockoutState, Role};
use craftlens_core::{DomainError, DomainResult, UserId};
use serde::{Deserialize, Serialize};

/// How long an email-verification token stays valid.
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Broad account category. Admin surfaces reject customer accounts outright,
/// before any permission check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Customer,
    Admin,
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    PendingVerification,
    Active,
    Suspended,
    Banned,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::PendingVerification => "pending_verification",
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Banned => "banned",
            AccountStatus::Inactive => "inactive",
        }
    }
}

/// Subscription plan. Each plan carries a monthly analysis quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Starter,
    Pro,
    Unlimited,
}

impl Plan {
    pub fn analysis_limit(&self) -> u32 {
        match self {
            Plan::Free => 1,
            Plan::Starter => 50,
            Plan::Pro => 250,
            Plan::Unlimited => 999_999,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
            Plan::Unlimited => "unlimited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    None,
    Active,
    Expired,
    Cancelled,
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A user account (customer or back-office admin).
///
/// # Invariants
/// - `email` is stored normalized (trimmed, lowercased) and is unique.
/// - `analysis_limit` always matches `plan.analysis_limit()`.
/// - `role` is consistent with `account_type`: customers carry
///   `Role::Customer`, admin accounts never do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub account_type: AccountType,
    pub role: Role,
    pub status: AccountStatus,
    pub is_email_verified: bool,
    pub email_verification_token: Option<String>,
    pub email_verification_expires: Option<DateTime<Utc>>,
    pub plan: Plan,
    pub analysis_count: u32,
    pub analysis_limit: u32,
    pub monthly_reset_date: DateTime<Utc>,
    pub subscription_status: SubscriptionStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub lockout: LockoutState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a customer account awaiting email verification.
    pub fn new_customer(
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        verification_token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let plan = Plan::Free;
        Ok(Self {
            id: UserId::new(),
            name: validate_name(name.into())?,
            email: normalize_email(email)?,
            password_hash: password_hash.into(),
            account_type: AccountType::Customer,
            role: Role::Customer,
            status: AccountStatus::PendingVerification,
            is_email_verified: false,
            email_verification_token: Some(verification_token.into()),
            email_verification_expires: Some(
                now + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS),
            ),
            plan,
            analysis_count: 0,
            analysis_limit: plan.analysis_limit(),
            monthly_reset_date: next_monthly_reset(now),
            subscription_status: SubscriptionStatus::None,
            last_login: None,
            last_login_ip: None,
            lockout: LockoutState::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a back-office account. Admin accounts are active immediately;
    /// they are provisioned by another admin, not self-registered.
    pub fn new_admin(
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !role.is_back_office() {
            return Err(DomainError::validation(
                "admin accounts require a back-office role",
            ));
        }
        let plan = Plan::Free;
        Ok(Self {
            id: UserId::new(),
            name: validate_name(name.into())?,
            email: normalize_email(email)?,
            password_hash: password_hash.into(),
            account_type: AccountType::Admin,
            role,
            status: AccountStatus::Active,
            is_email_verified: true,
            email_verification_token: None,
            email_verification_expires: None,
            plan,
            analysis_count: 0,
            analysis_limit: plan.analysis_limit(),
            monthly_reset_date: next_monthly_reset(now),
            subscription_status: SubscriptionStatus::None,
            last_login: None,
            last_login_ip: None,
            lockout: LockoutState::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the account may consume one more analysis.
    pub fn can_analyze(&self) -> bool {
        self.analysis_count < self.analysis_limit
    }

    /// Zero the counter and roll the window forward once `now` has passed
    /// the reset date. Returns whether a reset happened.
    pub fn reset_monthly_count(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.monthly_reset_date {
            return false;
        }
        self.analysis_count = 0;
        self.monthly_reset_date = next_monthly_reset(now);
        self.updated_at = now;
        true
    }

    /// Change plan and re-derive the quota limit. The used counter is kept;
    /// downgrading below current usage simply leaves the account over quota.
    /// Paid plans activate the subscription and open a fresh 30-day window.
    pub fn change_plan(&mut self, plan: Plan, now: DateTime<Utc>) {
        self.plan = plan;
        self.analysis_limit = plan.analysis_limit();
        if plan != Plan::Free {
            self.subscription_status = SubscriptionStatus::Active;
            self.monthly_reset_date = now + Duration::days(30);
        }
        self.updated_at = now;
    }

    /// Whether the verification token has passed its expiry.
    pub fn verification_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.email_verification_expires
            .is_some_and(|expires| now > expires)
    }

    /// Mark the email verified and activate a pending account.
    pub fn verify_email(&mut self, now: DateTime<Utc>) {
        self.is_email_verified = true;
        self.email_verification_token = None;
        self.email_verification_expires = None;
        if self.status == AccountStatus::PendingVerification {
            self.status = AccountStatus::Active;
        }
        self.updated_at = now;
    }

    /// Record a successful login.
    pub fn record_login(&mut self, ip: Option<String>, now: DateTime<Utc>) {
        self.last_login = Some(now);
        self.last_login_ip = ip;
        self.lockout = LockoutState::default();
        self.updated_at = now;
    }
}

/// Midnight UTC on the first day of the month after `now`.
pub fn next_monthly_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Trim, lowercase, and shape-check an email address.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let normalized = email.trim().to_lowercase();
    let mut parts = normalized.split('@');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None)
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    );
    if !valid {
        return Err(DomainError::validation("invalid email address"));
    }
    Ok(normalized)
}

fn validate_name(name: String) -> DomainResult<String> {
    let trimmed = name.trim().to_string();
    if trimmed.is_empty() {
        return Err(DomainError::validation("name is required"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> User {
        User::new_customer("Maya", "Maya@Example.com", "hash", "token", Utc::now()).unwrap()
    }

    #[test]
    fn new_customer_defaults() {
        let user = customer();
        assert_eq!(user.email, "maya@example.com");
        assert_eq!(user.status, AccountStatus::PendingVerification);
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.plan, Plan::Free);
        assert_eq!(user.analysis_limit, 1);
        assert!(!user.is_email_verified);
    }

    #[test]
    fn plan_limits() {
        assert_eq!(Plan::Free.analysis_limit(), 1);
        assert_eq!(Plan::Starter.analysis_limit(), 50);
        assert_eq!(Plan::Pro.analysis_limit(), 250);
        assert_eq!(Plan::Unlimited.analysis_limit(), 999_999);
    }

    #[test]
    fn change_plan_rederives_limit_but_keeps_usage() {
        let mut user = customer();
        user.analysis_count = 1;
        user.change_plan(Plan::Starter, Utc::now());
        assert_eq!(user.analysis_limit, 50);
        assert_eq!(user.analysis_count, 1);
        assert!(user.can_analyze());
    }

    #[test]
    fn quota_exhaustion() {
        let mut user = customer();
        assert!(user.can_analyze());
        user.analysis_count = 1;
        assert!(!user.can_analyze());
    }

    #[test]
    fn monthly_reset_rolls_the_window_forward() {
        let mut user = customer();
        user.analysis_count = 1;

        // still inside the current window
        assert!(!user.reset_monthly_count(Utc::now()));
        assert_eq!(user.analysis_count, 1);

        let later = user.monthly_reset_date + Duration::days(4);
        assert!(user.reset_monthly_count(later));
        assert_eq!(user.analysis_count, 0);
        assert!(user.monthly_reset_date > later);
        assert_eq!(user.monthly_reset_date.day(), 1);
    }

    #[test]
    fn paid_plan_change_opens_a_fresh_window() {
        let mut user = customer();
        let now = Utc::now();
        user.change_plan(Plan::Pro, now);
        assert_eq!(user.subscription_status, SubscriptionStatus::Active);
        assert_eq!(user.monthly_reset_date, now + Duration::days(30));
    }

    #[test]
    fn verification_token_carries_a_24h_expiry() {
        let user = customer();
        let issued = user.created_at;
        assert!(!user.verification_token_expired(issued + Duration::hours(23)));
        assert!(user.verification_token_expired(issued + Duration::hours(25)));

        let mut verified = customer();
        verified.verify_email(Utc::now());
        assert!(verified.email_verification_expires.is_none());
        assert!(!verified.verification_token_expired(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn verify_email_activates_pending_account() {
        let mut user = customer();
        user.verify_email(Utc::now());
        assert!(user.is_email_verified);
        assert_eq!(user.status, AccountStatus::Active);
        assert!(user.email_verification_token.is_none());

        // a suspended account stays suspended even if re-verified
        let mut suspended = customer();
        suspended.status = AccountStatus::Suspended;
        suspended.verify_email(Utc::now());
        assert_eq!(suspended.status, AccountStatus::Suspended);
    }

    #[test]
    fn admin_requires_back_office_role() {
        let err = User::new_admin("Ops", "ops@example.com", "hash", Role::Customer, Utc::now());
        assert!(err.is_err());

        let admin =
            User::new_admin("Ops", "ops@example.com", "hash", Role::Admin, Utc::now()).unwrap();
        assert_eq!(admin.account_type, AccountType::Admin);
        assert_eq!(admin.status, AccountStatus::Active);
        assert!(admin.is_email_verified);
    }

    #[test]
    fn email_normalization_and_rejection() {
        assert_eq!(normalize_email("  A@b.Co ").unwrap(), "a@b.co");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("two@@signs.com").is_err());
        assert!(normalize_email("@missing.local").is_err());
        assert!(normalize_email("user@nodot").is_err());
    }
}
