//! `craftlens-identity` — user accounts, custom roles, and credentials.

pub mod custom_role;
pub mod password;
pub mod user;

pub use custom_role::CustomRole;
pub use password::{MIN_PASSWORD_LENGTH, hash_password, validate_password, verify_password};
pub use user::{
    AccountStatus, AccountType, Plan, SubscriptionStatus, User, VERIFICATION_TOKEN_TTL_HOURS,
    next_monthly_reset, normalize_email,
};
