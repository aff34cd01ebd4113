//! `craftlens-auth` — authentication & authorization primitives.
//!
//! This crate is transport-agnostic: it models permissions, roles, JWT
//! claims, and the login-lockout policy as pure domain logic. HTTP wiring
//! (middleware, guards, response shapes) lives in the API crate.

pub mod claims;
pub mod jwt;
pub mod lockout;
pub mod permission;
pub mod resolver;
pub mod role;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256TokenService, JwtError, JwtValidator, TOKEN_TTL_DAYS};
pub use lockout::{LockoutPolicy, LockoutState};
pub use permission::{CATALOG, Permission, PermissionSet};
pub use resolver::{ResolveError, resolve_permissions};
pub use role::Role;
