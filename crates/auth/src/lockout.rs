//! Login lockout policy.
//!
//! Pure state transitions; persistence of the counter lives on the user
//! record and is applied atomically by the storage layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Failed-login counter and lock window carried on a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockoutState {
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

/// Lockout policy: lock for a fixed window after too many failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_duration: Duration::hours(2),
        }
    }
}

impl LockoutPolicy {
    /// Whether the account is currently locked.
    pub fn is_locked(&self, state: &LockoutState, now: DateTime<Utc>) -> bool {
        state.locked_until.is_some_and(|until| until > now)
    }

    /// Apply one failed login attempt.
    ///
    /// An expired lock resets the counter to 1 instead of accumulating on
    /// top of stale attempts. The `max_attempts`-th failure starts the lock
    /// window.
    pub fn register_failure(&self, state: &LockoutState, now: DateTime<Utc>) -> LockoutState {
        if let Some(until) = state.locked_until {
            if until <= now {
                return LockoutState {
                    failed_attempts: 1,
                    locked_until: None,
                };
            }
        }

        let failed_attempts = state.failed_attempts + 1;
        let locked_until = if failed_attempts >= self.max_attempts && !self.is_locked(state, now) {
            Some(now + self.lock_duration)
        } else {
            state.locked_until
        };

        LockoutState {
            failed_attempts,
            locked_until,
        }
    }

    /// Clear the counter after a successful login.
    pub fn reset(&self) -> LockoutState {
        LockoutState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifth_failure_locks_for_two_hours() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let mut state = LockoutState::default();
        for _ in 0..4 {
            state = policy.register_failure(&state, now);
            assert!(!policy.is_locked(&state, now));
        }

        state = policy.register_failure(&state, now);
        assert_eq!(state.failed_attempts, 5);
        assert!(policy.is_locked(&state, now));
        assert_eq!(state.locked_until, Some(now + Duration::hours(2)));
    }

    #[test]
    fn lock_expires_after_window() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let state = LockoutState {
            failed_attempts: 5,
            locked_until: Some(now + Duration::hours(2)),
        };
        assert!(policy.is_locked(&state, now + Duration::hours(1)));
        assert!(!policy.is_locked(&state, now + Duration::hours(2)));
    }

    #[test]
    fn failure_after_expired_lock_restarts_the_counter() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let state = LockoutState {
            failed_attempts: 5,
            locked_until: Some(now - Duration::minutes(1)),
        };
        let next = policy.register_failure(&state, now);
        assert_eq!(next.failed_attempts, 1);
        assert_eq!(next.locked_until, None);
    }

    #[test]
    fn successful_login_resets_everything() {
        let policy = LockoutPolicy::default();
        let state = policy.reset();
        assert_eq!(state, LockoutState::default());
    }
}
