//! Emergency submission allowance and cooldown.

use chrono::{DateTime, Duration, Utc};

use crate::DomainError;

/// How many emergencies a citizen may file before a cooldown, and how long
/// that cooldown lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    allowance: u32,
    block_for: Duration,
}

impl CooldownPolicy {
    pub const DEFAULT_ALLOWANCE: u32 = 3;
    pub const DEFAULT_BLOCK_SECONDS: i64 = 60;

    pub fn new(allowance: u32, block_for: Duration) -> Self {
        Self {
            allowance: allowance.max(1),
            block_for,
        }
    }

    pub fn allowance(&self) -> u32 {
        self.allowance
    }

    pub fn block_for(&self) -> Duration {
        self.block_for
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_ALLOWANCE,
            Duration::seconds(Self::DEFAULT_BLOCK_SECONDS),
        )
    }
}

/// A user's remaining emergency submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyQuota {
    pub remaining: u32,
    pub blocked_until: Option<DateTime<Utc>>,
}

impl EmergencyQuota {
    pub fn full(policy: &CooldownPolicy) -> Self {
        Self {
            remaining: policy.allowance(),
            blocked_until: None,
        }
    }

    /// The active block expiry, if the user is still cooling down at `now`.
    pub fn blocked_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.blocked_until.filter(|until| *until > now)
    }

    /// Spend one submission.
    ///
    /// Spending the last submission starts a cooldown of `policy.block_for()`.
    /// An expired block does not refill the counter; only handling an
    /// emergency does, so the next submission after expiry blocks again.
    pub fn consume(
        &self,
        now: DateTime<Utc>,
        policy: &CooldownPolicy,
    ) -> Result<EmergencyQuota, DomainError> {
        if let Some(until) = self.blocked_at(now) {
            return Err(DomainError::blocked(until));
        }

        let remaining = self.remaining.saturating_sub(1);
        if remaining == 0 {
            Ok(EmergencyQuota {
                remaining: 0,
                blocked_until: Some(now + policy.block_for()),
            })
        } else {
            Ok(EmergencyQuota {
                remaining,
                blocked_until: None,
            })
        }
    }
}
