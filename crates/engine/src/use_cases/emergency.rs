//! Emergency use cases.
//!
//! Residents file emergencies under a cooldown policy: each account has a
//! small allowance of submissions and is blocked for a while once it is spent.
//! Handling an emergency restores the reporter's allowance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sidesa_domain::{
    CooldownPolicy, DomainError, Emergency, EmergencyId, EmergencyWithReporter, NewEmergency,
    Role, User,
};
use sidesa_shared::{CreateEmergencyRequest, EmergencyCounts, EmergencyListQuery, PageResponse};

use crate::infrastructure::ports::{ClockPort, EmergencyFilter, EmergencyRepo, RepoError, UserRepo};
use crate::use_cases::validation::{validate, ValidationFailure};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum EmergencyError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("Only REGULAR users can submit emergencies")]
    NotRegularUser,
    #[error("Emergency submissions are blocked until {}", .until.to_rfc3339())]
    Blocked { until: DateTime<Utc> },
    #[error("Emergency not found")]
    NotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<DomainError> for EmergencyError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Blocked { until } => Self::Blocked { until },
            other => ValidationFailure::single("emergency", "invalid", other.to_string()).into(),
        }
    }
}

/// Parsed listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyPage {
    pub page: u32,
    pub limit: u32,
    pub is_handled: Option<bool>,
}

impl EmergencyPage {
    pub fn parse(query: &EmergencyListQuery) -> Result<Self, ValidationFailure> {
        let mut failure = ValidationFailure { issues: Vec::new() };

        let page = positive_or_default(query.page.as_deref(), "page", DEFAULT_PAGE)
            .unwrap_or_else(|e| {
                failure.extend(e);
                DEFAULT_PAGE
            });
        let limit = positive_or_default(query.limit.as_deref(), "limit", DEFAULT_LIMIT)
            .unwrap_or_else(|e| {
                failure.extend(e);
                DEFAULT_LIMIT
            });
        let is_handled = match query.is_handled.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) if raw.eq_ignore_ascii_case("true") => Some(true),
            Some(raw) if raw.eq_ignore_ascii_case("false") => Some(false),
            Some(_) => {
                failure.extend(ValidationFailure::single(
                    "is_handled",
                    "invalid_type",
                    "is_handled must be true or false",
                ));
                None
            }
        };

        if !failure.is_empty() {
            return Err(failure);
        }
        Ok(Self {
            page,
            limit,
            is_handled,
        })
    }

    fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn positive_or_default(raw: Option<&str>, field: &str, default: u32) -> Result<u32, ValidationFailure> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: i64 = raw.trim().parse().map_err(|_| {
        ValidationFailure::single(field, "invalid_type", format!("{field} must be an integer"))
    })?;
    if value < 1 {
        return Err(ValidationFailure::single(
            field,
            "min_value",
            format!("{field} must be at least 1"),
        ));
    }
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

pub struct EmergencyUseCases {
    emergencies: Arc<dyn EmergencyRepo>,
    users: Arc<dyn UserRepo>,
    clock: Arc<dyn ClockPort>,
    policy: CooldownPolicy,
}

impl EmergencyUseCases {
    pub fn new(
        emergencies: Arc<dyn EmergencyRepo>,
        users: Arc<dyn UserRepo>,
        clock: Arc<dyn ClockPort>,
        policy: CooldownPolicy,
    ) -> Self {
        Self {
            emergencies,
            users,
            clock,
            policy,
        }
    }

    pub async fn list(
        &self,
        query: &EmergencyListQuery,
    ) -> Result<PageResponse<EmergencyWithReporter>, EmergencyError> {
        let page = EmergencyPage::parse(query)?;
        let filter = EmergencyFilter {
            is_handled: page.is_handled,
        };

        let data = self
            .emergencies
            .list(filter, page.offset(), page.limit)
            .await?;
        let total = self.emergencies.count(filter).await?;

        Ok(PageResponse {
            page: page.page,
            limit: page.limit,
            total_page: total.div_ceil(u64::from(page.limit)),
            data,
        })
    }

    /// File an emergency on behalf of `reporter`, spending one submission.
    pub async fn create(
        &self,
        reporter: &User,
        request: CreateEmergencyRequest,
    ) -> Result<Emergency, EmergencyError> {
        if reporter.role != Role::Regular {
            return Err(EmergencyError::NotRegularUser);
        }
        validate(&request)?;

        // Quota is read fresh; the authenticated copy may be stale.
        let user = self
            .users
            .get(reporter.id)
            .await?
            .ok_or(EmergencyError::UserNotFound)?;
        let now = self.clock.now();

        let quota = match user.emergency_quota().consume(now, &self.policy) {
            Ok(quota) => quota,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Emergency submission refused");
                return Err(e.into());
            }
        };

        let emergency = Emergency::new(
            NewEmergency {
                user_id: user.id,
                phone_number: Some(request.phone_number),
                message: request.message,
                latitude: request.latitude,
                longitude: request.longitude,
            },
            now,
        );
        self.emergencies.insert(&emergency).await?;
        self.users.save_emergency_quota(user.id, quota, now).await?;

        tracing::info!(
            emergency_id = %emergency.id,
            user_id = %user.id,
            remaining = quota.remaining,
            blocked_until = ?quota.blocked_until,
            "Emergency submitted"
        );
        Ok(emergency)
    }

    /// Mark as handled and restore the reporter's allowance.
    pub async fn handle(&self, id: EmergencyId) -> Result<Emergency, EmergencyError> {
        let mut emergency = self
            .emergencies
            .get(id)
            .await?
            .ok_or(EmergencyError::NotFound)?;
        let now = self.clock.now();

        emergency.mark_handled(now);
        self.emergencies.update(&emergency).await?;
        self.users
            .reset_emergency_change(emergency.user_id, self.policy.allowance(), now)
            .await?;

        tracing::info!(emergency_id = %id, user_id = %emergency.user_id, "Emergency handled");
        Ok(emergency)
    }

    pub async fn delete(&self, id: EmergencyId) -> Result<(), EmergencyError> {
        self.emergencies
            .get(id)
            .await?
            .ok_or(EmergencyError::NotFound)?;
        self.emergencies.delete(id).await?;

        tracing::info!(emergency_id = %id, "Emergency deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<EmergencyCounts, EmergencyError> {
        let is_not_handled = self
            .emergencies
            .count(EmergencyFilter {
                is_handled: Some(false),
            })
            .await?;
        let is_handled = self
            .emergencies
            .count(EmergencyFilter {
                is_handled: Some(true),
            })
            .await?;

        Ok(EmergencyCounts {
            is_not_handled,
            is_handled,
        })
    }
}
