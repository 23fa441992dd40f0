//! User account use cases.

use std::sync::Arc;

use sidesa_domain::{CooldownPolicy, NewUser, Role, User, UserId};
use sidesa_shared::RegisterUserRequest;

use crate::infrastructure::ports::{ClockPort, RepoError, UserRepo};
use crate::use_cases::validation::{validate, ValidationFailure};

pub const SEED_ADMIN_NAME: &str = "Administrator";
pub const SEED_ADMIN_EMAIL: &str = "admin@desa.com";
pub const SEED_ADMIN_PHONE: &str = "08123456789";

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("Email is already registered")]
    EmailTaken,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct UserUseCases {
    repo: Arc<dyn UserRepo>,
    clock: Arc<dyn ClockPort>,
    policy: CooldownPolicy,
}

impl UserUseCases {
    pub fn new(repo: Arc<dyn UserRepo>, clock: Arc<dyn ClockPort>, policy: CooldownPolicy) -> Self {
        Self {
            repo,
            clock,
            policy,
        }
    }

    /// Register a resident account with a full emergency allowance.
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, UserError> {
        validate(&request)?;
        let email = request.email.trim().to_ascii_lowercase();
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let user = User::new(
            NewUser {
                name: request.name,
                email,
                phone_number: request.phone_number,
                role: Role::Regular,
                emergency_change: self.policy.allowance(),
            },
            self.clock.now(),
        );
        self.repo.insert(&user).await.map_err(|e| match e {
            RepoError::ConstraintViolation(_) => UserError::EmailTaken,
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Resolve the caller of an authenticated request.
    pub async fn authenticate(&self, id: UserId) -> Result<Option<User>, UserError> {
        Ok(self.repo.get(id).await?)
    }

    /// Create the default administrator unless an admin already exists.
    /// Returns the created account, or `None` when nothing was done.
    pub async fn seed_admin(&self) -> Result<Option<User>, UserError> {
        if let Some(existing) = self.repo.find_first_by_role(Role::Admin).await? {
            tracing::info!(user_id = %existing.id, "Admin already exists, skipping seed");
            return Ok(None);
        }
        if self.repo.find_by_email(SEED_ADMIN_EMAIL).await?.is_some() {
            tracing::warn!(email = SEED_ADMIN_EMAIL, "Seed admin email is taken by a non-admin account");
            return Err(UserError::EmailTaken);
        }

        let admin = User::new(
            NewUser {
                name: SEED_ADMIN_NAME.to_string(),
                email: SEED_ADMIN_EMAIL.to_string(),
                phone_number: SEED_ADMIN_PHONE.to_string(),
                role: Role::Admin,
                emergency_change: self.policy.allowance(),
            },
            self.clock.now(),
        );
        self.repo.insert(&admin).await?;

        tracing::info!(user_id = %admin.id, "Admin account seeded");
        Ok(Some(admin))
    }
}
