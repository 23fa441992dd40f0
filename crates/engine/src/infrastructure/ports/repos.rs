//! Repository port traits for database access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sidesa_domain::*;

use super::error::RepoError;

// =============================================================================
// Query filters
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmergencyFilter {
    pub is_handled: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapFeatureFilter {
    pub map_type: Option<MapType>,
    pub year: Option<i32>,
}

// =============================================================================
// Database Ports (one per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegulationRepo: Send + Sync {
    async fn create(&self, regulation: &NewRegulation) -> Result<Regulation, RepoError>;
    async fn get(&self, id: RegulationId) -> Result<Option<Regulation>, RepoError>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Regulation>, RepoError>;
    async fn update(&self, regulation: &Regulation) -> Result<(), RepoError>;
    async fn delete(&self, id: RegulationId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmergencyRepo: Send + Sync {
    async fn insert(&self, emergency: &Emergency) -> Result<(), RepoError>;
    async fn get(&self, id: EmergencyId) -> Result<Option<Emergency>, RepoError>;
    /// Newest first, with the reporter embedded.
    async fn list(
        &self,
        filter: EmergencyFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<EmergencyWithReporter>, RepoError>;
    async fn count(&self, filter: EmergencyFilter) -> Result<u64, RepoError>;
    async fn update(&self, emergency: &Emergency) -> Result<(), RepoError>;
    async fn delete(&self, id: EmergencyId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapFeatureRepo: Send + Sync {
    async fn create(&self, feature: &NewMapFeature) -> Result<MapFeature, RepoError>;
    async fn get(&self, id: MapFeatureId) -> Result<Option<MapFeature>, RepoError>;
    /// Newest first.
    async fn list(&self, filter: MapFeatureFilter) -> Result<Vec<MapFeature>, RepoError>;
    async fn update(&self, feature: &MapFeature) -> Result<(), RepoError>;
    async fn delete(&self, id: MapFeatureId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), RepoError>;
    async fn get(&self, id: UserId) -> Result<Option<User>, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn find_first_by_role(&self, role: Role) -> Result<Option<User>, RepoError>;
    async fn save_emergency_quota(
        &self,
        id: UserId,
        quota: EmergencyQuota,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError>;
    async fn reset_emergency_change(
        &self,
        id: UserId,
        remaining: u32,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError>;
}
