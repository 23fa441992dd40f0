//! SQLite persistence adapters
//!
//! This module implements the repository ports for SQLite,
//! providing CRUD operations for all domain entities.

mod connection;
mod emergency_repository;
mod map_repository;
mod regulation_repository;
mod user_repository;

pub use connection::SqliteConnection;
pub use emergency_repository::SqliteEmergencyRepository;
pub use map_repository::SqliteMapFeatureRepository;
pub use regulation_repository::SqliteRegulationRepository;
pub use user_repository::SqliteUserRepository;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};

use crate::infrastructure::ports::RepoError;

/// Combined repository providing access to all domain repositories
#[derive(Clone)]
pub struct SqliteRepository {
    connection: SqliteConnection,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let connection = SqliteConnection::new(database_url).await?;
        connection.initialize_schema().await?;
        Ok(Self { connection })
    }

    pub fn from_connection(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    pub fn regulations(&self) -> SqliteRegulationRepository {
        SqliteRegulationRepository::new(self.connection.clone())
    }

    pub fn emergencies(&self) -> SqliteEmergencyRepository {
        SqliteEmergencyRepository::new(self.connection.clone())
    }

    pub fn map_features(&self) -> SqliteMapFeatureRepository {
        SqliteMapFeatureRepository::new(self.connection.clone())
    }

    pub fn users(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(self.connection.clone())
    }
}

// =============================================================================
// Row helpers
// =============================================================================

/// Timestamps are stored as RFC 3339 text with microsecond precision so that
/// lexical order matches chronological order.
pub(crate) fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_time(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("invalid timestamp {raw:?}: {e}")))
}

pub(crate) fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, RepoError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepoError::serialization(format!("column {name}: {e}")))
}

pub(crate) fn time_column(row: &SqliteRow, name: &str) -> Result<DateTime<Utc>, RepoError> {
    let raw: String = column(row, name)?;
    decode_time(&raw)
}

/// Map a write failure, surfacing unique/foreign key violations separately.
pub(crate) fn write_error(operation: &'static str, err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            RepoError::constraint(db.message())
        }
        _ => RepoError::database(operation, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn encoded_times_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).single().expect("time");
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(encode_time(earlier) < encode_time(later));
    }

    #[test]
    fn decode_time_round_trips_encoded_value() {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).single().expect("time");
        assert_eq!(decode_time(&encode_time(time)).expect("decode"), time);
        assert!(decode_time("yesterday").is_err());
    }
}
