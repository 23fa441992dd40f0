//! User repository implementation for SQLite

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteQueryResult, SqliteRow};

use super::connection::SqliteConnection;
use super::{column, decode_time, encode_time, time_column, write_error};
use crate::infrastructure::ports::{RepoError, UserRepo};
use sidesa_domain::{EmergencyQuota, Role, User, UserId};

const SELECT_USER: &str = "SELECT id, name, email, phone_number, role, emergency_change, emergency_blocked_until, created_at, updated_at FROM users";

/// Repository for User operations
pub struct SqliteUserRepository {
    connection: SqliteConnection,
}

impl SqliteUserRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    async fn fetch_one_where(
        &self,
        operation: &'static str,
        clause: &str,
        value: String,
    ) -> Result<Option<User>, RepoError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE {clause}"))
            .bind(value)
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| RepoError::database(operation, e))?;

        row.as_ref().map(row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, phone_number, role, emergency_change,
                emergency_blocked_until, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(user.role.as_str())
        .bind(i64::from(user.emergency_change))
        .bind(user.emergency_blocked_until.map(encode_time))
        .bind(encode_time(user.created_at))
        .bind(encode_time(user.updated_at))
        .execute(self.connection.pool())
        .await
        .map_err(|e| write_error("user.insert", e))?;

        tracing::debug!("Created user {} ({})", user.id, user.role);
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, RepoError> {
        self.fetch_one_where("user.get", "id = ?", id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.fetch_one_where("user.find_by_email", "email = ?", email.to_string())
            .await
    }

    async fn find_first_by_role(&self, role: Role) -> Result<Option<User>, RepoError> {
        self.fetch_one_where(
            "user.find_first_by_role",
            "role = ? ORDER BY created_at LIMIT 1",
            role.as_str().to_string(),
        )
        .await
    }

    async fn save_emergency_quota(
        &self,
        id: UserId,
        quota: EmergencyQuota,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE users SET emergency_change = ?, emergency_blocked_until = ?, updated_at = ?
            WHERE id = ?",
        )
        .bind(i64::from(quota.remaining))
        .bind(quota.blocked_until.map(encode_time))
        .bind(encode_time(now))
        .bind(id.to_string())
        .execute(self.connection.pool())
        .await
        .map_err(|e| RepoError::database("user.save_emergency_quota", e))?;

        expect_affected(id, result)
    }

    async fn reset_emergency_change(
        &self,
        id: UserId,
        remaining: u32,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE users SET emergency_change = ?, updated_at = ? WHERE id = ?")
            .bind(i64::from(remaining))
            .bind(encode_time(now))
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .map_err(|e| RepoError::database("user.reset_emergency_change", e))?;

        expect_affected(id, result)
    }
}

fn expect_affected(id: UserId, result: SqliteQueryResult) -> Result<(), RepoError> {
    if result.rows_affected() == 0 {
        return Err(RepoError::not_found("User", id));
    }
    Ok(())
}

fn row_to_user(row: &SqliteRow) -> Result<User, RepoError> {
    let id: String = column(row, "id")?;
    let role: String = column(row, "role")?;
    let emergency_change: i64 = column(row, "emergency_change")?;
    let blocked_until: Option<String> = column(row, "emergency_blocked_until")?;

    Ok(User {
        id: UserId::from_str(&id).map_err(RepoError::serialization)?,
        name: column(row, "name")?,
        email: column(row, "email")?,
        phone_number: column(row, "phone_number")?,
        role: Role::from_str(&role).map_err(RepoError::serialization)?,
        emergency_change: u32::try_from(emergency_change).map_err(RepoError::serialization)?,
        emergency_blocked_until: blocked_until.as_deref().map(decode_time).transpose()?,
        created_at: time_column(row, "created_at")?,
        updated_at: time_column(row, "updated_at")?,
    })
}
