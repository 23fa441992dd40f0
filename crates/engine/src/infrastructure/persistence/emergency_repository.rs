//! Emergency repository implementation for SQLite

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use super::connection::SqliteConnection;
use super::{column, encode_time, time_column, write_error};
use crate::infrastructure::ports::{EmergencyFilter, EmergencyRepo, RepoError};
use sidesa_domain::{Emergency, EmergencyId, EmergencyWithReporter, ReporterSummary, UserId};

const EMERGENCY_COLUMNS: &str = "e.id, e.user_id, e.phone_number, e.message, e.latitude, e.longitude, e.is_handled, e.created_at, e.updated_at";

/// Repository for Emergency operations
pub struct SqliteEmergencyRepository {
    connection: SqliteConnection,
}

impl SqliteEmergencyRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl EmergencyRepo for SqliteEmergencyRepository {
    async fn insert(&self, emergency: &Emergency) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO emergencies (id, user_id, phone_number, message, latitude, longitude,
                is_handled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(emergency.id.to_string())
        .bind(emergency.user_id.to_string())
        .bind(&emergency.phone_number)
        .bind(&emergency.message)
        .bind(&emergency.latitude)
        .bind(&emergency.longitude)
        .bind(emergency.is_handled)
        .bind(encode_time(emergency.created_at))
        .bind(encode_time(emergency.updated_at))
        .execute(self.connection.pool())
        .await
        .map_err(|e| write_error("emergency.insert", e))?;

        tracing::debug!("Created emergency {} for user {}", emergency.id, emergency.user_id);
        Ok(())
    }

    async fn get(&self, id: EmergencyId) -> Result<Option<Emergency>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {EMERGENCY_COLUMNS} FROM emergencies e WHERE e.id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .map_err(|e| RepoError::database("emergency.get", e))?;

        row.as_ref().map(row_to_emergency).transpose()
    }

    async fn list(
        &self,
        filter: EmergencyFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<EmergencyWithReporter>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {EMERGENCY_COLUMNS},
                u.id AS reporter_id, u.name AS reporter_name,
                u.phone_number AS reporter_phone_number, u.email AS reporter_email
            FROM emergencies e
            LEFT JOIN users u ON u.id = e.user_id
            WHERE (?1 IS NULL OR e.is_handled = ?1)
            ORDER BY e.created_at DESC, e.id DESC
            LIMIT ?2 OFFSET ?3"
        ))
        .bind(filter.is_handled)
        .bind(i64::from(limit))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(self.connection.pool())
        .await
        .map_err(|e| RepoError::database("emergency.list", e))?;

        rows.iter()
            .map(|row| -> Result<EmergencyWithReporter, RepoError> {
                Ok(EmergencyWithReporter {
                    emergency: row_to_emergency(row)?,
                    user: row_to_reporter(row)?,
                })
            })
            .collect()
    }

    async fn count(&self, filter: EmergencyFilter) -> Result<u64, RepoError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM emergencies WHERE (?1 IS NULL OR is_handled = ?1)",
        )
        .bind(filter.is_handled)
        .fetch_one(self.connection.pool())
        .await
        .map_err(|e| RepoError::database("emergency.count", e))?;

        let total: i64 = column(&row, "total")?;
        u64::try_from(total).map_err(RepoError::serialization)
    }

    async fn update(&self, emergency: &Emergency) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE emergencies SET is_handled = ?, updated_at = ? WHERE id = ?",
        )
        .bind(emergency.is_handled)
        .bind(encode_time(emergency.updated_at))
        .bind(emergency.id.to_string())
        .execute(self.connection.pool())
        .await
        .map_err(|e| write_error("emergency.update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Emergency", emergency.id));
        }
        Ok(())
    }

    async fn delete(&self, id: EmergencyId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM emergencies WHERE id = ?")
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .map_err(|e| RepoError::database("emergency.delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Emergency", id));
        }
        tracing::debug!("Deleted emergency {}", id);
        Ok(())
    }
}

fn row_to_emergency(row: &SqliteRow) -> Result<Emergency, RepoError> {
    let id: String = column(row, "id")?;
    let user_id: String = column(row, "user_id")?;

    Ok(Emergency {
        id: EmergencyId::from_str(&id).map_err(RepoError::serialization)?,
        user_id: UserId::from_str(&user_id).map_err(RepoError::serialization)?,
        phone_number: column(row, "phone_number")?,
        message: column(row, "message")?,
        latitude: column(row, "latitude")?,
        longitude: column(row, "longitude")?,
        is_handled: column(row, "is_handled")?,
        created_at: time_column(row, "created_at")?,
        updated_at: time_column(row, "updated_at")?,
    })
}

fn row_to_reporter(row: &SqliteRow) -> Result<Option<ReporterSummary>, RepoError> {
    let Some(id) = column::<Option<String>>(row, "reporter_id")? else {
        return Ok(None);
    };

    Ok(Some(ReporterSummary {
        id: UserId::from_str(&id).map_err(RepoError::serialization)?,
        name: column(row, "reporter_name")?,
        phone_number: column(row, "reporter_phone_number")?,
        email: column(row, "reporter_email")?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::SqliteUserRepository;
    use crate::infrastructure::ports::UserRepo;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use sidesa_domain::{NewEmergency, NewUser, Role, User};

    struct Fixture {
        emergencies: SqliteEmergencyRepository,
        reporter: User,
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 17, 10, 0, 0).single().expect("time")
    }

    async fn fixture() -> Fixture {
        let connection = SqliteConnection::in_memory().await.expect("in-memory sqlite");
        let reporter = User::new(
            NewUser {
                name: "Siti".to_string(),
                email: "siti@desa.com".to_string(),
                phone_number: "081298765432".to_string(),
                role: Role::Regular,
                emergency_change: 3,
            },
            base_time(),
        );
        SqliteUserRepository::new(connection.clone())
            .insert(&reporter)
            .await
            .expect("insert reporter");

        Fixture {
            emergencies: SqliteEmergencyRepository::new(connection),
            reporter,
        }
    }

    fn emergency(user_id: UserId, message: &str, at: DateTime<Utc>) -> Emergency {
        Emergency::new(
            NewEmergency {
                user_id,
                phone_number: Some("081298765432".to_string()),
                message: message.to_string(),
                latitude: "-6.200000".to_string(),
                longitude: "106.816666".to_string(),
            },
            at,
        )
    }

    #[tokio::test]
    async fn list_embeds_reporter_newest_first() {
        let f = fixture().await;
        for (i, message) in ["banjir di RT 01", "kebakaran di pasar"].iter().enumerate() {
            let at = base_time() + Duration::minutes(i as i64);
            f.emergencies
                .insert(&emergency(f.reporter.id, message, at))
                .await
                .expect("insert");
        }

        let page = f
            .emergencies
            .list(EmergencyFilter::default(), 0, 10)
            .await
            .expect("list");

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].emergency.message, "kebakaran di pasar");
        let reporter = page[0].user.as_ref().expect("reporter");
        assert_eq!(reporter.email, "siti@desa.com");
        assert_eq!(reporter.id, f.reporter.id);
    }

    #[tokio::test]
    async fn filter_and_pagination_apply_to_list_and_count() {
        let f = fixture().await;
        for i in 0..5 {
            let mut e = emergency(f.reporter.id, "pohon tumbang", base_time() + Duration::minutes(i));
            if i % 2 == 0 {
                e.mark_handled(base_time() + Duration::hours(1));
            }
            f.emergencies.insert(&e).await.expect("insert");
        }

        let handled = EmergencyFilter { is_handled: Some(true) };
        let open = EmergencyFilter { is_handled: Some(false) };
        assert_eq!(f.emergencies.count(handled).await.expect("count"), 3);
        assert_eq!(f.emergencies.count(open).await.expect("count"), 2);
        assert_eq!(f.emergencies.count(EmergencyFilter::default()).await.expect("count"), 5);

        let second_page = f.emergencies.list(handled, 2, 2).await.expect("list");
        assert_eq!(second_page.len(), 1);
        assert!(second_page[0].emergency.is_handled);
        assert_eq!(second_page[0].emergency.created_at, base_time());
    }

    #[tokio::test]
    async fn update_marks_handled() {
        let f = fixture().await;
        let mut e = emergency(f.reporter.id, "jalan longsor", base_time());
        f.emergencies.insert(&e).await.expect("insert");

        e.mark_handled(base_time() + Duration::minutes(30));
        f.emergencies.update(&e).await.expect("update");

        let stored = f.emergencies.get(e.id).await.expect("get").expect("present");
        assert!(stored.is_handled);
        assert_eq!(stored.updated_at, base_time() + Duration::minutes(30));
    }

    #[tokio::test]
    async fn insert_for_unknown_user_is_rejected() {
        let f = fixture().await;
        let err = f
            .emergencies
            .insert(&emergency(UserId::new(), "orphan report", base_time()))
            .await
            .expect_err("foreign key");
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let f = fixture().await;
        let e = emergency(f.reporter.id, "listrik padam", base_time());
        f.emergencies.insert(&e).await.expect("insert");

        f.emergencies.delete(e.id).await.expect("delete");
        assert!(f.emergencies.delete(e.id).await.expect_err("again").is_not_found());
        assert!(f.emergencies.get(e.id).await.expect("get").is_none());
    }
}
