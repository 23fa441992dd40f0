//! Regulation repository implementation for SQLite

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use super::connection::SqliteConnection;
use super::{column, encode_time, time_column, write_error};
use crate::infrastructure::ports::{RegulationRepo, RepoError};
use sidesa_domain::{NewRegulation, Regulation, RegulationId};

const SELECT_REGULATION: &str = "SELECT id, title, year, file_path, file_name, file_size, created_at, updated_at FROM regulations";

/// Repository for Regulation operations
pub struct SqliteRegulationRepository {
    connection: SqliteConnection,
}

impl SqliteRegulationRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl RegulationRepo for SqliteRegulationRepository {
    async fn create(&self, regulation: &NewRegulation) -> Result<Regulation, RepoError> {
        let created_at = encode_time(regulation.created_at);
        let result = sqlx::query(
            "INSERT INTO regulations (title, year, file_path, file_name, file_size, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&regulation.title)
        .bind(regulation.year)
        .bind(&regulation.file_path)
        .bind(&regulation.file_name)
        .bind(regulation.file_size)
        .bind(&created_at)
        .bind(&created_at)
        .execute(self.connection.pool())
        .await
        .map_err(|e| write_error("regulation.create", e))?;

        let id = RegulationId::new(result.last_insert_rowid());
        tracing::debug!("Created regulation {}: {}", id, regulation.title);

        Ok(Regulation {
            id,
            title: regulation.title.clone(),
            year: regulation.year,
            file_path: regulation.file_path.clone(),
            file_name: regulation.file_name.clone(),
            file_size: regulation.file_size,
            created_at: regulation.created_at,
            updated_at: regulation.created_at,
        })
    }

    async fn get(&self, id: RegulationId) -> Result<Option<Regulation>, RepoError> {
        let row = sqlx::query(&format!("{SELECT_REGULATION} WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| RepoError::database("regulation.get", e))?;

        row.as_ref().map(row_to_regulation).transpose()
    }

    async fn list(&self) -> Result<Vec<Regulation>, RepoError> {
        let rows = sqlx::query(&format!(
            "{SELECT_REGULATION} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.connection.pool())
        .await
        .map_err(|e| RepoError::database("regulation.list", e))?;

        rows.iter().map(row_to_regulation).collect()
    }

    async fn update(&self, regulation: &Regulation) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE regulations
            SET title = ?, year = ?, file_path = ?, file_name = ?, file_size = ?, updated_at = ?
            WHERE id = ?",
        )
        .bind(&regulation.title)
        .bind(regulation.year)
        .bind(&regulation.file_path)
        .bind(&regulation.file_name)
        .bind(regulation.file_size)
        .bind(encode_time(regulation.updated_at))
        .bind(regulation.id.get())
        .execute(self.connection.pool())
        .await
        .map_err(|e| write_error("regulation.update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Regulation", regulation.id));
        }
        tracing::debug!("Updated regulation {}", regulation.id);
        Ok(())
    }

    async fn delete(&self, id: RegulationId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM regulations WHERE id = ?")
            .bind(id.get())
            .execute(self.connection.pool())
            .await
            .map_err(|e| RepoError::database("regulation.delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Regulation", id));
        }
        tracing::debug!("Deleted regulation {}", id);
        Ok(())
    }
}

fn row_to_regulation(row: &SqliteRow) -> Result<Regulation, RepoError> {
    Ok(Regulation {
        id: RegulationId::new(column(row, "id")?),
        title: column(row, "title")?,
        year: column(row, "year")?,
        file_path: column(row, "file_path")?,
        file_name: column(row, "file_name")?,
        file_size: column(row, "file_size")?,
        created_at: time_column(row, "created_at")?,
        updated_at: time_column(row, "updated_at")?,
    })
}
