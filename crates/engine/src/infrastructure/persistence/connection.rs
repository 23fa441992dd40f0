//! SQLite connection management

use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Shared SQLite connection pool
#[derive(Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        tracing::info!("Connected to SQLite at {}", database_url);

        Ok(Self { pool })
    }

    /// Single-connection in-memory database. The connection is never recycled,
    /// so the schema lives as long as the pool.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let connection = Self { pool };
        connection.initialize_schema().await?;
        Ok(connection)
    }

    /// Get a reference to the pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn initialize_schema(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                phone_number TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'REGULAR',
                emergency_change INTEGER NOT NULL DEFAULT 3,
                emergency_blocked_until TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS regulations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                year INTEGER NOT NULL,
                file_path TEXT NOT NULL,
                file_name TEXT NOT NULL,
                file_size INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS emergencies (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                phone_number TEXT,
                message TEXT NOT NULL,
                latitude TEXT NOT NULL,
                longitude TEXT NOT NULL,
                is_handled INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS map_features (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                year INTEGER NOT NULL,
                coordinates TEXT NOT NULL,
                icon TEXT,
                color TEXT,
                area REAL,
                radius REAL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS emergencies_created_at ON emergencies (created_at)",
            "CREATE INDEX IF NOT EXISTS emergencies_is_handled ON emergencies (is_handled)",
            "CREATE INDEX IF NOT EXISTS map_features_type_year ON map_features (type, year)",
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        tracing::info!("Database schema initialized");
        Ok(())
    }
}
