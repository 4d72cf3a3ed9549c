//! SQLite-based snapshot store

use crate::persistence::PersistenceBackend;
use crate::core::PipelineSnapshot;
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

/// SQLite snapshot store
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the database at `db_path`; `:memory:` for a private in-memory db
    pub async fn new(db_path: &str) -> Result<Self> {
        let (options, max_connections) = if db_path == ":memory:" {
            (SqliteConnectOptions::from_str("sqlite::memory:")?, 1)
        } else {
            (
                SqliteConnectOptions::new()
                    .filename(db_path)
                    .create_if_missing(true),
                4,
            )
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Create store with default path
    pub async fn with_default_path() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        let db_dir = data_dir.join("vendor-verify");
        std::fs::create_dir_all(&db_dir)
            .with_context(|| format!("Failed to create {}", db_dir.display()))?;

        let db_path = db_dir.join("applications.db");
        let db_path = db_path
            .to_str()
            .context("Database path is not valid UTF-8")?;
        Self::new(db_path).await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id TEXT PRIMARY KEY,
                overall_status TEXT NOT NULL,
                progress REAL NOT NULL DEFAULT 0.0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                snapshot TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_overall_status ON applications(overall_status);
            CREATE INDEX IF NOT EXISTS idx_created_at ON applications(created_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn decode(row: &sqlx::sqlite::SqliteRow) -> Result<PipelineSnapshot> {
        let json: String = row.get("snapshot");
        serde_json::from_str(&json).context("Corrupt snapshot record")
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for SqliteSnapshotStore {
    async fn save_snapshot(&self, snapshot: &PipelineSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO applications
            (id, overall_status, progress, created_at, updated_at, snapshot)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(snapshot.application_id.to_string())
        .bind(snapshot.overall_status.as_str())
        .bind(snapshot.progress_percent)
        .bind(snapshot.created_at)
        .bind(Utc::now())
        .bind(json)
        .execute(&self.pool)
        .await
        .context("Failed to save snapshot")?;

        Ok(())
    }

    async fn load_snapshot(&self, application_id: Uuid) -> Result<Option<PipelineSnapshot>> {
        let row = sqlx::query("SELECT snapshot FROM applications WHERE id = ?1")
            .bind(application_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load snapshot")?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn list_snapshots(&self, limit: usize) -> Result<Vec<PipelineSnapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT snapshot
            FROM applications
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list snapshots")?;

        rows.iter().map(Self::decode).collect()
    }
}
