use anyhow::{bail, Context};
use sqlx::any::{AnyKind, AnyPoolOptions};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::models::{NewPaste, Paste};

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect to a database by URL. The driver is picked from the URL scheme.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("failed to connect to database")?;
        Ok(Self { pool })
    }

    /// Apply the embedded migrations for the connected backend.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let migrator = match self.pool.any_kind() {
            #[cfg(feature = "sqlite")]
            AnyKind::Sqlite => sqlx::migrate!("./migrations/sqlite"),
            #[cfg(feature = "mysql")]
            AnyKind::MySql => sqlx::migrate!("./migrations/mysql"),
            #[allow(unreachable_patterns)]
            kind => bail!("no migrations for {kind:?} databases"),
        };
        migrator
            .run(&self.pool)
            .await
            .context("failed to run migrations")?;
        Ok(())
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn ping(&mut self) -> crate::ApiResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }

    /// Get all pastes.
    pub async fn get_all_pastes(&mut self) -> crate::ApiResult<Vec<Paste>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sqlx::query_as::<_, Paste>(
            "SELECT id, content, created_at, expires_at, max_views, view_count FROM paste",
        )
        .fetch_all(&mut conn)
        .await?)
    }

    /// Get a paste by id.
    pub async fn get_paste(&mut self, id: &str) -> crate::ApiResult<Paste> {
        let mut conn = self.pool.acquire().await?;
        let paste = sqlx::query_as::<_, Paste>(
            "SELECT id, content, created_at, expires_at, max_views, view_count FROM paste WHERE \
             id = ?",
        )
        .bind(id)
        .fetch_one(&mut conn)
        .await?;
        Ok(paste)
    }

    /// Insert a paste, assigning its id.
    pub async fn insert_paste(&mut self, paste: NewPaste) -> crate::ApiResult<Paste> {
        let id = Uuid::new_v4().to_string();

        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO paste (id, content, created_at, expires_at, max_views, view_count) \
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(&id)
        .bind(&paste.content)
        .bind(paste.created_at)
        .bind(paste.expires_at)
        .bind(paste.max_views)
        .execute(&mut conn)
        .await?;

        Ok(paste.into_paste(id))
    }

    /// Count one view of a paste and return the updated row, or `None` if the
    /// paste has no views left.
    pub async fn record_view(&mut self, id: &str) -> crate::ApiResult<Option<Paste>> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            "UPDATE paste SET view_count = view_count + 1 WHERE id = ? AND (max_views IS NULL \
             OR view_count < max_views)",
        )
        .bind(id)
        .execute(&mut conn)
        .await?;
        if result.rows_affected() != 1 {
            return Ok(None);
        }

        let paste = sqlx::query_as::<_, Paste>(
            "SELECT id, content, created_at, expires_at, max_views, view_count FROM paste WHERE \
             id = ?",
        )
        .bind(id)
        .fetch_one(&mut conn)
        .await?;
        Ok(Some(paste))
    }

    /// Delete a paste by id.
    pub async fn delete_paste(&mut self, id: &str) -> crate::ApiResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("DELETE FROM paste WHERE id = ?")
            .bind(id)
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
