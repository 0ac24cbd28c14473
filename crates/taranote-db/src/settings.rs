//! Setting repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use taranote_core::{
    Error, Result, Setting, SettingRepository, SettingUpdate, DEFAULT_SETTING_GROUP,
    DEFAULT_SETTING_TYPE,
};

/// PostgreSQL implementation of SettingRepository.
pub struct PgSettingRepository {
    pool: Pool<Postgres>,
}

impl PgSettingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingRepository for PgSettingRepository {
    async fn list(&self) -> Result<Vec<Setting>> {
        let rows = sqlx::query(
            r#"SELECT id, key, value, type, "group", created_at, updated_at
               FROM settings
               ORDER BY "group", key"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Setting {
                id: r.get("id"),
                key: r.get("key"),
                value: r.get("value"),
                kind: r.get("type"),
                group: r.get("group"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
            .collect())
    }

    async fn upsert_batch(&self, updates: &[SettingUpdate]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let now = Utc::now();

        // Dropping the transaction on an early return rolls it back.
        for update in updates {
            sqlx::query(
                r#"INSERT INTO settings (id, key, value, type, "group", created_at, updated_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $6)
                   ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at"#,
            )
            .bind(Uuid::now_v7())
            .bind(&update.key)
            .bind(&update.value)
            .bind(DEFAULT_SETTING_TYPE)
            .bind(DEFAULT_SETTING_GROUP)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn insert_if_missing(
        &self,
        key: &str,
        value: &str,
        kind: &str,
        group: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"INSERT INTO settings (id, key, value, type, "group", created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               ON CONFLICT (key) DO NOTHING"#,
        )
        .bind(Uuid::now_v7())
        .bind(key)
        .bind(value)
        .bind(kind)
        .bind(group)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
