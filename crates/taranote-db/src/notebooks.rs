//! Notebook repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use taranote_core::logging::subsystem;
use taranote_core::{
    Error, NewNotebook, Notebook, NotebookChanges, NotebookRepository, NotebookSummary, Result,
};

use crate::map_write_err;

const NOTEBOOK_COLUMNS: &str =
    "id, user_id, name, slug, description, created_at, updated_at, deleted_at";

/// PostgreSQL implementation of NotebookRepository.
pub struct PgNotebookRepository {
    pool: Pool<Postgres>,
}

impl PgNotebookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn notebook_from_row(r: &PgRow) -> Notebook {
    Notebook {
        id: r.get("id"),
        user_id: r.get("user_id"),
        name: r.get("name"),
        slug: r.get("slug"),
        description: r.get("description"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        deleted_at: r.get("deleted_at"),
    }
}

#[async_trait]
impl NotebookRepository for PgNotebookRepository {
    async fn list_for_owner(&self, user_id: Uuid) -> Result<Vec<Notebook>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notebooks
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY name",
            NOTEBOOK_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(notebook_from_row).collect())
    }

    async fn list_public(&self) -> Result<Vec<NotebookSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT nb.id, nb.user_id, nb.name, nb.slug, nb.description,
                   nb.created_at, nb.updated_at, nb.deleted_at,
                   COALESCE((
                       SELECT COUNT(*) FROM notes n
                       WHERE n.notebook_id = nb.id
                         AND n.status = 'PUBLISHED'
                         AND n.deleted_at IS NULL
                   ), 0) AS notes_count
            FROM notebooks nb
            WHERE nb.deleted_at IS NULL
            ORDER BY nb.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|r| NotebookSummary {
                notebook: notebook_from_row(r),
                notes_count: r.get("notes_count"),
            })
            .collect())
    }

    async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notebook>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM notebooks
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
            NOTEBOOK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(notebook_from_row))
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        // Deleted rows still hold their slug in the unique index.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM notebooks
                 WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(exists)
    }

    async fn insert(&self, notebook: NewNotebook) -> Result<Notebook> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO notebooks (id, user_id, name, slug, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {}",
            NOTEBOOK_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(notebook.user_id)
        .bind(&notebook.name)
        .bind(&notebook.slug)
        .bind(&notebook.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "notebook slug"))?;

        Ok(notebook_from_row(&row))
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: NotebookChanges,
    ) -> Result<Option<Notebook>> {
        let row = sqlx::query(&format!(
            "UPDATE notebooks
             SET name = $3, slug = $4, description = $5, updated_at = $6
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
             RETURNING {}",
            NOTEBOOK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&changes.name)
        .bind(&changes.slug)
        .bind(&changes.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "notebook slug"))?;

        Ok(row.as_ref().map(notebook_from_row))
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let now = Utc::now();

        let deleted = sqlx::query(
            "UPDATE notebooks SET deleted_at = $3
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        if deleted == 0 {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(false);
        }

        // Notes outlive their notebook; they become unfiled.
        let unfiled = sqlx::query(
            "UPDATE notes SET notebook_id = NULL, updated_at = $2 WHERE notebook_id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = subsystem::DATABASE,
            component = "notebooks",
            op = "soft_delete",
            notebook_id = %id,
            unfiled_notes = unfiled,
            "Notebook deleted"
        );
        Ok(true)
    }
}
