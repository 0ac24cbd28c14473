//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use taranote_core::{
    Article, Error, NewNote, Note, NoteChanges, NoteFilter, NoteRepository, NoteStatus, Result,
};

use crate::{escape_like, map_write_err};

const NOTE_COLUMNS: &str = "n.id, n.user_id, n.notebook_id, n.title, n.slug, n.excerpt, \
                            n.content, n.cover_image, n.status, n.published_at, n.views, \
                            n.is_featured, n.created_at, n.updated_at, n.deleted_at";

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn note_from_row(r: &PgRow) -> Result<Note> {
    let status: String = r.get("status");
    Ok(Note {
        id: r.get("id"),
        user_id: r.get("user_id"),
        notebook_id: r.get("notebook_id"),
        title: r.get("title"),
        slug: r.get("slug"),
        excerpt: r.get("excerpt"),
        content: r.get("content"),
        cover_image: r.get("cover_image"),
        status: status.parse::<NoteStatus>()?,
        published_at: r.get("published_at"),
        views: r.get("views"),
        is_featured: r.get("is_featured"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        deleted_at: r.get("deleted_at"),
    })
}

fn article_from_row(r: &PgRow) -> Result<Article> {
    Ok(Article {
        note: note_from_row(r)?,
        author_name: r.get("author_name"),
        notebook_name: r.get("notebook_name"),
        notebook_slug: r.get("notebook_slug"),
    })
}

fn published_query(tail: &str) -> String {
    format!(
        "SELECT {}, u.name AS author_name, nb.name AS notebook_name, nb.slug AS notebook_slug
         FROM notes n
         JOIN users u ON u.id = n.user_id
         LEFT JOIN notebooks nb ON nb.id = n.notebook_id AND nb.deleted_at IS NULL
         WHERE n.status = 'PUBLISHED' AND n.deleted_at IS NULL {}",
        NOTE_COLUMNS, tail
    )
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list_for_owner(&self, user_id: Uuid, filter: &NoteFilter) -> Result<Vec<Note>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(escape_like);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM notes n
            WHERE n.user_id = $1 AND n.deleted_at IS NULL
              AND ($2::text IS NULL OR n.status = $2)
              AND ($3::uuid IS NULL OR n.notebook_id = $3)
              AND ($4::text IS NULL
                   OR n.title ILIKE '%' || $4 || '%' ESCAPE '\'
                   OR n.content ILIKE '%' || $4 || '%' ESCAPE '\')
            ORDER BY n.updated_at DESC, n.id DESC
            "#,
            NOTE_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.notebook_id)
        .bind(search)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(note_from_row).collect()
    }

    async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM notes n
             WHERE n.id = $1 AND n.user_id = $2 AND n.deleted_at IS NULL",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(note_from_row).transpose()
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        // Deleted rows still hold their slug in the unique index.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM notes
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

    async fn insert(&self, note: NewNote) -> Result<Note> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO notes AS n (id, user_id, title, slug, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(note.user_id)
        .bind(&note.title)
        .bind(&note.slug)
        .bind(NoteStatus::Draft.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "note slug"))?;

        note_from_row(&row)
    }

    async fn update(&self, id: Uuid, user_id: Uuid, changes: NoteChanges) -> Result<Option<Note>> {
        let row = sqlx::query(&format!(
            "UPDATE notes AS n
             SET title = $3, content = $4, excerpt = $5, cover_image = $6,
                 notebook_id = $7, status = $8, is_featured = $9,
                 published_at = $10, updated_at = $11
             WHERE n.id = $1 AND n.user_id = $2 AND n.deleted_at IS NULL
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.excerpt)
        .bind(&changes.cover_image)
        .bind(changes.notebook_id)
        .bind(changes.status.as_str())
        .bind(changes.is_featured)
        .bind(changes.published_at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(note_from_row).transpose()
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE notes SET deleted_at = $3
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_published(&self, limit: Option<i64>) -> Result<Vec<Article>> {
        let rows = sqlx::query(&published_query(
            "ORDER BY n.published_at DESC NULLS LAST, n.id DESC LIMIT $1",
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(article_from_row).collect()
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&published_query("AND n.slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE notes SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
