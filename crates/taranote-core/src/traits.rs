//! Repository traits for TaraNote storage backends.
//!
//! Every owner-scoped method takes the acting user's id and must filter on
//! it: a row owned by someone else is indistinguishable from a missing row.
//! Soft-deleted rows (`deleted_at` set) are excluded from every read except
//! slug probes, because deleted rows still hold their slug in the unique index.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a live user by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a live user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Insert a user. Duplicate emails fail with `Error::Conflict`.
    async fn insert(&self, user: NewUser) -> Result<User>;
}

// =============================================================================
// NOTEBOOK REPOSITORY
// =============================================================================

#[async_trait]
pub trait NotebookRepository: Send + Sync {
    /// List a user's notebooks ordered by name.
    async fn list_for_owner(&self, user_id: Uuid) -> Result<Vec<Notebook>>;

    /// List every live notebook with its published-note count, ordered by name.
    async fn list_public(&self) -> Result<Vec<NotebookSummary>>;

    /// Fetch one of the user's notebooks.
    async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notebook>>;

    /// Whether any row, deleted or not, other than `exclude` holds `slug`.
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool>;

    /// Insert a notebook. A slug collision fails with `Error::Conflict`.
    async fn insert(&self, notebook: NewNotebook) -> Result<Notebook>;

    /// Replace the editable fields. `None` when no such notebook for the user.
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: NotebookChanges,
    ) -> Result<Option<Notebook>>;

    /// Soft-delete and unfile the owner's notes in it. `false` when absent.
    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// List a user's notes, most recently updated first.
    async fn list_for_owner(&self, user_id: Uuid, filter: &NoteFilter) -> Result<Vec<Note>>;

    /// Fetch one of the user's notes.
    async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>>;

    /// Whether any row, deleted or not, other than `exclude` holds `slug`.
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool>;

    /// Insert a DRAFT note with no notebook.
    async fn insert(&self, note: NewNote) -> Result<Note>;

    /// Replace the editable fields. `None` when no such note for the user.
    async fn update(&self, id: Uuid, user_id: Uuid, changes: NoteChanges) -> Result<Option<Note>>;

    /// Soft-delete. `false` when absent.
    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Published notes, newest publication first.
    async fn list_published(&self, limit: Option<i64>) -> Result<Vec<Article>>;

    /// A published note by slug.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// Bump the view counter of a note.
    async fn increment_views(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// SETTING REPOSITORY
// =============================================================================

#[async_trait]
pub trait SettingRepository: Send + Sync {
    /// All settings ordered by group, then key.
    async fn list(&self) -> Result<Vec<Setting>>;

    /// Update-or-insert every entry atomically. New keys get the default
    /// type and group tags. Any failure leaves all settings unchanged.
    async fn upsert_batch(&self, updates: &[SettingUpdate]) -> Result<()>;

    /// Insert a setting with explicit tags unless the key already exists.
    /// Returns whether a row was inserted.
    async fn insert_if_missing(&self, key: &str, value: &str, kind: &str, group: &str)
        -> Result<bool>;
}
