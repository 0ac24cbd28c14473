//! In-memory storage backend.
//!
//! Implements every repository trait over a single shared state so the HTTP
//! layer can be exercised without PostgreSQL. Unique constraints (user email
//! and username, note and notebook slugs, setting keys) are enforced the same
//! way the schema enforces them, including across soft-deleted rows.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taranote_db::{Database, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let db = Database::in_memory(store.clone());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use taranote_core::{
    Article, Error, NewNote, NewNotebook, NewUser, Note, NoteChanges, NoteFilter, NoteRepository,
    NoteStatus, Notebook, NotebookChanges, NotebookRepository, NotebookSummary, Result, Setting,
    SettingRepository, SettingUpdate, User, UserRepository, DEFAULT_SETTING_GROUP,
    DEFAULT_SETTING_TYPE,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    notebooks: HashMap<Uuid, Notebook>,
    notes: HashMap<Uuid, Note>,
    settings: HashMap<String, Setting>,
    /// Setting key whose write fails, to exercise batch rollback.
    failing_setting_key: Option<String>,
}

impl MemoryState {
    fn notebook_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> bool {
        self.notebooks
            .values()
            .any(|nb| nb.slug == slug && Some(nb.id) != exclude)
    }

    fn note_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> bool {
        self.notes
            .values()
            .any(|n| n.slug == slug && Some(n.id) != exclude)
    }

    fn article(&self, note: &Note) -> Article {
        let notebook = note
            .notebook_id
            .and_then(|id| self.notebooks.get(&id))
            .filter(|nb| nb.deleted_at.is_none());

        Article {
            note: note.clone(),
            author_name: self
                .users
                .get(&note.user_id)
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            notebook_name: notebook.map(|nb| nb.name.clone()),
            notebook_slug: notebook.map(|nb| nb.slug.clone()),
        }
    }
}

fn upsert_setting(
    settings: &mut HashMap<String, Setting>,
    failing_key: Option<&str>,
    update: &SettingUpdate,
) -> Result<()> {
    if failing_key == Some(update.key.as_str()) {
        return Err(Error::Internal(format!(
            "write to setting '{}' failed",
            update.key
        )));
    }

    let now = Utc::now();
    settings
        .entry(update.key.clone())
        .and_modify(|s| {
            s.value = update.value.clone();
            s.updated_at = now;
        })
        .or_insert_with(|| Setting {
            id: Uuid::now_v7(),
            key: update.key.clone(),
            value: update.value.clone(),
            kind: DEFAULT_SETTING_TYPE.to_string(),
            group: DEFAULT_SETTING_GROUP.to_string(),
            created_at: now,
            updated_at: now,
        });
    Ok(())
}

/// Shared in-memory store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every batch that writes `key` fail.
    pub async fn fail_setting_writes_for(&self, key: impl Into<String>) {
        self.state.write().await.failing_setting_key = Some(key.into());
    }

    /// Mark a user deleted. Lookups then treat them as absent.
    pub async fn soft_delete_user(&self, id: Uuid) {
        if let Some(user) = self.state.write().await.users.get_mut(&id) {
            user.deleted_at = Some(Utc::now());
        }
    }
}

// =============================================================================
// USERS
// =============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(Error::Conflict("user already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

// =============================================================================
// NOTEBOOKS
// =============================================================================

#[async_trait]
impl NotebookRepository for MemoryStore {
    async fn list_for_owner(&self, user_id: Uuid) -> Result<Vec<Notebook>> {
        let state = self.state.read().await;
        let mut notebooks: Vec<Notebook> = state
            .notebooks
            .values()
            .filter(|nb| nb.user_id == user_id && nb.deleted_at.is_none())
            .cloned()
            .collect();
        notebooks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(notebooks)
    }

    async fn list_public(&self) -> Result<Vec<NotebookSummary>> {
        let state = self.state.read().await;
        let mut summaries: Vec<NotebookSummary> = state
            .notebooks
            .values()
            .filter(|nb| nb.deleted_at.is_none())
            .map(|nb| NotebookSummary {
                notebook: nb.clone(),
                notes_count: state
                    .notes
                    .values()
                    .filter(|n| {
                        n.notebook_id == Some(nb.id)
                            && n.status == NoteStatus::Published
                            && n.deleted_at.is_none()
                    })
                    .count() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| a.notebook.name.cmp(&b.notebook.name));
        Ok(summaries)
    }

    async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notebook>> {
        let state = self.state.read().await;
        Ok(state
            .notebooks
            .get(&id)
            .filter(|nb| nb.user_id == user_id && nb.deleted_at.is_none())
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        Ok(self.state.read().await.notebook_slug_taken(slug, exclude))
    }

    async fn insert(&self, notebook: NewNotebook) -> Result<Notebook> {
        let mut state = self.state.write().await;
        if state.notebook_slug_taken(&notebook.slug, None) {
            return Err(Error::Conflict("notebook slug already exists".to_string()));
        }

        let now = Utc::now();
        let notebook = Notebook {
            id: Uuid::now_v7(),
            user_id: notebook.user_id,
            name: notebook.name,
            slug: notebook.slug,
            description: notebook.description,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.notebooks.insert(notebook.id, notebook.clone());
        Ok(notebook)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: NotebookChanges,
    ) -> Result<Option<Notebook>> {
        let mut state = self.state.write().await;
        let owned = state
            .notebooks
            .get(&id)
            .is_some_and(|nb| nb.user_id == user_id && nb.deleted_at.is_none());
        if !owned {
            return Ok(None);
        }
        if state.notebook_slug_taken(&changes.slug, Some(id)) {
            return Err(Error::Conflict("notebook slug already exists".to_string()));
        }

        let Some(notebook) = state.notebooks.get_mut(&id) else {
            return Ok(None);
        };
        notebook.name = changes.name;
        notebook.slug = changes.slug;
        notebook.description = changes.description;
        notebook.updated_at = Utc::now();
        Ok(Some(notebook.clone()))
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        match state.notebooks.get_mut(&id) {
            Some(nb) if nb.user_id == user_id && nb.deleted_at.is_none() => {
                nb.deleted_at = Some(now);
            }
            _ => return Ok(false),
        }

        for note in state.notes.values_mut() {
            if note.notebook_id == Some(id) {
                note.notebook_id = None;
                note.updated_at = now;
            }
        }
        Ok(true)
    }
}

// =============================================================================
// NOTES
// =============================================================================

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn list_for_owner(&self, user_id: Uuid, filter: &NoteFilter) -> Result<Vec<Note>> {
        let state = self.state.read().await;
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|n| n.user_id == user_id && n.deleted_at.is_none())
            .filter(|n| filter.status.map_or(true, |s| n.status == s))
            .filter(|n| filter.notebook_id.map_or(true, |id| n.notebook_id == Some(id)))
            .filter(|n| {
                search.as_deref().map_or(true, |q| {
                    n.title.to_lowercase().contains(q) || n.content.to_lowercase().contains(q)
                })
            })
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(notes)
    }

    async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>> {
        let state = self.state.read().await;
        Ok(state
            .notes
            .get(&id)
            .filter(|n| n.user_id == user_id && n.deleted_at.is_none())
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        Ok(self.state.read().await.note_slug_taken(slug, exclude))
    }

    async fn insert(&self, note: NewNote) -> Result<Note> {
        let mut state = self.state.write().await;
        if state.note_slug_taken(&note.slug, None) {
            return Err(Error::Conflict("note slug already exists".to_string()));
        }

        let now = Utc::now();
        let note = Note {
            id: Uuid::now_v7(),
            user_id: note.user_id,
            notebook_id: None,
            title: note.title,
            slug: note.slug,
            excerpt: String::new(),
            content: String::new(),
            cover_image: String::new(),
            status: NoteStatus::Draft,
            published_at: None,
            views: 0,
            is_featured: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, id: Uuid, user_id: Uuid, changes: NoteChanges) -> Result<Option<Note>> {
        let mut state = self.state.write().await;
        let Some(note) = state
            .notes
            .get_mut(&id)
            .filter(|n| n.user_id == user_id && n.deleted_at.is_none())
        else {
            return Ok(None);
        };

        note.title = changes.title;
        note.content = changes.content;
        note.excerpt = changes.excerpt;
        note.cover_image = changes.cover_image;
        note.notebook_id = changes.notebook_id;
        note.status = changes.status;
        note.is_featured = changes.is_featured;
        note.published_at = changes.published_at;
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.notes.get_mut(&id) {
            Some(n) if n.user_id == user_id && n.deleted_at.is_none() => {
                n.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_published(&self, limit: Option<i64>) -> Result<Vec<Article>> {
        let state = self.state.read().await;
        let mut notes: Vec<&Note> = state
            .notes
            .values()
            .filter(|n| n.status == NoteStatus::Published && n.deleted_at.is_none())
            .collect();
        // Newest first, never-stamped last.
        notes.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let limit = limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(notes
            .into_iter()
            .take(limit)
            .map(|n| state.article(n))
            .collect())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let state = self.state.read().await;
        Ok(state
            .notes
            .values()
            .find(|n| {
                n.slug == slug && n.status == NoteStatus::Published && n.deleted_at.is_none()
            })
            .map(|n| state.article(n)))
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        if let Some(note) = self.state.write().await.notes.get_mut(&id) {
            note.views += 1;
        }
        Ok(())
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

#[async_trait]
impl SettingRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Setting>> {
        let state = self.state.read().await;
        let mut settings: Vec<Setting> = state.settings.values().cloned().collect();
        settings.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.key.cmp(&b.key)));
        Ok(settings)
    }

    async fn upsert_batch(&self, updates: &[SettingUpdate]) -> Result<()> {
        let mut state = self.state.write().await;

        // Apply to a copy and swap it in only when every write succeeded.
        let mut staged = state.settings.clone();
        for update in updates {
            upsert_setting(&mut staged, state.failing_setting_key.as_deref(), update)?;
        }

        state.settings = staged;
        Ok(())
    }

    async fn insert_if_missing(
        &self,
        key: &str,
        value: &str,
        kind: &str,
        group: &str,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.settings.contains_key(key) {
            return Ok(false);
        }

        let now = Utc::now();
        state.settings.insert(
            key.to_string(),
            Setting {
                id: Uuid::now_v7(),
                key: key.to_string(),
                value: value.to_string(),
                kind: kind.to_string(),
                group: group.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(store: &MemoryStore, email: &str) -> User {
        UserRepository::insert(
            store,
            NewUser {
                name: "Tara".into(),
                username: email.split('@').next().unwrap_or(email).into(),
                email: email.into(),
                password_hash: "hash".into(),
                role: "admin".into(),
                is_admin: true,
            },
        )
        .await
        .unwrap()
    }

    fn publish(title: &str, notebook_id: Option<Uuid>) -> NoteChanges {
        NoteChanges {
            title: title.into(),
            content: String::new(),
            excerpt: String::new(),
            cover_image: String::new(),
            notebook_id,
            status: NoteStatus::Published,
            is_featured: false,
            published_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        seed_user(&store, "a@example.com").await;
        let err = UserRepository::insert(
            &store,
            NewUser {
                name: "Other".into(),
                username: "other".into(),
                email: "a@example.com".into(),
                password_hash: "hash".into(),
                role: "user".into(),
                is_admin: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deleted_note_keeps_its_slug() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@example.com").await;
        let note = NoteRepository::insert(
            &store,
            NewNote {
                user_id: user.id,
                title: "Hello".into(),
                slug: "hello".into(),
            },
        )
        .await
        .unwrap();

        assert!(NoteRepository::soft_delete(&store, note.id, user.id).await.unwrap());
        assert!(NoteRepository::slug_exists(&store, "hello", None).await.unwrap());
        assert!(!NoteRepository::slug_exists(&store, "hello", Some(note.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_owner_scoping_hides_foreign_rows() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.com").await;
        let other = seed_user(&store, "other@example.com").await;
        let note = NoteRepository::insert(
            &store,
            NewNote {
                user_id: owner.id,
                title: "Mine".into(),
                slug: "mine".into(),
            },
        )
        .await
        .unwrap();

        assert!(NoteRepository::find_for_owner(&store, note.id, other.id)
            .await
            .unwrap()
            .is_none());
        assert!(!NoteRepository::soft_delete(&store, note.id, other.id).await.unwrap());
        assert!(NoteRepository::update(&store, note.id, other.id, publish("x", None))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_notebook_delete_unfiles_notes_and_counts_published_only() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@example.com").await;
        let notebook = NotebookRepository::insert(
            &store,
            NewNotebook {
                user_id: user.id,
                name: "Guides".into(),
                slug: "guides".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap();

        for (i, status) in [NoteStatus::Published, NoteStatus::Draft].into_iter().enumerate() {
            let note = NoteRepository::insert(
                &store,
                NewNote {
                    user_id: user.id,
                    title: format!("n{}", i),
                    slug: format!("n{}", i),
                },
            )
            .await
            .unwrap();
            let mut changes = publish(&note.title, Some(notebook.id));
            changes.status = status;
            NoteRepository::update(&store, note.id, user.id, changes)
                .await
                .unwrap();
        }

        let public = NotebookRepository::list_public(&store).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].notes_count, 1);

        assert!(NotebookRepository::soft_delete(&store, notebook.id, user.id)
            .await
            .unwrap());
        let filter = NoteFilter::default();
        let notes = NoteRepository::list_for_owner(&store, user.id, &filter)
            .await
            .unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.notebook_id.is_none()));
        assert!(NotebookRepository::list_public(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_setting_batch_leaves_settings_unchanged() {
        let store = MemoryStore::new();
        store
            .upsert_batch(&[SettingUpdate {
                key: "site_name".into(),
                value: "Before".into(),
            }])
            .await
            .unwrap();
        store.fail_setting_writes_for("broken").await;

        let result = store
            .upsert_batch(&[
                SettingUpdate {
                    key: "site_name".into(),
                    value: "After".into(),
                },
                SettingUpdate {
                    key: "broken".into(),
                    value: "x".into(),
                },
            ])
            .await;
        assert!(result.is_err());

        let settings = SettingRepository::list(&store).await.unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].value, "Before");
    }

    #[tokio::test]
    async fn test_insert_if_missing_keeps_existing_value() {
        let store = MemoryStore::new();
        assert!(store
            .insert_if_missing("footer_text", "Hi", "text", "footer")
            .await
            .unwrap());
        assert!(!store
            .insert_if_missing("footer_text", "Other", "text", "footer")
            .await
            .unwrap());

        let settings = SettingRepository::list(&store).await.unwrap();
        assert_eq!(settings[0].value, "Hi");
        assert_eq!(settings[0].group, "footer");
    }

    #[tokio::test]
    async fn test_soft_deleted_user_is_absent() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "tara@example.com").await;
        store.soft_delete_user(user.id).await;

        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store
            .find_by_email("tara@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
