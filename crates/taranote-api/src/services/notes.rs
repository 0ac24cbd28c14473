//! Owner-scoped note management.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use taranote_core::logging::subsystem;
use taranote_core::{
    generate_slug, unique_slug, CreateNoteInput, Error, FieldErrors, NewNote, Note, NoteChanges,
    NoteFilter, NoteStatus, Result, UpdateNoteInput,
};
use taranote_db::Database;

use super::MAX_TITLE_CHARS;

/// Query string for the owner's note listing.
#[derive(Debug, Default, Deserialize)]
pub struct NoteQuery {
    pub status: Option<String>,
    pub notebook_id: Option<Uuid>,
    pub search: Option<String>,
}

impl NoteQuery {
    fn into_filter(self) -> Result<NoteFilter> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_status(raw)?),
        };
        Ok(NoteFilter {
            status,
            notebook_id: self.notebook_id,
            search: self.search,
        })
    }
}

#[derive(Clone)]
pub struct NoteService {
    db: Database,
}

impl NoteService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The owner's notes, most recently updated first.
    pub async fn list(&self, user_id: Uuid, query: NoteQuery) -> Result<Vec<Note>> {
        let filter = query.into_filter()?;
        self.db.notes.list_for_owner(user_id, &filter).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Note> {
        self.db
            .notes
            .find_for_owner(id, user_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Create an unfiled DRAFT whose slug derives from the title.
    pub async fn create(&self, user_id: Uuid, input: CreateNoteInput) -> Result<Note> {
        let mut errors = FieldErrors::new();
        let title = validate_title(&input.title, &mut errors);
        errors.into_result()?;

        let repo = &self.db.notes;
        let slug = unique_slug(&generate_slug(&title), |candidate| async move {
            repo.slug_exists(&candidate, None).await
        })
        .await?;

        let note = repo.insert(NewNote { user_id, title, slug }).await?;

        info!(
            subsystem = subsystem::API,
            component = "notes",
            op = "create",
            user_id = %user_id,
            note_id = %note.id,
            slug = %note.slug,
            "Note created"
        );
        Ok(note)
    }

    /// Replace every editable field. The slug is left as is.
    pub async fn update(&self, user_id: Uuid, id: Uuid, input: UpdateNoteInput) -> Result<Note> {
        let existing = self.get(user_id, id).await?;

        let mut errors = FieldErrors::new();
        let title = validate_title(&input.title, &mut errors);
        let status = match parse_status(input.status.trim()) {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", status_message());
                None
            }
        };
        if let Some(notebook_id) = input.notebook_id {
            let owned = self
                .db
                .notebooks
                .find_for_owner(notebook_id, user_id)
                .await?
                .is_some();
            if !owned {
                errors.add("notebook_id", "The selected notebook is invalid.");
            }
        }
        errors.into_result()?;
        let status = status.unwrap_or(existing.status);

        let published_at = if status == NoteStatus::Published && existing.status != status {
            Some(Utc::now())
        } else {
            existing.published_at
        };

        let note = self
            .db
            .notes
            .update(
                id,
                user_id,
                NoteChanges {
                    title,
                    content: input.content,
                    excerpt: input.excerpt,
                    cover_image: input.cover_image,
                    notebook_id: input.notebook_id,
                    status,
                    is_featured: input.is_featured,
                    published_at,
                },
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(
            subsystem = subsystem::API,
            component = "notes",
            op = "update",
            user_id = %user_id,
            note_id = %id,
            status = %note.status,
            "Note updated"
        );
        Ok(note)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        if !self.db.notes.soft_delete(id, user_id).await? {
            return Err(not_found(id));
        }
        info!(
            subsystem = subsystem::API,
            component = "notes",
            op = "delete",
            user_id = %user_id,
            note_id = %id,
            "Note deleted"
        );
        Ok(())
    }
}

fn validate_title(raw: &str, errors: &mut FieldErrors) -> String {
    let title = raw.trim();
    if title.is_empty() {
        errors.add("title", "The title field is required.");
    } else if title.chars().count() > MAX_TITLE_CHARS {
        errors.add(
            "title",
            format!("The title may not be greater than {} characters.", MAX_TITLE_CHARS),
        );
    }
    title.to_string()
}

fn status_message() -> String {
    let allowed: Vec<&str> = NoteStatus::ALL.iter().map(|s| s.as_str()).collect();
    format!("The status must be one of {}.", allowed.join(", "))
}

fn parse_status(raw: &str) -> Result<NoteStatus> {
    raw.parse()
        .map_err(|_| Error::field("status", status_message()))
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Note {} not found", id))
}
