//! Domain models shared by the repositories, services and HTTP layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// USERS
// =============================================================================

/// An account that owns notebooks and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    /// PHC-format password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// 'admin', 'editor' or 'user'
    pub role: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert payload for a user (seed/registration only).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_admin: bool,
}

// =============================================================================
// NOTEBOOKS
// =============================================================================

/// A named group of notes owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Notebook with the number of published notes filed in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookSummary {
    #[serde(flatten)]
    pub notebook: Notebook,
    pub notes_count: i64,
}

/// Request body for creating or replacing a notebook.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotebookInput {
    pub name: String,
    /// Optional explicit slug; derived from `name` when blank.
    pub slug: Option<String>,
    pub description: String,
}

/// Validated insert payload for a notebook.
#[derive(Debug, Clone)]
pub struct NewNotebook {
    pub user_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// Validated whole-field replacement for a notebook.
#[derive(Debug, Clone)]
pub struct NotebookChanges {
    pub name: String,
    pub slug: String,
    pub description: String,
}

// =============================================================================
// NOTES
// =============================================================================

/// Publication status of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NoteStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl NoteStatus {
    pub const ALL: [NoteStatus; 3] = [NoteStatus::Draft, NoteStatus::Published, NoteStatus::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Draft => "DRAFT",
            NoteStatus::Published => "PUBLISHED",
            NoteStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DRAFT" => Ok(NoteStatus::Draft),
            "PUBLISHED" => Ok(NoteStatus::Published),
            "ARCHIVED" => Ok(NoteStatus::Archived),
            other => Err(Error::InvalidInput(format!("unknown note status '{}'", other))),
        }
    }
}

/// A note. Publicly readable only while `status` is `PUBLISHED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notebook_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
    pub status: NoteStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A published note joined with its author and notebook for public pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(flatten)]
    pub note: Note,
    pub author_name: String,
    pub notebook_name: Option<String>,
    pub notebook_slug: Option<String>,
}

/// Request body for creating a note.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateNoteInput {
    pub title: String,
}

/// Request body for replacing a note's editable fields.
///
/// Missing fields deserialize to their empty value and overwrite the stored
/// ones: callers send the full desired state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateNoteInput {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: String,
    pub notebook_id: Option<Uuid>,
    pub status: String,
    pub is_featured: bool,
}

/// Validated insert payload for a note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
}

/// Validated whole-field replacement for a note.
#[derive(Debug, Clone)]
pub struct NoteChanges {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: String,
    pub notebook_id: Option<Uuid>,
    pub status: NoteStatus,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}

/// Owner-side note listing filters.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub status: Option<NoteStatus>,
    pub notebook_id: Option<Uuid>,
    /// Case-insensitive substring matched against title and content.
    pub search: Option<String>,
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Type tag given to settings created through a batch update.
pub const DEFAULT_SETTING_TYPE: &str = "text";

/// Group tag given to settings created through a batch update.
pub const DEFAULT_SETTING_GROUP: &str = "general";

/// Global key/value configuration row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    /// text, boolean, image, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// general, footer, social, ...
    pub group: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a settings batch update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingUpdate {
    pub key: String,
    pub value: String,
}
