//! Service layer for business logic.
//!
//! Services take the acting user's id on every owner-scoped call; a resource
//! owned by someone else is reported as `Error::NotFound`.

pub mod auth;
pub mod notebooks;
pub mod notes;
pub mod public;
pub mod settings;

pub use auth::AuthService;
pub use notebooks::NotebookService;
pub use notes::NoteService;
pub use public::PublicService;
pub use settings::SettingService;

/// Maximum length of note titles and notebook names, in characters.
pub const MAX_TITLE_CHARS: usize = 255;
