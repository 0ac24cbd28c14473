//! # taranote-db
//!
//! Storage layer for TaraNote.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for users, notebooks, notes and settings
//! - An in-memory store implementing the same traits, for tests and demos
//!
//! ## Example
//!
//! ```rust,ignore
//! use taranote_db::{Database, NewNote, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/taranote").await?;
//!     let note = db.notes.insert(NewNote {
//!         user_id,
//!         title: "Hello".into(),
//!         slug: "hello".into(),
//!     }).await?;
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod memory;
pub mod notebooks;
pub mod notes;
pub mod pool;
pub mod settings;
pub mod users;

use std::sync::Arc;

use sqlx::PgPool;

// Re-export core types
pub use taranote_core::*;

pub use memory::MemoryStore;
pub use notebooks::PgNotebookRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, log_pool_metrics, PoolConfig};
pub use settings::PgSettingRepository;
pub use users::PgUserRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Map a write error, turning unique-constraint violations into `Conflict`.
pub(crate) fn map_write_err(e: sqlx::Error, what: &str) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Conflict(format!("{} already exists", what))
        }
        _ => Error::Database(e),
    }
}

/// Combined storage context with all repositories.
///
/// Cloning is cheap: repositories are shared behind `Arc`.
#[derive(Clone)]
pub struct Database {
    pool: Option<PgPool>,
    pub users: Arc<dyn UserRepository>,
    pub notebooks: Arc<dyn NotebookRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub settings: Arc<dyn SettingRepository>,
}

impl Database {
    /// Create a Postgres-backed instance from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            notebooks: Arc::new(PgNotebookRepository::new(pool.clone())),
            notes: Arc::new(PgNoteRepository::new(pool.clone())),
            settings: Arc::new(PgSettingRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create an instance backed by an in-memory store.
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            pool: None,
            users: Arc::new(store.clone()),
            notebooks: Arc::new(store.clone()),
            notes: Arc::new(store.clone()),
            settings: Arc::new(store),
        }
    }

    /// Connect with the default pool configuration.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Connect with a custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool(url, &config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations. No-op for in-memory instances.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        if let Some(pool) = &self.pool {
            sqlx::migrate!("../../migrations")
                .run(pool)
                .await
                .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        }
        Ok(())
    }

    /// The underlying connection pool, if Postgres-backed.
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }
}
