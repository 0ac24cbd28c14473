//! Read paths for anonymous visitors. Only PUBLISHED notes are visible.

use tracing::warn;

use taranote_core::logging::subsystem;
use taranote_core::{Article, Error, NotebookSummary, Result};
use taranote_db::Database;

/// Number of articles on the home page.
pub const HOME_ARTICLE_LIMIT: i64 = 9;

/// Published notes alongside the notebooks they are filed in.
#[derive(Debug, Clone)]
pub struct Listing {
    pub notes: Vec<Article>,
    pub notebooks: Vec<NotebookSummary>,
}

#[derive(Clone)]
pub struct PublicService {
    db: Database,
}

impl PublicService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The latest published articles for the home page.
    pub async fn latest(&self) -> Result<Listing> {
        self.listing(Some(HOME_ARTICLE_LIMIT)).await
    }

    /// Every published article, for the browser page.
    pub async fn browse(&self) -> Result<Listing> {
        self.listing(None).await
    }

    async fn listing(&self, limit: Option<i64>) -> Result<Listing> {
        let (notes, notebooks) = tokio::try_join!(
            self.db.notes.list_published(limit),
            self.db.notebooks.list_public(),
        )?;
        Ok(Listing { notes, notebooks })
    }

    /// A published article by slug. Bumps its view counter best-effort.
    pub async fn article(&self, slug: &str) -> Result<Article> {
        let mut article = self
            .db
            .notes
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Article '{}' not found", slug)))?;

        match self.db.notes.increment_views(article.note.id).await {
            Ok(()) => article.note.views += 1,
            Err(e) => warn!(
                subsystem = subsystem::API,
                component = "public",
                note_id = %article.note.id,
                error = %e,
                "Failed to increment view counter"
            ),
        }
        Ok(article)
    }
}
