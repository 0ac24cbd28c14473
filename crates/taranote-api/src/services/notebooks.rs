//! Owner-scoped notebook management.

use tracing::info;
use uuid::Uuid;

use taranote_core::logging::subsystem;
use taranote_core::{
    generate_slug, unique_slug, Error, FieldErrors, NewNotebook, Notebook, NotebookChanges,
    NotebookInput, Result,
};
use taranote_db::Database;

use super::MAX_TITLE_CHARS;

#[derive(Clone)]
pub struct NotebookService {
    db: Database,
}

impl NotebookService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Notebook>> {
        self.db.notebooks.list_for_owner(user_id).await
    }

    pub async fn create(&self, user_id: Uuid, input: NotebookInput) -> Result<Notebook> {
        let name = validate_name(&input.name)?;
        let slug = self.free_slug(&slug_base(&input, &name), None).await?;

        let notebook = self
            .db
            .notebooks
            .insert(NewNotebook {
                user_id,
                name,
                slug,
                description: input.description.trim().to_string(),
            })
            .await?;

        info!(
            subsystem = subsystem::API,
            component = "notebooks",
            op = "create",
            user_id = %user_id,
            notebook_id = %notebook.id,
            slug = %notebook.slug,
            "Notebook created"
        );
        Ok(notebook)
    }

    /// Replace name, slug and description. A blank slug is re-derived from
    /// the name; the notebook's own current slug never counts as taken.
    pub async fn update(&self, user_id: Uuid, id: Uuid, input: NotebookInput) -> Result<Notebook> {
        let name = validate_name(&input.name)?;
        if self.db.notebooks.find_for_owner(id, user_id).await?.is_none() {
            return Err(not_found(id));
        }
        let slug = self.free_slug(&slug_base(&input, &name), Some(id)).await?;

        let notebook = self
            .db
            .notebooks
            .update(
                id,
                user_id,
                NotebookChanges {
                    name,
                    slug,
                    description: input.description.trim().to_string(),
                },
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(
            subsystem = subsystem::API,
            component = "notebooks",
            op = "update",
            user_id = %user_id,
            notebook_id = %id,
            slug = %notebook.slug,
            "Notebook updated"
        );
        Ok(notebook)
    }

    /// Soft-delete; notes filed in it become unfiled.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        if !self.db.notebooks.soft_delete(id, user_id).await? {
            return Err(not_found(id));
        }
        info!(
            subsystem = subsystem::API,
            component = "notebooks",
            op = "delete",
            user_id = %user_id,
            notebook_id = %id,
            "Notebook deleted"
        );
        Ok(())
    }

    async fn free_slug(&self, base: &str, exclude: Option<Uuid>) -> Result<String> {
        let repo = &self.db.notebooks;
        unique_slug(base, |candidate| async move {
            repo.slug_exists(&candidate, exclude).await
        })
        .await
    }
}

fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let mut errors = FieldErrors::new();
    if name.is_empty() {
        errors.add("name", "The name field is required.");
    } else if name.chars().count() > MAX_TITLE_CHARS {
        errors.add(
            "name",
            format!("The name may not be greater than {} characters.", MAX_TITLE_CHARS),
        );
    }
    errors.into_result()?;
    Ok(name.to_string())
}

/// An explicit slug is normalized; a blank one falls back to the name.
fn slug_base(input: &NotebookInput, name: &str) -> String {
    match input.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => generate_slug(slug),
        _ => generate_slug(name),
    }
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Notebook {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taranote_db::MemoryStore;

    fn input(name: &str, slug: Option<&str>) -> NotebookInput {
        NotebookInput {
            name: name.into(),
            slug: slug.map(String::from),
            description: String::new(),
        }
    }

    #[test]
    fn test_slug_base_normalizes_explicit_slug() {
        assert_eq!(slug_base(&input("Ignored", Some("My Slug!")), "Ignored"), "my-slug");
        assert_eq!(slug_base(&input("Field Notes", Some("  ")), "Field Notes"), "field-notes");
    }

    #[test]
    fn test_validate_name() {
        assert!(matches!(validate_name("   "), Err(Error::Validation(_))));
        assert!(validate_name(&"x".repeat(MAX_TITLE_CHARS)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_TITLE_CHARS + 1)).is_err());
        assert_eq!(validate_name("  Trimmed ").unwrap(), "Trimmed");
    }

    #[tokio::test]
    async fn test_update_keeps_own_slug() {
        let db = Database::in_memory(MemoryStore::new());
        let service = NotebookService::new(db);
        let user = Uuid::now_v7();

        let notebook = service.create(user, input("Guides", None)).await.unwrap();
        let updated = service
            .update(user, notebook.id, input("Guides", None))
            .await
            .unwrap();
        assert_eq!(updated.slug, "guides");
    }

    #[tokio::test]
    async fn test_update_of_foreign_notebook_is_not_found() {
        let service = NotebookService::new(Database::in_memory(MemoryStore::new()));
        let owner = Uuid::now_v7();
        let notebook = service.create(owner, input("Mine", None)).await.unwrap();

        let err = service
            .update(Uuid::now_v7(), notebook.id, input("Stolen", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
