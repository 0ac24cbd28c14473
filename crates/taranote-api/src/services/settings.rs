//! Global site settings.

use tracing::info;

use taranote_core::logging::subsystem;
use taranote_core::{FieldErrors, Result, Setting, SettingUpdate};
use taranote_db::Database;

#[derive(Clone)]
pub struct SettingService {
    db: Database,
}

impl SettingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All settings, ordered by group then key.
    pub async fn list(&self) -> Result<Vec<Setting>> {
        self.db.settings.list().await
    }

    /// Upsert every entry in one transaction. Nothing is written unless the
    /// whole batch is valid and every write succeeds.
    pub async fn update_batch(&self, updates: Vec<SettingUpdate>) -> Result<()> {
        let mut errors = FieldErrors::new();
        let updates: Vec<SettingUpdate> = updates
            .into_iter()
            .enumerate()
            .map(|(i, update)| {
                let key = update.key.trim().to_string();
                if key.is_empty() {
                    errors.add(format!("{}.key", i), "The key field is required.");
                }
                SettingUpdate {
                    key,
                    value: update.value,
                }
            })
            .collect();
        errors.into_result()?;

        self.db.settings.upsert_batch(&updates).await?;

        info!(
            subsystem = subsystem::API,
            component = "settings",
            op = "update_batch",
            count = updates.len(),
            "Settings updated"
        );
        Ok(())
    }
}
