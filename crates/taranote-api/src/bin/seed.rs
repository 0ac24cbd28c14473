//! Seed the database with an admin account, default settings and, for a
//! fresh account, a sample notebook with a published welcome note.
//!
//! Safe to run repeatedly: existing users and settings are left untouched.
//!
//! Environment variables:
//!   DATABASE_URL   - database to seed
//!   SEED_EMAIL     - admin email (default: admin@taranote.local)
//!   SEED_PASSWORD  - admin password (required)
//!   SEED_NAME      - admin display name (default: "TaraNote Admin")

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use taranote_api::services::{AuthService, NoteService, NotebookService};
use taranote_api::AppConfig;
use taranote_core::{
    Argon2Verifier, CreateNoteInput, NewUser, NotebookInput, UpdateNoteInput, User,
    DEFAULT_SETTING_GROUP, DEFAULT_SETTING_TYPE,
};
use taranote_db::Database;

/// `(key, value, type, group)` rows inserted when missing.
const DEFAULT_SETTINGS: &[(&str, &str, &str, &str)] = &[
    ("site_name", "TaraNote", DEFAULT_SETTING_TYPE, DEFAULT_SETTING_GROUP),
    (
        "site_description",
        "A digital sanctuary for your thoughts.",
        DEFAULT_SETTING_TYPE,
        DEFAULT_SETTING_GROUP,
    ),
    ("site_logo", "", "image", DEFAULT_SETTING_GROUP),
    ("footer_text", "Written with TaraNote.", DEFAULT_SETTING_TYPE, "footer"),
    ("show_author", "true", "boolean", DEFAULT_SETTING_GROUP),
    ("social_github", "", DEFAULT_SETTING_TYPE, "social"),
];

const WELCOME_CONTENT: &str = "<h1>Welcome to TaraNote</h1>\
<p>TaraNote is a quiet place to write. Keep notes private while they grow, \
file them into notebooks, and publish them as articles when they are ready.</p>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taranote_seed=info,taranote_api=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let email = std::env::var("SEED_EMAIL").unwrap_or_else(|_| "admin@taranote.local".to_string());
    let password = std::env::var("SEED_PASSWORD").context("SEED_PASSWORD must be set")?;
    let name = std::env::var("SEED_NAME").unwrap_or_else(|_| "TaraNote Admin".to_string());

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let auth = AuthService::new(db.clone(), Arc::new(Argon2Verifier));
    let (user, created) = ensure_admin(&db, &auth, &email, &password, &name).await?;

    let mut inserted = 0;
    for (key, value, kind, group) in DEFAULT_SETTINGS {
        if db.settings.insert_if_missing(key, value, kind, group).await? {
            inserted += 1;
        }
    }
    info!(inserted, "Default settings seeded");

    if created {
        seed_sample_content(&db, &user).await?;
    }

    info!(email = %user.email, "Seed completed");
    Ok(())
}

/// Find the admin by email or create it. Returns whether it was created.
async fn ensure_admin(
    db: &Database,
    auth: &AuthService,
    email: &str,
    password: &str,
    name: &str,
) -> anyhow::Result<(User, bool)> {
    if let Some(user) = db.users.find_by_email(email).await? {
        info!(user_id = %user.id, "Admin user already exists");
        return Ok((user, false));
    }

    let username = email
        .split('@')
        .next()
        .filter(|u| !u.is_empty())
        .unwrap_or("admin")
        .to_string();
    let user = db
        .users
        .insert(NewUser {
            name: name.to_string(),
            username,
            email: email.to_string(),
            password_hash: auth.hash_password(password).await?,
            role: "admin".to_string(),
            is_admin: true,
        })
        .await?;
    info!(user_id = %user.id, "Admin user created");
    Ok((user, true))
}

async fn seed_sample_content(db: &Database, user: &User) -> anyhow::Result<()> {
    let notebook = NotebookService::new(db.clone())
        .create(
            user.id,
            NotebookInput {
                name: "Project TaraNote".to_string(),
                slug: None,
                description: "Notes about building TaraNote.".to_string(),
            },
        )
        .await?;

    let notes = NoteService::new(db.clone());
    let note = notes
        .create(
            user.id,
            CreateNoteInput {
                title: "Welcome to TaraNote".to_string(),
            },
        )
        .await?;
    notes
        .update(
            user.id,
            note.id,
            UpdateNoteInput {
                title: note.title.clone(),
                content: WELCOME_CONTENT.to_string(),
                excerpt: "A quiet place to write.".to_string(),
                notebook_id: Some(notebook.id),
                status: "PUBLISHED".to_string(),
                is_featured: true,
                ..UpdateNoteInput::default()
            },
        )
        .await?;

    info!(notebook = %notebook.slug, note = %note.slug, "Sample content seeded");
    Ok(())
}
