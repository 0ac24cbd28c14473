//! Email/password authentication.

use std::sync::Arc;

use tracing::{debug, info};

use taranote_core::logging::subsystem;
use taranote_core::{CredentialVerifier, Error, FieldErrors, Result, User};
use taranote_db::Database;

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    credentials: Arc<dyn CredentialVerifier>,
}

impl AuthService {
    pub fn new(db: Database, credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self { db, credentials }
    }

    /// Resolve an email/password pair to a user.
    ///
    /// Unknown emails and wrong passwords both yield
    /// `Error::InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        let mut errors = FieldErrors::new();
        if email.is_empty() {
            errors.add("email", "The email field is required.");
        }
        if password.is_empty() {
            errors.add("password", "The password field is required.");
        }
        errors.into_result()?;

        let Some(user) = self.db.users.find_by_email(email).await? else {
            debug!(subsystem = subsystem::AUTH, op = "login", "Unknown email");
            return Err(Error::InvalidCredentials);
        };

        let credentials = Arc::clone(&self.credentials);
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || credentials.verify(&password, &hash))
            .await
            .map_err(|e| Error::Internal(format!("Password check panicked: {}", e)))??;

        if !matches {
            debug!(subsystem = subsystem::AUTH, op = "login", user_id = %user.id, "Password mismatch");
            return Err(Error::InvalidCredentials);
        }

        info!(subsystem = subsystem::AUTH, op = "login", user_id = %user.id, "User authenticated");
        Ok(user)
    }

    /// Hash a plaintext password on the blocking pool.
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let credentials = Arc::clone(&self.credentials);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| Error::Internal(format!("Password hash panicked: {}", e)))?
    }
}
