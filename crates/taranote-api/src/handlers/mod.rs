//! HTTP handlers.
//!
//! Page routes answer through [`crate::inertia::Inertia`]; admin API routes
//! answer JSON and report failures as [`crate::ApiError`].

pub mod auth;
pub mod dashboard;
pub mod docs;
pub mod health;
pub mod notebooks;
pub mod notes;
pub mod public;
pub mod settings;
pub mod upload;

use serde::Serialize;

use taranote_core::User;

/// The `auth` page prop shared by every page that shows the signed-in user.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AuthProps<'a> {
    pub user: Option<&'a User>,
}

impl<'a> AuthProps<'a> {
    pub fn new(user: Option<&'a User>) -> Self {
        Self { user }
    }
}

/// `{"data": ...}` wrapper used by the notebook endpoints.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// `{"message": ...}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}
