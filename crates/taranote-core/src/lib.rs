//! # taranote-core
//!
//! Core types, traits, and abstractions for TaraNote.
//!
//! This crate provides the domain models, error type, slug rules and
//! repository traits that the storage and HTTP crates depend on.

pub mod credentials;
pub mod error;
pub mod logging;
pub mod models;
pub mod slug;
pub mod traits;

// Re-export commonly used types at crate root
pub use credentials::{Argon2Verifier, CredentialVerifier};
pub use error::{Error, FieldErrors, Result};
pub use models::*;
pub use slug::{generate_slug, unique_slug, FALLBACK_SLUG};
pub use traits::*;
