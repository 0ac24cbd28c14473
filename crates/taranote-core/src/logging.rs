//! Structured logging field names for TaraNote.
//!
//! Every log event carries a `subsystem` field whose value is one of the
//! [`subsystem`] constants, so log queries can filter on the same names
//! across crates.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, best-effort fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), mutations, logins |
//! | DEBUG | Decision points (render mode, gate outcome), config choices |
//! | TRACE | Per-item iteration (slug probes) |

/// Values of the `subsystem` field.
pub mod subsystem {
    pub const API: &str = "api";
    pub const AUTH: &str = "auth";
    pub const RENDER: &str = "render";
    pub const DATABASE: &str = "database";
    pub const DOCS: &str = "docs";
}

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event. Values live in [`subsystem`].
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "notes", "notebooks", "settings", "upload", "public"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "update", "delete", "login", "logout"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Authenticated user UUID.
pub const USER_ID: &str = "user_id";

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Notebook UUID being operated on.
pub const NOTEBOOK_ID: &str = "notebook_id";

/// Slug assigned to a note or notebook.
pub const SLUG: &str = "slug";

/// Page component name in the render protocol.
pub const PAGE_COMPONENT: &str = "component_name";

/// Number of slug candidates probed before a free one was found.
pub const SLUG_ATTEMPTS: &str = "slug_attempts";

// ─── Database fields ───────────────────────────────────────────────────────

pub const POOL_SIZE: &str = "pool_size";

pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[&str] = &[
        SUBSYSTEM,
        COMPONENT,
        OPERATION,
        USER_ID,
        NOTE_ID,
        NOTEBOOK_ID,
        SLUG,
        PAGE_COMPONENT,
        SLUG_ATTEMPTS,
        POOL_SIZE,
        POOL_IDLE,
        ERROR_MSG,
    ];

    const SUBSYSTEMS: &[&str] = &[
        subsystem::API,
        subsystem::AUTH,
        subsystem::RENDER,
        subsystem::DATABASE,
        subsystem::DOCS,
    ];

    #[test]
    fn test_names_are_distinct_snake_case() {
        for names in [FIELDS, SUBSYSTEMS] {
            let mut seen = std::collections::HashSet::new();
            for name in names {
                assert!(seen.insert(*name), "duplicate name {}", name);
                assert!(name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c == '_'));
            }
        }
    }
}
