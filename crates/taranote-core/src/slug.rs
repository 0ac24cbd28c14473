//! URL slugs for notes and notebooks.

use std::future::Future;

use tracing::{debug, trace};

use crate::error::Result;

/// Slug used when a title has no usable characters.
pub const FALLBACK_SLUG: &str = "untitled";

/// Turn a title into a URL-safe slug.
///
/// Lower-cases the input, turns whitespace runs into one hyphen, drops every
/// character outside `[a-z0-9-]`, collapses hyphen runs and trims hyphens
/// from both ends. Falls back to [`FALLBACK_SLUG`] when nothing is left.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        match c {
            '-' => pending_hyphen = true,
            'a'..='z' | '0'..='9' => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            }
            _ => {}
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Find the first free slug among `base`, `base-1`, `base-2`, ...
///
/// `taken` probes storage for a candidate. The probe and the later insert are
/// not atomic: a concurrent writer can claim the same candidate in between,
/// which the insert then reports as `Error::Conflict`.
pub async fn unique_slug<F, Fut>(base: &str, mut taken: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut candidate = base.to_string();
    let mut suffix: u64 = 1;

    while taken(candidate.clone()).await? {
        trace!(slug = %candidate, "Slug taken, trying next suffix");
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }

    if suffix > 1 {
        debug!(slug = %candidate, slug_attempts = suffix, "Slug suffixed");
    }
    Ok(candidate)
}
