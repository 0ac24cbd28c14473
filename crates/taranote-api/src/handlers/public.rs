//! Public pages: home, notebook browser and single articles.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    response::Response,
};
use serde::Serialize;

use taranote_core::{Article, NotebookSummary, Result, User};

use crate::auth::OptionalUser;
use crate::handlers::AuthProps;
use crate::inertia::Inertia;
use crate::services::public::Listing;
use crate::AppState;

#[derive(Serialize)]
struct ListingProps<'a> {
    notes: &'a [Article],
    notebooks: &'a [NotebookSummary],
    auth: AuthProps<'a>,
}

#[derive(Serialize)]
struct ArticleProps<'a> {
    article: &'a Article,
    /// Site settings as a key to value map.
    settings: BTreeMap<String, String>,
    auth: AuthProps<'a>,
}

/// `/`: the latest published articles.
pub async fn home(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    inertia: Inertia,
) -> Response {
    match state.public.latest().await {
        Ok(listing) => render_listing(&inertia, "Articles", &listing, user.as_ref()).await,
        Err(e) => inertia.error(e).await,
    }
}

/// `/taranote`: every published article with the notebook sidebar.
pub async fn browser(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    inertia: Inertia,
) -> Response {
    match state.public.browse().await {
        Ok(listing) => render_listing(&inertia, "TaraNote", &listing, user.as_ref()).await,
        Err(e) => inertia.error(e).await,
    }
}

async fn render_listing(
    inertia: &Inertia,
    component: &str,
    listing: &Listing,
    user: Option<&User>,
) -> Response {
    inertia
        .render(
            component,
            ListingProps {
                notes: &listing.notes,
                notebooks: &listing.notebooks,
                auth: AuthProps::new(user),
            },
        )
        .await
}

/// `/articles/:slug`: one published article.
pub async fn article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    OptionalUser(user): OptionalUser,
    inertia: Inertia,
) -> Response {
    let loaded = load_article(&state, &slug).await;
    match loaded {
        Ok((article, settings)) => {
            inertia
                .render(
                    "Docs",
                    ArticleProps {
                        article: &article,
                        settings,
                        auth: AuthProps::new(user.as_ref()),
                    },
                )
                .await
        }
        Err(e) => inertia.error(e).await,
    }
}

async fn load_article(state: &AppState, slug: &str) -> Result<(Article, BTreeMap<String, String>)> {
    let article = state.public.article(slug).await?;
    let settings = state
        .settings
        .list()
        .await?
        .into_iter()
        .map(|s| (s.key, s.value))
        .collect();
    Ok((article, settings))
}
