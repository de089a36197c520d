//! HTML entry points: `/` redirects to `/dashboard`, which serves the page
//! shell with every target at its placeholder.

use axum::{
    response::{Html, Redirect},
    routing::get,
    Router,
};

use crate::dashboard::Page;

// ---

async fn home() -> Redirect {
    Redirect::to("/dashboard")
}

async fn dashboard() -> Html<String> {
    Html(Page::new().to_html())
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
}
