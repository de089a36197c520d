use axum::Router;
use sqlx::PgPool;

use crate::Config;

mod health;
mod pages;
mod readings;
mod summary;

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(readings::router())
        .merge(summary::router())
        .merge(pages::router())
        .merge(health::router())
        .with_state((pool, config))
}
