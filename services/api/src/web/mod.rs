pub mod auth;
pub mod middleware;
pub mod rest;
pub mod session;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use state::AppState;

// Re-export the handlers and middleware to make them easily accessible
// to the binary that will build the web server router.
pub use middleware::resolve_session;
pub use rest::{list_scrapes_handler, scrape_detail_handler, scrape_handler};

/// Builds the API router: all five endpoints behind the session-resolution
/// layer. The binary adds CORS and the Swagger UI on top; integration tests
/// drive this router directly.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/scrapes/", get(list_scrapes_handler))
        .route("/scrapes/{id}/", get(scrape_detail_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            resolve_session,
        ))
        .with_state(state)
}
