//! services/api/src/web/middleware.rs
//!
//! Per-request session resolution.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use wikiquiz_core::domain::AuthState;

use crate::web::session::{token_from_headers, verify_session_token};
use crate::web::state::AppState;

/// Middleware that resolves the session cookie into an [`AuthState`]
/// request extension.
///
/// Any verification failure (missing cookie, bad signature, expired token,
/// unknown subject) downgrades the request to `Anonymous` instead of
/// rejecting it. Handlers that require a user enforce that themselves.
pub async fn resolve_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth = authenticate(&state, req.headers()).await;
    req.extensions_mut().insert(auth);
    next.run(req).await
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> AuthState {
    let Some(token) = token_from_headers(headers) else {
        return AuthState::Anonymous;
    };

    let Ok(claims) = verify_session_token(token, &state.config.jwt_secret) else {
        return AuthState::Anonymous;
    };

    // The subject claim is the user's email; an unknown one stays anonymous.
    match state.db.find_user_by_email(&claims.user_id).await {
        Ok(Some(user)) => AuthState::Authenticated(user),
        Ok(None) => AuthState::Anonymous,
        Err(e) => {
            warn!("Session subject lookup failed: {e}");
            AuthState::Anonymous
        }
    }
}
