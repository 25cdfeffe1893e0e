//! services/api/src/web/session.rs
//!
//! Session-token generation and verification, plus the cookie it travels in.
//!
//! Tokens are HS256-signed JWTs whose subject is the user's email address.
//! They are stateless: nothing is persisted server-side, and expiry is
//! enforced by the signature check alone.

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "access_token";

/// Session lifetime: the token's `exp` claim and the cookie's Max-Age.
const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject -- the user's email address.
    pub user_id: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Generates an HS256 session token for the given user email, expiring 24
/// hours from now.
pub fn issue_session_token(
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::seconds(SESSION_TTL_SECONDS)).timestamp();
    let claims = SessionClaims {
        user_id: email.to_string(),
        exp,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates and decodes a session token, returning the embedded
/// [`SessionClaims`]. Signature and expiration are checked automatically.
pub fn verify_session_token(
    token: &str,
    secret: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

/// Builds the `Set-Cookie` value for a freshly issued session token:
/// HTTP-only, secure transport only, same-site Lax, 24h max age.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECONDS
    )
}

/// Pulls the session token out of a `Cookie` header value, if present.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}

/// Extracts the session token from a request's headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_cookie_header)
}
