//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration and login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::web::session::{issue_session_token, session_cookie};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Fields are optional so that a missing one maps to a 400 with a clear
/// message rather than a body-deserialization rejection.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
}

/// The validated form of a registration request. Username, password, and
/// email are three independent inputs; none of them is ever derived from
/// another.
struct Registration {
    username: String,
    password: String,
    email: String,
}

fn validate_registration(req: RegisterRequest) -> Result<Registration, ApiError> {
    let trimmed = |field: Option<String>| {
        field
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let (Some(username), Some(password), Some(email)) = (
        trimmed(req.username),
        trimmed(req.password),
        trimmed(req.email),
    ) else {
        return Err(ApiError::Validation("Missing Fields".to_string()));
    };

    if !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if username == password || username == email || password == email {
        return Err(ApiError::Validation(
            "username, password and email must be distinct".to_string(),
        ));
    }

    Ok(Registration {
        username,
        password,
        email,
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /register - Create a new user account and start a session
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created; session cookie set", body = AuthResponse),
        (status = 400, description = "Missing or malformed field"),
        (status = 409, description = "Username or email already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let registration = validate_registration(req)?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(registration.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })?
        .to_string();

    // 2. Create user in database (a duplicate username or email is a 409)
    let user = state
        .db
        .create_user(&registration.username, &registration.email, &password_hash)
        .await?;

    // 3. Issue the session token and its cookie
    let token = issue_session_token(&user.email, &state.config.jwt_secret).map_err(|e| {
        error!("Failed to sign session token: {:?}", e);
        ApiError::Internal("Failed to create session".to_string())
    })?;
    let cookie = session_cookie(&token);

    // 4. Return response with cookie
    let response = AuthResponse {
        message: "User Registration Successful".to_string(),
    };

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /login - Log in with existing credentials
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login successful; session cookie set", body = AuthResponse),
        (status = 400, description = "Missing field"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(ApiError::Validation("Missing Fields".to_string()));
    };

    // 1. Look up stored credentials; an unknown username is indistinguishable
    //    from a bad password in the response.
    let credentials = state
        .db
        .find_credentials_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&credentials.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Authentication error".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    // 3. Issue the session token and its cookie
    let token = issue_session_token(&credentials.email, &state.config.jwt_secret).map_err(|e| {
        error!("Failed to sign session token: {:?}", e);
        ApiError::Internal("Failed to create session".to_string())
    })?;
    let cookie = session_cookie(&token);

    // 4. Return response with cookie
    let response = AuthResponse {
        message: "Login successful".to_string(),
    };

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        username: Option<&str>,
        password: Option<&str>,
        email: Option<&str>,
    ) -> RegisterRequest {
        RegisterRequest {
            username: username.map(String::from),
            password: password.map(String::from),
            email: email.map(String::from),
        }
    }

    #[test]
    fn registration_requires_all_three_fields() {
        for req in [
            request(None, Some("pw"), Some("a@b.com")),
            request(Some("ada"), None, Some("a@b.com")),
            request(Some("ada"), Some("pw"), None),
            request(Some("   "), Some("pw"), Some("a@b.com")),
        ] {
            assert!(matches!(
                validate_registration(req),
                Err(ApiError::Validation(_))
            ));
        }
    }

    #[test]
    fn registration_rejects_malformed_email() {
        let req = request(Some("ada"), Some("hunter2"), Some("not-an-email"));
        assert!(matches!(
            validate_registration(req),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn registration_rejects_coupled_fields() {
        // Guards against the email field ever being fed the password value.
        let req = request(Some("ada"), Some("a@b.com"), Some("a@b.com"));
        assert!(matches!(
            validate_registration(req),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn registration_accepts_distinct_well_formed_fields() {
        let req = request(Some("ada"), Some("hunter2"), Some("ada@example.com"));
        let registration = validate_registration(req).expect("should validate");
        assert_eq!(registration.username, "ada");
        assert_eq!(registration.password, "hunter2");
        assert_eq!(registration.email, "ada@example.com");
    }
}
