//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the scrape endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use wikiquiz_core::domain::{AuthState, QuizQuestion, Scrape, ScrapeSummary, User};

use crate::error::{ApiError, ApiResult};
use crate::extract::extract_digest;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        scrape_handler,
        list_scrapes_handler,
        scrape_detail_handler,
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
    ),
    components(
        schemas(
            ScrapeRequest,
            ScrapeDetailResponse,
            ScrapeSummaryResponse,
            QuizQuestionBody,
            KeyEntitiesBody,
            crate::web::auth::RegisterRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::AuthResponse,
        )
    ),
    tags(
        (name = "WikiQuiz API", description = "Scrape a Wikipedia article and turn it into a summary, entities, and a quiz.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ScrapeRequest {
    pub url: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct KeyEntitiesBody {
    people: Vec<String>,
    organizations: Vec<String>,
    locations: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct QuizQuestionBody {
    question: String,
    options: Vec<String>,
    answer: String,
    difficulty: String,
    explanation: String,
}

impl From<QuizQuestion> for QuizQuestionBody {
    fn from(question: QuizQuestion) -> Self {
        Self {
            question: question.question,
            options: question.options,
            answer: question.answer,
            difficulty: question.difficulty.as_str().to_string(),
            explanation: question.explanation,
        }
    }
}

/// The full stored record echoed by the scrape and detail endpoints.
#[derive(Serialize, ToSchema)]
pub struct ScrapeDetailResponse {
    id: Uuid,
    url: String,
    title: String,
    summary: String,
    key_entities: KeyEntitiesBody,
    sections: Vec<String>,
    quiz: Vec<QuizQuestionBody>,
    related_topics: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<Scrape> for ScrapeDetailResponse {
    fn from(scrape: Scrape) -> Self {
        Self {
            id: scrape.id,
            url: scrape.url,
            title: scrape.title,
            summary: scrape.summary,
            key_entities: KeyEntitiesBody {
                people: scrape.key_entities.people,
                organizations: scrape.key_entities.organizations,
                locations: scrape.key_entities.locations,
            },
            sections: scrape.sections,
            quiz: scrape.quiz.into_iter().map(QuizQuestionBody::from).collect(),
            related_topics: scrape.related_topics,
            created_at: scrape.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ScrapeSummaryResponse {
    id: Uuid,
    url: String,
    title: String,
    created_at: DateTime<Utc>,
}

impl From<ScrapeSummary> for ScrapeSummaryResponse {
    fn from(summary: ScrapeSummary) -> Self {
        Self {
            id: summary.id,
            url: summary.url,
            title: summary.title,
            created_at: summary.created_at,
        }
    }
}

/// Resolves the acting user or rejects the request.
fn require_user(auth: &AuthState) -> Result<&User, ApiError> {
    auth.user()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Scrape a Wikipedia article and enrich it.
///
/// Fetches the page, digests its introduction/infobox/sections, asks the
/// model for a summary, quiz, entities, and topics, and stores everything
/// atomically.
#[utoipa::path(
    post,
    path = "/scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 201, description = "Scrape stored", body = ScrapeDetailResponse),
        (status = 400, description = "Missing url"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "Fetch, extraction, model, or database failure")
    )
)]
pub async fn scrape_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthState>,
    Json(req): Json<ScrapeRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = require_user(&auth)?.clone();

    let url = req
        .url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Validation("URL is required".to_string()))?;

    // Fetch -> digest -> enrich -> persist. Each step blocks the request for
    // its full duration; a failure anywhere surfaces as a 500 and nothing is
    // stored.
    let html = state.fetcher.fetch(&url).await?;
    let digest = extract_digest(&html)?;
    let enrichment = state.enricher.enrich(&digest).await?;
    let scrape = state
        .db
        .create_scrape(user.id, &url, &digest, &enrichment)
        .await?;

    info!(
        "Stored scrape {} ({} quiz questions) for user {}",
        scrape.id,
        scrape.quiz.len(),
        user.id
    );

    Ok((
        StatusCode::CREATED,
        Json(ScrapeDetailResponse::from(scrape)),
    ))
}

/// List the acting user's scrapes, newest first.
#[utoipa::path(
    get,
    path = "/scrapes/",
    responses(
        (status = 200, description = "Scrape history", body = [ScrapeSummaryResponse]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_scrapes_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthState>,
) -> ApiResult<impl IntoResponse> {
    let user = require_user(&auth)?;

    let scrapes = state.db.list_scrapes_for_user(user.id).await?;
    let body: Vec<ScrapeSummaryResponse> = scrapes
        .into_iter()
        .map(ScrapeSummaryResponse::from)
        .collect();

    Ok(Json(body))
}

/// Fetch one scrape with its quiz.
///
/// An id owned by a different user is reported as not found, never leaked.
#[utoipa::path(
    get,
    path = "/scrapes/{id}/",
    params(
        ("id" = Uuid, Path, description = "The scrape's unique ID.")
    ),
    responses(
        (status = 200, description = "Full scrape detail", body = ScrapeDetailResponse),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Unknown or unowned scrape")
    )
)]
pub async fn scrape_detail_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthState>,
    Path(scrape_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = require_user(&auth)?;

    let scrape = state
        .db
        .get_scrape_for_user(user.id, scrape_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))?;

    Ok(Json(ScrapeDetailResponse::from(scrape)))
}
