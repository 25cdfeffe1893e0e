//! crates/wikiquiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Enrichment, PageDigest, Scrape, ScrapeSummary, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The enrichment model replied with something that is not the requested JSON.
    #[error("Invalid JSON from AI")]
    InvalidModelReply(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Creates a new user. A username or email that is already taken yields
    /// `PortError::Conflict` and no row.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User>;

    /// Looks up login credentials by username. `None` means unknown username.
    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> PortResult<Option<UserCredentials>>;

    /// Resolves a session token's subject claim (an email) to a user.
    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>>;

    // --- Scrape Management ---

    /// Persists one enrichment run: a scrape row plus one quiz row per
    /// question, atomically. Either the whole set exists afterwards or none
    /// of it does.
    async fn create_scrape(
        &self,
        user_id: Uuid,
        url: &str,
        digest: &PageDigest,
        enrichment: &Enrichment,
    ) -> PortResult<Scrape>;

    /// Lists the user's scrapes, newest first.
    async fn list_scrapes_for_user(&self, user_id: Uuid) -> PortResult<Vec<ScrapeSummary>>;

    /// Fetches one scrape with its quiz, scoped to the owning user.
    /// `None` covers both "unknown id" and "owned by someone else".
    async fn get_scrape_for_user(
        &self,
        user_id: Uuid,
        scrape_id: Uuid,
    ) -> PortResult<Option<Scrape>>;
}

#[async_trait]
pub trait PageFetchService: Send + Sync {
    /// Fetches the raw HTML body of the given URL.
    async fn fetch(&self, url: &str) -> PortResult<String>;
}

#[async_trait]
pub trait EnrichmentService: Send + Sync {
    /// Sends a page digest to the language model and returns its parsed,
    /// structured reply.
    async fn enrich(&self, digest: &PageDigest) -> PortResult<Enrichment>;
}
