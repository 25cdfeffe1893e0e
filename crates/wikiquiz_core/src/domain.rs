//! crates/wikiquiz_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Represents a registered user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

// Only used internally for login/registration - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// The outcome of per-request session resolution.
///
/// Verification failures never raise; they resolve to `Anonymous`, and
/// endpoints that require a user reject `Anonymous` themselves.
#[derive(Debug, Clone)]
pub enum AuthState {
    Authenticated(User),
    Anonymous,
}

impl AuthState {
    /// Returns the resolved user, or `None` for an anonymous request.
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            AuthState::Anonymous => None,
        }
    }
}

/// The structured digest of one fetched Wikipedia page.
///
/// This is what the extractor produces and what the enrichment model
/// receives (serialized to a compact JSON string). The infobox preserves
/// document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDigest {
    pub title: String,
    pub infobox: IndexMap<String, String>,
    pub sections: Vec<String>,
    pub introduction: Vec<String>,
}

/// Difficulty label attached to a quiz question by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Named entities the model extracted from the page text.
///
/// The key set is fixed; a reply with extra keys is rejected at parse time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyEntities {
    pub people: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
}

/// One multiple-choice question as produced by the model, before it is
/// persisted. `difficulty` falls back to easy when the model omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizDraft {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub explanation: String,
}

/// The model's full structured reply for one digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub quiz: Vec<QuizDraft>,
    pub key_entities: KeyEntities,
    pub related_topics: Vec<String>,
    pub summary: String,
}

/// One persisted quiz question belonging to a scrape.
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub scrape_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub difficulty: Difficulty,
    pub explanation: String,
}

/// One persisted enrichment run, immutable after creation.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub sections: Vec<String>,
    pub key_entities: KeyEntities,
    pub related_topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub quiz: Vec<QuizQuestion>,
}

/// The abbreviated form returned by the scrape-list endpoint.
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
