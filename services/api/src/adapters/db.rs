//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use wikiquiz_core::domain::{
    Difficulty, Enrichment, KeyEntities, PageDigest, QuizQuestion, Scrape, ScrapeSummary, User,
    UserCredentials,
};
use wikiquiz_core::ports::{DatabaseService, PortError, PortResult};

/// Column list for the `scrapes` table.
const SCRAPE_COLUMNS: &str = "id, user_id, url, title, summary, sections, entities_people, \
    entities_organizations, entities_locations, related_topics, created_at";

/// Column list for the `quiz_questions` table.
const QUIZ_COLUMNS: &str = "id, scrape_id, question, options, answer, difficulty, explanation";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a sqlx error onto the port taxonomy. Unique-constraint violations
/// (PostgreSQL code 23505) become conflicts; everything else is unexpected.
fn map_db_error(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            PortError::Conflict("User already exists".to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct ScrapeRecord {
    id: Uuid,
    user_id: Uuid,
    url: String,
    title: String,
    summary: String,
    sections: Vec<String>,
    entities_people: Vec<String>,
    entities_organizations: Vec<String>,
    entities_locations: Vec<String>,
    related_topics: Vec<String>,
    created_at: DateTime<Utc>,
}
impl ScrapeRecord {
    fn to_domain(self, quiz: Vec<QuizQuestion>) -> Scrape {
        Scrape {
            id: self.id,
            user_id: self.user_id,
            url: self.url,
            title: self.title,
            summary: self.summary,
            sections: self.sections,
            key_entities: KeyEntities {
                people: self.entities_people,
                organizations: self.entities_organizations,
                locations: self.entities_locations,
            },
            related_topics: self.related_topics,
            created_at: self.created_at,
            quiz,
        }
    }
}

#[derive(FromRow)]
struct ScrapeSummaryRecord {
    id: Uuid,
    url: String,
    title: String,
    created_at: DateTime<Utc>,
}
impl ScrapeSummaryRecord {
    fn to_domain(self) -> ScrapeSummary {
        ScrapeSummary {
            id: self.id,
            url: self.url,
            title: self.title,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct QuizRecord {
    id: Uuid,
    scrape_id: Uuid,
    question: String,
    options: Vec<String>,
    answer: String,
    difficulty: String,
    explanation: String,
}
impl QuizRecord {
    fn to_domain(self) -> QuizQuestion {
        QuizQuestion {
            id: self.id,
            scrape_id: self.scrape_id,
            question: self.question,
            options: self.options,
            answer: self.answer,
            // The column has a CHECK constraint; anything else decodes as easy.
            difficulty: Difficulty::parse(&self.difficulty).unwrap_or_default(),
            explanation: self.explanation,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let taken: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE username = $1 OR email = $2")
                .bind(username)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_error)?;
        if taken.is_some() {
            return Err(PortError::Conflict("User already exists".to_string()));
        }

        // The unique constraints still guard the race between the check and
        // the insert; 23505 maps to Conflict as well.
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, username, email, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING id, username, email",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(record.to_domain())
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, username, email, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(record.map(CredentialsRecord::to_domain))
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(record.map(UserRecord::to_domain))
    }

    async fn create_scrape(
        &self,
        user_id: Uuid,
        url: &str,
        digest: &PageDigest,
        enrichment: &Enrichment,
    ) -> PortResult<Scrape> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let insert_scrape = format!(
            "INSERT INTO scrapes \
                (id, user_id, url, title, summary, sections, entities_people, \
                 entities_organizations, entities_locations, related_topics) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {SCRAPE_COLUMNS}"
        );
        let scrape_record = sqlx::query_as::<_, ScrapeRecord>(&insert_scrape)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(url)
            .bind(&digest.title)
            .bind(&enrichment.summary)
            .bind(&digest.sections)
            .bind(&enrichment.key_entities.people)
            .bind(&enrichment.key_entities.organizations)
            .bind(&enrichment.key_entities.locations)
            .bind(&enrichment.related_topics)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let insert_question = format!(
            "INSERT INTO quiz_questions \
                (id, scrape_id, position, question, options, answer, difficulty, explanation) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {QUIZ_COLUMNS}"
        );
        let mut quiz = Vec::with_capacity(enrichment.quiz.len());
        for (position, draft) in enrichment.quiz.iter().enumerate() {
            let record = sqlx::query_as::<_, QuizRecord>(&insert_question)
                .bind(Uuid::new_v4())
                .bind(scrape_record.id)
                .bind(position as i32)
                .bind(&draft.question)
                .bind(&draft.options)
                .bind(&draft.answer)
                .bind(draft.difficulty.as_str())
                .bind(&draft.explanation)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_db_error)?;
            quiz.push(record.to_domain());
        }

        // Dropping the transaction without this rolls everything back, so a
        // failed question insert also removes the scrape row.
        tx.commit().await.map_err(map_db_error)?;

        Ok(scrape_record.to_domain(quiz))
    }

    async fn list_scrapes_for_user(&self, user_id: Uuid) -> PortResult<Vec<ScrapeSummary>> {
        let records = sqlx::query_as::<_, ScrapeSummaryRecord>(
            "SELECT id, url, title, created_at FROM scrapes \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(records
            .into_iter()
            .map(ScrapeSummaryRecord::to_domain)
            .collect())
    }

    async fn get_scrape_for_user(
        &self,
        user_id: Uuid,
        scrape_id: Uuid,
    ) -> PortResult<Option<Scrape>> {
        let select_scrape =
            format!("SELECT {SCRAPE_COLUMNS} FROM scrapes WHERE id = $1 AND user_id = $2");
        let record = sqlx::query_as::<_, ScrapeRecord>(&select_scrape)
            .bind(scrape_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        let Some(record) = record else {
            return Ok(None);
        };

        let select_quiz = format!(
            "SELECT {QUIZ_COLUMNS} FROM quiz_questions WHERE scrape_id = $1 ORDER BY position ASC"
        );
        let quiz = sqlx::query_as::<_, QuizRecord>(&select_quiz)
            .bind(record.id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(QuizRecord::to_domain)
            .collect();

        Ok(Some(record.to_domain(quiz)))
    }
}
