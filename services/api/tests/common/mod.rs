//! Shared harness for the HTTP integration tests.
//!
//! Drives the real router through `tower::ServiceExt::oneshot`, with
//! in-memory fakes standing in for PostgreSQL, the page fetcher, and the
//! enrichment model, so the full request pipeline (session middleware,
//! handlers, extraction) runs without external services.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use api_lib::config::Config;
use api_lib::web::{api_router, state::AppState};
use wikiquiz_core::domain::{
    Difficulty, Enrichment, KeyEntities, PageDigest, QuizDraft, QuizQuestion, Scrape,
    ScrapeSummary, User, UserCredentials,
};
use wikiquiz_core::ports::{
    DatabaseService, EnrichmentService, PageFetchService, PortError, PortResult,
};

/// Secret shared between the test config and tests that hand-craft tokens.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// A wiki-shaped page served by the fake fetcher.
pub const CAT_PAGE: &str = r#"
    <html><body>
    <h1 id="firstHeading">Cat</h1>
    <div class="mw-content-ltr">
        <table class="infobox">
            <tbody>
                <tr>
                    <th class="infobox-label">Kingdom</th>
                    <td class="infobox-data">Animalia</td>
                </tr>
            </tbody>
        </table>
        <p>The cat is a small domesticated carnivorous mammal.</p>
        <p>It is the only domesticated species of the family Felidae.</p>
    </div>
    <div class="mw-heading mw-heading2"><h2>Etymology</h2></div>
    <div class="mw-heading mw-heading2"><h2>Taxonomy</h2></div>
    </body></html>
"#;

/// A page that fails extraction: no title heading.
pub const TITLELESS_PAGE: &str = "<html><body><p>nothing here</p></body></html>";

/// A three-question enrichment the fake model hands back.
pub fn sample_enrichment() -> Enrichment {
    let question = |text: &str, answer: &str, difficulty: Difficulty| QuizDraft {
        question: text.to_string(),
        options: vec![
            answer.to_string(),
            "Wrong A".to_string(),
            "Wrong B".to_string(),
            "Wrong C".to_string(),
        ],
        answer: answer.to_string(),
        difficulty,
        explanation: format!("The text states: {answer}."),
    };

    Enrichment {
        quiz: vec![
            question("What family does the cat belong to?", "Felidae", Difficulty::Easy),
            question("What kind of animal is the cat?", "Mammal", Difficulty::Medium),
            question("What kingdom is listed in the infobox?", "Animalia", Difficulty::Hard),
        ],
        key_entities: KeyEntities {
            people: vec![],
            organizations: vec!["International Cat Association".to_string()],
            locations: vec!["Near East".to_string()],
        },
        related_topics: vec![
            "Felidae".to_string(),
            "Domestication".to_string(),
            "Carnivore".to_string(),
        ],
        summary: "The cat is a small domesticated carnivorous mammal.".to_string(),
    }
}

//=========================================================================================
// Fake port implementations
//=========================================================================================

#[derive(Default)]
struct FakeDbInner {
    users: Vec<UserCredentials>,
    scrapes: Vec<Scrape>,
}

/// In-memory stand-in for the PostgreSQL adapter. Mirrors its semantics:
/// conflicts on duplicate username/email, all-or-nothing scrape creation,
/// owner-scoped reads.
#[derive(Default)]
pub struct FakeDb {
    inner: Mutex<FakeDbInner>,
}

impl FakeDb {
    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn scrape_count(&self) -> usize {
        self.inner.lock().unwrap().scrapes.len()
    }
}

#[async_trait]
impl DatabaseService for FakeDb {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.username == username || u.email == email)
        {
            return Err(PortError::Conflict("User already exists".to_string()));
        }
        let credentials = UserCredentials {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        let user = User {
            id: credentials.id,
            username: credentials.username.clone(),
            email: credentials.email.clone(),
        };
        inner.users.push(credentials);
        Ok(user)
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> PortResult<Option<UserCredentials>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).map(|u| User {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
        }))
    }

    async fn create_scrape(
        &self,
        user_id: Uuid,
        url: &str,
        digest: &PageDigest,
        enrichment: &Enrichment,
    ) -> PortResult<Scrape> {
        let scrape_id = Uuid::new_v4();
        let quiz = enrichment
            .quiz
            .iter()
            .map(|draft| QuizQuestion {
                id: Uuid::new_v4(),
                scrape_id,
                question: draft.question.clone(),
                options: draft.options.clone(),
                answer: draft.answer.clone(),
                difficulty: draft.difficulty,
                explanation: draft.explanation.clone(),
            })
            .collect();
        let scrape = Scrape {
            id: scrape_id,
            user_id,
            url: url.to_string(),
            title: digest.title.clone(),
            summary: enrichment.summary.clone(),
            sections: digest.sections.clone(),
            key_entities: enrichment.key_entities.clone(),
            related_topics: enrichment.related_topics.clone(),
            created_at: Utc::now(),
            quiz,
        };
        self.inner.lock().unwrap().scrapes.push(scrape.clone());
        Ok(scrape)
    }

    async fn list_scrapes_for_user(&self, user_id: Uuid) -> PortResult<Vec<ScrapeSummary>> {
        let inner = self.inner.lock().unwrap();
        let mut summaries: Vec<ScrapeSummary> = inner
            .scrapes
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| ScrapeSummary {
                id: s.id,
                url: s.url.clone(),
                title: s.title.clone(),
                created_at: s.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn get_scrape_for_user(
        &self,
        user_id: Uuid,
        scrape_id: Uuid,
    ) -> PortResult<Option<Scrape>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .scrapes
            .iter()
            .find(|s| s.id == scrape_id && s.user_id == user_id)
            .cloned())
    }
}

/// Serves a fixed HTML body for every URL.
pub struct FakeFetcher {
    html: String,
}

impl FakeFetcher {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
        }
    }
}

#[async_trait]
impl PageFetchService for FakeFetcher {
    async fn fetch(&self, _url: &str) -> PortResult<String> {
        Ok(self.html.clone())
    }
}

/// Hands back a fixed enrichment, or fails the way the real adapter does
/// when the model's reply is not JSON.
pub struct FakeEnricher {
    reply: Option<Enrichment>,
}

impl FakeEnricher {
    pub fn returning(enrichment: Enrichment) -> Self {
        Self {
            reply: Some(enrichment),
        }
    }

    pub fn malformed() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl EnrichmentService for FakeEnricher {
    async fn enrich(&self, _digest: &PageDigest) -> PortResult<Enrichment> {
        match &self.reply {
            Some(enrichment) => Ok(enrichment.clone()),
            None => Err(PortError::InvalidModelReply(
                "expected value at line 1 column 1".to_string(),
            )),
        }
    }
}

//=========================================================================================
// App construction and request helpers
//=========================================================================================

/// Build a test `Config` with safe defaults; nothing in it reaches the
/// network during tests.
pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        openai_api_key: None,
        openai_base_url: None,
        enrich_model: "test-model".to_string(),
        frontend_origin: "http://localhost:3000".to_string(),
    }
}

/// Build the application router exactly as the binary does, minus CORS and
/// Swagger, so tests exercise the same middleware and handlers.
pub fn build_test_app(
    db: Arc<dyn DatabaseService>,
    fetcher: Arc<dyn PageFetchService>,
    enricher: Arc<dyn EnrichmentService>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        fetcher,
        enricher,
        config: Arc::new(test_config()),
    });
    api_router(state)
}

/// The standard happy-path app: fake db, cat page, three-question model.
pub fn happy_app() -> (Arc<FakeDb>, Router) {
    let db = Arc::new(FakeDb::default());
    let app = build_test_app(
        db.clone(),
        Arc::new(FakeFetcher::new(CAT_PAGE)),
        Arc::new(FakeEnricher::returning(sample_enrichment())),
    );
    (db, app)
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_with_cookie(
    app: Router,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Extracts the `access_token=<jwt>` pair from a register/login response,
/// ready to be sent back as a `Cookie` header.
pub fn session_cookie_from(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Registers a user and returns the session cookie pair.
pub async fn register_user(app: &Router, username: &str, email: &str) -> String {
    let response = post_json(
        app.clone(),
        "/register",
        serde_json::json!({
            "username": username,
            "password": "correct horse battery staple",
            "email": email,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    session_cookie_from(&response)
}
