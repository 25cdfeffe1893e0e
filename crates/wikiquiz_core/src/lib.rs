pub mod domain;
pub mod ports;

pub use domain::{
    AuthState, Difficulty, Enrichment, KeyEntities, PageDigest, QuizDraft, QuizQuestion, Scrape,
    ScrapeSummary, User, UserCredentials,
};
pub use ports::{DatabaseService, EnrichmentService, PageFetchService, PortError, PortResult};
