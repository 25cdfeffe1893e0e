pub mod db;
pub mod enrich_llm;
pub mod fetch;

pub use db::DbAdapter;
pub use enrich_llm::OpenAiEnrichmentAdapter;
pub use fetch::HttpFetchAdapter;
