//! services/api/src/adapters/enrich_llm.rs
//!
//! This module contains the adapter for the enrichment LLM.
//! It implements the `EnrichmentService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use wikiquiz_core::{
    domain::{Enrichment, PageDigest},
    ports::{EnrichmentService, PortError, PortResult},
};

const SYSTEM_INSTRUCTIONS: &str = "You are a data extraction assistant. Analyze the provided Wikipedia introduction and return JSON only. \
Return keys in this exact order: 'quiz', 'key_entities', 'related_topics', 'summary'. \
'quiz': Generate 3-4 MCQs with 4 options, 1 correct answer, and a brief explanation and the difficulty of the question (easy, medium or hard). \
'key_entities': Must be a JSON object with keys 'people', 'organizations', 'locations'. \
'related_topics': List 3-6 relevant topics from the text only. \
'summary': Write a concise 2-3 sentence summary based strictly on the text. \
Use ONLY the provided text. Do not add external knowledge. \
Return ONLY valid JSON. No markdown, no filler text.";

/// Sampling temperature for the enrichment exchange.
const TEMPERATURE: f32 = 0.9;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EnrichmentService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiEnrichmentAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEnrichmentAdapter {
    /// Creates a new `OpenAiEnrichmentAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Parses the model's textual reply into a typed [`Enrichment`].
    ///
    /// Anything that is not the requested JSON shape fails with
    /// `PortError::InvalidModelReply`; there is no coercion and no reprompt.
    fn parse_model_reply(reply: &str) -> PortResult<Enrichment> {
        serde_json::from_str(reply).map_err(|e| PortError::InvalidModelReply(e.to_string()))
    }
}

//=========================================================================================
// `EnrichmentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EnrichmentService for OpenAiEnrichmentAdapter {
    /// Sends the digest (as a compact JSON string) to the model and parses
    /// the structured reply.
    async fn enrich(&self, digest: &PageDigest) -> PortResult<Enrichment> {
        let payload = serde_json::to_string(digest)
            .map_err(|e| PortError::Unexpected(format!("Failed to serialize digest: {}", e)))?;

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(payload)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(TEMPERATURE)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Self::parse_model_reply(&content)
            } else {
                Err(PortError::Unexpected(
                    "Enrichment LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Enrichment LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
