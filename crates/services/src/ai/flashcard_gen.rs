use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct FlashcardAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl FlashcardAiConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("LINGUA_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("LINGUA_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("LINGUA_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

//
// ─── SOURCE CONTRACT ───────────────────────────────────────────────────────────
//

/// One flashcard as suggested by the model. Wire shape, unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlashcardSuggestion {
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Boundary contract for the generative collaborator.
///
/// The workflow layer and its tests depend on this trait, never on the
/// concrete HTTP client.
#[async_trait]
pub trait FlashcardSource: Send + Sync {
    /// Generate `count` flashcards for a topic.
    ///
    /// # Errors
    ///
    /// Returns `AiError` when the collaborator is unavailable, fails, or
    /// replies with something that is not a flashcard list.
    async fn suggest_flashcards(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<Vec<FlashcardSuggestion>, AiError>;

    /// Suggest a topic worth studying.
    ///
    /// # Errors
    ///
    /// Returns `AiError` when the collaborator is unavailable or fails.
    async fn suggest_topic(&self) -> Result<String, AiError>;
}

//
// ─── HTTP CLIENT ───────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct FlashcardAiService {
    client: Client,
    config: Option<FlashcardAiConfig>,
}

impl FlashcardAiService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(FlashcardAiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<FlashcardAiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn chat(&self, prompt: String) -> Result<String, AiError> {
        let config = self.config.as_ref().ok_or(AiError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AiError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AiError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl FlashcardSource for FlashcardAiService {
    async fn suggest_flashcards(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<Vec<FlashcardSuggestion>, AiError> {
        let content = self.chat(flashcards_prompt(topic, count)).await?;
        parse_flashcards(&content)
    }

    async fn suggest_topic(&self) -> Result<String, AiError> {
        let content = self.chat(topic_prompt()).await?;
        Ok(parse_topic(&content))
    }
}

//
// ─── PROMPTS AND PARSING ───────────────────────────────────────────────────────
//

fn flashcards_prompt(topic: &str, count: u32) -> String {
    format!(
        "You are an AI assistant that suggests flashcards for language learners. \
         Generate {count} flashcards for the topic: {topic}. \
         Each flashcard has an English word, its Vietnamese meaning, and an optional \
         example sentence. Reply with only a JSON array of objects with fields \
         \"word\", \"meaning\" and optional \"example\". \
         Make the flashcards diverse across the topic, the meanings accurate, and \
         the example sentences natural."
    )
}

fn topic_prompt() -> String {
    "You are an AI assistant for a Vietnamese language learning app. \
     Suggest a single, random, interesting topic for flashcards, specific enough \
     to generate a good set, like \"Common kitchen items\" or \"Basic greetings\". \
     Reply with only a JSON object {\"topic\": \"...\"} and no extra text."
        .to_string()
}

// Chat models routinely wrap JSON in a Markdown fence even when told not to.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn parse_flashcards(content: &str) -> Result<Vec<FlashcardSuggestion>, AiError> {
    serde_json::from_str(strip_code_fence(content)).map_err(|e| AiError::Malformed(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct TopicReply {
    topic: String,
}

fn parse_topic(content: &str) -> String {
    let body = strip_code_fence(content);
    match serde_json::from_str::<TopicReply>(body) {
        Ok(reply) => reply.topic.trim().to_owned(),
        // Some models reply with the bare topic string despite the JSON ask.
        Err(_) => body.trim_matches('"').trim().to_owned(),
    }
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
