//! Shared error types for the services crate.

use thiserror::Error;

use lingua_core::model::DeckError;

/// Errors emitted by the flashcard collaborator client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    #[error("flashcard source is not configured")]
    Disabled,
    #[error("flashcard source returned an empty response")]
    EmptyResponse,
    #[error("flashcard source request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("flashcard source returned malformed data: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `DeckGenService::generate`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    #[error("topic cannot be empty")]
    EmptyTopic,
    #[error("generation returned no flashcards")]
    NoCards,
    #[error("generation superseded by a newer request")]
    Superseded,
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Source(#[from] AiError),
}

/// Errors emitted by `DeckGenService::suggest_topic`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SuggestError {
    #[error("topic suggestion came back empty")]
    EmptySuggestion,
    #[error(transparent)]
    Source(#[from] AiError),
}
