#![forbid(unsafe_code)]

pub mod ai;
pub mod deck_gen_service;
pub mod error;
pub mod quiz;

pub use lingua_core::Clock;

pub use ai::{FlashcardAiConfig, FlashcardAiService, FlashcardSource, FlashcardSuggestion};
pub use deck_gen_service::{DEFAULT_CARDS_PER_DECK, DeckGenService};
pub use error::{AiError, GenerateError, SuggestError};

pub use quiz::{
    AnswerRecord, DEFAULT_OPTION_COUNT, Direction, Mode, OptionSets, QuizProgress, StudySession,
    generate_options,
};
