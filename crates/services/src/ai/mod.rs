pub mod flashcard_gen;

pub use flashcard_gen::{
    FlashcardAiConfig, FlashcardAiService, FlashcardSource, FlashcardSuggestion,
};
