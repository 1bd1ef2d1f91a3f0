use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

/// Raw card fields as returned by the deck provider, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDraft {
    pub term: String,
    pub meaning: String,
    pub example: Option<String>,
}

impl CardDraft {
    #[must_use]
    pub fn new(
        term: impl Into<String>,
        meaning: impl Into<String>,
        example: Option<String>,
    ) -> Self {
        Self {
            term: term.into(),
            meaning: meaning.into(),
            example,
        }
    }

    /// Validate and normalize the draft.
    ///
    /// Trims all fields; a blank example collapses to `None`.
    ///
    /// # Errors
    ///
    /// Returns `CardError::EmptyTerm` or `CardError::EmptyMeaning` if the
    /// corresponding field is empty or whitespace-only.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedCard, CardError> {
        let term = self.term.trim().to_owned();
        if term.is_empty() {
            return Err(CardError::EmptyTerm);
        }

        let meaning = self.meaning.trim().to_owned();
        if meaning.is_empty() {
            return Err(CardError::EmptyMeaning);
        }

        let example = self
            .example
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());

        Ok(ValidatedCard {
            term,
            meaning,
            example,
            created_at: now,
        })
    }
}

/// A draft that passed validation but has not been placed in a deck yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    term: String,
    meaning: String,
    example: Option<String>,
    created_at: DateTime<Utc>,
}

impl ValidatedCard {
    #[must_use]
    pub fn assign_id(self, id: CardId) -> Card {
        Card {
            id,
            term: self.term,
            meaning: self.meaning,
            example: self.example,
            created_at: self.created_at,
        }
    }
}

/// One vocabulary item: a prompt term and its correct meaning.
///
/// Immutable once created; cards are built in bulk from a generation
/// response and replaced wholesale when a new topic is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    term: String,
    meaning: String,
    example: Option<String>,
    created_at: DateTime<Utc>,
}

impl Card {
    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── CARD VALIDATION ERRORS ────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("card term cannot be empty")]
    EmptyTerm,

    #[error("card meaning cannot be empty")]
    EmptyMeaning,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn card_fails_if_term_empty() {
        let draft = CardDraft::new("   ", "nghĩa", None);
        let err = draft.validate(fixed_now()).unwrap_err();
        assert_eq!(err, CardError::EmptyTerm);
    }

    #[test]
    fn card_fails_if_meaning_empty() {
        let draft = CardDraft::new("word", " ", None);
        let err = draft.validate(fixed_now()).unwrap_err();
        assert_eq!(err, CardError::EmptyMeaning);
    }

    #[test]
    fn card_trims_fields_and_drops_blank_example() {
        let draft = CardDraft::new("  apple  ", "  táo  ", Some("   ".into()));
        let card = draft.validate(fixed_now()).unwrap().assign_id(CardId::new(1));

        assert_eq!(card.term(), "apple");
        assert_eq!(card.meaning(), "táo");
        assert_eq!(card.example(), None);
    }

    #[test]
    fn valid_card_validates_and_assigns_id() {
        let draft = CardDraft::new("banana", "chuối", Some("Tôi ăn chuối.".into()));
        let card = draft
            .validate(fixed_now())
            .unwrap()
            .assign_id(CardId::new(42));

        assert_eq!(card.id(), CardId::new(42));
        assert_eq!(card.term(), "banana");
        assert_eq!(card.meaning(), "chuối");
        assert_eq!(card.example(), Some("Tôi ăn chuối."));
        assert_eq!(card.created_at(), fixed_now());
    }
}
