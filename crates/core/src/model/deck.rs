use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::card::{Card, CardDraft, CardError};
use crate::model::ids::{CardId, DeckId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("deck topic cannot be empty")]
    EmptyTopic,

    #[error("deck must contain at least one card")]
    NoCards,

    #[error(transparent)]
    Card(#[from] CardError),
}

//
// ─── DECK ──────────────────────────────────────────────────────────────────────
//

/// The full ordered set of cards generated for one topic.
///
/// A deck is immutable: a new topic produces a new deck, and the old one is
/// discarded together with any session built on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    id: DeckId,
    topic: String,
    cards: Vec<Card>,
    created_at: DateTime<Utc>,
}

impl Deck {
    /// Creates a new Deck from already-validated cards.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::EmptyTopic` if the topic is empty or
    /// whitespace-only, `DeckError::NoCards` if no cards are provided.
    pub fn new(
        id: DeckId,
        topic: impl Into<String>,
        cards: Vec<Card>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DeckError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(DeckError::EmptyTopic);
        }
        if cards.is_empty() {
            return Err(DeckError::NoCards);
        }

        Ok(Self {
            id,
            topic: topic.trim().to_owned(),
            cards,
            created_at,
        })
    }

    /// Validate a batch of provider drafts and assemble them into a deck.
    ///
    /// Card ids are assigned positionally, so they are unique within the
    /// deck. The whole batch is accepted or rejected; a single bad draft
    /// fails the deck.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::Card` for the first draft that fails validation,
    /// plus the topic/cards checks of [`Deck::new`].
    pub fn from_drafts(
        id: DeckId,
        topic: impl Into<String>,
        drafts: Vec<CardDraft>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DeckError> {
        let mut cards = Vec::with_capacity(drafts.len());
        for (position, draft) in drafts.into_iter().enumerate() {
            let card = draft
                .validate(created_at)?
                .assign_id(CardId::new(position as u64));
            cards.push(card);
        }
        Self::new(id, topic, cards, created_at)
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> DeckId {
        self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Look up a card by id.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == id)
    }

    /// Card at the given position in deck order.
    #[must_use]
    pub fn card_at(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
