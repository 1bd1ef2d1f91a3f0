use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

use lingua_core::model::{Card, CardId, Deck};

use super::options::OptionSets;
use super::progress::QuizProgress;

//
// ─── MODES AND RECORDS ─────────────────────────────────────────────────────────
//

/// How the user is working through the deck.
///
/// Only quiz mode gates forward navigation on the current card being
/// answered; study mode navigation is unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Study,
    Quiz,
}

/// Navigation direction for [`StudySession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

/// Recorded outcome for one answered card.
///
/// Terminal: once a card has a record, it is never overwritten for the rest
/// of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub chosen: String,
    pub is_correct: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory study/quiz state for one generated deck.
///
/// Owns the deck and its precomputed option sets, tracks the chosen answer
/// and correctness per card, a running score, and the current position.
/// Created fresh when a deck is generated and discarded with it.
pub struct StudySession {
    deck: Deck,
    options: OptionSets,
    current: usize,
    answers: HashMap<CardId, AnswerRecord>,
    score: u32,
    started_at: DateTime<Utc>,
}

impl StudySession {
    /// Create a session positioned on the first card with no answers yet.
    #[must_use]
    pub fn new(deck: Deck, options: OptionSets, started_at: DateTime<Utc>) -> Self {
        Self {
            deck,
            options,
            current: 0,
            answers: HashMap::new(),
            score: 0,
            started_at,
        }
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Position of the current card in deck order.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        self.deck.card_at(self.current)
    }

    /// Answer choices for the given card, in display order.
    #[must_use]
    pub fn options_for(&self, card_id: CardId) -> Option<&[String]> {
        self.options.options_for(card_id)
    }

    #[must_use]
    pub fn answer_for(&self, card_id: CardId) -> Option<&AnswerRecord> {
        self.answers.get(&card_id)
    }

    /// Whether the card at the current position has been answered.
    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.current_card()
            .is_some_and(|card| self.answers.contains_key(&card.id()))
    }

    /// The session is finished once every card in the deck is answered.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.answers.len() == self.deck.len()
    }

    /// Returns a summary of the current quiz progress.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            total: self.deck.len(),
            answered: self.answers.len(),
            score: self.score,
            is_finished: self.is_finished(),
        }
    }

    /// Score as a rounded percentage of the deck size.
    #[must_use]
    pub fn percent_score(&self) -> u32 {
        let total = self.deck.len() as f64;
        ((f64::from(self.score) / total) * 100.0).round() as u32
    }

    /// Record an answer for `card_id`.
    ///
    /// Correctness is exact string equality with the card's meaning; the
    /// score increments iff correct. A card that is already answered is left
    /// untouched and its existing record is returned, so repeated
    /// submissions cannot change an outcome or inflate the score. Returns
    /// `None` for a card id that is not in the deck, mutating nothing.
    pub fn submit_answer(&mut self, card_id: CardId, chosen: &str) -> Option<&AnswerRecord> {
        let card = self.deck.card(card_id)?;
        if self.answers.contains_key(&card_id) {
            return self.answers.get(&card_id);
        }

        let is_correct = chosen == card.meaning();
        if is_correct {
            self.score += 1;
        }
        self.answers.insert(
            card_id,
            AnswerRecord {
                chosen: chosen.to_owned(),
                is_correct,
            },
        );
        self.answers.get(&card_id)
    }

    /// Move the current position one card forward or back.
    ///
    /// Clamped to the deck bounds; out-of-range requests are ignored rather
    /// than erroring. Forward movement in [`Mode::Quiz`] is refused while
    /// the current card is unanswered. Returns whether the position changed.
    pub fn advance(&mut self, direction: Direction, mode: Mode) -> bool {
        match direction {
            Direction::Back => {
                if self.current == 0 {
                    return false;
                }
                self.current -= 1;
                true
            }
            Direction::Forward => {
                if self.current + 1 >= self.deck.len() {
                    return false;
                }
                if mode == Mode::Quiz && !self.is_current_answered() {
                    return false;
                }
                self.current += 1;
                true
            }
        }
    }

    /// Clear all answers and the score and return to the first card.
    ///
    /// The deck and its option sets are preserved; only quiz progress is
    /// reset.
    pub fn restart(&mut self) {
        self.answers.clear();
        self.score = 0;
        self.current = 0;
    }
}

impl fmt::Debug for StudySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudySession")
            .field("topic", &self.deck.topic())
            .field("cards_len", &self.deck.len())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("score", &self.score)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
