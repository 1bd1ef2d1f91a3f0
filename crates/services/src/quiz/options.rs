use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use lingua_core::model::{Card, CardId, Deck};

/// Number of answer choices shown per quiz card.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Build the multiple-choice options for one card.
///
/// The distractor pool is every other card's meaning, duplicates included
/// when the deck repeats a meaning. The pool is shuffled, `count - 1`
/// distractors are kept, the correct meaning is mixed in and the combined
/// set is shuffled again so the correct position is unpredictable.
///
/// Returns fewer than `count` strings when the pool runs out; that is not
/// an error. With `count == 1` only the correct meaning comes back.
#[must_use]
pub fn generate_options<R: Rng + ?Sized>(
    target: &Card,
    cards: &[Card],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut distractors: Vec<String> = cards
        .iter()
        .filter(|card| card.id() != target.id())
        .map(|card| card.meaning().to_owned())
        .collect();

    distractors.shuffle(rng);
    distractors.truncate(count.saturating_sub(1));

    let mut options = Vec::with_capacity(distractors.len() + 1);
    options.push(target.meaning().to_owned());
    options.append(&mut distractors);
    options.shuffle(rng);
    options
}

/// Precomputed option sets for every card of one deck.
///
/// Built once when a deck is installed; a regenerated deck gets a fresh
/// build, option sets are never carried across decks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSets {
    by_card: HashMap<CardId, Vec<String>>,
}

impl OptionSets {
    /// Compute the options for every card in `deck`.
    #[must_use]
    pub fn build<R: Rng + ?Sized>(deck: &Deck, count: usize, rng: &mut R) -> Self {
        let by_card = deck
            .cards()
            .iter()
            .map(|card| (card.id(), generate_options(card, deck.cards(), count, rng)))
            .collect();
        Self { by_card }
    }

    #[must_use]
    pub fn options_for(&self, card_id: CardId) -> Option<&[String]> {
        self.by_card.get(&card_id).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_card.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_card.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
