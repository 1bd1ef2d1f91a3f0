use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::rng;

use lingua_core::Clock;
use lingua_core::model::{CardDraft, Deck, DeckId};

use crate::ai::{FlashcardSource, FlashcardSuggestion};
use crate::error::{GenerateError, SuggestError};
use crate::quiz::{DEFAULT_OPTION_COUNT, OptionSets, StudySession};

/// Cards requested per generation.
pub const DEFAULT_CARDS_PER_DECK: u32 = 20;

//
// ─── DECK GENERATION WORKFLOW ──────────────────────────────────────────────────
//

/// Orchestrates one deck generation against the AI collaborator.
///
/// Every `generate` call takes a fresh generation token from a shared
/// counter. When calls overlap, the newest token wins: an older call finds
/// the counter moved on after its await and discards its own result, so a
/// new request supersedes an in-flight one instead of queueing behind it.
/// Sessions are owned by the caller; dropping the previous session when a
/// new one arrives is all the cleanup there is.
#[derive(Clone)]
pub struct DeckGenService {
    clock: Clock,
    source: Arc<dyn FlashcardSource>,
    generation: Arc<AtomicU64>,
    cards_per_deck: u32,
    option_count: usize,
}

impl DeckGenService {
    #[must_use]
    pub fn new(clock: Clock, source: Arc<dyn FlashcardSource>) -> Self {
        Self {
            clock,
            source,
            generation: Arc::new(AtomicU64::new(0)),
            cards_per_deck: DEFAULT_CARDS_PER_DECK,
            option_count: DEFAULT_OPTION_COUNT,
        }
    }

    /// Override how many cards each generation asks for.
    #[must_use]
    pub fn with_cards_per_deck(mut self, cards_per_deck: u32) -> Self {
        self.cards_per_deck = cards_per_deck;
        self
    }

    /// Override how many answer choices each quiz card gets.
    #[must_use]
    pub fn with_option_count(mut self, option_count: usize) -> Self {
        self.option_count = option_count;
        self
    }

    /// Generate a new deck for `topic` and return a fresh study session.
    ///
    /// The deck is installed whole or not at all: a validation failure or a
    /// superseding request discards the entire response, leaving whatever
    /// session the caller already holds untouched.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::EmptyTopic` without calling the collaborator
    /// when the topic is blank, `GenerateError::Source` when the
    /// collaborator fails, `GenerateError::NoCards`/`GenerateError::Deck`
    /// for unusable responses, and `GenerateError::Superseded` when a newer
    /// request took over while this one was in flight.
    pub async fn generate(&self, topic: &str) -> Result<StudySession, GenerateError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(GenerateError::EmptyTopic);
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let suggestions = self
            .source
            .suggest_flashcards(topic, self.cards_per_deck)
            .await?;

        // Stale-response guard: a newer request owns the session now.
        if self.generation.load(Ordering::SeqCst) != token {
            return Err(GenerateError::Superseded);
        }

        if suggestions.is_empty() {
            return Err(GenerateError::NoCards);
        }

        let now = self.clock.now();
        let drafts = suggestions.into_iter().map(draft_from_suggestion).collect();
        let deck = Deck::from_drafts(DeckId::new(token), topic, drafts, now)?;

        let mut rng = rng();
        let options = OptionSets::build(&deck, self.option_count, &mut rng);
        Ok(StudySession::new(deck, options, now))
    }

    /// Ask the collaborator for a topic worth studying.
    ///
    /// # Errors
    ///
    /// Returns `SuggestError::Source` when the collaborator fails and
    /// `SuggestError::EmptySuggestion` when it replies with nothing usable.
    pub async fn suggest_topic(&self) -> Result<String, SuggestError> {
        let topic = self.source.suggest_topic().await?;
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SuggestError::EmptySuggestion);
        }
        Ok(topic.to_owned())
    }
}

fn draft_from_suggestion(suggestion: FlashcardSuggestion) -> CardDraft {
    CardDraft::new(suggestion.word, suggestion.meaning, suggestion.example)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lingua_core::model::{CardError, DeckError};
    use lingua_core::time::fixed_clock;
    use std::sync::atomic::AtomicU32;
    use tokio::sync::{Mutex, Notify, oneshot};

    use crate::error::AiError;

    fn suggestion(word: &str, meaning: &str) -> FlashcardSuggestion {
        FlashcardSuggestion {
            word: word.to_owned(),
            meaning: meaning.to_owned(),
            example: None,
        }
    }

    /// Returns a canned response per call and counts calls.
    struct StubSource {
        responses: Mutex<Vec<Result<Vec<FlashcardSuggestion>, AiError>>>,
        calls: AtomicU32,
    }

    impl StubSource {
        fn new(responses: Vec<Result<Vec<FlashcardSuggestion>, AiError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FlashcardSource for StubSource {
        async fn suggest_flashcards(
            &self,
            _topic: &str,
            _count: u32,
        ) -> Result<Vec<FlashcardSuggestion>, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().await.remove(0)
        }

        async fn suggest_topic(&self) -> Result<String, AiError> {
            Ok("Common fruits".to_owned())
        }
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_before_the_collaborator_is_called() {
        let source = Arc::new(StubSource::new(vec![Ok(vec![suggestion("apple", "táo")])]));
        let service = DeckGenService::new(
            fixed_clock(),
            Arc::clone(&source) as Arc<dyn FlashcardSource>,
        );

        let err = service.generate("   ").await.unwrap_err();

        assert!(matches!(err, GenerateError::EmptyTopic));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn generate_builds_a_session_with_options_for_every_card() {
        let source = Arc::new(StubSource::new(vec![Ok(vec![
            suggestion("apple", "táo"),
            suggestion("banana", "chuối"),
            suggestion("orange", "cam"),
        ])]));
        let service = DeckGenService::new(fixed_clock(), source).with_option_count(4);

        let session = service.generate("  Common fruits ").await.unwrap();

        assert_eq!(session.deck().topic(), "Common fruits");
        assert_eq!(session.deck().len(), 3);
        assert_eq!(session.score(), 0);
        for card in session.deck().cards() {
            let options = session.options_for(card.id()).unwrap();
            // Pool of two distractors caps the set below the requested four.
            assert_eq!(options.len(), 3);
            assert!(options.iter().any(|o| o == card.meaning()));
        }
    }

    #[tokio::test]
    async fn collaborator_failure_propagates_as_source_error() {
        let source = Arc::new(StubSource::new(vec![Err(AiError::EmptyResponse)]));
        let service = DeckGenService::new(fixed_clock(), source);

        let err = service.generate("Fruits").await.unwrap_err();

        assert!(matches!(err, GenerateError::Source(AiError::EmptyResponse)));
    }

    #[tokio::test]
    async fn empty_suggestion_list_is_no_cards() {
        let source = Arc::new(StubSource::new(vec![Ok(Vec::new())]));
        let service = DeckGenService::new(fixed_clock(), source);

        let err = service.generate("Fruits").await.unwrap_err();

        assert!(matches!(err, GenerateError::NoCards));
    }

    #[tokio::test]
    async fn one_bad_card_discards_the_whole_deck() {
        let source = Arc::new(StubSource::new(vec![Ok(vec![
            suggestion("apple", "táo"),
            suggestion("", "chuối"),
        ])]));
        let service = DeckGenService::new(fixed_clock(), source);

        let err = service.generate("Fruits").await.unwrap_err();

        assert!(matches!(
            err,
            GenerateError::Deck(DeckError::Card(CardError::EmptyTerm))
        ));
    }

    /// Parks the first call on a gate so a second call can overtake it.
    struct GatedSource {
        entered: Notify,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        calls: AtomicU32,
    }

    impl GatedSource {
        fn new(gate: oneshot::Receiver<()>) -> Self {
            Self {
                entered: Notify::new(),
                gate: Mutex::new(Some(gate)),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl FlashcardSource for GatedSource {
        async fn suggest_flashcards(
            &self,
            topic: &str,
            _count: u32,
        ) -> Result<Vec<FlashcardSuggestion>, AiError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.notify_one();
                let gate = self.gate.lock().await.take();
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
            }
            Ok(vec![
                suggestion("one", format!("{topic}-1").as_str()),
                suggestion("two", format!("{topic}-2").as_str()),
            ])
        }

        async fn suggest_topic(&self) -> Result<String, AiError> {
            Ok("Common fruits".to_owned())
        }
    }

    #[tokio::test]
    async fn superseded_generation_is_discarded_on_arrival() {
        let (release, gate) = oneshot::channel();
        let source = Arc::new(GatedSource::new(gate));
        let service = DeckGenService::new(
            fixed_clock(),
            Arc::clone(&source) as Arc<dyn FlashcardSource>,
        );

        let older = {
            let service = service.clone();
            tokio::spawn(async move { service.generate("Fruits").await })
        };
        // Wait until the first request is parked inside the collaborator.
        source.entered.notified().await;

        let newer = service.generate("Animals").await.unwrap();
        release.send(()).unwrap();
        let older = older.await.unwrap();

        assert!(matches!(older, Err(GenerateError::Superseded)));
        assert_eq!(newer.deck().topic(), "Animals");
        assert_eq!(newer.deck().cards()[0].meaning(), "Animals-1");
    }

    #[tokio::test]
    async fn suggest_topic_passes_the_collaborator_reply_through() {
        let source = Arc::new(StubSource::new(Vec::new()));
        let service = DeckGenService::new(fixed_clock(), source);

        assert_eq!(service.suggest_topic().await.unwrap(), "Common fruits");
    }

    /// Topic source returning whitespace only.
    struct BlankTopicSource;

    #[async_trait]
    impl FlashcardSource for BlankTopicSource {
        async fn suggest_flashcards(
            &self,
            _topic: &str,
            _count: u32,
        ) -> Result<Vec<FlashcardSuggestion>, AiError> {
            Ok(Vec::new())
        }

        async fn suggest_topic(&self) -> Result<String, AiError> {
            Ok("   ".to_owned())
        }
    }

    #[tokio::test]
    async fn blank_topic_suggestion_is_an_error() {
        let service = DeckGenService::new(fixed_clock(), Arc::new(BlankTopicSource));

        let err = service.suggest_topic().await.unwrap_err();

        assert!(matches!(err, SuggestError::EmptySuggestion));
    }
}
