//! Swipe-driven quiz sessions over a deck's active cards.

use crate::models::{Card, Ledger};
use crate::store::DeckStore;

/// Swipe direction, each mapped to one ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Right, // Got it
    Left,  // Needs review
    Up,    // Important
}

impl Swipe {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            'r' | 'c' => Some(Self::Right),
            'l' => Some(Self::Left),
            'u' | 'i' => Some(Self::Up),
            _ => None,
        }
    }

    pub fn ledger(&self) -> Ledger {
        match self {
            Self::Right => Ledger::Completed,
            Self::Left => Ledger::Review,
            Self::Up => Ledger::Important,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Right => "Completed",
            Self::Left => "Review",
            Self::Up => "Important",
        }
    }
}

/// What happened to a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeResult {
    Recorded,
    CardGone,
}

/// Per-session outcome counts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionTally {
    pub completed: usize,
    pub review: usize,
    pub important: usize,
    pub skipped: usize,
}

impl SessionTally {
    pub fn studied(&self) -> usize {
        self.completed + self.review + self.important
    }

    fn count(&mut self, swipe: Swipe) {
        match swipe {
            Swipe::Right => self.completed += 1,
            Swipe::Left => self.review += 1,
            Swipe::Up => self.important += 1,
        }
    }
}

/// A pass over the cards that were active when the session started.
///
/// The card list is a snapshot: completing a card mid-session does not
/// shrink the queue, the session just moves on.
#[derive(Debug, Clone)]
pub struct QuizSession {
    deck_id: String,
    cards: Vec<Card>,
    position: usize,
    tally: SessionTally,
}

impl QuizSession {
    /// Returns None when the deck does not exist.
    pub fn start(store: &DeckStore, deck_id: &str) -> Option<Self> {
        store.get_deck_by_id(deck_id)?;
        let cards = store.get_active_cards(deck_id).into_iter().cloned().collect();
        tracing::info!(deck_id, "quiz started");
        Some(Self {
            deck_id: deck_id.to_string(),
            cards,
            position: 0,
            tally: SessionTally::default(),
        })
    }

    pub fn deck_id(&self) -> &str {
        &self.deck_id
    }

    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.position)
    }

    pub fn is_complete(&self) -> bool {
        self.position >= self.cards.len()
    }

    /// One-based position of the current card and the session length.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.cards.len();
        ((self.position + 1).min(total), total)
    }

    pub fn tally(&self) -> &SessionTally {
        &self.tally
    }

    /// Record the outcome for the current card and advance. Returns None
    /// if the session was already complete.
    ///
    /// A card removed from the store since the session started is skipped:
    /// nothing lands in the ledger and the tally only counts it as skipped.
    pub fn record(&mut self, store: &mut DeckStore, swipe: Swipe) -> Option<SwipeResult> {
        let card = self.cards.get(self.position)?;
        let ledger = swipe.ledger();
        let before = store.ledger(ledger).len();
        store.mark(ledger, &card.id, &self.deck_id);

        let result = if store.ledger(ledger).len() > before {
            self.tally.count(swipe);
            SwipeResult::Recorded
        } else {
            tracing::warn!(card_id = %card.id, deck_id = %self.deck_id, "card gone, swipe skipped");
            self.tally.skipped += 1;
            SwipeResult::CardGone
        };

        self.position += 1;
        if self.is_complete() {
            tracing::info!(deck_id = %self.deck_id, studied = self.tally.studied(), "quiz completed");
        }
        Some(result)
    }

    /// Start over with the deck's current active cards.
    pub fn restart(&mut self, store: &DeckStore) {
        self.cards = store
            .get_active_cards(&self.deck_id)
            .into_iter()
            .cloned()
            .collect();
        self.position = 0;
        self.tally = SessionTally::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_with(questions: &[&str]) -> (DeckStore, String) {
        let mut store = DeckStore::new();
        let deck_id = store.create_deck("Quiz", None);
        for q in questions {
            store.add_card(&deck_id, q, "answer");
        }
        (store, deck_id)
    }

    #[test]
    fn unknown_deck_has_no_session() {
        let store = DeckStore::new();
        assert!(QuizSession::start(&store, "missing").is_none());
    }

    #[test]
    fn empty_deck_starts_complete() {
        let (store, deck_id) = deck_with(&[]);
        let session = QuizSession::start(&store, &deck_id).unwrap();
        assert!(session.is_complete());
        assert_eq!(session.progress(), (0, 0));
    }

    #[test]
    fn swipes_record_into_ledgers_and_advance() {
        let (mut store, deck_id) = deck_with(&["one", "two", "three"]);
        let mut session = QuizSession::start(&store, &deck_id).unwrap();

        assert_eq!(session.progress(), (1, 3));
        assert_eq!(session.record(&mut store, Swipe::Right), Some(SwipeResult::Recorded));
        assert_eq!(session.current().unwrap().question, "two");
        assert_eq!(session.record(&mut store, Swipe::Up), Some(SwipeResult::Recorded));
        assert_eq!(session.record(&mut store, Swipe::Left), Some(SwipeResult::Recorded));
        assert!(session.is_complete());
        assert_eq!(session.record(&mut store, Swipe::Right), None);

        assert_eq!(store.completed_cards()[0].question, "one");
        assert_eq!(store.important_cards()[0].question, "two");
        assert_eq!(store.review_cards()[0].question, "three");
        assert_eq!(session.tally().studied(), 3);
    }

    #[test]
    fn swipe_on_removed_card_is_skipped() {
        let (mut store, deck_id) = deck_with(&["one", "two"]);
        let mut session = QuizSession::start(&store, &deck_id).unwrap();
        let first = session.current().unwrap().id.clone();
        store.remove_card(&first, &deck_id);

        assert_eq!(session.record(&mut store, Swipe::Right), Some(SwipeResult::CardGone));
        assert!(store.completed_cards().is_empty());
        assert_eq!(session.tally().completed, 0);
        assert_eq!(session.tally().skipped, 1);
        assert_eq!(session.tally().studied(), 0);

        store.remove_deck(&deck_id);
        assert_eq!(session.record(&mut store, Swipe::Up), Some(SwipeResult::CardGone));
        assert!(session.is_complete());
        assert_eq!(session.tally().skipped, 2);
    }

    #[test]
    fn restart_only_serves_remaining_active_cards() {
        let (mut store, deck_id) = deck_with(&["one", "two"]);
        let mut session = QuizSession::start(&store, &deck_id).unwrap();
        session.record(&mut store, Swipe::Right);
        session.record(&mut store, Swipe::Left);

        session.restart(&store);
        assert_eq!(session.progress(), (1, 1));
        assert_eq!(session.current().unwrap().question, "two");
        assert_eq!(session.tally(), &SessionTally::default());
    }

    #[test]
    fn swipe_keys() {
        assert_eq!(Swipe::from_key('r'), Some(Swipe::Right));
        assert_eq!(Swipe::from_key('l'), Some(Swipe::Left));
        assert_eq!(Swipe::from_key('u'), Some(Swipe::Up));
        assert_eq!(Swipe::from_key('x'), None);
        assert_eq!(Swipe::Left.ledger(), Ledger::Review);
    }
}
