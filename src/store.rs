//! In-memory deck store: the single owner of decks, cards and ledgers.
//!
//! Every mutation is a [`Command`] folded into the current [`DeckState`] by
//! [`DeckState::apply`]. Subscribers are told about each applied command, in
//! subscription order, before `dispatch` returns.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::models::{short_id, Card, Deck, DeckStats, Ledger, LedgerEntry};

/// A mutation request understood by [`DeckState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateDeck(Deck),
    AddCard { deck_id: String, card: Card },
    Mark { ledger: Ledger, card_id: String, deck_id: String },
    RemoveDeck { deck_id: String },
    RemoveCard { card_id: String, deck_id: String },
}

/// Everything the store owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeckState {
    pub decks: Vec<Deck>,
    pub completed_cards: Vec<LedgerEntry>,
    pub important_cards: Vec<LedgerEntry>,
    pub review_cards: Vec<LedgerEntry>,
}

impl DeckState {
    /// Fold one command into the state. Unknown decks or cards, and ids
    /// already taken, leave the state unchanged.
    pub fn apply(mut self, command: &Command) -> Self {
        match command {
            Command::CreateDeck(deck) => {
                if self.deck(&deck.id).is_some() {
                    tracing::debug!(deck_id = %deck.id, "create_deck: id taken, no-op");
                } else {
                    self.decks.push(deck.clone());
                }
            }
            Command::AddCard { deck_id, card } => {
                match self.decks.iter_mut().find(|d| &d.id == deck_id) {
                    Some(deck) if deck.has_card(&card.id) => tracing::debug!(
                        deck_id = %deck_id,
                        card_id = %card.id,
                        "add_card: id taken, no-op"
                    ),
                    Some(deck) => deck.cards.push(card.clone()),
                    None => tracing::debug!(deck_id = %deck_id, "add_card: no such deck"),
                }
            }
            Command::Mark {
                ledger,
                card_id,
                deck_id,
            } => {
                let entry = self
                    .deck(deck_id)
                    .and_then(|d| d.find_card(card_id))
                    .map(|card| LedgerEntry::snapshot(card, deck_id));
                match entry {
                    Some(entry) => self.ledger_mut(*ledger).push(entry),
                    None => tracing::debug!(
                        ledger = ledger.name(),
                        card_id = %card_id,
                        deck_id = %deck_id,
                        "mark: no such card"
                    ),
                }
            }
            Command::RemoveDeck { deck_id } => {
                self.decks.retain(|d| &d.id != deck_id);
                for ledger in Ledger::ALL {
                    self.ledger_mut(ledger).retain(|e| &e.deck_id != deck_id);
                }
            }
            Command::RemoveCard { card_id, deck_id } => {
                // Ledger entries are snapshots and outlive the card.
                if let Some(deck) = self.decks.iter_mut().find(|d| &d.id == deck_id) {
                    deck.cards.retain(|c| &c.id != card_id);
                }
            }
        }
        self
    }

    pub fn ledger(&self, ledger: Ledger) -> &[LedgerEntry] {
        match ledger {
            Ledger::Completed => &self.completed_cards,
            Ledger::Important => &self.important_cards,
            Ledger::Review => &self.review_cards,
        }
    }

    fn ledger_mut(&mut self, ledger: Ledger) -> &mut Vec<LedgerEntry> {
        match ledger {
            Ledger::Completed => &mut self.completed_cards,
            Ledger::Important => &mut self.important_cards,
            Ledger::Review => &mut self.review_cards,
        }
    }

    pub fn deck(&self, deck_id: &str) -> Option<&Deck> {
        self.decks.iter().find(|d| d.id == deck_id)
    }

    pub fn cards(&self, deck_id: &str) -> &[Card] {
        self.deck(deck_id).map(|d| d.cards.as_slice()).unwrap_or(&[])
    }

    fn completed_ids(&self, deck_id: &str) -> HashSet<&str> {
        self.completed_cards
            .iter()
            .filter(|e| e.deck_id == deck_id)
            .map(|e| e.card_id.as_str())
            .collect()
    }

    pub fn active_cards(&self, deck_id: &str) -> Vec<&Card> {
        let completed = self.completed_ids(deck_id);
        self.cards(deck_id)
            .iter()
            .filter(|c| !completed.contains(c.id.as_str()))
            .collect()
    }
}

/// Handle returned by [`DeckStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Command, &DeckState) + Send>;

/// Owner of the flashcard state, passed by reference to whoever needs it.
#[derive(Default)]
pub struct DeckStore {
    state: DeckState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for DeckStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl DeckStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DeckState {
        &self.state
    }

    /// Apply a command and notify every subscriber.
    pub fn dispatch(&mut self, command: Command) {
        tracing::debug!(?command, "dispatch");
        self.state = std::mem::take(&mut self.state).apply(&command);
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&command, &self.state);
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Command, &DeckState) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Create an empty deck and return its id. The name is not validated.
    pub fn create_deck(&mut self, name: &str, description: Option<&str>) -> String {
        let mut deck = Deck::new(name.to_string(), description.map(str::to_string));
        while self.state.deck(&deck.id).is_some() {
            deck.id = short_id();
        }
        let id = deck.id.clone();
        self.dispatch(Command::CreateDeck(deck));
        id
    }

    /// Append a card to a deck. Unknown decks are silently ignored.
    pub fn add_card(&mut self, deck_id: &str, question: &str, answer: &str) {
        let mut card = Card::new(question.to_string(), answer.to_string());
        if let Some(deck) = self.state.deck(deck_id) {
            while deck.has_card(&card.id) {
                card.id = short_id();
            }
        }
        self.dispatch(Command::AddCard {
            deck_id: deck_id.to_string(),
            card,
        });
    }

    pub fn mark(&mut self, ledger: Ledger, card_id: &str, deck_id: &str) {
        self.dispatch(Command::Mark {
            ledger,
            card_id: card_id.to_string(),
            deck_id: deck_id.to_string(),
        });
    }

    pub fn mark_completed(&mut self, card_id: &str, deck_id: &str) {
        self.mark(Ledger::Completed, card_id, deck_id);
    }

    pub fn mark_important(&mut self, card_id: &str, deck_id: &str) {
        self.mark(Ledger::Important, card_id, deck_id);
    }

    pub fn mark_review(&mut self, card_id: &str, deck_id: &str) {
        self.mark(Ledger::Review, card_id, deck_id);
    }

    /// Remove a deck together with every ledger entry pointing at it.
    pub fn remove_deck(&mut self, deck_id: &str) {
        self.dispatch(Command::RemoveDeck {
            deck_id: deck_id.to_string(),
        });
    }

    pub fn remove_card(&mut self, card_id: &str, deck_id: &str) {
        self.dispatch(Command::RemoveCard {
            card_id: card_id.to_string(),
            deck_id: deck_id.to_string(),
        });
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn decks(&self) -> &[Deck] {
        &self.state.decks
    }

    pub fn completed_cards(&self) -> &[LedgerEntry] {
        &self.state.completed_cards
    }

    pub fn important_cards(&self) -> &[LedgerEntry] {
        &self.state.important_cards
    }

    pub fn review_cards(&self) -> &[LedgerEntry] {
        &self.state.review_cards
    }

    pub fn ledger(&self, ledger: Ledger) -> &[LedgerEntry] {
        self.state.ledger(ledger)
    }

    pub fn get_deck_by_id(&self, deck_id: &str) -> Option<&Deck> {
        self.state.deck(deck_id)
    }

    pub fn get_cards_by_deck(&self, deck_id: &str) -> &[Card] {
        self.state.cards(deck_id)
    }

    /// Cards of the deck not yet completed for that deck.
    pub fn get_active_cards(&self, deck_id: &str) -> Vec<&Card> {
        self.state.active_cards(deck_id)
    }

    pub fn deck_stats(&self, deck_id: &str) -> Option<DeckStats> {
        let deck = self.state.deck(deck_id)?;
        let completed = self.state.completed_ids(deck_id);
        let count = |ledger: Ledger| {
            self.state
                .ledger(ledger)
                .iter()
                .filter(|e| e.deck_id == deck_id)
                .count()
        };

        Some(DeckStats {
            total_cards: deck.cards.len(),
            active_cards: self.state.active_cards(deck_id).len(),
            completed_cards: deck
                .cards
                .iter()
                .filter(|c| completed.contains(c.id.as_str()))
                .count(),
            important_cards: count(Ledger::Important),
            review_cards: count(Ledger::Review),
        })
    }
}
