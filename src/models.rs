//! Data models for decks, cards and the annotation ledgers.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short opaque identifier, same shape for decks and cards.
pub(crate) fn short_id() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}

/// A single flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Local>,
}

impl Card {
    pub fn new(question: String, answer: String) -> Self {
        Self {
            id: short_id(),
            question,
            answer,
            created_at: Local::now(),
        }
    }
}

/// A named collection of flashcards. Card order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cards: Vec<Card>,
    pub created_at: DateTime<Local>,
}

impl Deck {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: short_id(),
            name,
            description: description.unwrap_or_default(),
            cards: Vec::new(),
            created_at: Local::now(),
        }
    }

    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    /// Whether a card id is already used inside this deck.
    pub fn has_card(&self, card_id: &str) -> bool {
        self.find_card(card_id).is_some()
    }
}

/// The three study-outcome ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ledger {
    Completed,
    Important,
    Review,
}

impl Ledger {
    pub const ALL: [Ledger; 3] = [Ledger::Completed, Ledger::Important, Ledger::Review];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Important => "important",
            Self::Review => "review",
        }
    }
}

/// Snapshot of a card taken when a study outcome was recorded.
///
/// The copy is independent of the live card: removing or changing the card
/// afterwards does not touch the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub card_id: String,
    pub deck_id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Local>,
}

impl LedgerEntry {
    pub fn snapshot(card: &Card, deck_id: &str) -> Self {
        Self {
            card_id: card.id.clone(),
            deck_id: deck_id.to_string(),
            question: card.question.clone(),
            answer: card.answer.clone(),
            created_at: card.created_at,
        }
    }

    pub fn refers_to(&self, card_id: &str, deck_id: &str) -> bool {
        self.card_id == card_id && self.deck_id == deck_id
    }
}

/// Statistics for a deck.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeckStats {
    pub total_cards: usize,
    pub active_cards: usize,
    pub completed_cards: usize,
    pub important_cards: usize,
    pub review_cards: usize,
}
