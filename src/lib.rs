//! Swipedeck - swipe-driven flashcard decks.
//!
//! The [`store::DeckStore`] owns every deck, card and study ledger in memory;
//! everything else (quiz sessions, the shell, CSV import) talks to it.

pub mod config;
pub mod models;
pub mod session;
pub mod shell;
pub mod store;
pub mod transfer;

pub use models::{Card, Deck, DeckStats, Ledger, LedgerEntry};
pub use session::{QuizSession, SessionTally, Swipe, SwipeResult};
pub use store::{Command, DeckState, DeckStore, SubscriptionId};
