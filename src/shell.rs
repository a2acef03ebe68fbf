//! Line-oriented front-end over the deck store.
//!
//! The shell is the only place that validates user input; the store itself
//! accepts whatever it is given.

use std::io::{BufRead, Write};

use anyhow::Result;
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::models::{Card, Ledger};
use crate::session::{QuizSession, Swipe, SwipeResult};
use crate::store::DeckStore;
use crate::transfer;

/// Errors from parsing a shell line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Help,
    ListDecks,
    CreateDeck { name: String, description: Option<String> },
    RemoveDeck { deck_id: String },
    ShowDeck { deck_id: String },
    AddCard { deck_id: String, question: String, answer: String },
    RemoveCard { deck_id: String, card_id: String },
    Active { deck_id: String },
    ShowLedger(Ledger),
    Quiz { deck_id: String },
    Import { path: String },
    Export { path: String },
    Quit,
}

const HELP: &str = "\
commands:
  decks                               list decks
  deck new <name> [| <description>]   create a deck
  deck show <deck>                    list a deck's cards
  deck rm <deck>                      remove a deck and its ledger entries
  card add <deck> <question> | <answer>
  card rm <deck> <card>
  active <deck>                       cards not yet completed
  completed | important | review      ledger views
  quiz <deck>                         swipe through active cards
  import <file.csv>                   new deck from front,back lines
  export <file.json>                  dump the whole store
  quit";

const QUIZ_HELP: &str =
    "swipe with r (got it), l (review) or u (important); s shows the answer, restart, q quits";

/// Split off the first whitespace-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn required<'a>(value: &'a str, what: &'static str) -> Result<&'a str, ShellError> {
    if value.is_empty() {
        Err(ShellError::MissingArgument(what))
    } else {
        Ok(value)
    }
}

fn non_empty(value: &str, what: &'static str) -> Result<String, ShellError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ShellError::EmptyField(what))
    } else {
        Ok(value.to_string())
    }
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Action>, ShellError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = split_word(line);
    let action = match command {
        "help" | "?" => Action::Help,
        "decks" => Action::ListDecks,
        "deck" => {
            let (sub, rest) = split_word(rest);
            match sub {
                "new" => {
                    let (name, description) = match rest.split_once('|') {
                        Some((name, description)) => {
                            let description = description.trim();
                            (name, (!description.is_empty()).then(|| description.to_string()))
                        }
                        None => (rest, None),
                    };
                    Action::CreateDeck {
                        name: non_empty(name, "deck name")?,
                        description,
                    }
                }
                "rm" => Action::RemoveDeck {
                    deck_id: required(rest, "deck id")?.to_string(),
                },
                "show" => Action::ShowDeck {
                    deck_id: required(rest, "deck id")?.to_string(),
                },
                "" => return Err(ShellError::MissingArgument("deck subcommand")),
                other => return Err(ShellError::UnknownCommand(format!("deck {}", other))),
            }
        }
        "card" => {
            let (sub, rest) = split_word(rest);
            let (deck_id, rest) = split_word(rest);
            match sub {
                "add" => {
                    let deck_id = required(deck_id, "deck id")?.to_string();
                    let (question, answer) = rest
                        .split_once('|')
                        .ok_or(ShellError::MissingArgument("`question | answer`"))?;
                    Action::AddCard {
                        deck_id,
                        question: non_empty(question, "question")?,
                        answer: non_empty(answer, "answer")?,
                    }
                }
                "rm" => Action::RemoveCard {
                    deck_id: required(deck_id, "deck id")?.to_string(),
                    card_id: required(rest, "card id")?.to_string(),
                },
                "" => return Err(ShellError::MissingArgument("card subcommand")),
                other => return Err(ShellError::UnknownCommand(format!("card {}", other))),
            }
        }
        "active" => Action::Active {
            deck_id: required(rest, "deck id")?.to_string(),
        },
        "completed" => Action::ShowLedger(Ledger::Completed),
        "important" => Action::ShowLedger(Ledger::Important),
        "review" => Action::ShowLedger(Ledger::Review),
        "quiz" => Action::Quiz {
            deck_id: required(rest, "deck id")?.to_string(),
        },
        "import" => Action::Import {
            path: required(rest, "file path")?.to_string(),
        },
        "export" => Action::Export {
            path: required(rest, "file path")?.to_string(),
        },
        "quit" | "exit" => Action::Quit,
        other => return Err(ShellError::UnknownCommand(other.to_string())),
    };

    Ok(Some(action))
}

/// Drives a [`DeckStore`] from lines of text.
pub struct Shell<'a, W: Write> {
    store: &'a mut DeckStore,
    config: &'a Config,
    out: W,
    quiz: Option<QuizSession>,
    prompt: bool,
}

impl<'a, W: Write> Shell<'a, W> {
    pub fn new(store: &'a mut DeckStore, config: &'a Config, out: W) -> Self {
        Self {
            store,
            config,
            out,
            quiz: None,
            prompt: false,
        }
    }

    /// Print a prompt before each line (interactive use).
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read lines until input ends or `quit`.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.show_prompt()?;
        for line in input.lines() {
            let line = line?;
            let keep_going = if self.quiz.is_some() {
                self.handle_quiz_line(&line)?;
                true
            } else {
                self.handle_line(&line)?
            };
            if !keep_going {
                break;
            }
            self.show_prompt()?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn show_prompt(&mut self) -> Result<()> {
        if self.prompt {
            let prompt = if self.quiz.is_some() { "swipe> " } else { "> " };
            write!(self.out, "{}", prompt)?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Returns false when the shell should stop.
    pub fn handle_line(&mut self, line: &str) -> Result<bool> {
        match parse_line(line) {
            Ok(Some(Action::Quit)) => return Ok(false),
            Ok(Some(action)) => self.execute(action)?,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(line, error = %e, "rejected input");
                writeln!(self.out, "error: {}", e)?;
            }
        }
        Ok(true)
    }

    fn execute(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Help => writeln!(self.out, "{}", HELP)?,
            Action::ListDecks => self.list_decks()?,
            Action::CreateDeck { name, description } => {
                let id = self.store.create_deck(&name, description.as_deref());
                writeln!(self.out, "created deck {} ({})", name, id)?;
            }
            Action::RemoveDeck { deck_id } => {
                if self.store.get_deck_by_id(&deck_id).is_none() {
                    writeln!(self.out, "no deck {}", deck_id)?;
                }
                self.store.remove_deck(&deck_id);
            }
            Action::ShowDeck { deck_id } => self.show_deck(&deck_id)?,
            Action::AddCard {
                deck_id,
                question,
                answer,
            } => {
                let before = self.store.get_cards_by_deck(&deck_id).len();
                self.store.add_card(&deck_id, &question, &answer);
                match self.store.get_cards_by_deck(&deck_id).get(before) {
                    Some(card) => writeln!(self.out, "added card {}", card.id)?,
                    None => writeln!(self.out, "no deck {}", deck_id)?,
                }
            }
            Action::RemoveCard { deck_id, card_id } => {
                let found = self
                    .store
                    .get_cards_by_deck(&deck_id)
                    .iter()
                    .any(|c| c.id == card_id);
                self.store.remove_card(&card_id, &deck_id);
                if found {
                    writeln!(self.out, "removed card {}", card_id)?;
                } else {
                    writeln!(self.out, "no card {} in deck {}", card_id, deck_id)?;
                }
            }
            Action::Active { deck_id } => {
                let cards: Vec<Card> = self
                    .store
                    .get_active_cards(&deck_id)
                    .into_iter()
                    .cloned()
                    .collect();
                if cards.is_empty() {
                    writeln!(self.out, "no active cards")?;
                }
                for card in &cards {
                    self.write_card_line(card)?;
                }
            }
            Action::ShowLedger(ledger) => self.show_ledger(ledger)?,
            Action::Quiz { deck_id } => self.start_quiz(&deck_id)?,
            Action::Import { path } => {
                match transfer::import_csv(self.store, std::path::Path::new(&path)) {
                    Ok((deck_id, count)) => {
                        writeln!(self.out, "imported {} cards into deck {}", count, deck_id)?
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "import failed");
                        writeln!(self.out, "import failed: {:#}", e)?
                    }
                }
            }
            Action::Export { path } => {
                match transfer::export_snapshot(self.store, std::path::Path::new(&path)) {
                    Ok(count) => writeln!(self.out, "exported {} decks to {}", count, path)?,
                    Err(e) => {
                        tracing::warn!(error = %e, "export failed");
                        writeln!(self.out, "export failed: {:#}", e)?
                    }
                }
            }
            Action::Quit => {}
        }
        Ok(())
    }

    // ── Views ─────────────────────────────────────────────────────────────

    fn list_decks(&mut self) -> Result<()> {
        if self.store.decks().is_empty() {
            writeln!(self.out, "no decks yet")?;
            return Ok(());
        }

        let width = self
            .store
            .decks()
            .iter()
            .map(|d| d.name.width())
            .max()
            .unwrap_or(0);

        for deck in self.store.decks() {
            let stats = self.store.deck_stats(&deck.id).unwrap_or_default();
            let pad = " ".repeat(width - deck.name.width());
            writeln!(
                self.out,
                "{}  {}{}  {} cards, {} active, {} important, {} review",
                deck.id,
                deck.name,
                pad,
                stats.total_cards,
                stats.active_cards,
                stats.important_cards,
                stats.review_cards
            )?;
        }
        Ok(())
    }

    fn show_deck(&mut self, deck_id: &str) -> Result<()> {
        let Some(deck) = self.store.get_deck_by_id(deck_id).cloned() else {
            writeln!(self.out, "no deck {}", deck_id)?;
            return Ok(());
        };

        writeln!(self.out, "{} ({} cards)", deck.name, deck.cards.len())?;
        if !deck.description.is_empty() {
            writeln!(self.out, "{}", deck.description)?;
        }
        for card in &deck.cards {
            self.write_card_line(card)?;
        }
        Ok(())
    }

    fn write_card_line(&mut self, card: &Card) -> Result<()> {
        writeln!(self.out, "  {}  {} | {}", card.id, card.question, card.answer)?;
        Ok(())
    }

    fn show_ledger(&mut self, ledger: Ledger) -> Result<()> {
        let entries = self.store.ledger(ledger).to_vec();
        writeln!(
            self.out,
            "{} {} card{}",
            entries.len(),
            ledger.name(),
            if entries.len() == 1 { "" } else { "s" }
        )?;
        for entry in &entries {
            let deck_name = self
                .store
                .get_deck_by_id(&entry.deck_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| "Unknown deck".to_string());
            writeln!(
                self.out,
                "  [{}] {} | {}",
                deck_name, entry.question, entry.answer
            )?;
        }
        Ok(())
    }

    // ── Quiz ──────────────────────────────────────────────────────────────

    fn start_quiz(&mut self, deck_id: &str) -> Result<()> {
        let Some(session) = QuizSession::start(self.store, deck_id) else {
            writeln!(self.out, "no deck {}", deck_id)?;
            return Ok(());
        };

        if session.is_complete() {
            writeln!(self.out, "no active cards, nothing to quiz")?;
            return Ok(());
        }

        writeln!(self.out, "{}", QUIZ_HELP)?;
        self.quiz = Some(session);
        self.show_current_card()
    }

    fn show_current_card(&mut self) -> Result<()> {
        let Some(session) = &self.quiz else {
            return Ok(());
        };
        let Some(card) = session.current() else {
            return Ok(());
        };

        let (position, total) = session.progress();
        let width = self.config.wrap_width.max(10);
        let mut text = format!("[{} of {}]\nQ: ", position, total);
        text.push_str(&textwrap::fill(&card.question, width));
        if self.config.reveal_answers {
            text.push_str("\nA: ");
            text.push_str(&textwrap::fill(&card.answer, width));
        }
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn handle_quiz_line(&mut self, line: &str) -> Result<()> {
        let Some(session) = self.quiz.as_mut() else {
            return Ok(());
        };
        let input = line.trim();

        match input {
            "q" | "quit" => {
                let (position, total) = session.progress();
                writeln!(self.out, "quiz stopped at {} of {}", position, total)?;
                self.quiz = None;
            }
            "s" | "show" | "" => {
                if let Some(card) = session.current() {
                    let answer = textwrap::fill(&card.answer, self.config.wrap_width.max(10));
                    writeln!(self.out, "A: {}", answer)?;
                }
            }
            "restart" => {
                session.restart(self.store);
                if session.is_complete() {
                    writeln!(self.out, "no active cards left")?;
                    self.quiz = None;
                } else {
                    self.show_current_card()?;
                }
            }
            _ => {
                let swipe = input.chars().next().filter(|_| input.chars().count() == 1);
                match swipe.and_then(Swipe::from_key) {
                    Some(swipe) => {
                        match session.record(self.store, swipe) {
                            Some(SwipeResult::Recorded) => {
                                writeln!(self.out, "-> {}", swipe.name())?
                            }
                            Some(SwipeResult::CardGone) => {
                                writeln!(self.out, "card no longer in deck, skipped")?
                            }
                            None => {}
                        }
                        if session.is_complete() {
                            let tally = session.tally().clone();
                            writeln!(
                                self.out,
                                "quiz completed: {} studied ({} completed, {} review, {} important)",
                                tally.studied(),
                                tally.completed,
                                tally.review,
                                tally.important
                            )?;
                            self.quiz = None;
                        } else {
                            self.show_current_card()?;
                        }
                    }
                    None => writeln!(self.out, "{}", QUIZ_HELP)?,
                }
            }
        }
        Ok(())
    }
}
