//! Moving cards in and out of the store: CSV import and JSON snapshots.
//!
//! Neither direction makes the store durable. A snapshot is a one-way dump
//! for inspection; nothing reads it back.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::store::{DeckState, DeckStore};

/// Parse `front,back` lines. A first line mentioning "front" is a header.
/// Lines with an empty side are skipped.
pub fn parse_csv(content: &str) -> Vec<(String, String)> {
    let mut cards = Vec::new();

    for (i, line) in content.lines().enumerate() {
        // Skip header
        if i == 0 && line.to_lowercase().contains("front") {
            continue;
        }

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() >= 2 {
            let front = parts[0].trim();
            let back = parts[1].trim();

            if !front.is_empty() && !back.is_empty() {
                cards.push((front.to_string(), back.to_string()));
            }
        }
    }

    cards
}

/// Create a deck from a CSV file, named after the file.
/// Returns the new deck id and the number of cards added.
pub fn import_csv(store: &mut DeckStore, csv_path: &Path) -> Result<(String, usize)> {
    let content = fs::read_to_string(csv_path)
        .with_context(|| format!("Failed to read CSV file: {:?}", csv_path))?;
    let cards = parse_csv(&content);

    let deck_name = csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(filename_to_title_case)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Imported Deck".to_string());

    let deck_id = store.create_deck(&deck_name, None);
    for (front, back) in &cards {
        store.add_card(&deck_id, front, back);
    }

    tracing::info!(deck = %deck_name, cards = cards.len(), "imported csv");
    Ok((deck_id, cards.len()))
}

/// Convert a filename (snake_case or kebab-case) to Title Case.
pub fn filename_to_title_case(name: &str) -> String {
    name.split(|c| c == '_' || c == '-')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Snapshot format containing the whole store.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub version: u32,
    pub created_at: chrono::DateTime<chrono::Local>,
    #[serde(flatten)]
    pub state: &'a DeckState,
}

/// Write the whole store to `path` as pretty JSON. Returns the deck count.
pub fn export_snapshot(store: &DeckStore, path: &Path) -> Result<usize> {
    let snapshot = Snapshot {
        version: 1,
        created_at: chrono::Local::now(),
        state: store.state(),
    };

    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, json).with_context(|| format!("Failed to write snapshot: {:?}", path))?;

    Ok(snapshot.state.decks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_skips_header_and_blank_sides() {
        let cards = parse_csv("Front,Back\nhola, hello\n,empty\nadios,goodbye\nlonely\n");
        assert_eq!(
            cards,
            vec![
                ("hola".to_string(), "hello".to_string()),
                ("adios".to_string(), "goodbye".to_string()),
            ]
        );
    }

    #[test]
    fn title_case_from_file_stem() {
        assert_eq!(filename_to_title_case("spanish_verbs-basic"), "Spanish Verbs Basic");
        assert_eq!(filename_to_title_case("__"), "");
    }

    #[test]
    fn import_creates_named_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spanish_basics.csv");
        fs::write(&path, "front,back\nhola,hello\ngracias,thanks\n").unwrap();

        let mut store = DeckStore::new();
        let (deck_id, count) = import_csv(&mut store, &path).unwrap();

        assert_eq!(count, 2);
        let deck = store.get_deck_by_id(&deck_id).unwrap();
        assert_eq!(deck.name, "Spanish Basics");
        assert_eq!(deck.cards[1].question, "gracias");
    }

    #[test]
    fn import_missing_file_fails() {
        let mut store = DeckStore::new();
        assert!(import_csv(&mut store, Path::new("/nonexistent/x.csv")).is_err());
        assert!(store.decks().is_empty());
    }

    #[test]
    fn export_writes_all_ledgers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let mut store = DeckStore::new();
        let deck_id = store.create_deck("Spanish", None);
        store.add_card(&deck_id, "hola", "hello");
        let card_id = store.get_cards_by_deck(&deck_id)[0].id.clone();
        store.mark_important(&card_id, &deck_id);

        assert_eq!(export_snapshot(&store, &path).unwrap(), 1);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["decks"][0]["name"], "Spanish");
        assert_eq!(value["important_cards"][0]["question"], "hola");
        assert_eq!(value["completed_cards"].as_array().unwrap().len(), 0);
    }
}
