// Deck operations persisted through a real deck file.
use std::fs;

use assert_matches::assert_matches;
use tempfile::tempdir;

use studystack::{
    deck::{Deck, Persistence},
    error::DeckError,
    storage::{CardStore, JsonFileStore},
};

#[test]
fn added_card_survives_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flashcards.json");
    fs::write(&path, r#"[["2+2?", "4"]]"#).unwrap();

    let mut deck = Deck::load_seeded(Box::new(JsonFileStore::with_path(&path)), 1);
    let saved = deck.add_card("  Largest planet?  ", " Jupiter ").unwrap();
    assert!(saved.is_saved());

    let reloaded = JsonFileStore::with_path(&path).load();
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded
        .iter()
        .any(|c| c.question == "Largest planet?" && c.answer == "Jupiter"));
}

#[test]
fn deleted_card_is_gone_after_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flashcards.json");
    fs::write(&path, r#"[["2+2?", "4"], ["H2O?", "Water"]]"#).unwrap();

    let mut deck = Deck::load_seeded(Box::new(JsonFileStore::with_path(&path)), 5);
    let (removed, saved) = deck.delete_current_card().unwrap();
    assert!(saved.is_saved());

    let reloaded = JsonFileStore::with_path(&path).load();
    assert_eq!(reloaded.len(), 1);
    assert_ne!(reloaded[0].question, removed.question);
}

#[test]
fn deck_file_in_new_directory_is_created_on_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deck.json");

    let mut deck = Deck::load(Box::new(JsonFileStore::with_path(&path)));
    // missing file falls back to the built-in cards
    assert_eq!(deck.len(), 6);

    let saved = deck.add_card("Q", "A").unwrap();
    assert!(saved.is_saved());
    assert!(path.exists());
    assert_eq!(JsonFileStore::with_path(&path).load().len(), 7);
}

#[test]
fn save_failure_keeps_the_card_in_memory() {
    let dir = tempdir().unwrap();
    // a directory where the file should be makes the write fail
    let path = dir.path().join("deck.json");
    fs::create_dir(&path).unwrap();

    let mut deck = Deck::load(Box::new(JsonFileStore::with_path(&path)));
    let before = deck.len();

    let saved = deck.add_card("Q", "A").unwrap();

    assert_matches!(saved, Persistence::Failed(_));
    assert_eq!(deck.len(), before + 1);
}

#[test]
fn mixed_record_shapes_load_and_save_as_pairs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flashcards.json");
    fs::write(
        &path,
        r#"[["2+2?", "4"], {"question": "H2O?", "answer": "Water"}, {"q": "Red planet?", "a": "Mars"}, ["broken"]]"#,
    )
    .unwrap();

    let mut deck = Deck::load_seeded(Box::new(JsonFileStore::with_path(&path)), 3);
    assert_eq!(deck.len(), 3);

    assert!(deck.add_card("Q", "A").unwrap().is_saved());

    let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let entries = raw.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e.as_array().map(Vec::len) == Some(2)));
}

#[test]
fn empty_fields_never_touch_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flashcards.json");
    fs::write(&path, r#"[["2+2?", "4"]]"#).unwrap();
    let before = fs::read(&path).unwrap();

    let mut deck = Deck::load(Box::new(JsonFileStore::with_path(&path)));
    assert_eq!(deck.add_card("   ", "A").unwrap_err(), DeckError::EmptyField);

    assert_eq!(fs::read(&path).unwrap(), before);
}
