use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use studystack::{
    app::{App, Screen, Timing},
    audio::Music,
    card::Card,
    deck::{Deck, DeckStatus},
    runtime::{ChannelEventSource, QuizEvent, Runner},
    storage::MemoryStore,
};

fn quick_timing() -> Timing {
    Timing {
        reveal_delay: Duration::from_millis(10),
        finish_delay: Duration::from_millis(10),
    }
}

fn app_with(pairs: &[(&str, &str)]) -> App {
    let cards = pairs.iter().map(|(q, a)| Card::new(*q, *a)).collect();
    let deck = Deck::with_cards(cards, Box::new(MemoryStore::from_pairs(pairs)));
    App::new(deck, Music::silent(), quick_timing())
}

fn key(code: KeyCode) -> QuizEvent {
    QuizEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_answer(tx: &mpsc::Sender<QuizEvent>, text: &str) {
    for c in text.chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();
}

/// Drive the app until it has no pending reveal and the channel is drained
fn run(app: &mut App, runner: &mut Runner<ChannelEventSource>, max_steps: u32) {
    for _ in 0..max_steps {
        match runner.step() {
            QuizEvent::Tick(dt) => app.on_tick(dt),
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => app.on_key(key),
        }
        if app.should_quit {
            break;
        }
    }
}

// Headless integration using the internal runtime without a TTY.
// Answers every card through Runner/ChannelEventSource and checks the final score.
#[test]
fn headless_quiz_flow_finishes() {
    let mut app = app_with(&[("2+2?", "4"), ("H2O?", "Water")]);

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(100));

    tx.send(key(KeyCode::Enter)).unwrap(); // Start Game
    run(&mut app, &mut runner, 1);
    assert_eq!(app.screen, Screen::Quiz);

    type_answer(&tx, "4");
    // typed keys plus enough ticks for the flip and the delay
    run(&mut app, &mut runner, 2 + 6);
    assert_eq!(app.deck.card_index(), 1);
    assert!(app.reveal.is_none());

    type_answer(&tx, "  wa ter ");
    run(&mut app, &mut runner, 10 + 6);

    assert!(app.deck.is_finished());
    assert_eq!(
        app.deck.status(),
        DeckStatus::Finished { score: 2, total: 2 }
    );
}

#[test]
fn headless_wrong_answer_counts_as_answered() {
    let mut app = app_with(&[("Capital of France?", "Paris")]);

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(100));

    tx.send(key(KeyCode::Enter)).unwrap();
    type_answer(&tx, "Rome");
    run(&mut app, &mut runner, 1 + 5 + 6);

    assert!(app.deck.is_finished());
    assert_eq!(app.deck.score(), 0);
    assert_eq!(app.deck.cards()[0].answered_correctly, Some(false));
}

#[test]
fn headless_restart_and_quit() {
    let mut app = app_with(&[("2+2?", "4")]);

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(100));

    tx.send(key(KeyCode::Enter)).unwrap();
    type_answer(&tx, "4");
    run(&mut app, &mut runner, 3 + 6);
    assert_eq!(app.deck.score(), 1);

    // ctrl-r asks first, y confirms
    tx.send(QuizEvent::Key(KeyEvent::new(
        KeyCode::Char('r'),
        KeyModifiers::CONTROL,
    )))
    .unwrap();
    tx.send(key(KeyCode::Char('y'))).unwrap();
    run(&mut app, &mut runner, 2);
    assert_eq!(app.deck.score(), 0);
    assert!(!app.deck.is_finished());

    tx.send(QuizEvent::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )))
    .unwrap();
    run(&mut app, &mut runner, 5);
    assert!(app.should_quit);
}

#[test]
fn headless_resize_is_ignored_by_state() {
    let mut app = app_with(&[("2+2?", "4")]);

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    tx.send(QuizEvent::Resize).unwrap();
    run(&mut app, &mut runner, 2);

    assert_eq!(app.screen, Screen::Menu);
    assert_eq!(app.deck.len(), 1);
}
