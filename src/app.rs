//! Screen state and input handling.
//!
//! Key events are turned into [`Intent`]s; each intent runs at most one deck
//! operation. Destructive intents go through a confirmation dialog first.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::audio::{AudioStatus, Cue, Music};
use crate::config::Config;
use crate::deck::{Deck, Persistence};
use crate::error::DeckError;
use crate::reveal::Reveal;

pub const TICK_RATE_MS: u64 = 100;

pub const INSTRUCTIONS: &str = "HOW TO USE STUDYSTACK:\n\n\
1. Choose Start Game to begin the flashcard quiz.\n\
2. A question appears on the card.\n\
3. Type your answer and press Enter.\n\
4. The card flips and shows if you are correct.\n\
5. Move between unanswered cards with Tab and Shift-Tab (or the arrow keys).\n\
6. Add new flashcards with Ctrl-N.\n\
7. Delete the current flashcard with Ctrl-D.\n\
8. Restart with Ctrl-R, toggle sound with Ctrl-S, Esc returns to the menu.";

pub const ABOUT: &str = "STUDYSTACK FLASHCARDS\n\n\
Created for learning and review.\n\n\
Add, view and delete your own questions, then test yourself by typing the \
answers. Answers are checked ignoring case and spaces. Your cards are saved \
as you edit them; scores last for the current session.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum MenuItem {
    #[strum(to_string = "Start Game")]
    Start,
    Instructions,
    About,
    Exit,
}

pub const MENU_ITEMS: [MenuItem; 4] = [
    MenuItem::Start,
    MenuItem::Instructions,
    MenuItem::About,
    MenuItem::Exit,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Quiz,
    AddCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Question,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardForm {
    pub question: String,
    pub answer: String,
    pub focus: Field,
}

impl Default for CardForm {
    fn default() -> Self {
        Self {
            question: String::new(),
            answer: String::new(),
            focus: Field::Question,
        }
    }
}

impl CardForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Question => &mut self.question,
            Field::Answer => &mut self.answer,
        }
    }

    fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Field::Question => Field::Answer,
            Field::Answer => Field::Question,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Restart,
    DeleteCard,
    BackToMenu,
}

impl ConfirmAction {
    fn intent(self) -> Intent {
        match self {
            ConfirmAction::Restart => Intent::Restart,
            ConfirmAction::DeleteCard => Intent::DeleteCard,
            ConfirmAction::BackToMenu => Intent::GoToMenu,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Info {
        title: String,
        body: String,
    },
    Confirm {
        title: String,
        body: String,
        action: ConfirmAction,
    },
}

impl Dialog {
    fn info(title: &str, body: impl Into<String>) -> Self {
        Dialog::Info {
            title: title.to_string(),
            body: body.into(),
        }
    }
}

/// Everything the user can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    ShowInstructions,
    ShowAbout,
    GoToMenu,
    Restart,
    Submit(String),
    Next,
    Prev,
    AddCard { question: String, answer: String },
    DeleteCard,
    ToggleMute,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub reveal_delay: Duration,
    pub finish_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Timing {
    fn from(cfg: &Config) -> Self {
        Self {
            reveal_delay: cfg.reveal_delay(),
            finish_delay: cfg.finish_delay(),
        }
    }
}

pub struct App {
    pub deck: Deck,
    pub music: Music,
    pub screen: Screen,
    pub menu_selected: usize,
    pub answer_input: String,
    pub form: CardForm,
    pub dialog: Option<Dialog>,
    pub reveal: Option<Reveal>,
    pub status: Option<String>,
    pub should_quit: bool,
    timing: Timing,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("deck", &self.deck)
            .field("screen", &self.screen)
            .field("dialog", &self.dialog)
            .field("reveal", &self.reveal)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn new(deck: Deck, music: Music, timing: Timing) -> Self {
        Self {
            deck,
            music,
            screen: Screen::Menu,
            menu_selected: 0,
            answer_input: String::new(),
            form: CardForm::default(),
            dialog: None,
            reveal: None,
            status: None,
            should_quit: false,
            timing,
        }
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    pub fn sound_status(&self) -> AudioStatus {
        self.music.status()
    }

    pub fn dispatch(&mut self, intent: Intent) {
        debug!(?intent, "dispatch");
        match intent {
            Intent::Start => {
                self.screen = Screen::Quiz;
                self.clear_card_state();
                self.skip_answered();
            }
            Intent::ShowInstructions => self.dialog = Some(Dialog::info("Instructions", INSTRUCTIONS)),
            Intent::ShowAbout => self.dialog = Some(Dialog::info("About", ABOUT)),
            Intent::GoToMenu => {
                self.screen = Screen::Menu;
                self.reveal = None;
                self.clear_card_state();
                self.skip_answered();
            }
            Intent::Restart => {
                self.deck.restart();
                self.reveal = None;
                self.clear_card_state();
            }
            Intent::Submit(text) => self.submit(&text),
            Intent::Next => self.navigate(Deck::next_card),
            Intent::Prev => self.navigate(Deck::prev_card),
            Intent::AddCard { question, answer } => self.add_card(&question, &answer),
            Intent::DeleteCard => self.delete_card(),
            Intent::ToggleMute => {
                let status = self.music.toggle_mute();
                if status == AudioStatus::Unavailable {
                    self.status = Some("No sound available.".into());
                }
            }
            Intent::Quit => {
                info!("quitting");
                self.should_quit = true;
            }
        }
    }

    fn clear_card_state(&mut self) {
        self.answer_input.clear();
        self.status = None;
    }

    fn submit(&mut self, text: &str) {
        if self.is_revealing() {
            return;
        }
        match self.deck.submit_answer(text) {
            Ok(verdict) => {
                self.music.cue(if verdict.correct {
                    Cue::Correct
                } else {
                    Cue::Incorrect
                });
                let delay = if self.deck.is_finished() {
                    self.timing.finish_delay
                } else {
                    self.timing.reveal_delay
                };
                self.reveal = Some(Reveal::new(verdict, delay));
                self.status = None;
            }
            Err(DeckError::EmptyAnswer) => {
                self.dialog = Some(Dialog::info("Error", "Please enter an answer before submitting."))
            }
            Err(e) => self.status = Some(format!("{}.", capitalize(&e.to_string()))),
        }
    }

    fn navigate(&mut self, step: fn(&mut Deck) -> Result<usize, DeckError>) {
        match step(&mut self.deck) {
            Ok(_) => {
                self.reveal = None;
                self.clear_card_state();
            }
            Err(e) => self.status = Some(format!("{}.", capitalize(&e.to_string()))),
        }
    }

    fn add_card(&mut self, question: &str, answer: &str) {
        match self.deck.add_card(question, answer) {
            Ok(saved) => {
                self.screen = Screen::Quiz;
                self.form = CardForm::default();
                self.reveal = None;
                self.clear_card_state();
                self.dialog = Some(match saved {
                    Persistence::Saved => Dialog::info("Saved", "Flashcard added!"),
                    Persistence::Failed(e) => Dialog::info("Error", format!("Could not save:\n{}", e)),
                });
            }
            Err(e) => self.status = Some(format!("{}.", capitalize(&e.to_string()))),
        }
    }

    fn delete_card(&mut self) {
        match self.deck.delete_current_card() {
            Ok((_, saved)) => {
                self.reveal = None;
                self.clear_card_state();
                self.skip_answered();
                if let Persistence::Failed(e) = saved {
                    self.dialog = Some(Dialog::info("Error", format!("Could not save:\n{}", e)));
                }
            }
            Err(e) => self.status = Some(format!("{}.", capitalize(&e.to_string()))),
        }
    }

    /// Move off an answered card to the nearest unanswered one, ahead first.
    /// A finished deck stays put so the summary shows.
    fn skip_answered(&mut self) {
        let on_answered = self.deck.current_card().is_some_and(|c| c.answered);
        if on_answered && !self.deck.is_finished() && self.deck.next_card().is_err() {
            let _ = self.deck.prev_card();
        }
    }

    /// Advance timers. Moves on once a pending reveal expires.
    pub fn on_tick(&mut self, dt: Duration) {
        self.music.poll();

        let fired = self.reveal.as_mut().is_some_and(|r| r.on_tick(dt));
        if !fired {
            return;
        }
        self.reveal = None;
        self.answer_input.clear();
        self.skip_answered();
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.dispatch(Intent::Quit);
            return;
        }

        if let Some(dialog) = self.dialog.take() {
            self.on_dialog_key(dialog, key);
            return;
        }

        match self.screen {
            Screen::Menu => self.on_menu_key(key),
            Screen::Quiz => self.on_quiz_key(key),
            Screen::AddCard => self.on_form_key(key),
        }
    }

    fn on_dialog_key(&mut self, dialog: Dialog, key: KeyEvent) {
        // any key dismisses an info dialog
        let action = match &dialog {
            Dialog::Info { .. } => return,
            Dialog::Confirm { action, .. } => *action,
        };
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.dispatch(action.intent())
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {}
            _ => self.dialog = Some(dialog),
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.menu_selected = self.menu_selected.saturating_sub(1),
            KeyCode::Down => self.menu_selected = (self.menu_selected + 1).min(MENU_ITEMS.len() - 1),
            KeyCode::Enter => {
                let intent = match MENU_ITEMS[self.menu_selected] {
                    MenuItem::Start => Intent::Start,
                    MenuItem::Instructions => Intent::ShowInstructions,
                    MenuItem::About => Intent::ShowAbout,
                    MenuItem::Exit => Intent::Quit,
                };
                self.dispatch(intent);
            }
            KeyCode::Char('q') | KeyCode::Esc => self.dispatch(Intent::Quit),
            _ => {}
        }
    }

    fn on_quiz_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => {
                    self.form = CardForm::default();
                    self.status = None;
                    self.screen = Screen::AddCard;
                }
                KeyCode::Char('d') => self.request_delete(),
                KeyCode::Char('r') => {
                    self.dialog = Some(Dialog::Confirm {
                        title: "Restart".into(),
                        body: "Restart the game and reset score?".into(),
                        action: ConfirmAction::Restart,
                    })
                }
                KeyCode::Char('s') => self.dispatch(Intent::ToggleMute),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.dialog = Some(Dialog::Confirm {
                    title: "Exit".into(),
                    body: "Are you sure you want to go back to the main menu?".into(),
                    action: ConfirmAction::BackToMenu,
                })
            }
            KeyCode::Enter => {
                let text = self.answer_input.clone();
                self.dispatch(Intent::Submit(text));
            }
            KeyCode::Tab | KeyCode::Right => self.dispatch(Intent::Next),
            KeyCode::BackTab | KeyCode::Left => self.dispatch(Intent::Prev),
            KeyCode::Backspace => {
                if !self.is_revealing() {
                    self.answer_input.pop();
                }
            }
            KeyCode::Char(c) => {
                if !self.is_revealing() {
                    self.answer_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn request_delete(&mut self) {
        let Some(card) = self.deck.current_card() else {
            self.status = Some("No flashcards available.".into());
            return;
        };
        self.dialog = Some(Dialog::Confirm {
            title: "Delete".into(),
            body: format!("Delete this card?\n\n{}\n{}", card.question, card.answer),
            action: ConfirmAction::DeleteCard,
        });
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        // control chords are not text
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }
        match key.code {
            KeyCode::Esc => {
                self.form = CardForm::default();
                self.status = None;
                self.screen = Screen::Quiz;
            }
            KeyCode::Tab | KeyCode::BackTab => self.form.switch_focus(),
            KeyCode::Enter => match self.form.focus {
                Field::Question => self.form.focus = Field::Answer,
                Field::Answer => {
                    let intent = Intent::AddCard {
                        question: self.form.question.clone(),
                        answer: self.form.answer.clone(),
                    };
                    self.dispatch(intent);
                }
            },
            KeyCode::Backspace => {
                self.form.focused_mut().pop();
            }
            KeyCode::Char(c) => self.form.focused_mut().push(c),
            _ => {}
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
