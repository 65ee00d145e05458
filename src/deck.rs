//! The quiz state machine: which card is showing, which cards are done, and
//! the running score.
//!
//! Every mutation goes through a method on [`Deck`]. Add and delete write the
//! question/answer text back through the [`CardStore`] straight away; session
//! flags and the score are never persisted.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::card::Card;
use crate::error::{DeckError, StorageError};
use crate::storage::CardStore;

/// Outcome of a write-through after add/delete.
///
/// A failed save leaves the in-memory deck as it is.
#[must_use]
#[derive(Debug)]
pub enum Persistence {
    Saved,
    Failed(StorageError),
}

impl Persistence {
    fn from_result(result: Result<(), StorageError>) -> Self {
        match result {
            Ok(()) => Persistence::Saved,
            Err(e) => {
                warn!(error = %e, "could not save deck");
                Persistence::Failed(e)
            }
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }
}

/// Result of a submitted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    /// The stored answer, for display
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckStatus {
    Empty,
    Playing(usize),
    Finished { score: usize, total: usize },
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckView {
    pub headline: String,
    /// `Some((index + 1, total))` while playing
    pub position: Option<(usize, usize)>,
    pub score: usize,
    pub can_next: bool,
    pub can_prev: bool,
    pub status: DeckStatus,
}

pub struct Deck {
    cards: Vec<Card>,
    card_index: usize,
    score: usize,
    store: Box<dyn CardStore>,
    rng: StdRng,
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deck")
            .field("cards", &self.cards)
            .field("card_index", &self.card_index)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

impl Deck {
    /// Load from the store and shuffle once
    pub fn load(store: Box<dyn CardStore>) -> Self {
        Self::load_with_rng(store, StdRng::from_entropy())
    }

    /// Like [`Deck::load`] but with a reproducible shuffle
    pub fn load_seeded(store: Box<dyn CardStore>, seed: u64) -> Self {
        Self::load_with_rng(store, StdRng::seed_from_u64(seed))
    }

    fn load_with_rng(store: Box<dyn CardStore>, mut rng: StdRng) -> Self {
        let mut cards = store.load();
        cards.shuffle(&mut rng);
        info!(cards = cards.len(), "deck ready");
        Self {
            cards,
            card_index: 0,
            score: 0,
            store,
            rng,
        }
    }

    /// Build a deck that keeps `cards` in the given order
    pub fn with_cards(cards: Vec<Card>, store: Box<dyn CardStore>) -> Self {
        Self {
            cards,
            card_index: 0,
            score: 0,
            store,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card_index(&self) -> usize {
        self.card_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.card_index)
    }

    pub fn correct_count(&self) -> usize {
        self.cards
            .iter()
            .filter(|c| c.answered_correctly == Some(true))
            .count()
    }

    /// True when the deck has cards and every one of them is answered
    pub fn is_finished(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.answered)
    }

    pub fn status(&self) -> DeckStatus {
        if self.cards.is_empty() {
            DeckStatus::Empty
        } else if self.is_finished() {
            DeckStatus::Finished {
                score: self.score,
                total: self.cards.len(),
            }
        } else {
            DeckStatus::Playing(self.card_index)
        }
    }

    pub fn restart(&mut self) {
        self.score = 0;
        self.card_index = 0;
        self.cards.iter_mut().for_each(Card::reset);
        self.cards.shuffle(&mut self.rng);
        info!(cards = self.cards.len(), "deck restarted");
    }

    pub fn submit_answer(&mut self, text: &str) -> Result<Verdict, DeckError> {
        if text.trim().is_empty() {
            return Err(DeckError::EmptyAnswer);
        }
        let card = self
            .cards
            .get_mut(self.card_index)
            .ok_or(DeckError::NoCurrentCard)?;
        if card.answered {
            return Err(DeckError::AlreadyAnswered);
        }

        let correct = card.accepts(text);
        card.answered = true;
        card.answered_correctly = Some(correct);
        if correct {
            self.score += 1;
        }
        debug!(index = self.card_index, correct, score = self.score, "answer submitted");

        Ok(Verdict {
            correct,
            answer: card.answer.clone(),
        })
    }

    fn unanswered_ahead(&self) -> Option<usize> {
        self.cards
            .iter()
            .enumerate()
            .skip(self.card_index + 1)
            .find(|(_, c)| !c.answered)
            .map(|(i, _)| i)
    }

    fn unanswered_behind(&self) -> Option<usize> {
        self.cards[..self.card_index.min(self.cards.len())]
            .iter()
            .rposition(|c| !c.answered)
    }

    pub fn has_unanswered_ahead(&self) -> bool {
        self.unanswered_ahead().is_some()
    }

    pub fn has_unanswered_behind(&self) -> bool {
        self.unanswered_behind().is_some()
    }

    /// Move to the nearest unanswered card after the current one
    pub fn next_card(&mut self) -> Result<usize, DeckError> {
        let idx = self.unanswered_ahead().ok_or(DeckError::NoUnansweredAhead)?;
        self.card_index = idx;
        Ok(idx)
    }

    /// Move to the nearest unanswered card before the current one
    pub fn prev_card(&mut self) -> Result<usize, DeckError> {
        let idx = self
            .unanswered_behind()
            .ok_or(DeckError::NoUnansweredBehind)?;
        self.card_index = idx;
        Ok(idx)
    }

    pub fn add_card(&mut self, question: &str, answer: &str) -> Result<Persistence, DeckError> {
        let (question, answer) = (question.trim(), answer.trim());
        if question.is_empty() || answer.is_empty() {
            return Err(DeckError::EmptyField);
        }

        self.cards.push(Card::new(question, answer));
        self.card_index = self.cards.len() - 1;
        info!(cards = self.cards.len(), "card added");

        Ok(Persistence::from_result(self.store.save(&self.cards)))
    }

    pub fn delete_card(&mut self, index: usize) -> Result<(Card, Persistence), DeckError> {
        if self.cards.is_empty() {
            return Err(DeckError::EmptyDeck);
        }
        if index >= self.cards.len() {
            return Err(DeckError::IndexOutOfRange {
                index,
                len: self.cards.len(),
            });
        }

        let removed = self.cards.remove(index);
        if removed.answered_correctly == Some(true) {
            // score only counts correct cards still in the deck
            self.score = self.score.saturating_sub(1);
        }
        self.card_index = self.card_index.min(self.cards.len().saturating_sub(1));
        info!(cards = self.cards.len(), "card deleted");

        let saved = Persistence::from_result(self.store.save(&self.cards));
        Ok((removed, saved))
    }

    pub fn delete_current_card(&mut self) -> Result<(Card, Persistence), DeckError> {
        self.delete_card(self.card_index)
    }

    pub fn view(&self) -> DeckView {
        let status = self.status();
        let headline = match status {
            DeckStatus::Empty => "No flashcards available.".to_string(),
            DeckStatus::Finished { score, total } => {
                format!("Finished! You answered {} correct out of {}.", score, total)
            }
            DeckStatus::Playing(idx) => self.cards[idx].question.clone(),
        };
        let position = match status {
            DeckStatus::Playing(idx) => Some((idx + 1, self.cards.len())),
            _ => None,
        };

        DeckView {
            headline,
            position,
            score: self.score,
            can_next: self.has_unanswered_ahead(),
            can_prev: self.has_unanswered_behind(),
            status,
        }
    }
}
