//! Error types shared across the crate.
//!
//! Nothing here is fatal to the process: deck errors are rejected user
//! actions, storage errors are surfaced as notices, audio errors just
//! silence the music.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected deck operations. None of these mutate the deck.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("please enter an answer before submitting")]
    EmptyAnswer,

    #[error("both question and answer are required")]
    EmptyField,

    #[error("this card has already been answered")]
    AlreadyAnswered,

    #[error("no flashcards available")]
    NoCurrentCard,

    #[error("no more unanswered cards ahead")]
    NoUnansweredAhead,

    #[error("no more unanswered cards behind")]
    NoUnansweredBehind,

    #[error("the deck is empty")]
    EmptyDeck,

    #[error("card {index} does not exist (deck has {len} cards)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Failures reading or writing the deck file
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} does not contain a list of cards")]
    NotAList { path: PathBuf },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Audio backend failures. Callers log these and carry on without sound.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio is not available")]
    Unavailable,

    #[error("player command is empty")]
    EmptyCommand,

    #[error("could not start player `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("player `{command}` exited with {status}")]
    PlayerFailed {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("audio i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not write config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode config: {0}")]
    Encode(#[from] serde_json::Error),
}
