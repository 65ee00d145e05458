// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod audio;
pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod reveal;
pub mod runtime;
pub mod storage;
