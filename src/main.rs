pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use studystack::{
    app::{App, Timing, TICK_RATE_MS},
    app_dirs::AppDirs,
    audio::{AudioBackend, Music, PlayerBackend, SilentBackend},
    config::{Config, ConfigStore, FileConfigStore},
    deck::Deck,
    runtime::{ChannelEventSource, QuizEvent, Runner},
    storage::JsonFileStore,
};

use crate::ui::AppWidget;

/// flashcard quiz in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A flashcard quiz TUI: type the answer to each card, keep score, and add or delete cards as you study. Cards are saved as a JSON list of [question, answer] pairs."
)]
pub struct Cli {
    /// deck file to load and save (default: platform data dir)
    #[clap(short = 'd', long)]
    deck: Option<PathBuf>,

    /// background track to loop while studying
    #[clap(short = 'm', long)]
    music: Option<PathBuf>,

    /// track to use when the main one is missing
    #[clap(long)]
    fallback_music: Option<PathBuf>,

    /// command used to play the track, e.g. "aplay -q" or "afplay"
    #[clap(long)]
    player: Option<String>,

    /// start with the background track muted
    #[clap(long)]
    mute: bool,

    /// seed the card shuffle for a reproducible order
    #[clap(long)]
    seed: Option<u64>,

    /// remember the deck, music, player and mute options for later runs
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Layer command line flags over the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(deck) = &self.deck {
            config.deck_path = Some(deck.clone());
        }
        if let Some(music) = &self.music {
            config.primary_track = Some(music.clone());
        }
        if let Some(fallback) = &self.fallback_music {
            config.fallback_track = Some(fallback.clone());
        }
        if let Some(player) = &self.player {
            config.player = Some(player.clone());
        }
        if self.mute {
            config.start_muted = true;
        }
        config
    }
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_env("STUDYSTACK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;
    Ok(())
}

fn build_music(config: &Config) -> Music {
    let backend: Box<dyn AudioBackend> = match config.player.as_deref() {
        Some(command) => match PlayerBackend::new(command) {
            Ok(player) => Box::new(player),
            Err(e) => {
                warn!(error = %e, "falling back to silence");
                Box::new(SilentBackend)
            }
        },
        None => Box::new(SilentBackend),
    };

    let mut music = Music::new(backend, &config.audio());
    if !config.start_muted {
        let status = music.start();
        info!(%status, "background music");
    }
    music
}

fn build_app(config: &Config, seed: Option<u64>) -> App {
    let store = JsonFileStore::with_path(config.deck_path.clone().unwrap_or_else(AppDirs::deck_path));
    info!(path = %store.path().display(), "deck file");
    let store = Box::new(store);
    let deck = match seed {
        Some(seed) => Deck::load_seeded(store, seed),
        None => Deck::load(store),
    };

    App::new(deck, build_music(config), Timing::from(config))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // the TUI owns the terminal, so a log file is the only place for diagnostics
    let log_path = AppDirs::log_path();
    if let Err(e) = init_logging(&log_path) {
        eprintln!("logging disabled ({}): {}", log_path.display(), e);
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save {
        match config_store.save(&config) {
            Ok(()) => info!(path = %config_store.path().display(), "saved config"),
            Err(e) => eprintln!("could not save config: {}", e),
        }
    }

    let mut app = build_app(&config, cli.seed);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.music.stop();
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        ChannelEventSource::crossterm(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| ui(app, f))?;

    while !app.should_quit {
        match runner.step() {
            QuizEvent::Tick(dt) => {
                let animating = app.is_revealing();
                app.on_tick(dt);

                // only redraw while a reveal is running or just ended
                if animating || app.is_revealing() {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            QuizEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            QuizEvent::Key(key) => {
                app.on_key(key);
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(AppWidget(app), f.area());
}
