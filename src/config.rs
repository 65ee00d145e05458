use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::audio::AudioConfig;
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Deck file; `None` means the platform data dir
    pub deck_path: Option<PathBuf>,
    pub primary_track: Option<PathBuf>,
    pub fallback_track: Option<PathBuf>,
    pub player: Option<String>,
    pub start_muted: bool,
    /// Pause after revealing an answer before moving on
    pub reveal_delay_ms: u64,
    /// Pause after the last answer before showing the summary
    pub finish_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deck_path: None,
            primary_track: Some(PathBuf::from("bgm.wav")),
            fallback_track: None,
            player: None,
            start_muted: false,
            reveal_delay_ms: 3000,
            finish_delay_ms: 1500,
        }
    }
}

impl Config {
    pub fn audio(&self) -> AudioConfig {
        AudioConfig {
            primary_track: self.primary_track.clone(),
            fallback_track: self.fallback_track.clone(),
            player: self.player.clone(),
        }
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn finish_delay(&self) -> Duration {
        Duration::from_millis(self.finish_delay_ms)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "studystack") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("studystack_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => debug!(path = %self.path.display(), error = %e, "ignoring bad config"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data).map_err(io_err)
    }
}
