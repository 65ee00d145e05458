use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn data_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("studystack")
        } else {
            ProjectDirs::from("", "", "studystack")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
                .unwrap_or_default()
        }
    }

    fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("studystack")
        } else {
            Self::data_dir()
        }
    }

    pub fn deck_path() -> PathBuf {
        Self::data_dir().join("flashcards.json")
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join("studystack.log")
    }
}
