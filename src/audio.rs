//! Background music and answer cues.
//!
//! Sound is optional. Every call on [`Music`] reports an [`AudioStatus`] and
//! never fails the caller; when no backend is available the calls are no-ops
//! that return [`AudioStatus::Unavailable`].

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Cue {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AudioStatus {
    Unavailable,
    Playing,
    Muted,
    Stopped,
}

/// Where the background track may come from, resolved once at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioConfig {
    pub primary_track: Option<PathBuf>,
    pub fallback_track: Option<PathBuf>,
    /// External player command, e.g. `aplay -q` or `afplay`
    pub player: Option<String>,
}

impl AudioConfig {
    /// First configured track that exists on disk
    pub fn resolve_track(&self) -> Option<PathBuf> {
        [&self.primary_track, &self.fallback_track]
            .into_iter()
            .flatten()
            .find(|p| p.exists())
            .cloned()
    }
}

pub trait AudioBackend {
    fn is_available(&self) -> bool;
    fn start_loop(&mut self, track: &Path) -> Result<(), AudioError>;
    fn stop_loop(&mut self) -> Result<(), AudioError>;
    /// Restart the loop if the track ran out. Called on every tick.
    fn poll(&mut self) -> Result<(), AudioError>;
    fn cue(&mut self, cue: Cue) -> Result<(), AudioError>;
}

/// Backend for systems without sound
#[derive(Debug, Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn is_available(&self) -> bool {
        false
    }

    fn start_loop(&mut self, _track: &Path) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }

    fn stop_loop(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }

    fn poll(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn cue(&mut self, _cue: Cue) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }
}

/// Plays the track through an external player process and rings the
/// terminal bell for cues
pub struct PlayerBackend<W: Write> {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    track: Option<PathBuf>,
    bell: W,
}

impl PlayerBackend<std::io::Stdout> {
    pub fn new(command: &str) -> Result<Self, AudioError> {
        Self::with_bell(command, std::io::stdout())
    }
}

impl<W: Write> PlayerBackend<W> {
    pub fn with_bell(command: &str, bell: W) -> Result<Self, AudioError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(AudioError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
            child: None,
            track: None,
            bell,
        })
    }

    fn spawn(&mut self, track: &Path) -> Result<(), AudioError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(track)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AudioError::Spawn {
                command: self.program.clone(),
                source,
            })?;
        debug!(pid = child.id(), track = %track.display(), "player started");
        self.child = Some(child);
        Ok(())
    }

    fn kill(&mut self) -> Result<(), AudioError> {
        if let Some(mut child) = self.child.take() {
            // an already exited child is fine
            let _ = child.kill();
            child.wait()?;
        }
        Ok(())
    }
}

impl<W: Write> AudioBackend for PlayerBackend<W> {
    fn is_available(&self) -> bool {
        true
    }

    fn start_loop(&mut self, track: &Path) -> Result<(), AudioError> {
        self.kill()?;
        self.track = Some(track.to_path_buf());
        self.spawn(track)
    }

    fn stop_loop(&mut self) -> Result<(), AudioError> {
        self.track = None;
        self.kill()
    }

    fn poll(&mut self) -> Result<(), AudioError> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };
        let Some(status) = child.try_wait()? else {
            return Ok(());
        };
        self.child = None;
        if !status.success() {
            // a player that cannot handle the track would fail again on every tick
            self.track = None;
            return Err(AudioError::PlayerFailed {
                command: self.program.clone(),
                status,
            });
        }
        if let Some(track) = self.track.clone() {
            self.spawn(&track)?;
        }
        Ok(())
    }

    fn cue(&mut self, cue: Cue) -> Result<(), AudioError> {
        // one bell for correct, two for incorrect
        let bells = match cue {
            Cue::Correct => "\x07",
            Cue::Incorrect => "\x07\x07",
        };
        self.bell.write_all(bells.as_bytes())?;
        self.bell.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for PlayerBackend<W> {
    fn drop(&mut self) {
        let _ = self.kill();
    }
}

/// Owns the looping background track and the mute flag
pub struct Music {
    backend: Box<dyn AudioBackend>,
    track: Option<PathBuf>,
    running: bool,
    muted: bool,
}

impl Music {
    pub fn new(backend: Box<dyn AudioBackend>, config: &AudioConfig) -> Self {
        Self {
            backend,
            track: config.resolve_track(),
            running: false,
            muted: false,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentBackend), &AudioConfig::default())
    }

    /// Whether there is anything to play at all
    pub fn is_available(&self) -> bool {
        self.backend.is_available() && self.track.is_some()
    }

    pub fn status(&self) -> AudioStatus {
        if !self.is_available() {
            AudioStatus::Unavailable
        } else if self.muted {
            AudioStatus::Muted
        } else if self.running {
            AudioStatus::Playing
        } else {
            AudioStatus::Stopped
        }
    }

    fn play(&mut self) -> AudioStatus {
        let Some(track) = self.track.clone() else {
            return AudioStatus::Unavailable;
        };
        match self.backend.start_loop(&track) {
            Ok(()) => {
                self.running = true;
                self.muted = false;
            }
            Err(e) => {
                warn!(error = %e, "could not start background track");
                self.running = false;
            }
        }
        self.status()
    }

    pub fn start(&mut self) -> AudioStatus {
        if !self.is_available() {
            return AudioStatus::Unavailable;
        }
        self.play()
    }

    pub fn stop(&mut self) -> AudioStatus {
        if !self.is_available() {
            return AudioStatus::Unavailable;
        }
        if let Err(e) = self.backend.stop_loop() {
            warn!(error = %e, "could not stop background track");
        }
        self.running = false;
        self.status()
    }

    pub fn toggle_mute(&mut self) -> AudioStatus {
        if !self.is_available() {
            return AudioStatus::Unavailable;
        }
        if !self.running || self.muted {
            return self.play();
        }
        match self.backend.stop_loop() {
            Ok(()) => {
                self.muted = true;
                self.running = false;
            }
            Err(e) => warn!(error = %e, "could not mute background track"),
        }
        self.status()
    }

    /// Keep the loop going; call once per tick
    pub fn poll(&mut self) {
        if self.running && !self.muted {
            if let Err(e) = self.backend.poll() {
                warn!(error = %e, "background track stopped");
                self.running = false;
            }
        }
    }

    pub fn cue(&mut self, cue: Cue) -> AudioStatus {
        if !self.backend.is_available() {
            return AudioStatus::Unavailable;
        }
        if let Err(e) = self.backend.cue(cue) {
            debug!(error = %e, %cue, "cue failed");
        }
        self.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[derive(Debug, Default)]
    struct Calls {
        started: usize,
        stopped: usize,
        cues: Vec<Cue>,
    }

    struct RecordingBackend(Rc<RefCell<Calls>>);

    impl AudioBackend for RecordingBackend {
        fn is_available(&self) -> bool {
            true
        }
        fn start_loop(&mut self, _track: &Path) -> Result<(), AudioError> {
            self.0.borrow_mut().started += 1;
            Ok(())
        }
        fn stop_loop(&mut self) -> Result<(), AudioError> {
            self.0.borrow_mut().stopped += 1;
            Ok(())
        }
        fn poll(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
        fn cue(&mut self, cue: Cue) -> Result<(), AudioError> {
            self.0.borrow_mut().cues.push(cue);
            Ok(())
        }
    }

    fn music_with_track() -> (Music, Rc<RefCell<Calls>>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let track = dir.path().join("bgm.wav");
        std::fs::write(&track, b"RIFF").unwrap();
        let calls = Rc::new(RefCell::new(Calls::default()));
        let config = AudioConfig {
            primary_track: Some(track),
            ..AudioConfig::default()
        };
        let music = Music::new(Box::new(RecordingBackend(Rc::clone(&calls))), &config);
        (music, calls, dir)
    }

    #[test]
    fn test_resolve_track_prefers_existing_primary() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("bgm.wav");
        let fallback = dir.path().join("other.wav");
        std::fs::write(&fallback, b"RIFF").unwrap();

        let config = AudioConfig {
            primary_track: Some(primary.clone()),
            fallback_track: Some(fallback.clone()),
            player: None,
        };
        assert_eq!(config.resolve_track(), Some(fallback.clone()));

        std::fs::write(&primary, b"RIFF").unwrap();
        assert_eq!(config.resolve_track(), Some(primary));
        assert_eq!(AudioConfig::default().resolve_track(), None);
    }

    #[test]
    fn test_silent_music_is_unavailable() {
        let mut music = Music::silent();

        assert_eq!(music.start(), AudioStatus::Unavailable);
        assert_eq!(music.toggle_mute(), AudioStatus::Unavailable);
        assert_eq!(music.stop(), AudioStatus::Unavailable);
        assert_eq!(music.cue(Cue::Correct), AudioStatus::Unavailable);
        music.poll();
        assert_eq!(music.status(), AudioStatus::Unavailable);
    }

    #[test]
    fn test_missing_track_is_unavailable() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let config = AudioConfig {
            primary_track: Some(PathBuf::from("/definitely/not/here.wav")),
            ..AudioConfig::default()
        };
        let mut music = Music::new(Box::new(RecordingBackend(Rc::clone(&calls))), &config);

        assert_eq!(music.start(), AudioStatus::Unavailable);
        assert_eq!(calls.borrow().started, 0);
        // cues do not need a track
        assert_eq!(music.cue(Cue::Incorrect), AudioStatus::Unavailable);
        assert_eq!(calls.borrow().cues, vec![Cue::Incorrect]);
    }

    #[test]
    fn test_toggle_mute_cycle() {
        let (mut music, calls, _dir) = music_with_track();

        assert_eq!(music.start(), AudioStatus::Playing);
        assert_eq!(music.toggle_mute(), AudioStatus::Muted);
        assert_eq!(calls.borrow().stopped, 1);
        assert_eq!(music.toggle_mute(), AudioStatus::Playing);
        assert_eq!(calls.borrow().started, 2);
    }

    #[test]
    fn test_toggle_mute_when_stopped_starts() {
        let (mut music, calls, _dir) = music_with_track();

        assert_eq!(music.status(), AudioStatus::Stopped);
        assert_eq!(music.toggle_mute(), AudioStatus::Playing);
        assert_eq!(calls.borrow().started, 1);
    }

    #[test]
    fn test_cues_reach_backend() {
        let (mut music, calls, _dir) = music_with_track();

        music.cue(Cue::Correct);
        music.cue(Cue::Incorrect);

        assert_eq!(calls.borrow().cues, vec![Cue::Correct, Cue::Incorrect]);
    }

    #[test]
    fn test_player_backend_rings_bell() {
        let mut backend = PlayerBackend::with_bell("aplay -q", Vec::new()).unwrap();

        backend.cue(Cue::Correct).unwrap();
        backend.cue(Cue::Incorrect).unwrap();

        assert_eq!(backend.bell, b"\x07\x07\x07".to_vec());
        assert_eq!(backend.program, "aplay");
        assert_eq!(backend.args, vec!["-q".to_string()]);
    }

    #[test]
    fn test_player_backend_rejects_empty_command() {
        assert!(matches!(
            PlayerBackend::with_bell("   ", Vec::new()),
            Err(AudioError::EmptyCommand)
        ));
    }

    #[test]
    fn test_player_backend_spawn_failure() {
        let mut backend =
            PlayerBackend::with_bell("studystack-no-such-player", Vec::new()).unwrap();

        assert!(matches!(
            backend.start_loop(Path::new("bgm.wav")),
            Err(AudioError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    fn wait_for_exit(backend: &mut PlayerBackend<Vec<u8>>) -> Result<(), AudioError> {
        for _ in 0..100 {
            std::thread::sleep(std::time::Duration::from_millis(20));
            let result = backend.poll();
            if result.is_err() || backend.child.is_none() {
                return result;
            }
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_player_is_not_respawned() {
        let mut backend = PlayerBackend::with_bell("false", Vec::new()).unwrap();
        backend.start_loop(Path::new("bgm.wav")).unwrap();

        let result = wait_for_exit(&mut backend);

        assert!(matches!(result, Err(AudioError::PlayerFailed { .. })));
        assert!(backend.child.is_none());
        assert!(backend.poll().is_ok());
        assert!(backend.child.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_finished_player_loops() {
        let mut backend = PlayerBackend::with_bell("true", Vec::new()).unwrap();
        backend.start_loop(Path::new("bgm.wav")).unwrap();

        let mut respawned = false;
        for _ in 0..100 {
            std::thread::sleep(std::time::Duration::from_millis(20));
            let before = backend.child.as_ref().map(|c| c.id());
            backend.poll().unwrap();
            let after = backend.child.as_ref().map(|c| c.id());
            if before.is_some() && after.is_some() && before != after {
                respawned = true;
                break;
            }
        }

        assert!(respawned);
        backend.stop_loop().unwrap();
        assert!(backend.child.is_none());
    }
}
