//! Alert sound routing.
//!
//! The engine only emits [`SoundRequest`] intents. This module turns them
//! into player calls:
//!
//! ```text
//! OutboundEvent::SoundRequest ──▶ SoundRouter ──▶ AlertPlayer
//!                                     │              ├─ RodioAlertPlayer (audio feature)
//!                                     ▼              └─ MockAlertPlayer
//!                                SoundSource (catalog)
//! ```
//!
//! Playback failures are logged and swallowed so that a missing device or
//! file never stops monitoring.

mod catalog;
mod error;
#[cfg(feature = "audio")]
mod player;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

pub use catalog::{
    default_sound_dir, default_study_sound, find_study_sound, AlertSound, SoundSource,
    CUSTOM_SOUND_ID, DRIVING_ALARM, STUDY_SOUNDS,
};
pub use error::SoundError;
#[cfg(feature = "audio")]
pub use player::{try_create_player, RodioAlertPlayer};

use crate::types::{OutboundEvent, SoundRequest};

/// Playback backend for alert sounds.
pub trait AlertPlayer {
    /// Starts `path` looping until [`stop_loop`](Self::stop_loop).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be decoded or played.
    fn start_loop(&self, path: &Path) -> Result<(), SoundError>;

    /// Stops the looping sound, if any.
    fn stop_loop(&self) -> Result<(), SoundError>;

    /// Plays `path` once in the background.
    fn play_once(&self, path: &Path) -> Result<(), SoundError>;
}

// ============================================================================
// SoundRouter
// ============================================================================

/// Executes engine sound requests against a player.
pub struct SoundRouter<P: AlertPlayer> {
    player: P,
    source: SoundSource,
    sound_dir: PathBuf,
}

impl<P: AlertPlayer> SoundRouter<P> {
    pub fn new(player: P, source: SoundSource, sound_dir: impl Into<PathBuf>) -> Self {
        Self {
            player,
            source,
            sound_dir: sound_dir.into(),
        }
    }

    /// Executes one request.
    ///
    /// # Errors
    ///
    /// Returns the player or lookup error.
    pub fn execute(&self, request: SoundRequest) -> Result<(), SoundError> {
        match request {
            SoundRequest::StartLooping => {
                let path = self.source.resolve(&self.sound_dir)?;
                debug!("Looping alert sound: {}", path.display());
                self.player.start_loop(&path)
            }
            SoundRequest::StopLooping => self.player.stop_loop(),
            SoundRequest::PlayOnce => {
                let path = self.source.resolve(&self.sound_dir)?;
                self.player.play_once(&path)
            }
        }
    }

    /// Routes an outbound event, ignoring everything but sound requests.
    ///
    /// Failures are logged at `warn`.
    pub fn handle(&self, event: &OutboundEvent) {
        if let OutboundEvent::SoundRequest(request) = event {
            if let Err(e) = self.execute(*request) {
                warn!("Sound request {:?} failed: {} ({})", request, e, e.suggestion());
            }
        }
    }

    pub fn source(&self) -> &SoundSource {
        &self.source
    }

    pub fn player(&self) -> &P {
        &self.player
    }
}

// ============================================================================
// MockAlertPlayer
// ============================================================================

/// Call recorded by [`MockAlertPlayer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    StartLoop(PathBuf),
    StopLoop,
    PlayOnce(PathBuf),
}

/// Recording player for tests.
#[derive(Debug, Default)]
pub struct MockAlertPlayer {
    calls: Mutex<Vec<PlayerCall>>,
    should_fail: AtomicBool,
}

impl MockAlertPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PlayerCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: PlayerCall) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.lock().push(call);
        Ok(())
    }
}

impl AlertPlayer for MockAlertPlayer {
    fn start_loop(&self, path: &Path) -> Result<(), SoundError> {
        self.record(PlayerCall::StartLoop(path.to_path_buf()))
    }

    fn stop_loop(&self) -> Result<(), SoundError> {
        self.record(PlayerCall::StopLoop)
    }

    fn play_once(&self, path: &Path) -> Result<(), SoundError> {
        self.record(PlayerCall::PlayOnce(path.to_path_buf()))
    }
}
