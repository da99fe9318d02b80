//! Alert player backed by rodio.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::AlertPlayer;

/// Plays alert sounds on the default output device.
///
/// The output stream must stay on the thread that created it, so the
/// player is not `Send`.
pub struct RodioAlertPlayer {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    /// Sink of the looping alert, if one is playing
    looping: Mutex<Option<Sink>>,
    disabled: AtomicBool,
}

impl RodioAlertPlayer {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotAvailable` if no output device can be opened.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;
        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            looping: Mutex::new(None),
            disabled: AtomicBool::new(disabled),
        })
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
    }

    fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        Decoder::new(BufReader::new(file)).map_err(|e| SoundError::DecodeError(e.to_string()))
    }

    fn new_sink(&self) -> Result<Sink, SoundError> {
        Sink::try_new(&self.stream_handle).map_err(|e| SoundError::StreamError(e.to_string()))
    }

    fn looping_sink(&self) -> Result<std::sync::MutexGuard<'_, Option<Sink>>, SoundError> {
        self.looping
            .lock()
            .map_err(|_| SoundError::PlaybackError("looping sink lock poisoned".to_string()))
    }
}

impl AlertPlayer for RodioAlertPlayer {
    fn start_loop(&self, path: &Path) -> Result<(), SoundError> {
        if self.is_disabled() {
            debug!("Sound playback disabled, skipping loop");
            return Ok(());
        }

        let decoder = Self::decode(path)?;
        let sink = self.new_sink()?;
        sink.append(decoder.repeat_infinite());

        let mut looping = self.looping_sink()?;
        if let Some(previous) = looping.replace(sink) {
            warn!("Alert loop already playing; replacing it");
            previous.stop();
        }
        Ok(())
    }

    fn stop_loop(&self) -> Result<(), SoundError> {
        if let Some(sink) = self.looping_sink()?.take() {
            sink.stop();
            debug!("Alert loop stopped");
        }
        Ok(())
    }

    fn play_once(&self, path: &Path) -> Result<(), SoundError> {
        if self.is_disabled() {
            return Ok(());
        }

        let decoder = Self::decode(path)?;
        let sink = self.new_sink()?;
        sink.append(decoder);
        sink.detach();
        Ok(())
    }
}

impl std::fmt::Debug for RodioAlertPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioAlertPlayer")
            .field("disabled", &self.is_disabled())
            .finish_non_exhaustive()
    }
}

/// Opens the audio device, returning `None` (with a warning) if unavailable.
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<RodioAlertPlayer> {
    match RodioAlertPlayer::new(disabled) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            None
        }
    }
}
