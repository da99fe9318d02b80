//! Sound error types.

use thiserror::Error;

/// Errors raised while resolving or playing alert sounds.
#[derive(Debug, Error)]
pub enum SoundError {
    /// No audio output device could be opened.
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// The sound file does not exist or cannot be opened.
    #[error("sound file not found: {0}")]
    FileNotFound(String),

    /// The sound file could not be decoded.
    #[error("failed to decode sound file: {0}")]
    DecodeError(String),

    /// An output sink could not be created.
    #[error("failed to create audio stream: {0}")]
    StreamError(String),

    /// Any other playback failure.
    #[error("sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    /// Returns a user-facing hint for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "Connect an audio output device",
            Self::FileNotFound(_) => "Check the sound directory or re-import the custom sound",
            Self::DecodeError(_) => "The sound file may be corrupted; use a WAV file",
            Self::StreamError(_) => "Check the system audio settings",
            Self::PlaybackError(_) => "Restart the application",
        }
    }
}
