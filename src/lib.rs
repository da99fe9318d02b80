//! eyeguard library
//!
//! Monitoring engine for a drowsiness and focus monitor. It includes:
//! - Drowsiness debouncing over a stream of eye samples
//! - Focus countdown and break scheduling
//! - Trip and run accounting
//! - A mode coordinator and its tokio actor
//! - Eye-openness classification from landmark points
//! - Alert sound routing
//! - The replay CLI

pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod sound;
pub mod types;
pub mod vision;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use config::{AlertClearPolicy, EngineConfig, MonitoringContext};
pub use engine::{EngineActor, EngineHandle, EngineSnapshot, SessionCoordinator};
pub use error::{ConfigError, EngineError};
pub use types::{
    CameraCommand, EyeSample, EyeState, InboundEvent, Mode, OutboundEvent, SessionSummary,
    SoundRequest,
};

// Re-export sound types
pub use sound::{AlertPlayer, MockAlertPlayer, SoundError, SoundRouter, SoundSource};
#[cfg(feature = "audio")]
pub use sound::RodioAlertPlayer;
