//! Core data types for the monitoring engine.
//!
//! This module defines the data structures used for:
//! - Eye samples produced by the vision collaborator
//! - The coordinator mode
//! - Inbound events and outbound notifications
//! - Session summaries

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Timestamp;

// ============================================================================
// EyeState / EyeSample
// ============================================================================

/// Eye state reported for one camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeState {
    /// Eyes detected and open
    Open,
    /// Eyes detected and closed
    Closed,
    /// No face (or no usable eye region) in the frame
    NoFace,
}

impl EyeState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            EyeState::Open => "open",
            EyeState::Closed => "closed",
            EyeState::NoFace => "no_face",
        }
    }

    /// Returns true if the sample counts towards a closed-eye excursion.
    ///
    /// A missing face is not assumed to mean "eyes open".
    pub fn counts_as_closed(&self) -> bool {
        matches!(self, EyeState::Closed | EyeState::NoFace)
    }
}

/// One eye-openness observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyeSample {
    /// Capture time of the frame
    pub timestamp: Timestamp,
    /// Observed state
    pub state: EyeState,
}

impl EyeSample {
    pub fn new(timestamp: Timestamp, state: EyeState) -> Self {
        Self { timestamp, state }
    }

    pub fn open(timestamp: Timestamp) -> Self {
        Self::new(timestamp, EyeState::Open)
    }

    pub fn closed(timestamp: Timestamp) -> Self {
        Self::new(timestamp, EyeState::Closed)
    }

    pub fn no_face(timestamp: Timestamp) -> Self {
        Self::new(timestamp, EyeState::NoFace)
    }
}

// ============================================================================
// Mode
// ============================================================================

/// The single mode of the session coordinator.
///
/// UI flags are derived from this value rather than stored next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Nothing is running
    #[default]
    Idle,
    /// Eye samples are being evaluated
    Monitoring,
    /// A drowsiness alert is sounding and awaits acknowledgment
    AlertTriggered,
    /// A break countdown is running; samples are ignored
    OnBreak,
    /// A trip summary is on screen
    Summary,
}

impl Mode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Monitoring => "monitoring",
            Mode::AlertTriggered => "alert_triggered",
            Mode::OnBreak => "on_break",
            Mode::Summary => "summary",
        }
    }

    /// Returns true while a monitoring session is in progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Mode::Monitoring | Mode::AlertTriggered | Mode::OnBreak
        )
    }

    /// Returns true if eye samples are evaluated in this mode.
    pub fn accepts_samples(&self) -> bool {
        matches!(self, Mode::Monitoring)
    }

    /// Returns true if the user may navigate away from the monitoring screen.
    pub fn can_leave_screen(&self) -> bool {
        matches!(self, Mode::Idle)
    }

    /// Returns true if a countdown badge should be visible.
    pub fn shows_timer(&self) -> bool {
        matches!(self, Mode::Monitoring | Mode::OnBreak)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Requests to external executors
// ============================================================================

/// Semantic audio requests; decoding and device I/O happen elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundRequest {
    /// Start the alert sound, looping until stopped
    StartLooping,
    /// Stop the looping alert sound
    StopLooping,
    /// Play a short cue once
    PlayOnce,
}

/// Camera session requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraCommand {
    Start,
    Stop,
}

// ============================================================================
// SessionSummary
// ============================================================================

/// Immutable snapshot of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Trip this snapshot belongs to
    pub trip_id: Uuid,
    /// Total time spent monitoring across all runs of the trip
    #[serde(rename = "totalFocusMs", with = "duration_millis")]
    pub total_focus_duration: Duration,
    /// Drowsiness alerts raised during the trip
    #[serde(rename = "alertCount")]
    pub alert_count: u32,
    /// Number of completed runs
    #[serde(rename = "runCount")]
    pub run_count: u32,
    /// Length of the most recent completed run
    #[serde(rename = "lastRunMs", with = "duration_millis")]
    pub last_run_duration: Duration,
}

// ============================================================================
// Inbound / outbound events
// ============================================================================

/// Events delivered to the coordinator by its producers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A frame-derived eye observation
    EyeSample(EyeSample),
    /// One second elapsed
    TimerTick,
    /// User asked to start monitoring
    StartMonitoring {
        /// Begin a fresh trip before starting
        #[serde(default)]
        trip_reset: bool,
    },
    /// User asked to stop and see the summary
    StopMonitoring,
    /// User dismissed the wake-up alert
    AcknowledgeAlert,
    /// User left the monitoring screen
    ExitEntirely,
    /// User dismissed the summary
    DismissSummary,
    /// Focus and break durations changed
    ConfigurePomodoro {
        #[serde(default)]
        total_seconds: Option<u32>,
        #[serde(default)]
        break_seconds: Option<u32>,
    },
    /// Camera session is running
    MonitoringStarted,
    /// Camera could not be started or was lost
    MonitoringUnavailable { reason: String },
}

impl InboundEvent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::EyeSample(_) => "eye_sample",
            InboundEvent::TimerTick => "timer_tick",
            InboundEvent::StartMonitoring { .. } => "start_monitoring",
            InboundEvent::StopMonitoring => "stop_monitoring",
            InboundEvent::AcknowledgeAlert => "acknowledge_alert",
            InboundEvent::ExitEntirely => "exit_entirely",
            InboundEvent::DismissSummary => "dismiss_summary",
            InboundEvent::ConfigurePomodoro { .. } => "configure_pomodoro",
            InboundEvent::MonitoringStarted => "monitoring_started",
            InboundEvent::MonitoringUnavailable { .. } => "monitoring_unavailable",
        }
    }
}

/// Notifications observed by the UI and the audio/camera executors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OutboundEvent {
    ModeChanged(Mode),
    ClosedDurationChanged(#[serde(with = "duration_millis")] Duration),
    TimerDisplayChanged(u32),
    SoundRequest(SoundRequest),
    CameraRequest(CameraCommand),
    SessionSummaryReady(SessionSummary),
    MonitoringUnavailable(String),
}

// ============================================================================
// Serde helpers
// ============================================================================

/// Serializes a [`Duration`] as integer milliseconds.
pub mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// ============================================================================
// Tests
// ============================================================================
