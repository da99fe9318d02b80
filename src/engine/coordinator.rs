//! Session mode coordinator.
//!
//! Owns the drowsiness monitor, the focus timer, the break scheduler and the
//! session tracker, and folds every inbound event into one consistent
//! [`Mode`]. Each call to [`SessionCoordinator::handle_at`] runs one event to
//! completion and returns the outbound events it produced, in order.
//!
//! Events whose transition guard fails are dropped and logged at `debug`.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::breaks::{BreakScheduler, BreakTick};
use super::countdown::{CountdownTimer, TickOutcome};
use super::drowsiness::{AlertEvent, DrowsinessMonitor};
use super::session::SessionTracker;
use crate::clock::{Clock, MonotonicClock, Timestamp};
use crate::config::{AlertClearPolicy, EngineConfig};
use crate::error::EngineError;
use crate::types::{
    duration_millis, CameraCommand, EyeSample, InboundEvent, Mode, OutboundEvent,
    SessionSummary, SoundRequest,
};

// ============================================================================
// CameraState
// ============================================================================

/// Lifecycle of the single camera session, as far as the engine knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CameraState {
    #[default]
    Stopped,
    /// Start requested, not yet confirmed
    Starting,
    Running,
}

// ============================================================================
// EngineSnapshot
// ============================================================================

/// Derived engine state for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSnapshot {
    pub mode: Mode,
    #[serde(rename = "closedMs", with = "duration_millis")]
    pub closed_duration: Duration,
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u32,
    #[serde(rename = "showsTimer")]
    pub shows_timer: bool,
    #[serde(rename = "canLeaveScreen")]
    pub can_leave_screen: bool,
    #[serde(rename = "alertSounding")]
    pub alert_sounding: bool,
    /// Trip totals including the open run
    pub trip: SessionSummary,
}

// ============================================================================
// SessionCoordinator
// ============================================================================

/// Top-level monitoring state machine.
pub struct SessionCoordinator<C: Clock = MonotonicClock> {
    config: EngineConfig,
    clock: C,
    mode: Mode,
    drowsiness: DrowsinessMonitor,
    focus_timer: CountdownTimer,
    breaks: BreakScheduler,
    session: SessionTracker,
    camera: CameraState,
    alert_sounding: bool,
    reported_closed: Duration,
    last_summary: Option<SessionSummary>,
}

impl<C: Clock> SessionCoordinator<C> {
    /// Creates a coordinator in `Idle` mode.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn new(config: EngineConfig, clock: C) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            drowsiness: DrowsinessMonitor::new(config.threshold(), config.alert_clear_policy),
            config,
            clock,
            mode: Mode::Idle,
            focus_timer: CountdownTimer::new(),
            breaks: BreakScheduler::new(),
            session: SessionTracker::new(),
            camera: CameraState::Stopped,
            alert_sounding: false,
            reported_closed: Duration::ZERO,
            last_summary: None,
        })
    }

    /// Handles one event stamped with the coordinator's clock.
    pub fn handle(&mut self, event: InboundEvent) -> Vec<OutboundEvent> {
        let now = self.clock.now();
        self.handle_at(now, event)
    }

    /// Handles one event as if it arrived at `now`.
    pub fn handle_at(&mut self, now: Timestamp, event: InboundEvent) -> Vec<OutboundEvent> {
        let mut out = Vec::new();
        let name = event.name();

        let accepted = match event {
            InboundEvent::EyeSample(sample) => self.on_sample(now, &sample, &mut out),
            InboundEvent::TimerTick => self.on_tick(now, &mut out),
            InboundEvent::StartMonitoring { trip_reset } => {
                self.on_start(now, trip_reset, &mut out)
            }
            InboundEvent::StopMonitoring => self.on_stop(now, &mut out),
            InboundEvent::AcknowledgeAlert => self.on_acknowledge(now, &mut out),
            InboundEvent::ExitEntirely => self.on_exit(now, &mut out),
            InboundEvent::DismissSummary => self.on_dismiss(&mut out),
            InboundEvent::ConfigurePomodoro {
                total_seconds,
                break_seconds,
            } => self.on_configure(total_seconds, break_seconds),
            InboundEvent::MonitoringStarted => self.on_camera_started(),
            InboundEvent::MonitoringUnavailable { reason } => {
                self.on_camera_unavailable(now, reason, &mut out)
            }
        };

        if !accepted {
            debug!(event = name, mode = %self.mode, "Event dropped");
        }
        out
    }

    // ------------------------------------------------------------------------
    // Event handlers
    // ------------------------------------------------------------------------

    fn on_sample(&mut self, now: Timestamp, sample: &EyeSample, out: &mut Vec<OutboundEvent>) -> bool {
        let clears_on_open = self.mode == Mode::AlertTriggered
            && self.config.alert_clear_policy == AlertClearPolicy::ClearOnOpen;
        if !self.mode.accepts_samples() && !clears_on_open {
            return false;
        }
        // A delivered frame means the camera is up, confirmed or not.
        if self.camera == CameraState::Starting {
            debug!("Camera confirmed by first sample");
            self.camera = CameraState::Running;
        }

        let event = self.drowsiness.ingest(sample);
        self.report_closed_duration(out);

        match event {
            Some(AlertEvent::Raised { closed_for }) if self.mode == Mode::Monitoring => {
                info!(closed_ms = closed_for.as_millis() as u64, "Drowsiness alert raised");
                self.session.register_alert();
                self.session.end_run(now);
                self.start_alert_sound(out);
                self.set_mode(Mode::AlertTriggered, out);
            }
            Some(AlertEvent::Cleared) if self.mode == Mode::AlertTriggered => {
                info!("Alert cleared by open eyes");
                self.resume_after_alert(now, out);
            }
            _ => {}
        }
        true
    }

    fn on_tick(&mut self, now: Timestamp, out: &mut Vec<OutboundEvent>) -> bool {
        match self.mode {
            Mode::Monitoring | Mode::AlertTriggered => match self.focus_timer.tick() {
                TickOutcome::Inactive => false,
                TickOutcome::Counting(remaining) => {
                    out.push(OutboundEvent::TimerDisplayChanged(remaining));
                    true
                }
                TickOutcome::Expired => {
                    out.push(OutboundEvent::TimerDisplayChanged(0));
                    self.on_focus_expired(now, out);
                    true
                }
            },
            Mode::OnBreak => match self.breaks.tick() {
                BreakTick::Inactive => false,
                BreakTick::Counting(remaining) => {
                    out.push(OutboundEvent::TimerDisplayChanged(remaining));
                    true
                }
                BreakTick::Ended => {
                    out.push(OutboundEvent::TimerDisplayChanged(0));
                    self.on_break_ended(now, out);
                    true
                }
            },
            Mode::Idle | Mode::Summary => false,
        }
    }

    fn on_focus_expired(&mut self, now: Timestamp, out: &mut Vec<OutboundEvent>) {
        let break_seconds = self.config.break_seconds().unwrap_or(0);
        if !self.breaks.maybe_start_break(self.mode, break_seconds) {
            debug!(mode = %self.mode, "Focus expiry dropped");
            return;
        }

        info!(break_seconds, "Break started");
        self.session.end_run(now);
        self.drowsiness.reset();
        self.report_closed_duration(out);
        self.set_mode(Mode::OnBreak, out);
        out.push(OutboundEvent::SoundRequest(SoundRequest::PlayOnce));
        out.push(OutboundEvent::TimerDisplayChanged(self.breaks.remaining()));
    }

    fn on_break_ended(&mut self, now: Timestamp, out: &mut Vec<OutboundEvent>) {
        info!("Break ended, resuming monitoring");
        self.session.begin_run(now);
        self.drowsiness.reset();
        self.report_closed_duration(out);
        // Restart at the length this block started with; a mid-session
        // ConfigurePomodoro waits for the next StartMonitoring.
        let focus = self.focus_timer.total();
        self.focus_timer.reset(focus, true);
        self.set_mode(Mode::Monitoring, out);
        out.push(OutboundEvent::SoundRequest(SoundRequest::PlayOnce));
        out.push(OutboundEvent::TimerDisplayChanged(self.focus_timer.remaining()));
    }

    fn on_start(&mut self, now: Timestamp, trip_reset: bool, out: &mut Vec<OutboundEvent>) -> bool {
        if self.mode != Mode::Idle {
            return false;
        }

        if trip_reset {
            if let Err(e) = self.session.reset_trip() {
                warn!("Trip not reset: {}", e);
            }
        }
        self.session.begin_run(now);
        self.drowsiness.reset();
        self.report_closed_duration(out);
        self.request_camera_start(out);

        match self.config.focus_seconds() {
            Some(focus) => {
                self.focus_timer.start(focus);
                out.push(OutboundEvent::TimerDisplayChanged(focus));
            }
            None => self.focus_timer.reset(0, false),
        }

        info!(trip_id = %self.session.record().trip_id, "Monitoring started");
        self.set_mode(Mode::Monitoring, out);
        true
    }

    fn on_stop(&mut self, now: Timestamp, out: &mut Vec<OutboundEvent>) -> bool {
        if !self.mode.is_active() {
            return false;
        }

        self.wind_down(now, out);
        let summary = self.session.summary();
        info!(
            total_ms = summary.total_focus_duration.as_millis() as u64,
            alerts = summary.alert_count,
            "Monitoring stopped"
        );
        self.last_summary = Some(summary.clone());
        self.set_mode(Mode::Summary, out);
        out.push(OutboundEvent::SessionSummaryReady(summary));
        true
    }

    fn on_acknowledge(&mut self, now: Timestamp, out: &mut Vec<OutboundEvent>) -> bool {
        if self.mode != Mode::AlertTriggered {
            return false;
        }
        self.resume_after_alert(now, out);
        true
    }

    fn on_exit(&mut self, now: Timestamp, out: &mut Vec<OutboundEvent>) -> bool {
        match self.mode {
            Mode::Idle => false,
            Mode::Summary => {
                self.set_mode(Mode::Idle, out);
                true
            }
            Mode::Monitoring | Mode::AlertTriggered | Mode::OnBreak => {
                self.wind_down(now, out);
                self.set_mode(Mode::Idle, out);
                true
            }
        }
    }

    fn on_dismiss(&mut self, out: &mut Vec<OutboundEvent>) -> bool {
        if self.mode != Mode::Summary {
            return false;
        }
        self.set_mode(Mode::Idle, out);
        true
    }

    fn on_configure(&mut self, total_seconds: Option<u32>, break_seconds: Option<u32>) -> bool {
        let candidate = self
            .config
            .clone()
            .with_focus_seconds(total_seconds)
            .with_break_seconds(break_seconds);
        if let Err(e) = candidate.validate() {
            warn!("Pomodoro configuration rejected: {}", e);
            return false;
        }
        debug!(?total_seconds, ?break_seconds, "Pomodoro configured");
        self.config = candidate;
        true
    }

    fn on_camera_started(&mut self) -> bool {
        if self.camera != CameraState::Starting {
            return false;
        }
        self.camera = CameraState::Running;
        true
    }

    fn on_camera_unavailable(&mut self, now: Timestamp, reason: String, out: &mut Vec<OutboundEvent>) -> bool {
        warn!("Monitoring unavailable: {}", reason);
        if self.mode.is_active() {
            if self.camera == CameraState::Running {
                self.session.end_run(now);
            } else {
                self.session.abandon_run();
            }
            // The camera is gone; no stop request is needed.
            self.camera = CameraState::Stopped;
            self.wind_down(now, out);
            self.set_mode(Mode::Idle, out);
        }
        out.push(OutboundEvent::MonitoringUnavailable(reason));
        true
    }

    // ------------------------------------------------------------------------
    // Shared steps
    // ------------------------------------------------------------------------

    fn resume_after_alert(&mut self, now: Timestamp, out: &mut Vec<OutboundEvent>) {
        self.drowsiness.acknowledge();
        self.report_closed_duration(out);
        self.stop_alert_sound(out);
        self.session.begin_run(now);
        self.set_mode(Mode::Monitoring, out);
    }

    /// Stops every sub-timer, the sound and the camera, closing the open run.
    fn wind_down(&mut self, now: Timestamp, out: &mut Vec<OutboundEvent>) {
        self.session.end_run(now);
        self.focus_timer.stop();
        self.breaks.stop();
        self.drowsiness.reset();
        self.report_closed_duration(out);
        self.stop_alert_sound(out);
        self.request_camera_stop(out);
    }

    fn set_mode(&mut self, mode: Mode, out: &mut Vec<OutboundEvent>) {
        if self.mode == mode {
            return;
        }
        debug!(from = %self.mode, to = %mode, "Mode changed");
        self.mode = mode;
        out.push(OutboundEvent::ModeChanged(mode));
    }

    fn report_closed_duration(&mut self, out: &mut Vec<OutboundEvent>) {
        let current = self.drowsiness.closed_duration();
        if current != self.reported_closed {
            self.reported_closed = current;
            out.push(OutboundEvent::ClosedDurationChanged(current));
        }
    }

    fn start_alert_sound(&mut self, out: &mut Vec<OutboundEvent>) {
        if self.alert_sounding {
            return;
        }
        self.alert_sounding = true;
        out.push(OutboundEvent::SoundRequest(SoundRequest::StartLooping));
    }

    fn stop_alert_sound(&mut self, out: &mut Vec<OutboundEvent>) {
        if !self.alert_sounding {
            return;
        }
        self.alert_sounding = false;
        out.push(OutboundEvent::SoundRequest(SoundRequest::StopLooping));
    }

    fn request_camera_start(&mut self, out: &mut Vec<OutboundEvent>) {
        if self.camera != CameraState::Stopped {
            debug!("Camera start already outstanding");
            return;
        }
        self.camera = CameraState::Starting;
        out.push(OutboundEvent::CameraRequest(CameraCommand::Start));
    }

    fn request_camera_stop(&mut self, out: &mut Vec<OutboundEvent>) {
        if self.camera == CameraState::Stopped {
            return;
        }
        self.camera = CameraState::Stopped;
        out.push(OutboundEvent::CameraRequest(CameraCommand::Stop));
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn closed_duration(&self) -> Duration {
        self.drowsiness.closed_duration()
    }

    /// Seconds shown on the countdown badge: the break while on break,
    /// otherwise the focus timer.
    pub fn remaining_seconds(&self) -> u32 {
        match self.mode {
            Mode::OnBreak => self.breaks.remaining(),
            _ => self.focus_timer.remaining(),
        }
    }

    pub fn focus_timer(&self) -> &CountdownTimer {
        &self.focus_timer
    }

    pub fn is_alert_sounding(&self) -> bool {
        self.alert_sounding
    }

    /// Summary produced by the most recent stop, if any.
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    /// Current derived state, with trip totals counted up to now.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.mode,
            closed_duration: self.closed_duration(),
            remaining_seconds: self.remaining_seconds(),
            shows_timer: self.mode.shows_timer(),
            can_leave_screen: self.mode.can_leave_screen(),
            alert_sounding: self.alert_sounding,
            trip: self.session.summary_at(self.clock.now()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
