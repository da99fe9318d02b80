//! Display utilities for the eyeguard CLI.
//!
//! Formatting lives in `format_*` functions so it can be tested; the
//! `show_*` functions only print.

use std::time::Duration;

use crate::clock::Timestamp;
use crate::engine::format_clock;
use crate::sound::{SoundSource, CUSTOM_SOUND_ID, DRIVING_ALARM, STUDY_SOUNDS};
use crate::types::{CameraCommand, OutboundEvent, SessionSummary, SoundRequest};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Prints one outbound event as text.
    pub fn show_event(at: Timestamp, event: &OutboundEvent) {
        println!("{}", Self::format_event(at, event));
    }

    /// Prints one outbound event as a JSON line.
    pub fn show_event_json(at: Timestamp, event: &OutboundEvent) -> serde_json::Result<()> {
        let line = serde_json::json!({ "at_ms": at.as_millis(), "event": event });
        println!("{}", serde_json::to_string(&line)?);
        Ok(())
    }

    /// Prints the session summary screen.
    pub fn show_summary(summary: &SessionSummary) {
        println!("{}", Self::format_summary(summary));
    }

    /// Prints the alert sound catalog, marking the active one.
    pub fn show_sounds(active: &SoundSource) {
        println!("Study sounds:");
        for sound in &STUDY_SOUNDS {
            let marker = if *active == SoundSource::Bundled(*sound) { "*" } else { " " };
            println!(" {} {:<8} {}", marker, sound.id, sound.title);
        }
        let custom_marker = if matches!(active, SoundSource::Custom(_)) { "*" } else { " " };
        println!(" {} {:<8} Imported file", custom_marker, CUSTOM_SOUND_ID);
        println!();
        let alarm_marker = if *active == SoundSource::Bundled(DRIVING_ALARM) { "*" } else { " " };
        println!("Driving:");
        println!(" {} {:<8} {}", alarm_marker, DRIVING_ALARM.id, DRIVING_ALARM.title);
    }

    pub fn show_break_length(focus_minutes: u32, break_minutes: u32) {
        println!("{focus_minutes} min focus -> {break_minutes} min break");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    /// `[MM:SS.mmm] description`
    pub fn format_event(at: Timestamp, event: &OutboundEvent) -> String {
        format!("[{}] {}", Self::format_timestamp(at), Self::describe(event))
    }

    fn describe(event: &OutboundEvent) -> String {
        match event {
            OutboundEvent::ModeChanged(mode) => format!("mode -> {mode}"),
            OutboundEvent::ClosedDurationChanged(d) => {
                format!("eyes closed {:.1}s", d.as_secs_f64())
            }
            OutboundEvent::TimerDisplayChanged(s) => format!("timer {}", format_clock(*s)),
            OutboundEvent::SoundRequest(SoundRequest::StartLooping) => "alarm on".to_string(),
            OutboundEvent::SoundRequest(SoundRequest::StopLooping) => "alarm off".to_string(),
            OutboundEvent::SoundRequest(SoundRequest::PlayOnce) => "chime".to_string(),
            OutboundEvent::CameraRequest(CameraCommand::Start) => "camera start".to_string(),
            OutboundEvent::CameraRequest(CameraCommand::Stop) => "camera stop".to_string(),
            OutboundEvent::SessionSummaryReady(summary) => format!(
                "summary: {} focused, {} alert(s)",
                Self::format_session_time(summary.total_focus_duration),
                summary.alert_count
            ),
            OutboundEvent::MonitoringUnavailable(reason) => {
                format!("monitoring unavailable: {reason}")
            }
        }
    }

    /// Summary screen text. Runs are split at alerts and breaks, so only
    /// trip-level totals are shown.
    pub fn format_summary(summary: &SessionSummary) -> String {
        [
            "Session summary".to_string(),
            "─────────────────────────────".to_string(),
            format!("Focus time: {}", Self::format_session_time(summary.total_focus_duration)),
            format!("Alerts:     {}", summary.alert_count),
            format!("Trip:       {}", summary.trip_id),
        ]
        .join("\n")
    }

    /// Session length as shown on the summary screen: `N min` from one
    /// minute up, otherwise `N sec`.
    pub fn format_session_time(duration: Duration) -> String {
        let seconds = duration.as_secs_f64().round() as u64;
        if seconds >= 60 {
            format!("{} min", seconds / 60)
        } else {
            format!("{} sec", seconds)
        }
    }

    /// Replay clock as `MM:SS.mmm`.
    pub fn format_timestamp(at: Timestamp) -> String {
        let ms = at.as_millis();
        format!("{:02}:{:02}.{:03}", ms / 60_000, (ms / 1_000) % 60, ms % 1_000)
    }
}

// ============================================================================
// Tests
// ============================================================================
