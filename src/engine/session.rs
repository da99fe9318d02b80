//! Trip and run accounting.
//!
//! A trip spans any number of runs. Each run is one contiguous stretch of
//! monitoring; the tracker adds its length to the trip total when it ends.

use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Timestamp;
use crate::error::EngineError;
use crate::types::SessionSummary;

/// Mutable trip record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub trip_id: Uuid,
    pub trip_accumulated_duration: Duration,
    pub current_run_started_at: Option<Timestamp>,
    pub alert_count: u32,
    pub last_run_duration: Duration,
    pub last_run_alert_count: u32,
    pub run_count: u32,
    current_run_alert_count: u32,
}

impl SessionRecord {
    fn new() -> Self {
        Self {
            trip_id: Uuid::new_v4(),
            trip_accumulated_duration: Duration::ZERO,
            current_run_started_at: None,
            alert_count: 0,
            last_run_duration: Duration::ZERO,
            last_run_alert_count: 0,
            run_count: 0,
            current_run_alert_count: 0,
        }
    }
}

/// Accumulates monitoring time and alerts across runs of a trip.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    record: SessionRecord,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    /// Creates a tracker with a fresh trip.
    pub fn new() -> Self {
        Self {
            record: SessionRecord::new(),
        }
    }

    /// Opens a run at `at`. Returns false if a run is already open.
    pub fn begin_run(&mut self, at: Timestamp) -> bool {
        if self.record.current_run_started_at.is_some() {
            debug!("begin_run ignored: a run is already open");
            return false;
        }
        self.record.current_run_started_at = Some(at);
        self.record.current_run_alert_count = 0;
        true
    }

    /// Closes the open run at `at` and returns its length.
    ///
    /// Returns `None` if no run is open.
    pub fn end_run(&mut self, at: Timestamp) -> Option<Duration> {
        let started = self.record.current_run_started_at.take()?;
        let duration = at.saturating_since(started);

        self.record.trip_accumulated_duration += duration;
        self.record.last_run_duration = duration;
        self.record.last_run_alert_count = self.record.current_run_alert_count;
        self.record.current_run_alert_count = 0;
        self.record.run_count += 1;

        debug!(
            run_ms = duration.as_millis() as u64,
            trip_ms = self.record.trip_accumulated_duration.as_millis() as u64,
            "Run ended"
        );
        Some(duration)
    }

    /// Discards the open run without adding its time to the trip.
    ///
    /// Alerts already registered stay counted against the trip.
    pub fn abandon_run(&mut self) -> bool {
        self.record.current_run_alert_count = 0;
        self.record.current_run_started_at.take().is_some()
    }

    /// Counts one alert against the trip (and the open run, if any).
    pub fn register_alert(&mut self) {
        self.record.alert_count += 1;
        if self.record.current_run_started_at.is_some() {
            self.record.current_run_alert_count += 1;
        }
    }

    /// Starts a new trip.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if a run is open.
    pub fn reset_trip(&mut self) -> Result<(), EngineError> {
        if self.record.current_run_started_at.is_some() {
            return Err(EngineError::InvalidOperation(
                "cannot reset the trip while a run is open".to_string(),
            ));
        }
        self.record = SessionRecord::new();
        info!(trip_id = %self.record.trip_id, "Trip reset");
        Ok(())
    }

    /// Snapshot of completed runs.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            trip_id: self.record.trip_id,
            total_focus_duration: self.record.trip_accumulated_duration,
            alert_count: self.record.alert_count,
            run_count: self.record.run_count,
            last_run_duration: self.record.last_run_duration,
        }
    }

    /// Snapshot that also counts the open run up to `now`.
    pub fn summary_at(&self, now: Timestamp) -> SessionSummary {
        let mut summary = self.summary();
        if let Some(started) = self.record.current_run_started_at {
            summary.total_focus_duration += now.saturating_since(started);
        }
        summary
    }

    pub fn is_run_open(&self) -> bool {
        self.record.current_run_started_at.is_some()
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }
}

// ============================================================================
// Tests
// ============================================================================
