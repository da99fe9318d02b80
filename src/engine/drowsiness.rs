//! Drowsiness state machine.
//!
//! Turns a stream of eye samples into a debounced alert:
//! - A closed-eye excursion starts at the first `Closed`/`NoFace` sample
//! - The alert fires once when the excursion reaches the threshold
//! - An `Open` sample ends the excursion but does not clear a raised alert
//!   unless [`AlertClearPolicy::ClearOnOpen`] is configured

use std::time::Duration;

use tracing::debug;

use crate::clock::Timestamp;
use crate::config::AlertClearPolicy;
use crate::types::EyeSample;

// ============================================================================
// DrowsinessState
// ============================================================================

/// Excursion and alert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrowsinessState {
    /// Timestamp of the first closed sample of the current excursion
    pub closed_since: Option<Timestamp>,
    /// Length of the current excursion
    pub closed_duration: Duration,
    /// Whether an alert has been raised and not yet cleared
    pub alerting: bool,
}

impl DrowsinessState {
    fn clear_excursion(&mut self) {
        self.closed_since = None;
        self.closed_duration = Duration::ZERO;
    }
}

// ============================================================================
// AlertEvent
// ============================================================================

/// Edge events produced by sample ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEvent {
    /// The excursion crossed the threshold
    Raised {
        /// Excursion length at the moment the alert fired
        closed_for: Duration,
    },
    /// Eyes reopened and the policy allows clearing without acknowledgment
    Cleared,
}

// ============================================================================
// DrowsinessMonitor
// ============================================================================

/// Debounces eye samples into drowsiness alerts.
#[derive(Debug, Clone)]
pub struct DrowsinessMonitor {
    threshold: Duration,
    policy: AlertClearPolicy,
    state: DrowsinessState,
}

impl DrowsinessMonitor {
    /// Creates a monitor that alerts after `threshold` of continuous closure.
    pub fn new(threshold: Duration, policy: AlertClearPolicy) -> Self {
        Self {
            threshold,
            policy,
            state: DrowsinessState::default(),
        }
    }

    /// Feeds one sample and returns an edge event, if any.
    pub fn ingest(&mut self, sample: &EyeSample) -> Option<AlertEvent> {
        if !sample.state.counts_as_closed() {
            self.state.clear_excursion();
            if self.state.alerting && self.policy == AlertClearPolicy::ClearOnOpen {
                self.state.alerting = false;
                debug!("Alert cleared by open-eyes sample");
                return Some(AlertEvent::Cleared);
            }
            return None;
        }

        let since = *self.state.closed_since.get_or_insert(sample.timestamp);
        let elapsed = sample.timestamp.saturating_since(since);
        // Out-of-order samples never shrink the excursion.
        self.state.closed_duration = self.state.closed_duration.max(elapsed);

        if !self.state.alerting && self.state.closed_duration >= self.threshold {
            self.state.alerting = true;
            debug!(
                closed_ms = self.state.closed_duration.as_millis() as u64,
                "Closed-eye threshold reached"
            );
            return Some(AlertEvent::Raised {
                closed_for: self.state.closed_duration,
            });
        }

        None
    }

    /// Clears the alert and the excursion after the user confirmed wakefulness.
    pub fn acknowledge(&mut self) {
        self.state.alerting = false;
        self.state.clear_excursion();
    }

    /// Clears everything without an acknowledgment (monitoring restarted).
    pub fn reset(&mut self) {
        self.state = DrowsinessState::default();
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn state(&self) -> &DrowsinessState {
        &self.state
    }

    pub fn closed_duration(&self) -> Duration {
        self.state.closed_duration
    }

    pub fn is_alerting(&self) -> bool {
        self.state.alerting
    }
}

// ============================================================================
// Tests
// ============================================================================
