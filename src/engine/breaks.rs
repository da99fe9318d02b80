//! Break scheduler.
//!
//! Reacts to focus-timer expiry with a break countdown. The scheduler only
//! decides whether a break may start and counts it down; pausing sample
//! ingestion and playing cues is the coordinator's job.

use tracing::debug;

use super::countdown::{CountdownTimer, TickOutcome};
use crate::types::Mode;

/// Result of one break tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakTick {
    /// No break in progress
    Inactive,
    /// One second of break elapsed
    Counting(u32),
    /// The break just finished
    Ended,
}

/// Runs break countdowns between focus blocks.
#[derive(Debug, Clone, Default)]
pub struct BreakScheduler {
    timer: CountdownTimer,
}

impl BreakScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a break if the coordinator is plainly monitoring.
    ///
    /// Fails when `mode` is anything but `Monitoring`, when a break is
    /// already running, or when `break_seconds` is zero. A failed attempt is
    /// dropped, not queued.
    pub fn maybe_start_break(&mut self, mode: Mode, break_seconds: u32) -> bool {
        if mode != Mode::Monitoring || self.is_active() {
            debug!(mode = mode.as_str(), "Break not started: guard failed");
            return false;
        }
        self.timer.start(break_seconds);
        self.timer.is_running()
    }

    /// Advances the break countdown by one second.
    pub fn tick(&mut self) -> BreakTick {
        match self.timer.tick() {
            TickOutcome::Inactive => BreakTick::Inactive,
            TickOutcome::Counting(remaining) => BreakTick::Counting(remaining),
            TickOutcome::Expired => BreakTick::Ended,
        }
    }

    /// Cancels a break in progress without reporting `Ended`.
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_running()
    }

    pub fn remaining(&self) -> u32 {
        self.timer.remaining()
    }
}
