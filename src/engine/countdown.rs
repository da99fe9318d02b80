//! Countdown timer shared by the focus and break timers.
//!
//! The timer does not own a clock. An external scheduler calls
//! [`CountdownTimer::tick`] once per second, which keeps the timer
//! deterministic under test.

use serde::{Deserialize, Serialize};

// ============================================================================
// TimerState
// ============================================================================

/// Countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerState {
    /// Length of the countdown when started
    #[serde(rename = "totalSeconds")]
    pub total_seconds: u32,
    /// Seconds left, always within `0..=total_seconds`
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u32,
    /// Whether ticks currently count down
    pub running: bool,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is not running; nothing changed
    Inactive,
    /// One second elapsed
    Counting(u32),
    /// The countdown reached zero and the timer stopped
    Expired,
}

// ============================================================================
// CountdownTimer
// ============================================================================

/// One-second-tick countdown timer.
#[derive(Debug, Clone, Default)]
pub struct CountdownTimer {
    state: TimerState,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting down from `total_seconds`.
    ///
    /// A running countdown is stopped first. Starting with zero seconds
    /// leaves the timer stopped and never reports an expiry.
    pub fn start(&mut self, total_seconds: u32) {
        self.stop();
        if total_seconds == 0 {
            return;
        }
        self.state = TimerState {
            total_seconds,
            remaining_seconds: total_seconds,
            running: true,
        };
    }

    /// Stops the countdown, keeping the remaining time for display.
    pub fn stop(&mut self) {
        self.state.running = false;
    }

    /// Sets a new length and optionally starts it.
    pub fn reset(&mut self, total_seconds: u32, start_immediately: bool) {
        self.stop();
        self.state.total_seconds = total_seconds;
        self.state.remaining_seconds = total_seconds;
        if start_immediately && total_seconds > 0 {
            self.start(total_seconds);
        }
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.running || self.state.remaining_seconds == 0 {
            return TickOutcome::Inactive;
        }

        self.state.remaining_seconds -= 1;
        if self.state.remaining_seconds == 0 {
            self.state.running = false;
            return TickOutcome::Expired;
        }
        TickOutcome::Counting(self.state.remaining_seconds)
    }

    pub fn remaining(&self) -> u32 {
        self.state.remaining_seconds
    }

    pub fn total(&self) -> u32 {
        self.state.total_seconds
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted(&self) -> String {
        format_clock(self.state.remaining_seconds)
    }
}

/// Formats seconds as `MM:SS`; minutes are not wrapped into hours.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// Tests
// ============================================================================
