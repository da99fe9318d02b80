//! Monitoring engine.
//!
//! - `drowsiness`: closed-eye debounce and alert edges
//! - `countdown`: one-second-tick countdown shared by focus and break timers
//! - `breaks`: guarded break scheduling
//! - `session`: trip and run accounting
//! - `coordinator`: mode state machine tying the above together
//! - `actor`: tokio task and handle around the coordinator

pub mod actor;
pub mod breaks;
pub mod coordinator;
pub mod countdown;
pub mod drowsiness;
pub mod session;

pub use actor::{spawn_ticker, EngineActor, EngineHandle};
pub use breaks::{BreakScheduler, BreakTick};
pub use coordinator::{EngineSnapshot, SessionCoordinator};
pub use countdown::{format_clock, CountdownTimer, TickOutcome, TimerState};
pub use drowsiness::{AlertEvent, DrowsinessMonitor, DrowsinessState};
pub use session::{SessionRecord, SessionTracker};
