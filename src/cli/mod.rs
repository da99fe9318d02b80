//! CLI module for eyeguard.
//!
//! - `commands`: Command definitions using clap derive
//! - `script`: JSON-lines replay script format
//! - `replay`: Script replay through the engine actor
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod replay;
pub mod script;

pub use commands::{Cli, Commands, ReplayArgs};
pub use display::Display;
pub use replay::run_replay;
pub use script::{parse_script, ScriptAction, ScriptError, ScriptLine};
