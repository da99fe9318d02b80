//! Replay script format.
//!
//! One JSON object per line. Each line carries an arrival time and either a
//! raw engine event or the landmarks of one camera frame:
//!
//! ```text
//! {"at_ms": 0,    "event": {"type": "start_monitoring", "trip_reset": true}}
//! {"at_ms": 100,  "event": {"type": "eye_sample", "timestamp": 100, "state": "closed"}}
//! {"at_ms": 200,  "face": {"left_eye": [{"x": 0.1, "y": 0.5}, ...]}}
//! {"at_ms": 300,  "face": null}
//! {"at_ms": 1000, "event": {"type": "timer_tick"}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use serde::Deserialize;
use thiserror::Error;

use crate::clock::Timestamp;
use crate::types::InboundEvent;
use crate::vision::{FaceLandmarks, OpennessClassifier};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// What a script line feeds to the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    Event(InboundEvent),
    /// Landmarks of one frame; `null` means no face was detected
    Face(Option<FaceLandmarks>),
}

/// One timed script line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptLine {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

impl ScriptLine {
    pub fn at(&self) -> Timestamp {
        Timestamp::from_millis(self.at_ms)
    }

    /// Converts the line into an engine event, classifying faces on the way.
    pub fn to_event(&self, classifier: &OpennessClassifier) -> InboundEvent {
        match &self.action {
            ScriptAction::Event(event) => event.clone(),
            ScriptAction::Face(face) => {
                InboundEvent::EyeSample(classifier.sample(self.at(), face.as_ref()))
            }
        }
    }
}

/// Parses a whole script.
///
/// # Errors
///
/// Returns the first malformed line, numbered from 1.
pub fn parse_script(content: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ScriptError::Parse {
                line: index + 1,
                source,
            })
        })
        .collect()
}
