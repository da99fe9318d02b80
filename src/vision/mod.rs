//! Eye-openness classification.
//!
//! Converts per-frame eye landmark points into the [`EyeState`] the engine
//! consumes. Landmark extraction itself happens outside this crate; points
//! are expected in a normalized coordinate space.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::types::{EyeSample, EyeState};

/// Ratio above which an eye counts as open.
pub const DEFAULT_OPENNESS_THRESHOLD: f64 = 0.18;

/// Fewest landmark points an eye region needs to be usable.
const MIN_EYE_POINTS: usize = 6;

/// Smallest horizontal extent treated as a real eye.
const MIN_HORIZONTAL_EXTENT: f64 = 0.0001;

/// A normalized landmark point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Eye regions of one detected face. A region is `None` when the detector
/// did not report it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    #[serde(default)]
    pub left_eye: Option<Vec<Point>>,
    #[serde(default)]
    pub right_eye: Option<Vec<Point>>,
}

/// Height-to-width ratio of an eye region's bounding box.
///
/// Returns `None` for regions with too few points or no horizontal extent.
pub fn eye_openness(points: &[Point]) -> Option<f64> {
    if points.len() < MIN_EYE_POINTS {
        return None;
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let horizontal = max_x - min_x;
    if horizontal.is_nan() || horizontal <= MIN_HORIZONTAL_EXTENT {
        return None;
    }
    Some((max_y - min_y) / horizontal)
}

/// Classifies faces into eye states by thresholding average openness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpennessClassifier {
    threshold: f64,
}

impl Default for OpennessClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_OPENNESS_THRESHOLD)
    }
}

impl OpennessClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Average openness of the usable eyes, if any.
    pub fn openness(&self, face: &FaceLandmarks) -> Option<f64> {
        let left = face.left_eye.as_deref().and_then(eye_openness);
        let right = face.right_eye.as_deref().and_then(eye_openness);
        match (left, right) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (one, other) => one.or(other),
        }
    }

    /// `NoFace` when there is no face or no usable eye.
    pub fn classify(&self, face: Option<&FaceLandmarks>) -> EyeState {
        match face.and_then(|f| self.openness(f)) {
            None => EyeState::NoFace,
            Some(ratio) if ratio > self.threshold => EyeState::Open,
            Some(_) => EyeState::Closed,
        }
    }

    pub fn sample(&self, at: Timestamp, face: Option<&FaceLandmarks>) -> EyeSample {
        EyeSample::new(at, self.classify(face))
    }
}
