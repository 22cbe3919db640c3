use std::time::Instant;

use serde::Deserialize;

/// Fewest landmarks a usable observation can carry; the matcher reads
/// indices 0 and 5, so anything shorter counts as "no hand seen".
pub const MIN_LANDMARKS: usize = 6;

/// One hand joint in normalized image coordinates, x and y in [0, 1].
/// Estimators that emit a depth component have it ignored on deserialize.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug)]
pub struct Observation {
    /// Empty when the estimator saw no hand this frame.
    pub landmarks: Vec<Landmark>,
    #[allow(dead_code)]
    pub timestamp: Instant,
}

impl Observation {
    pub fn hand(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks,
            timestamp: Instant::now(),
        }
    }

    pub fn no_hand() -> Self {
        Self::hand(Vec::new())
    }
}

/// A letter label with its two reference points: the wrist analog
/// (landmark 0) and the index-finger-base analog (landmark 5).
#[derive(Clone, Debug)]
pub struct SignReference {
    pub label: String,
    pub points: [Landmark; 2],
}

impl SignReference {
    pub fn new(label: impl Into<String>, first: Landmark, second: Landmark) -> Self {
        Self {
            label: label.into(),
            points: [first, second],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The observation matched this letter.
    Match(String),
    /// A hand was seen, but it matched no reference.
    NoMatch,
    /// No hand (or too few landmarks) this frame.
    NoObservation,
}

impl MatchOutcome {
    pub fn label(&self) -> Option<&str> {
        match self {
            MatchOutcome::Match(label) => Some(label),
            _ => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Match(_))
    }
}

/// What the recognition loop hands the UI once per processed frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub landmarks: Vec<Landmark>,
    pub outcome: MatchOutcome,
    pub status: String,
}
