use serde::{Deserialize, Serialize};
use std::fmt;

/// One prescribed block of a workout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub duration: f64, // seconds, > 0
    pub effort: f64,   // 0–10
}

/// A workout overlaid on a video: lead-in `start`, then `levels` back to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDefinition {
    pub name: String,
    /// Nominal length of the video (s). Informational only.
    #[serde(default)]
    pub duration: f64,
    #[serde(alias = "videoSourceId", default)]
    pub video_id: String,
    #[serde(default)]
    pub start: f64,
    pub levels: Vec<Segment>,
}

impl WorkoutDefinition {
    /// Time at which the last segment ends.
    pub fn final_time(&self) -> f64 {
        self.start + self.levels.iter().map(|l| l.duration).sum::<f64>()
    }
}

/// Effort label of an interval: the two sentinels or a numeric level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effort {
    Start,
    Level(f64),
    End,
}

impl Effort {
    pub fn level(&self) -> Option<f64> {
        match self {
            Effort::Level(l) => Some(*l),
            _ => None,
        }
    }

    /// Short name used for metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Effort::Start => "start",
            Effort::Level(_) => "level",
            Effort::End => "end",
        }
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effort::Start => write!(f, "start"),
            Effort::End => write!(f, "end"),
            Effort::Level(l) => write!(f, "{l}"),
        }
    }
}

/// Power bounds (watt) that effort 0 and 10 map to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PowerRange {
    fn default() -> Self {
        Self { min: 80.0, max: 180.0 }
    }
}

impl PowerRange {
    /// Linear map of effort 0–10 onto [min, max]. Effort is not clamped.
    pub fn target_power(&self, effort: f64) -> f64 {
        self.min + (self.max - self.min) * effort / 10.0
    }
}
