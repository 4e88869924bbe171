//! Workout timeline: absolute, half-open effort intervals derived from a
//! [`WorkoutDefinition`], and lookup of the interval active at a given
//! playback time.

use crate::models::{Effort, WorkoutDefinition};

/// A half-open range `[begin, end)` of playback time with its effort label.
/// `end == None` only for the trailing `End` interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffortInterval {
    pub effort: Effort,
    pub begin: f64,
    pub end: Option<f64>,
    pub duration: Option<f64>,
}

impl EffortInterval {
    #[inline]
    pub fn contains(&self, time: f64) -> bool {
        self.begin <= time && self.end.map_or(true, |end| time < end)
    }

    /// Fraction of the interval elapsed at `time`, clamped to [0, 1].
    /// Unbounded and empty intervals jump from 0 to 1 at `begin`.
    pub fn progress(&self, time: f64) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 => ((time - self.begin) / d).clamp(0.0, 1.0),
            _ => {
                if time >= self.begin {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn label(&self) -> String {
        match self.effort {
            Effort::Start => "Start".to_string(),
            Effort::End => "End".to_string(),
            Effort::Level(level) => {
                format!("{}s Level {}", self.duration.unwrap_or(0.0), level)
            }
        }
    }

    fn label_html(&self) -> String {
        match self.effort {
            Effort::Start => "<span>Start</span>".to_string(),
            Effort::End => "<span>End</span>".to_string(),
            Effort::Level(level) => format!(
                "<span>{}s</span><span>Level {}</span>",
                self.duration.unwrap_or(0.0),
                level
            ),
        }
    }
}

/// Ordered, contiguous intervals: `Start`, one per segment, `End`.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    intervals: Vec<EffortInterval>,
}

/// Single forward pass over the segments with a running time cursor.
/// Durations are not validated; a non-positive one yields an interval
/// that can never be resolved.
pub fn build_timeline(workout: &WorkoutDefinition) -> Timeline {
    let mut intervals = Vec::with_capacity(workout.levels.len() + 2);

    intervals.push(EffortInterval {
        effort: Effort::Start,
        begin: 0.0,
        end: Some(workout.start),
        duration: Some(workout.start),
    });

    let mut cursor = workout.start;
    for level in &workout.levels {
        intervals.push(EffortInterval {
            effort: Effort::Level(level.effort),
            begin: cursor,
            end: Some(cursor + level.duration),
            duration: Some(level.duration),
        });
        cursor += level.duration;
    }

    intervals.push(EffortInterval {
        effort: Effort::End,
        begin: cursor,
        end: None,
        duration: None,
    });

    Timeline { intervals }
}

/// First interval, in construction order, containing `time`.
/// Negative times resolve to `None`.
pub fn resolve(intervals: &[EffortInterval], time: f64) -> Option<&EffortInterval> {
    intervals.iter().find(|iv| iv.contains(time))
}

impl Timeline {
    pub fn intervals(&self) -> &[EffortInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EffortInterval> {
        self.intervals.get(index)
    }

    pub fn resolve(&self, time: f64) -> Option<&EffortInterval> {
        resolve(&self.intervals, time)
    }

    /// Like [`Timeline::resolve`] but returns the interval's position, which
    /// is its identity within this timeline.
    pub fn resolve_index(&self, time: f64) -> Option<usize> {
        self.intervals.iter().position(|iv| iv.contains(time))
    }

    /// Begin time of the trailing `End` interval.
    pub fn final_time(&self) -> f64 {
        self.intervals.last().map_or(0.0, |iv| iv.begin)
    }
}

/// One progress bar in the workout overview.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalProgress {
    pub label: String,
    pub progress: f64,
    pub active: bool,
}

pub fn progress_view(timeline: &Timeline, time: f64) -> Vec<IntervalProgress> {
    let active = timeline.resolve_index(time);
    timeline
        .intervals()
        .iter()
        .enumerate()
        .map(|(i, iv)| IntervalProgress {
            label: iv.label(),
            progress: iv.progress(time),
            active: active == Some(i),
        })
        .collect()
}

/// One `<div class="progress …">` per interval, newline separated.
pub fn render_progress_html(timeline: &Timeline, time: f64) -> String {
    let active = timeline.resolve_index(time);
    timeline
        .intervals()
        .iter()
        .enumerate()
        .map(|(i, iv)| {
            let class = if active == Some(i) { "active" } else { "inactive" };
            format!(
                "<div class=\"progress {class}\">\n<div class=\"label\">{}</div>\n<span class=\"value\" style=\"width: {}%;\"></span>\n</div>",
                iv.label_html(),
                iv.progress(time) * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    fn workout() -> WorkoutDefinition {
        WorkoutDefinition {
            name: "test".into(),
            duration: 124.0,
            video_id: String::new(),
            start: 4.0,
            levels: vec![
                Segment { duration: 60.0, effort: 2.0 },
                Segment { duration: 60.0, effort: 5.0 },
            ],
        }
    }

    #[test]
    fn builds_start_segments_end() {
        let tl = build_timeline(&workout());
        assert_eq!(tl.len(), 4);
        assert_eq!(tl.intervals()[0].effort, Effort::Start);
        assert_eq!(tl.intervals()[0].end, Some(4.0));
        assert_eq!(tl.intervals()[2].begin, 64.0);
        assert_eq!(tl.intervals()[3].effort, Effort::End);
        assert_eq!(tl.intervals()[3].end, None);
        assert_eq!(tl.final_time(), 124.0);
    }

    #[test]
    fn boundary_resolves_to_later_interval() {
        let tl = build_timeline(&workout());
        assert_eq!(tl.resolve_index(3.999), Some(0));
        assert_eq!(tl.resolve_index(4.0), Some(1));
        assert_eq!(tl.resolve_index(64.0), Some(2));
        assert_eq!(tl.resolve_index(124.0), Some(3));
        assert_eq!(tl.resolve_index(-1.0), None);
    }

    #[test]
    fn zero_lead_in_resolves_first_segment_at_zero() {
        let mut w = workout();
        w.start = 0.0;
        let tl = build_timeline(&w);
        assert_eq!(tl.resolve(0.0).map(|iv| iv.effort), Some(Effort::Level(2.0)));
    }

    #[test]
    fn progress_and_labels() {
        let tl = build_timeline(&workout());
        let seg = tl.intervals()[1];
        assert_eq!(seg.progress(0.0), 0.0);
        assert!((seg.progress(34.0) - 0.5).abs() < 1e-12);
        assert_eq!(seg.progress(500.0), 1.0);
        assert_eq!(seg.label(), "60s Level 2");

        let end = tl.intervals()[3];
        assert_eq!(end.progress(100.0), 0.0);
        assert_eq!(end.progress(130.0), 1.0);
        assert_eq!(end.label(), "End");
    }

    #[test]
    fn progress_view_marks_single_active() {
        let tl = build_timeline(&workout());
        let view = progress_view(&tl, 70.0);
        assert_eq!(view.iter().filter(|p| p.active).count(), 1);
        assert!(view[2].active);
        assert_eq!(view[1].progress, 1.0);

        let html = render_progress_html(&tl, 70.0);
        assert_eq!(html.matches("progress active").count(), 1);
        assert!(html.contains("<span>Level 5</span>"));
    }
}
