// tests/test_timeline.rs
use k2_core::{build_timeline, resolve, Effort, Segment, WorkoutDefinition};

fn workout(start: f64, durations: &[f64]) -> WorkoutDefinition {
    WorkoutDefinition {
        name: "intervals".into(),
        duration: 0.0,
        video_id: "VUEOu5m3oaY".into(),
        start,
        levels: durations
            .iter()
            .enumerate()
            .map(|(i, &duration)| Segment { duration, effort: i as f64 })
            .collect(),
    }
}

#[test]
fn resolves_every_region_of_the_timeline() {
    let s = 4.0;
    let d = [60.0, 30.0, 45.0];
    let tl = build_timeline(&workout(s, &d));

    // [0, S) -> start
    for t in [0.0, 1.0, 3.999] {
        assert_eq!(tl.resolve(t).unwrap().effort, Effort::Start, "t={t}");
    }
    // t = S -> first segment
    assert_eq!(tl.resolve(s).unwrap().effort, Effort::Level(0.0));

    // inside segment i -> exactly segment i
    let mut begin = s;
    for (i, dur) in d.iter().enumerate() {
        for t in [begin, begin + dur / 2.0, begin + dur - 1e-6] {
            assert_eq!(tl.resolve(t).unwrap().effort, Effort::Level(i as f64), "t={t}");
        }
        begin += dur;
    }

    // >= S + sum(d) -> end
    let end = s + d.iter().sum::<f64>();
    for t in [end, end + 1.0, 1e9] {
        assert_eq!(tl.resolve(t).unwrap().effort, Effort::End, "t={t}");
    }
}

#[test]
fn intervals_are_contiguous() {
    let tl = build_timeline(&workout(4.0, &[60.0, 60.0, 30.0, 30.0]));
    for pair in tl.intervals().windows(2) {
        assert_eq!(pair[0].end, Some(pair[1].begin));
    }
    assert_eq!(tl.intervals()[0].begin, 0.0);
    assert_eq!(tl.intervals().last().unwrap().end, None);
    assert_eq!(tl.intervals().last().unwrap().duration, None);
}

#[test]
fn free_resolve_matches_timeline_resolve() {
    let tl = build_timeline(&workout(2.0, &[10.0]));
    for t in [0.0, 2.0, 11.9, 12.0, 50.0] {
        assert_eq!(resolve(tl.intervals(), t), tl.resolve(t));
    }
    assert!(resolve(tl.intervals(), -0.5).is_none());
}

#[test]
fn zero_duration_segment_is_never_resolved() {
    let tl = build_timeline(&workout(0.0, &[10.0, 0.0, 10.0]));
    assert_eq!(tl.len(), 5);
    assert_eq!(tl.resolve(10.0).unwrap().effort, Effort::Level(2.0));
    assert_eq!(tl.resolve_index(10.0), Some(3));
}
