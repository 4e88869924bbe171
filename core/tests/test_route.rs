// tests/test_route.rs
use k2_core::elevation::ElevationChart;
use k2_core::route::GradePowerMap;
use k2_core::{cumulative_distance, haversine, Track, TrackPoint};

fn p(lat: f64, lon: f64, alt: f64) -> TrackPoint {
    TrackPoint { lat, lon, alt }
}

#[test]
fn single_point_track_starts_at_zero() {
    let pts = [p(49.48, 8.48, 97.0)];
    let out: Vec<_> = cumulative_distance(&pts).collect();
    assert_eq!(out, vec![(0.0, 97.0)]);
}

#[test]
fn two_point_track_uses_haversine() {
    let pts = [p(0.0, 0.0, 10.0), p(0.0, 1.0, 20.0)];
    let out: Vec<_> = cumulative_distance(&pts).collect();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0], (0.0, 10.0));
    assert!((out[1].0 - haversine(&pts[0], &pts[1])).abs() < 1e-9);
    assert_eq!(out[1].1, 20.0);
    assert!(((out[1].0 - 111_194.9) / 111_194.9).abs() < 1e-3);
}

#[test]
fn empty_track_yields_nothing() {
    assert_eq!(cumulative_distance(&[]).count(), 0);
}

fn climb() -> Track {
    // ~111 m per 0.001 deg of longitude on the equator
    Track::new(vec![
        p(0.0, 0.000, 100.0),
        p(0.0, 0.001, 105.0),
        p(0.0, 0.002, 105.0),
        p(0.0, 0.003, 100.0),
    ])
    .unwrap()
}

#[test]
fn overview_sums_climbs_and_drops() {
    let o = climb().overview();
    let seg = haversine(&p(0.0, 0.0, 0.0), &p(0.0, 0.001, 0.0));
    assert!((o.distance - 3.0 * seg).abs() < 1e-6);
    assert_eq!(o.ascent_m, 5.0);
    assert_eq!(o.descent_m, -5.0);
    assert!((o.max_ascent_percent - 500.0 / seg).abs() < 1e-9);
    assert!((o.max_descent_percent + 500.0 / seg).abs() < 1e-9);
}

#[test]
fn info_at_distance_interpolates_and_clamps() {
    let track = climb();
    let seg = track.total_distance() / 3.0;

    let mid = track.info_at_distance(seg / 2.0);
    assert!((mid.elevation - 102.5).abs() < 1e-6);
    assert!((mid.longitude - 0.0005).abs() < 1e-9);
    assert!((mid.grade - 5.0 / seg).abs() < 1e-9);

    let flat = track.info_at_distance(1.5 * seg);
    assert_eq!(flat.grade, 0.0);

    let before = track.info_at_distance(-10.0);
    assert_eq!(before.progress, 0.0);
    assert_eq!(before.latitude, 0.0);
    assert!((before.longitude - 0.0).abs() < 1e-12);

    let after = track.info_at_distance(1e6);
    assert_eq!(after.progress, 1.0);
    assert!((after.longitude - 0.003).abs() < 1e-12);
}

#[test]
fn grade_drives_power_target() {
    let track = climb();
    let info = track.info_at_distance(10.0);
    let watts = GradePowerMap::default().power_for_grade(info.grade);
    assert!(watts > 100.0 && watts <= 200.0, "watts={watts}");
}

#[test]
fn elevation_chart_renders_position_marker() {
    let track = climb();
    let mut chart = ElevationChart::new(track.points(), vec![150.0]).unwrap();
    chart.set_position(track.total_distance());
    assert!((chart.x_for_distance(track.total_distance()) - 1200.0).abs() < 1e-9);
    let svg = chart.to_svg();
    assert!(svg.starts_with("<svg id=\"elevationGraph\""));
    assert!(svg.contains("viewBox=\"-30 -10 1240 160\""));
    assert!(svg.contains("x1=\"1200.00\""));
}
