use crate::route::{DistanceTrackInfo, TrackOverview};
use crate::telemetry::TelemetryView;
use crate::timeline::Timeline;

fn fmt_clock(secs: f64) -> String {
    let s = secs.max(0.0).round() as u64;
    format!("{:02}:{:02}", s / 60, s % 60)
}

pub fn print_timeline(name: &str, timeline: &Timeline) {
    println!("--- Workout: {name} ---");
    for (i, iv) in timeline.intervals().iter().enumerate() {
        let end = iv.end.map_or("  ...".to_string(), fmt_clock);
        println!("#{i:<3} {} - {}  {}", fmt_clock(iv.begin), end, iv.label());
    }
    println!("Total: {}", fmt_clock(timeline.final_time()));
}

pub fn print_telemetry(view: &TelemetryView) {
    println!("--- Kettler ---");
    println!("Time:     {}", view.time);
    println!("Distance: {}", view.distance);
    println!("Speed:    {}", view.speed);
    println!("Cadence:  {}", view.cadence);
    println!("Power:    {}", view.power);
    println!("Energy:   {}", view.energy);
}

pub fn print_track_overview(o: &TrackOverview) {
    println!("--- Track ---");
    println!("Total distance: {:.1}m", o.distance);
    println!("Ascent: {:.0}m  Descent: {:.0}m", o.ascent_m, o.descent_m);
    println!(
        "Max grade: {:.1}%  Min grade: {:.1}%",
        o.max_ascent_percent, o.max_descent_percent
    );
}

pub fn print_track_info(distance: f64, info: &DistanceTrackInfo, power: f64) {
    println!(
        "@{distance:.0}m: lat={:.5} lon={:.5} elev={:.1}m grade={:.1}% progress={:.1}% -> {power:.0} W",
        info.latitude,
        info.longitude,
        info.elevation,
        info.grade * 100.0,
        info.progress * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::fmt_clock;

    #[test]
    fn clock_format() {
        assert_eq!(fmt_clock(964.0), "16:04");
        assert_eq!(fmt_clock(4.0), "00:04");
    }
}
