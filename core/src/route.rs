//! Route geometry over recorded tracks: great-circle distances, position
//! lookup by distance ridden, and grade based power targets.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{K2Error, Result};

/// Earth radius (m) used for all haversine distances.
pub const EARTH_RADIUS_M: f64 = 6_372_800.0;

/// A recorded point. Serialized as `[lat, lon, altitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct TrackPoint {
    pub lat: f64, // degrees
    pub lon: f64, // degrees
    pub alt: f64, // m
}

impl From<[f64; 3]> for TrackPoint {
    fn from([lat, lon, alt]: [f64; 3]) -> Self {
        Self { lat, lon, alt }
    }
}

impl From<TrackPoint> for [f64; 3] {
    fn from(p: TrackPoint) -> Self {
        [p.lat, p.lon, p.alt]
    }
}

/// Great-circle distance in meters (spherical law of haversines).
pub fn haversine(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Lazy `(distance_from_start_m, altitude)` pairs. Cloning restarts nothing:
/// a clone continues from the same position, a fresh call starts over.
#[derive(Debug, Clone)]
pub struct CumulativeDistance<'a> {
    points: &'a [TrackPoint],
    idx: usize,
    acc: f64,
}

impl Iterator for CumulativeDistance<'_> {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<(f64, f64)> {
        let p = self.points.get(self.idx)?;
        if self.idx > 0 {
            self.acc += haversine(&self.points[self.idx - 1], p);
        }
        self.idx += 1;
        Some((self.acc, p.alt))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.points.len() - self.idx;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CumulativeDistance<'_> {}

pub fn cumulative_distance(points: &[TrackPoint]) -> CumulativeDistance<'_> {
    CumulativeDistance { points, idx: 0, acc: 0.0 }
}

/// Summary shown in the track list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOverview {
    pub distance: f64,
    pub ascent_m: f64,
    /// Sum of all drops; zero or negative.
    pub descent_m: f64,
    pub max_ascent_percent: f64,
    pub max_descent_percent: f64,
}

/// Interpolated position after riding `distance` meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceTrackInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub grade: f64,
    pub progress: f64,
}

/// A track with at least two points and its per-segment running totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<TrackPoint>,
    /// `accumulated[i]` = distance at the end of segment `i` (points i → i+1).
    accumulated: Vec<f64>,
}

impl Track {
    pub fn new(points: Vec<TrackPoint>) -> Result<Self> {
        if points.len() < 2 {
            return Err(K2Error::InvalidTrack(format!(
                "need at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().position(|p| !(p.lat.is_finite() && p.lon.is_finite())) {
            return Err(K2Error::InvalidTrack(format!("non-finite coordinate at point {bad}")));
        }
        let accumulated = cumulative_distance(&points).skip(1).map(|(d, _)| d).collect();
        Ok(Self { points, accumulated })
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn total_distance(&self) -> f64 {
        self.accumulated.last().copied().unwrap_or(0.0)
    }

    fn segments(&self) -> impl Iterator<Item = (&TrackPoint, &TrackPoint)> + '_ {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }

    fn grade(start: &TrackPoint, end: &TrackPoint) -> f64 {
        let d = haversine(start, end);
        if d > 0.0 {
            (end.alt - start.alt) / d
        } else {
            0.0
        }
    }

    pub fn overview(&self) -> TrackOverview {
        let (mut ascent, mut descent) = (0.0, 0.0);
        let (mut max_g, mut min_g) = (f64::NEG_INFINITY, f64::INFINITY);
        for (a, b) in self.segments() {
            let dh = b.alt - a.alt;
            if dh >= 0.0 {
                ascent += dh;
            } else {
                descent += dh;
            }
            let g = Self::grade(a, b);
            max_g = max_g.max(g);
            min_g = min_g.min(g);
        }
        TrackOverview {
            distance: self.total_distance(),
            ascent_m: ascent,
            descent_m: descent,
            max_ascent_percent: max_g * 100.0,
            max_descent_percent: min_g * 100.0,
        }
    }

    /// Fraction of the track covered, clamped to [0, 1].
    pub fn progress_at_distance(&self, distance: f64) -> f64 {
        let total = self.total_distance();
        if total <= 0.0 {
            return 1.0;
        }
        (distance / total).clamp(0.0, 1.0)
    }

    /// Position, elevation and grade of the segment containing `distance`.
    /// Out-of-range distances clamp to the first/last segment.
    pub fn info_at_distance(&self, distance: f64) -> DistanceTrackInfo {
        let last = self.accumulated.len() - 1;
        let idx = self.accumulated.partition_point(|&d| d < distance).min(last);
        let (start, end) = (&self.points[idx], &self.points[idx + 1]);

        let seg_len = haversine(start, end);
        let seg_progress = if seg_len > 0.0 {
            (1.0 - (self.accumulated[idx] - distance) / seg_len).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let lerp = |a: f64, b: f64| (1.0 - seg_progress) * a + seg_progress * b;

        DistanceTrackInfo {
            latitude: lerp(start.lat, end.lat),
            longitude: lerp(start.lon, end.lon),
            elevation: lerp(start.alt, end.alt),
            grade: Self::grade(start, end),
            progress: self.progress_at_distance(distance),
        }
    }
}

impl Track {
    /// Build a track from a GPX document.
    pub fn from_gpx<R: Read>(reader: R) -> Result<Self> {
        Self::new(read_gpx(reader)?)
    }
}

/// Flatten every track, segment and point of a GPX document in file order.
/// Points without `<ele>` sit at 0 m.
pub fn read_gpx<R: Read>(reader: R) -> Result<Vec<TrackPoint>> {
    let doc = gpx::read(reader).map_err(|e| K2Error::Gpx(e.to_string()))?;
    let points = doc
        .tracks
        .into_iter()
        .flat_map(|track| track.segments)
        .flat_map(|segment| segment.points)
        .map(|wp| {
            let geo = wp.point();
            TrackPoint { lat: geo.y(), lon: geo.x(), alt: wp.elevation.unwrap_or(0.0) }
        })
        .collect();
    Ok(points)
}

/// Load every `*.gpx` file in `dir`, sorted by file name. Unreadable or
/// degenerate files are skipped with a warning.
pub fn load_gpx_dir(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, Track)>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gpx")))
        .collect();
    files.sort();

    let mut tracks = Vec::with_capacity(files.len());
    for path in files {
        let loaded = File::open(&path)
            .map_err(K2Error::from)
            .and_then(|f| Track::from_gpx(BufReader::new(f)));
        match loaded {
            Ok(track) => tracks.push((path, track)),
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
    }
    log::info!("{} gpx tracks loaded from {}", tracks.len(), dir.as_ref().display());
    Ok(tracks)
}

/// Resistance for riding a track: grade → power target (watt).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePowerMap {
    pub idle_power: f64,
    pub max_power: f64,
    /// Grade (fraction) at which `max_power` is reached.
    pub max_grade: f64,
}

impl Default for GradePowerMap {
    fn default() -> Self {
        Self { idle_power: 100.0, max_power: 200.0, max_grade: 0.15 }
    }
}

impl GradePowerMap {
    pub fn power_for_grade(&self, grade: f64) -> f64 {
        let climb = if self.max_grade > 0.0 {
            (self.max_power * (grade / self.max_grade)).max(0.0)
        } else {
            0.0
        };
        (climb + self.idle_power).min(self.max_power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64, alt: f64) -> TrackPoint {
        TrackPoint { lat, lon, alt }
    }

    #[test]
    fn one_degree_of_longitude_on_equator() {
        let d = haversine(&p(0.0, 0.0, 0.0), &p(0.0, 1.0, 0.0));
        assert!((d - EARTH_RADIUS_M * 1f64.to_radians()).abs() < 1e-6, "got {d}");
        // ~111.2 km whichever mean radius is used
        assert!(((d - 111_194.9) / 111_194.9).abs() < 1e-3, "got {d}");
    }

    #[test]
    fn cumulative_distance_is_restartable() {
        let pts = vec![p(0.0, 0.0, 10.0), p(0.0, 1.0, 20.0), p(0.0, 2.0, 15.0)];
        let first: Vec<_> = cumulative_distance(&pts).collect();
        let second: Vec<_> = cumulative_distance(&pts).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], (0.0, 10.0));
        assert!((first[2].0 - 2.0 * first[1].0).abs() < 1e-6);
        assert_eq!(cumulative_distance(&pts).len(), 3);
    }

    const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="k2" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Rheinufer</name>
    <trkseg>
      <trkpt lat="49.48" lon="8.48"><ele>97.0</ele></trkpt>
      <trkpt lat="49.481" lon="8.48"><ele>99.0</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="49.482" lon="8.48"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn gpx_points_are_flattened_in_order() {
        let pts = read_gpx(TWO_SEGMENTS.as_bytes()).unwrap();
        assert_eq!(
            pts,
            vec![p(49.48, 8.48, 97.0), p(49.481, 8.48, 99.0), p(49.482, 8.48, 0.0)]
        );
    }

    #[test]
    fn broken_gpx_is_a_gpx_error() {
        assert!(matches!(read_gpx("<gpx><trk>".as_bytes()), Err(K2Error::Gpx(_))));
    }

    #[test]
    fn track_point_reads_triples() {
        let pts: Vec<TrackPoint> = serde_json::from_str("[[49.1, 8.4, 120.5]]").unwrap();
        assert_eq!(pts[0], p(49.1, 8.4, 120.5));
    }

    #[test]
    fn grade_power_map_clamps() {
        let m = GradePowerMap::default();
        assert_eq!(m.power_for_grade(-0.05), 100.0);
        assert_eq!(m.power_for_grade(0.0), 100.0);
        assert!((m.power_for_grade(0.03) - 140.0).abs() < 1e-9);
        assert_eq!(m.power_for_grade(0.2), 200.0);
    }

    #[test]
    fn track_needs_two_points() {
        assert!(Track::new(vec![p(0.0, 0.0, 0.0)]).is_err());
    }
}
