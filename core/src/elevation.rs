//! Elevation profile chart for one route view.

use std::fmt::Write as _;

use ordered_float::OrderedFloat;

use crate::error::{K2Error, Result};
use crate::route::{cumulative_distance, TrackPoint};

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 130.0;
const TICKS: usize = 5;

/// Linear map of `domain` onto `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return 0.5 * (r0 + r1);
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    fn ticks(&self, n: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        if n < 2 || d1 == d0 {
            return vec![d0];
        }
        (0..n).map(|i| d0 + (d1 - d0) * i as f64 / (n - 1) as f64).collect()
    }
}

/// Chart state owned by a single view: the profile, its scales, the
/// highlight markers and the current position marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationChart {
    /// (km from start, altitude m)
    profile: Vec<(f64, f64)>,
    x: LinearScale,
    y: LinearScale,
    highlights_m: Vec<f64>,
    position_m: Option<f64>,
}

impl ElevationChart {
    pub fn new(points: &[TrackPoint], highlights_m: Vec<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(K2Error::InvalidTrack("elevation chart needs at least one point".into()));
        }
        let profile: Vec<(f64, f64)> = cumulative_distance(points)
            .map(|(d, alt)| (d / 1000.0, alt))
            .collect();

        let max_km = profile.iter().map(|p| OrderedFloat(p.0)).max().map_or(0.0, |v| v.0);
        let ymin = profile.iter().map(|p| OrderedFloat(p.1)).min().map_or(0.0, |v| v.0);
        let ymax = profile.iter().map(|p| OrderedFloat(p.1)).max().map_or(0.0, |v| v.0);

        Ok(Self {
            profile,
            x: LinearScale { domain: (0.0, max_km), range: (0.0, WIDTH) },
            y: LinearScale { domain: (ymin, ymax), range: (HEIGHT, 0.0) },
            highlights_m,
            position_m: None,
        })
    }

    pub fn profile(&self) -> &[(f64, f64)] {
        &self.profile
    }

    pub fn x_scale(&self) -> LinearScale {
        self.x
    }

    pub fn y_scale(&self) -> LinearScale {
        self.y
    }

    pub fn set_position(&mut self, distance_m: f64) {
        self.position_m = Some(distance_m);
    }

    pub fn clear_position(&mut self) {
        self.position_m = None;
    }

    pub fn position(&self) -> Option<f64> {
        self.position_m
    }

    /// Chart x coordinate of a distance along the route.
    pub fn x_for_distance(&self, distance_m: f64) -> f64 {
        self.x.apply(distance_m / 1000.0)
    }

    /// SVG path of the filled area under the profile.
    pub fn area_path(&self) -> String {
        let base = self.y.apply(self.y.domain.0);
        let mut d = String::new();
        for (i, (km, alt)) in self.profile.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd}{:.2},{:.2}", self.x.apply(*km), self.y.apply(*alt));
        }
        if let (Some(first), Some(last)) = (self.profile.first(), self.profile.last()) {
            let _ = write!(
                d,
                "L{:.2},{base:.2}L{:.2},{base:.2}Z",
                self.x.apply(last.0),
                self.x.apply(first.0)
            );
        }
        d
    }

    fn vline(&self, out: &mut String, distance_m: f64, color: &str, id: Option<&str>) {
        let x = self.x_for_distance(distance_m);
        let id_attr = id.map(|i| format!(" id=\"{i}\"")).unwrap_or_default();
        let _ = writeln!(
            out,
            "<line{id_attr} x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" style=\"stroke-width: 2; stroke: {color}; fill: none;\"/>",
            self.y.apply(self.y.domain.0),
            self.y.apply(self.y.domain.1),
        );
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "<svg id=\"elevationGraph\" xmlns=\"http://www.w3.org/2000/svg\" width=\"100%\" height=\"100%\" viewBox=\"-30 -10 1240 160\" preserveAspectRatio=\"xMinYMin\">"
        );
        out.push_str("<g>\n");

        // x axis (km)
        let _ = writeln!(
            out,
            "<g class=\"elevationAxis\" transform=\"translate(0, {HEIGHT})\">"
        );
        let _ = writeln!(
            out,
            "<line x1=\"0\" y1=\"0\" x2=\"{WIDTH}\" y2=\"0\" stroke=\"currentColor\"/>"
        );
        for t in self.x.ticks(TICKS) {
            let _ = writeln!(
                out,
                "<text x=\"{:.2}\" y=\"12\" text-anchor=\"middle\">{t:.1}</text>",
                self.x.apply(t)
            );
        }
        out.push_str("</g>\n");

        // y axis (m)
        out.push_str("<g class=\"elevationAxis\">\n");
        let _ = writeln!(
            out,
            "<line x1=\"0\" y1=\"0\" x2=\"0\" y2=\"{HEIGHT}\" stroke=\"currentColor\"/>"
        );
        for t in self.y.ticks(TICKS) {
            let _ = writeln!(
                out,
                "<text x=\"-4\" y=\"{:.2}\" text-anchor=\"end\">{t:.0}</text>",
                self.y.apply(t)
            );
        }
        out.push_str("</g>\n");

        let _ = writeln!(
            out,
            "<path fill=\"grey\" stroke=\"darkgrey\" stroke-width=\"1.5\" d=\"{}\"/>",
            self.area_path()
        );

        for &h in &self.highlights_m {
            self.vline(&mut out, h, "blue", None);
        }
        if let Some(pos) = self.position_m {
            self.vline(&mut out, pos, "orange", Some("currentPosition"));
        }

        out.push_str("</g>\n</svg>\n");
        out
    }
}
