use serde_json::{json, Value};

use crate::route::TrackPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Start,
    End,
    Location,
}

impl MarkerKind {
    fn name(&self) -> &'static str {
        match self {
            MarkerKind::Start => "startMarker",
            MarkerKind::End => "endMarker",
            MarkerKind::Location => "locationMarker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// South-west / north-east corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub sw: LatLng,
    pub ne: LatLng,
}

impl Bounds {
    fn around(p: LatLng) -> Self {
        Self { sw: p, ne: p }
    }

    fn extend(&mut self, p: LatLng) {
        self.sw.lat = self.sw.lat.min(p.lat);
        self.sw.lng = self.sw.lng.min(p.lng);
        self.ne.lat = self.ne.lat.max(p.lat);
        self.ne.lng = self.ne.lng.max(p.lng);
    }
}

/// Map state for one route view: the drawn path, its bounds, the three
/// markers and where the view is centered.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSession {
    path: Vec<LatLng>,
    bounds: Option<Bounds>,
    start: Option<LatLng>,
    end: Option<LatLng>,
    location: Option<LatLng>,
    center: LatLng,
    zoom: u8,
}

impl Default for MapSession {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            bounds: None,
            start: None,
            end: None,
            location: None,
            center: LatLng { lat: 49.48052, lng: 8.48433 },
            zoom: 16,
        }
    }
}

impl MapSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the path; start/end markers follow its first and last point.
    pub fn update_path(&mut self, points: &[TrackPoint]) {
        self.path = points.iter().map(|p| LatLng { lat: p.lat, lng: p.lon }).collect();
        self.bounds = None;
        for &p in &self.path {
            match self.bounds.as_mut() {
                Some(b) => b.extend(p),
                None => self.bounds = Some(Bounds::around(p)),
            }
        }
        if let Some(&first) = self.path.first() {
            self.set_marker(MarkerKind::Start, first);
        }
        if let Some(&last) = self.path.last() {
            self.set_marker(MarkerKind::End, last);
        }
    }

    pub fn update_location(&mut self, lat: f64, lng: f64) {
        self.set_marker(MarkerKind::Location, LatLng { lat, lng });
    }

    /// Moves (or creates) a marker and pans the view onto it.
    pub fn set_marker(&mut self, kind: MarkerKind, at: LatLng) {
        match kind {
            MarkerKind::Start => self.start = Some(at),
            MarkerKind::End => self.end = Some(at),
            MarkerKind::Location => self.location = Some(at),
        }
        self.center = at;
        self.zoom = 16;
    }

    pub fn marker(&self, kind: MarkerKind) -> Option<LatLng> {
        match kind {
            MarkerKind::Start => self.start,
            MarkerKind::End => self.end,
            MarkerKind::Location => self.location,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn path(&self) -> &[LatLng] {
        &self.path
    }

    /// GeoJSON FeatureCollection of the path and the markers that exist.
    pub fn to_geojson(&self) -> Value {
        let mut features = Vec::new();
        if !self.path.is_empty() {
            let coords: Vec<[f64; 2]> = self.path.iter().map(|p| [p.lng, p.lat]).collect();
            features.push(json!({
                "type": "Feature",
                "properties": {"name": "path", "stroke": "#FF0000", "stroke-width": 2},
                "geometry": {"type": "LineString", "coordinates": coords}
            }));
        }
        for kind in [MarkerKind::Start, MarkerKind::End, MarkerKind::Location] {
            if let Some(p) = self.marker(kind) {
                features.push(json!({
                    "type": "Feature",
                    "properties": {"name": kind.name()},
                    "geometry": {"type": "Point", "coordinates": [p.lng, p.lat]}
                }));
            }
        }
        json!({"type": "FeatureCollection", "features": features})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_sets_bounds_and_end_markers() {
        let mut m = MapSession::new();
        m.update_path(&[
            TrackPoint { lat: 49.0, lon: 8.5, alt: 0.0 },
            TrackPoint { lat: 49.2, lon: 8.3, alt: 0.0 },
        ]);
        let b = m.bounds().unwrap();
        assert_eq!((b.sw.lat, b.sw.lng), (49.0, 8.3));
        assert_eq!((b.ne.lat, b.ne.lng), (49.2, 8.5));
        assert_eq!(m.marker(MarkerKind::Start), Some(LatLng { lat: 49.0, lng: 8.5 }));
        assert_eq!(m.center(), LatLng { lat: 49.2, lng: 8.3 });
        assert!(m.marker(MarkerKind::Location).is_none());
    }

    #[test]
    fn location_pans_and_shows_in_geojson() {
        let mut m = MapSession::new();
        m.update_location(49.1, 8.4);
        assert_eq!(m.center(), LatLng { lat: 49.1, lng: 8.4 });
        let gj = m.to_geojson();
        assert_eq!(gj["features"].as_array().unwrap().len(), 1);
        assert_eq!(gj["features"][0]["properties"]["name"], "locationMarker");
    }
}
