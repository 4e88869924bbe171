// core/src/komoot_api.rs
use serde::Deserialize;
use ureq::Agent;

use crate::error::{from_json_str, K2Error, Result};
use crate::route::TrackPoint;

const BASE_URL: &str = "https://api.komoot.de/v007";

#[derive(Debug, Clone, Deserialize)]
struct CoordinatesResp {
    items: Vec<Coordinate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Coordinate {
    lat: f64,
    #[serde(alias = "lon")]
    lng: f64,
    #[serde(default)]
    alt: f64,
}

/// Map a komoot `coordinates` response to track points.
pub fn parse_coordinates(json: &str) -> Result<Vec<TrackPoint>> {
    let resp: CoordinatesResp = from_json_str(json)?;
    Ok(resp
        .items
        .into_iter()
        .map(|c| TrackPoint { lat: c.lat, lon: c.lng, alt: c.alt })
        .collect())
}

/// Komoot client, simple blocking version (ureq)
pub struct KomootClient {
    agent: Agent,
    base_url: String,
}

impl KomootClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(10))
            .build();
        Self { agent, base_url: BASE_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn coordinates_url(&self, tour_id: &str) -> String {
        format!("{}/tours/{}/coordinates/", self.base_url.trim_end_matches('/'), tour_id)
    }

    /// Fetch a public tour's coordinates.
    pub fn fetch_track(&self, tour_id: &str) -> Result<Vec<TrackPoint>> {
        let url = self.coordinates_url(tour_id);
        let body = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| K2Error::Http(e.to_string()))?
            .into_string()?;

        let points = parse_coordinates(&body)?;
        log::info!("[komoot] tour {tour_id}: {} points", points.len());
        Ok(points)
    }
}

impl Default for KomootClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KomootClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KomootClient").field("base_url", &self.base_url).finish()
    }
}
