//! Telemetry rendering: Kettler status payloads to display strings.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One Kettler status reading. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KettlerData {
    #[serde(default)]
    pub time_elapsed: Option<String>,
    /// km
    #[serde(default)]
    pub distance: Option<f64>,
    /// km/h
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub cadence: Option<f64>,
    #[serde(default)]
    pub real_power: Option<f64>,
    #[serde(default)]
    pub dest_power: Option<f64>,
    /// kJ
    #[serde(default)]
    pub energy: Option<f64>,
    /// Integrated distance in meters, added by the bike bridge.
    #[serde(default)]
    pub calc_distance: Option<f64>,
}

/// Envelope every retained K2 message is wrapped in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub payload: KettlerData,
    #[serde(rename = "_timestamp", default)]
    pub timestamp: Option<f64>,
}

impl StatusMessage {
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        let ts = self.timestamp?;
        let millis = (ts * 1000.0).round() as i64;
        Utc.timestamp_millis_opt(millis).single()
    }
}

/// `None` for anything that is not a status envelope.
pub fn parse_status_message(bytes: &[u8]) -> Option<StatusMessage> {
    match serde_json::from_slice::<StatusMessage>(bytes) {
        Ok(msg) => Some(msg),
        Err(e) => {
            log::debug!("ignoring non-status payload: {e}");
            None
        }
    }
}

pub const MISSING: &str = "--";

/// Display strings for the status bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryView {
    pub time: String,
    pub distance: String,
    pub speed: String,
    pub cadence: String,
    pub power: String,
    pub energy: String,
}

fn or_missing<T>(v: Option<T>, f: impl Fn(T) -> String) -> String {
    v.map(f).unwrap_or_else(|| MISSING.to_string())
}

pub fn format_status(data: &KettlerData) -> TelemetryView {
    TelemetryView {
        time: or_missing(data.time_elapsed.as_deref(), |t| t.to_string()),
        distance: or_missing(data.distance, |d| format!("{d:.1} km")),
        speed: or_missing(data.speed, |s| format!("{s:.1} km/h")),
        cadence: or_missing(data.cadence, |c| format!("{}", c.round())),
        power: format!(
            "{} / {} W",
            or_missing(data.real_power, |p| format!("{}", p.round())),
            or_missing(data.dest_power, |p| format!("{}", p.round())),
        ),
        energy: or_missing(data.energy, |e| format!("{} kJ", e.round())),
    }
}

/// Escape text for HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl TelemetryView {
    pub fn to_html(&self) -> String {
        format!(
            r#"<table class="statusBar">
<thead><tr>
<td>Time</td>
<td>Distance</td>
<td>Speed</td>
<td>Cadence</td>
<td>Power</td>
<td>Energy</td>
</tr></thead>
<tbody><tr>
<td>{}</td>
<td>{}</td>
<td>{}</td>
<td>{}</td>
<td>{}</td>
<td>{}</td>
</tr></tbody>
</table>"#,
            escape_html(&self.time),
            escape_html(&self.distance),
            escape_html(&self.speed),
            escape_html(&self.cadence),
            escape_html(&self.power),
            escape_html(&self.energy),
        )
    }
}
