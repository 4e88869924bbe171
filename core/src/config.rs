use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{from_json_str, Result};
use crate::models::{PowerRange, WorkoutDefinition};
use crate::route::GradePowerMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MqttConfig {
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub base_topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "ws://localhost:8083".to_string(),
            username: String::new(),
            password: String::new(),
            base_topic: "k2".to_string(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct K2Config {
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub power: PowerRange,
    #[serde(default)]
    pub grade_power: GradePowerMap,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub workouts: Vec<WorkoutDefinition>,
}

impl Default for K2Config {
    fn default() -> Self {
        Self {
            mqtt: MqttConfig::default(),
            power: PowerRange::default(),
            grade_power: GradePowerMap::default(),
            poll_interval_ms: default_poll_interval_ms(),
            workouts: Vec::new(),
        }
    }
}

impl K2Config {
    pub fn workout(&self, index: usize) -> Option<&WorkoutDefinition> {
        self.workouts.get(index)
    }
}

/// Read the config from disk (JSON).
/// A missing file yields the default config.
pub fn load_config(path: impl AsRef<Path>) -> Result<K2Config> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config: K2Config = from_json_str(&contents)?;
        log::info!(
            "config loaded from {} ({} workouts)",
            path.display(),
            config.workouts.len()
        );
        Ok(config)
    } else {
        log::warn!("no config at {}, using defaults", path.display());
        Ok(K2Config::default())
    }
}

/// Write the config to disk as pretty JSON.
pub fn save_config(config: &K2Config, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    log::info!("config saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: K2Config =
            from_json_str(r#"{"mqtt":{"host":"ws://bike:8083","baseTopic":"k2"}}"#).unwrap();
        assert_eq!(cfg.power, PowerRange { min: 80.0, max: 180.0 });
        assert_eq!(cfg.poll_interval_ms, 500);
        assert_eq!(cfg.grade_power.max_grade, 0.15);
        assert!(cfg.workouts.is_empty());
    }
}
