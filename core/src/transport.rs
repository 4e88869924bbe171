//! Outbound side of the message bus.
//!
//! The MQTT connection itself (connect, reconnect, subscribe) lives outside
//! this crate; everything here only needs something that can `publish`.

use chrono::Utc;
use serde_json::json;

use crate::error::{K2Error, Result};
use crate::models::{Effort, PowerRange};
use crate::route::DistanceTrackInfo;
use crate::topics::Topics;

pub trait Transport {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<()> {
        (**self).publish(topic, payload)
    }
}

/// Keeps every publish in memory. `fail_next` makes the next publish error.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    pub published: Vec<(String, String)>,
    pub fail_next: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payloads_for(&self, topic: &str) -> Vec<&str> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.as_str())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(K2Error::Publish {
                topic: topic.to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        self.published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

/// Dry-run transport: writes each publish to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

impl Transport for LogTransport {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<()> {
        log::info!("[MQTT] publish {topic} <- {payload}");
        Ok(())
    }
}

/// Receiver of effort changes.
pub trait EffortSink {
    /// Lead-in reached: begin the ride log.
    fn start_log(&mut self) -> Result<()>;
    /// Workout finished: close the ride log.
    fn close_log(&mut self) -> Result<()>;
    fn set_power(&mut self, watts: f64) -> Result<()>;

    /// Rider position on a route; `None` clears it. Ignored by default.
    fn set_location(&mut self, info: Option<&DistanceTrackInfo>) -> Result<()> {
        let _ = info;
        Ok(())
    }

    /// Sentinels go to the log hooks, numeric levels become a power target.
    fn set_effort(&mut self, effort: Effort, power: &PowerRange) -> Result<()> {
        match effort {
            Effort::Start => self.start_log(),
            Effort::End => self.close_log(),
            Effort::Level(level) => self.set_power(power.target_power(level)),
        }
    }
}

/// Publishes effort changes as K2 bus commands.
#[derive(Debug)]
pub struct K2Client<T: Transport> {
    transport: T,
    topics: Topics,
}

impl<T: Transport> K2Client<T> {
    pub fn new(transport: T, topics: Topics) -> Self {
        Self { transport, topics }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: Transport> EffortSink for K2Client<T> {
    fn start_log(&mut self) -> Result<()> {
        log::info!("StartLog");
        let topic = self.topics.logger_start();
        self.transport.publish(&topic, r#"{"logLocation": false}"#)
    }

    fn close_log(&mut self) -> Result<()> {
        log::info!("CloseLog");
        let topic = self.topics.logger_stop();
        self.transport.publish(&topic, "")
    }

    fn set_power(&mut self, watts: f64) -> Result<()> {
        let topic = self.topics.power_command();
        self.transport.publish(&topic, &format!("{watts}"))
    }

    fn set_location(&mut self, info: Option<&DistanceTrackInfo>) -> Result<()> {
        let topic = self.topics.controller_location();
        match info {
            Some(info) => {
                let body = json!({"payload": info, "_timestamp": Utc::now().timestamp()});
                self.transport.publish(&topic, &serde_json::to_string(&body)?)
            }
            None => self.transport.publish(&topic, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_publishes_decimal_power() {
        let mut client = K2Client::new(RecordingTransport::new(), Topics::new("k2"));
        let range = PowerRange { min: 80.0, max: 180.0 };
        client.set_effort(Effort::Level(5.0), &range).unwrap();
        client.set_effort(Effort::Level(2.5), &range).unwrap();
        assert_eq!(
            client.transport().payloads_for("k2/kettler/cmnd/power"),
            vec!["130", "105"]
        );
    }

    #[test]
    fn sentinels_hit_logger_topics_only() {
        let mut client = K2Client::new(RecordingTransport::new(), Topics::new("k2"));
        let range = PowerRange::default();
        client.set_effort(Effort::Start, &range).unwrap();
        client.set_effort(Effort::End, &range).unwrap();
        let t = client.transport();
        assert!(t.payloads_for("k2/kettler/cmnd/power").is_empty());
        assert_eq!(t.payloads_for("k2/logger/cmnd/start").len(), 1);
        assert_eq!(t.payloads_for("k2/logger/cmnd/stop"), vec![""]);
    }

    #[test]
    fn failed_publish_is_reported() {
        let mut t = RecordingTransport { fail_next: true, ..Default::default() };
        assert!(matches!(t.publish("a", "b"), Err(K2Error::Publish { .. })));
        assert!(t.publish("a", "b").is_ok());
        assert_eq!(t.published.len(), 1);
    }
}
