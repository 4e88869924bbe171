//! Grade driven route ride: every Kettler reading carries the distance
//! ridden so far, which is mapped onto the track to set resistance from
//! the local grade and publish the rider position.

use crate::metrics::{
    publish_errors_total, status_decode_errors_total, telemetry_messages_total, Metrics,
};
use crate::route::{DistanceTrackInfo, GradePowerMap, Track};
use crate::telemetry::{parse_status_message, KettlerData};
use crate::topics::{topic_matches, Topics};
use crate::transport::EffortSink;

pub struct RouteRide {
    track: Track,
    grade_power: GradePowerMap,
    topics: Topics,
    finished: bool,
    metrics: Metrics,
}

impl std::fmt::Debug for RouteRide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRide")
            .field("distance", &self.track.total_distance())
            .field("grade_power", &self.grade_power)
            .field("finished", &self.finished)
            .finish()
    }
}

impl RouteRide {
    pub fn new(track: Track, grade_power: GradePowerMap, topics: Topics) -> Self {
        log::info!("route ride over {:.0}m", track.total_distance());
        Self { track, grade_power, topics, finished: false, metrics: Metrics::new() }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// The end of the track has been reached; later readings are ignored.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Begin the ride log before the first reading.
    pub fn start(&mut self, sink: &mut dyn EffortSink) {
        self.finished = false;
        if let Err(e) = sink.start_log() {
            self.publish_failed("start log", e);
        }
    }

    /// One Kettler reading. Returns the position it maps to, or `None`
    /// when the reading has no `calcDistance` or the ride is over.
    pub fn on_telemetry(
        &mut self,
        data: &KettlerData,
        sink: &mut dyn EffortSink,
    ) -> Option<DistanceTrackInfo> {
        if self.finished {
            return None;
        }
        let Some(distance) = data.calc_distance else {
            log::debug!("kettler reading without calcDistance");
            return None;
        };

        let info = self.track.info_at_distance(distance);
        if let Err(e) = sink.set_location(Some(&info)) {
            self.publish_failed("location", e);
        }
        let watts = self.grade_power.power_for_grade(info.grade).trunc();
        if let Err(e) = sink.set_power(watts) {
            self.publish_failed("power", e);
        }

        if info.progress >= 1.0 {
            log::info!("end of track at {distance:.0}m");
            if let Err(e) = sink.close_log() {
                self.publish_failed("close log", e);
            }
            if let Err(e) = sink.set_location(None) {
                self.publish_failed("clear location", e);
            }
            self.finished = true;
        }
        Some(info)
    }

    /// Route one inbound bus message; only Kettler data moves the rider.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        sink: &mut dyn EffortSink,
    ) -> Option<DistanceTrackInfo> {
        if !topic_matches(&self.topics.kettler_data(), topic) {
            return None;
        }
        let Some(msg) = parse_status_message(payload) else {
            status_decode_errors_total(&self.metrics).inc();
            return None;
        };
        telemetry_messages_total(&self.metrics).inc();
        self.on_telemetry(&msg.payload, sink)
    }

    fn publish_failed(&self, what: &str, e: crate::error::K2Error) {
        log::warn!("{what} not delivered: {e}");
        publish_errors_total(&self.metrics).inc();
    }
}
