//! Composition of one workout ride: timeline + dispatcher + outbound sink,
//! plus routing of inbound telemetry to registered callbacks.

use chrono::{DateTime, Utc};

use crate::dispatcher::{DispatchState, EffortDispatcher};
use crate::metrics::{status_decode_errors_total, telemetry_messages_total, Metrics};
use crate::models::{PowerRange, WorkoutDefinition};
use crate::telemetry::{format_status, parse_status_message, KettlerData, TelemetryView};
use crate::timeline::{build_timeline, progress_view, EffortInterval, IntervalProgress, Timeline};
use crate::topics::{topic_matches, Topics};
use crate::transport::EffortSink;

pub type TelemetryCallback = Box<dyn FnMut(&TelemetryView, &KettlerData)>;

pub struct TrainerSession<S: EffortSink> {
    workout_name: String,
    dispatcher: EffortDispatcher,
    sink: S,
    topics: Topics,
    telemetry_listeners: Vec<TelemetryCallback>,
    metrics: Metrics,
    started_at: DateTime<Utc>,
}

impl<S: EffortSink> std::fmt::Debug for TrainerSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainerSession")
            .field("workout_name", &self.workout_name)
            .field("dispatcher", &self.dispatcher)
            .field("topics", &self.topics)
            .field("started_at", &self.started_at)
            .finish()
    }
}

impl<S: EffortSink> TrainerSession<S> {
    pub fn new(workout: &WorkoutDefinition, power: PowerRange, sink: S, topics: Topics) -> Self {
        Self::with_metrics(workout, power, sink, topics, Metrics::new())
    }

    pub fn with_metrics(
        workout: &WorkoutDefinition,
        power: PowerRange,
        sink: S,
        topics: Topics,
        metrics: Metrics,
    ) -> Self {
        let timeline = build_timeline(workout);
        log::info!(
            "session '{}' ready: {} intervals, ends at {:.0}s",
            workout.name,
            timeline.len(),
            timeline.final_time()
        );
        Self {
            workout_name: workout.name.clone(),
            dispatcher: EffortDispatcher::new(timeline, power).with_metrics(metrics.clone()),
            sink,
            topics,
            telemetry_listeners: Vec::new(),
            metrics,
            started_at: Utc::now(),
        }
    }

    pub fn workout_name(&self) -> &str {
        &self.workout_name
    }

    pub fn timeline(&self) -> &Timeline {
        self.dispatcher.timeline()
    }

    pub fn dispatch_state(&self) -> DispatchState {
        self.dispatcher.state()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn on_interval_changed<F>(&mut self, callback: F)
    where
        F: FnMut(&EffortInterval) + 'static,
    {
        self.dispatcher.on_interval_changed(callback);
    }

    pub fn on_telemetry<F>(&mut self, callback: F)
    where
        F: FnMut(&TelemetryView, &KettlerData) + 'static,
    {
        self.telemetry_listeners.push(Box::new(callback));
    }

    /// One poll at playback position `now`.
    pub fn tick(&mut self, now: f64) -> Option<EffortInterval> {
        self.dispatcher.poll(now, &mut self.sink)
    }

    /// Poll every position the tick source yields; returns dispatch count.
    pub fn run<I>(&mut self, ticks: I) -> usize
    where
        I: IntoIterator<Item = f64>,
    {
        self.dispatcher.run(ticks, &mut self.sink)
    }

    /// Playback jumped backwards: the next tick dispatches again.
    pub fn seek(&mut self) {
        self.dispatcher.reset();
    }

    pub fn progress(&self, now: f64) -> Vec<IntervalProgress> {
        progress_view(self.dispatcher.timeline(), now)
    }

    /// Route one inbound bus message. Only Kettler data is rendered; all
    /// other topics and unparseable payloads are ignored.
    pub fn handle_message(&mut self, topic: &str, payload: &[u8]) -> Option<TelemetryView> {
        if !topic_matches(&self.topics.kettler_data(), topic) {
            log::debug!("{topic}: {}", String::from_utf8_lossy(payload));
            return None;
        }
        let Some(msg) = parse_status_message(payload) else {
            status_decode_errors_total(&self.metrics).inc();
            return None;
        };

        let view = format_status(&msg.payload);
        telemetry_messages_total(&self.metrics).inc();
        for cb in self.telemetry_listeners.iter_mut() {
            cb(&view, &msg.payload);
        }
        Some(view)
    }

    /// End the session and hand back the sink.
    pub fn finish(self) -> S {
        let elapsed = Utc::now() - self.started_at;
        log::info!(
            "session '{}' finished after {}s",
            self.workout_name,
            elapsed.num_seconds()
        );
        self.sink
    }
}
