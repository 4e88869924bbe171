//! Effort dispatch: turns sampled playback positions into exactly one
//! effort command per interval entered.

use crate::metrics::{effort_dispatch_total, publish_errors_total, Metrics};
use crate::models::PowerRange;
use crate::timeline::{EffortInterval, Timeline};
use crate::transport::EffortSink;

/// Last interval handed to the sink, by position in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Dispatched(usize),
}

pub type IntervalCallback = Box<dyn FnMut(&EffortInterval)>;

/// Compares the interval active at each tick against the last dispatched
/// one and fires on identity change. Adjacent segments with equal effort
/// are distinct intervals and each dispatch.
pub struct EffortDispatcher {
    timeline: Timeline,
    power: PowerRange,
    state: DispatchState,
    listeners: Vec<IntervalCallback>,
    metrics: Metrics,
}

impl std::fmt::Debug for EffortDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffortDispatcher")
            .field("timeline", &self.timeline)
            .field("power", &self.power)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EffortDispatcher {
    pub fn new(timeline: Timeline, power: PowerRange) -> Self {
        Self {
            timeline,
            power,
            state: DispatchState::Idle,
            listeners: Vec::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// The interval last dispatched, if any.
    pub fn current(&self) -> Option<&EffortInterval> {
        match self.state {
            DispatchState::Idle => None,
            DispatchState::Dispatched(i) => self.timeline.get(i),
        }
    }

    pub fn on_interval_changed<F>(&mut self, callback: F)
    where
        F: FnMut(&EffortInterval) + 'static,
    {
        self.listeners.push(Box::new(callback));
    }

    /// One poll tick. Returns the newly entered interval, or `None` when the
    /// active interval is unchanged (or `now` resolves to nothing).
    ///
    /// A failing sink is logged and counted; the state still advances.
    pub fn poll(&mut self, now: f64, sink: &mut dyn EffortSink) -> Option<EffortInterval> {
        let index = self.timeline.resolve_index(now)?;
        if self.state == DispatchState::Dispatched(index) {
            return None;
        }

        let interval = *self.timeline.get(index)?;
        log::info!(
            "t={now:.1}s -> interval #{index} ({}) [{:.1}, {})",
            interval.effort,
            interval.begin,
            interval.end.map_or("∞".to_string(), |e| format!("{e:.1}")),
        );

        if let Err(e) = sink.set_effort(interval.effort, &self.power) {
            log::warn!("effort {} not delivered: {e}", interval.effort);
            publish_errors_total(&self.metrics).inc();
        }
        effort_dispatch_total(&self.metrics, interval.effort.kind()).inc();

        self.state = DispatchState::Dispatched(index);
        for cb in self.listeners.iter_mut() {
            cb(&interval);
        }
        Some(interval)
    }

    /// Drains a tick source; returns the number of dispatches.
    pub fn run<I>(&mut self, ticks: I, sink: &mut dyn EffortSink) -> usize
    where
        I: IntoIterator<Item = f64>,
    {
        let mut dispatched = 0;
        for t in ticks {
            if self.poll(t, sink).is_some() {
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Forget the last dispatch, e.g. after seeking backwards.
    pub fn reset(&mut self) {
        self.state = DispatchState::Idle;
    }
}
