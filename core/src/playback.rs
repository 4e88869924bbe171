//! Playback clock and tick sources for the effort dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Player states as reported by the video player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Unstarted,
    Playing,
    Paused,
    Buffering,
    Ended,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

/// Current position of the video player.
pub trait PlaybackClock {
    /// Seconds, fractional.
    fn current_time(&self) -> f64;
    fn state(&self) -> PlaybackState;
}

/// Shared flag that stops a [`PollingTicks`] before its next sample.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Real tick source: samples the clock once per `period` while it is
/// playing. Ends when the player leaves `Playing` or the token is cancelled.
#[derive(Debug)]
pub struct PollingTicks<C: PlaybackClock> {
    clock: C,
    period: Duration,
    cancel: CancelToken,
    first: bool,
}

impl<C: PlaybackClock> PollingTicks<C> {
    pub fn new(clock: C, period: Duration, cancel: CancelToken) -> Self {
        Self { clock, period, cancel, first: true }
    }
}

impl<C: PlaybackClock> Iterator for PollingTicks<C> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if !self.first {
            std::thread::sleep(self.period);
        }
        self.first = false;

        if self.cancel.is_cancelled() || !self.clock.state().is_playing() {
            return None;
        }
        Some(self.clock.current_time())
    }
}

/// Clock that replays a fixed series of positions; each read of
/// `current_time` advances to the next one. Reports `Ended` afterwards.
#[derive(Debug, Clone)]
pub struct ScriptedClock {
    times: Vec<f64>,
    pos: std::cell::Cell<usize>,
}

impl ScriptedClock {
    pub fn new(times: Vec<f64>) -> Self {
        Self { times, pos: std::cell::Cell::new(0) }
    }
}

impl PlaybackClock for ScriptedClock {
    fn current_time(&self) -> f64 {
        let i = self.pos.get();
        self.pos.set(i + 1);
        self.times
            .get(i)
            .or_else(|| self.times.last())
            .copied()
            .unwrap_or(0.0)
    }

    fn state(&self) -> PlaybackState {
        if self.pos.get() < self.times.len() {
            PlaybackState::Playing
        } else {
            PlaybackState::Ended
        }
    }
}

/// Evenly spaced synthetic positions `from, from+step, …` up to and
/// including `until`.
pub fn synthetic_ticks(from: f64, until: f64, step: f64) -> impl Iterator<Item = f64> + Clone {
    let step = if step > 0.0 { step } else { DEFAULT_POLL_INTERVAL.as_secs_f64() };
    let n = ((until - from) / step).floor().max(-1.0) as i64;
    (0..=n).map(move |i| from + i as f64 * step)
}
