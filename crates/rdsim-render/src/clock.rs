//! Time sources for the render loop.

use std::collections::VecDeque;
use std::time::Instant;

/// Monotonic time source, in seconds.
pub trait Clock {
    /// Current time. Only differences between calls are meaningful.
    fn now_seconds(&mut self) -> f64;
}

/// Wall clock.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_seconds(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock that advances by a scripted amount on every read.
///
/// Scheduled ticks are consumed first; afterwards every read advances by the
/// default tick.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: f64,
    tick: f64,
    schedule: VecDeque<f64>,
}

impl ManualClock {
    /// Clock advancing by `tick` seconds per read.
    pub fn new(tick: f64) -> Self {
        Self {
            now: 0.0,
            tick,
            schedule: VecDeque::new(),
        }
    }

    /// Clock that first advances by each of `ticks`, then by `tick`.
    pub fn with_schedule(ticks: impl IntoIterator<Item = f64>, tick: f64) -> Self {
        Self {
            now: 0.0,
            tick,
            schedule: ticks.into_iter().collect(),
        }
    }
}

impl Clock for ManualClock {
    fn now_seconds(&mut self) -> f64 {
        self.now += self.schedule.pop_front().unwrap_or(self.tick);
        self.now
    }
}
