use std::time::Duration;

/// Elapsed-time tracker for one animation loop.
///
/// The start timestamp is latched on the first tick, so the first tick always observes
/// `0.0` ms regardless of when the host delivers it.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    start: Option<Duration>,
    last_elapsed_ms: f64,
}

impl FrameClock {
    /// A clock that has not ticked yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to host timestamp `now` and return milliseconds since the first tick.
    ///
    /// Timestamps earlier than the latched start clamp to zero.
    pub fn tick(&mut self, now: Duration) -> f64 {
        let start = *self.start.get_or_insert(now);
        let elapsed_ms = now.saturating_sub(start).as_nanos() as f64 / 1_000_000.0;
        self.last_elapsed_ms = elapsed_ms;
        elapsed_ms
    }

    /// Host timestamp latched by the first tick.
    pub fn start(&self) -> Option<Duration> {
        self.start
    }

    /// Elapsed milliseconds returned by the last tick.
    pub fn last_elapsed_ms(&self) -> f64 {
        self.last_elapsed_ms
    }
}
