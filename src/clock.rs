//! Frame timestamps.

use chrono::{DateTime, TimeDelta, Utc};

/// Supplies the timestamp of each processed frame. Called once per frame.
pub trait Clock {
    fn now(&mut self) -> DateTime<Utc>;
}

/// Wall-clock time at the moment a frame is processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Video-timeline time: each frame advances a fixed period from `start`.
///
/// Timestamps past the end of the representable range stay pinned at
/// [`DateTime::<Utc>::MAX_UTC`].
#[derive(Debug, Clone)]
pub struct FrameRateClock {
    start: DateTime<Utc>,
    period: TimeDelta,
    ticks: i32,
}

impl FrameRateClock {
    /// `fps` must be positive; callers validate it through the session config.
    pub fn new(start: DateTime<Utc>, fps: f64) -> Self {
        let period = TimeDelta::nanoseconds((1e9 / fps).round() as i64);
        Self {
            start,
            period,
            ticks: 0,
        }
    }

    pub fn period(&self) -> TimeDelta {
        self.period
    }
}

impl Clock for FrameRateClock {
    fn now(&mut self) -> DateTime<Utc> {
        let at = self
            .period
            .checked_mul(self.ticks)
            .and_then(|offset| self.start.checked_add_signed(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.ticks = self.ticks.saturating_add(1);
        at
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&mut self) -> DateTime<Utc> {
        (**self).now()
    }
}
