/// Frame-rate ceiling for the render loop
use std::time::{Duration, Instant};

/// Decides when the next frame may be rendered.
///
/// Events are still polled every loop iteration; only render and present are
/// skipped until a full frame interval has passed since the last rendered
/// frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            interval: Duration::from_nanos(1_000_000_000 / u64::from(frame_rate.max(1))),
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true (and records `now`) if a frame is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Earliest instant at which the next frame is due.
    pub fn next_frame(&self, now: Instant) -> Instant {
        match self.last {
            Some(last) => last + self.interval,
            None => now,
        }
    }
}
