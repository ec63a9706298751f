//! Minimum-interval pacing between consecutive requests

use std::time::{Duration, Instant};

/// Enforces a minimum gap between marked events.
///
/// Call [`Throttle::wait`] before a request and [`Throttle::mark`] after
/// the work it paced completed. Only marked events count, so failed
/// requests do not delay the next attempt.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Time still to wait before the next request is allowed
    pub fn remaining(&self) -> Duration {
        match self.last {
            Some(last) => self.interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Sleep until the interval since the last mark has elapsed
    pub fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }

    /// Record that a paced event just finished
    pub fn mark(&mut self) {
        self.last = Some(Instant::now());
    }
}
