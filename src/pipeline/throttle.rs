use std::time::{Duration, Instant};

/// Gates how often consumed frames are forwarded to the gateway,
/// independent of the display refresh rate.
///
/// The caller passes the current instant explicitly so the gate can be
/// driven by a simulated clock in tests.
pub struct Throttle {
    interval: Duration,
    last_forwarded: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_forwarded: None,
        }
    }

    /// True when at least `interval` has elapsed since the last accepted
    /// call (or none was made yet). Accepting records `now`.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_forwarded {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_forwarded = Some(now);
                true
            }
        }
    }
}
