//! Bounded frame relay between the capture task and the viewer

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::queue::ArrayQueue;
use crossbeam::utils::CachePadded;

use crate::capture::Frame;

/// Fixed-capacity frame buffer with drop-oldest overflow semantics.
///
/// Shared between one producer (the capture task) and one consumer (the
/// viewer tick). `produce` never blocks and never errors: on a full buffer
/// the oldest frame is evicted to make room for the newest. `consume_latest`
/// drains any pending backlog and hands back only the newest frame, so the
/// consumer always observes the most recently captured frame available.
pub struct FrameRelay {
    queue: ArrayQueue<Frame>,

    /// Statistics
    stats: CachePadded<Stats>,
}

#[derive(Default)]
struct Stats {
    frames_produced: AtomicUsize,
    frames_consumed: AtomicUsize,
    frames_dropped: AtomicUsize,
    frames_skipped: AtomicUsize,
}

/// Relay counters: produced, consumed, dropped on overflow, and backlog
/// skipped over by `consume_latest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub produced: usize,
    pub consumed: usize,
    pub dropped: usize,
    pub skipped: usize,
}

impl FrameRelay {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            stats: CachePadded::new(Stats::default()),
        }
    }

    /// Producer: insert a frame, evicting the oldest one when full.
    /// Overflow is policy, not an error.
    pub fn produce(&self, frame: Frame) {
        if self.queue.force_push(frame).is_some() {
            self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.frames_produced.fetch_add(1, Ordering::Relaxed);
    }

    /// Consumer: drain pending frames and return the newest, or `None`
    /// when the buffer is empty. Never blocks.
    pub fn consume_latest(&self) -> Option<Frame> {
        let mut latest = None;
        while let Some(frame) = self.queue.pop() {
            if latest.replace(frame).is_some() {
                self.stats.frames_skipped.fetch_add(1, Ordering::Relaxed);
            }
        }

        if latest.is_some() {
            self.stats.frames_consumed.fetch_add(1, Ordering::Relaxed);
        }
        latest
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            produced: self.stats.frames_produced.load(Ordering::Relaxed),
            consumed: self.stats.frames_consumed.load(Ordering::Relaxed),
            dropped: self.stats.frames_dropped.load(Ordering::Relaxed),
            skipped: self.stats.frames_skipped.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    fn pop_oldest(&self) -> Option<Frame> {
        self.queue.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FrameSource, SyntheticSource};

    fn frames(n: u64) -> Vec<Frame> {
        let mut source = SyntheticSource::new(4, 4);
        (0..n).map(|_| source.next_frame().unwrap()).collect()
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let relay = FrameRelay::new(3);
        for frame in frames(10) {
            relay.produce(frame);
            assert!(relay.len() <= 3);
        }
        assert_eq!(relay.len(), 3);
        assert_eq!(relay.stats().dropped, 7);
    }

    #[test]
    fn overflow_drops_oldest_in_capture_order() {
        let relay = FrameRelay::new(3);
        for frame in frames(5) {
            relay.produce(frame);
        }

        // r1, r2 evicted; r3, r4, r5 remain in capture order
        let kept: Vec<u64> = std::iter::from_fn(|| relay.pop_oldest())
            .map(|f| f.meta.sequence)
            .collect();
        assert_eq!(kept, vec![3, 4, 5]);
    }

    #[test]
    fn produce_on_full_buffer_returns_immediately() {
        // No consumer exists at all; produce must still complete
        let relay = FrameRelay::new(1);
        for frame in frames(100) {
            relay.produce(frame);
        }
        assert_eq!(relay.len(), 1);
    }

    #[test]
    fn consume_latest_returns_newest_and_discards_backlog() {
        let relay = FrameRelay::new(5);
        for frame in frames(3) {
            relay.produce(frame);
        }

        let latest = relay.consume_latest().unwrap();
        assert_eq!(latest.meta.sequence, 3);

        // Backlog was discarded, not queued for later
        assert!(relay.consume_latest().is_none());
        let stats = relay.stats();
        assert_eq!(stats.consumed, 1);
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn consume_latest_on_empty_is_none() {
        let relay = FrameRelay::new(3);
        assert!(relay.consume_latest().is_none());
        assert_eq!(relay.stats().consumed, 0);
    }
}
