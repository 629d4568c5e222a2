//! Capture session: one stop signal, one capture task, one relay.
//!
//! A session is an explicit object created per start and discarded after
//! stop; nothing about it is process-wide. The stop signal is created
//! fresh for each session and set at most once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::capture::FrameSource;
use crate::pipeline::relay::FrameRelay;

/// Lifecycle notifications from the capture task to the viewer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started,
    /// A mid-session device read failed; the loop has exited. Frames
    /// already buffered remain consumable.
    ReadFailed(String),
    Stopped,
}

pub struct CaptureSession {
    stop: Arc<AtomicBool>,
    events: flume::Receiver<SessionEvent>,
    handle: JoinHandle<()>,
}

impl CaptureSession {
    /// Spawn the capture task. The source is moved into the task and its
    /// device handle is released when the loop exits, on stop or on a
    /// read failure.
    pub fn start(
        mut source: impl FrameSource + 'static,
        relay: Arc<FrameRelay>,
        fps: u32,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let (tx, rx) = flume::bounded(8);

        let handle = tokio::spawn(async move {
            let pace = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
            let _ = tx.send(SessionEvent::Started);
            info!("Capture session started, pacing at {}fps", fps.max(1));

            while !flag.load(Ordering::Relaxed) {
                match source.next_frame() {
                    Ok(frame) => relay.produce(frame),
                    Err(e) => {
                        error!("Capture read failed: {}", e);
                        let _ = tx.send(SessionEvent::ReadFailed(e.to_string()));
                        break;
                    }
                }
                tokio::time::sleep(pace).await;
            }

            let _ = tx.send(SessionEvent::Stopped);
            info!("Capture session stopped");
        });

        Self {
            stop,
            events: rx,
            handle,
        }
    }

    /// Idempotent, level-triggered stop. The capture loop observes it on
    /// its next iteration; calling it after the loop already exited is a
    /// no-op.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopping(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn events(&self) -> &flume::Receiver<SessionEvent> {
        &self.events
    }

    /// Wait for the capture task to exit. Call `stop` first.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SyntheticSource;

    #[tokio::test]
    async fn session_produces_until_stopped() {
        let relay = Arc::new(FrameRelay::new(30));
        let session = CaptureSession::start(SyntheticSource::new(4, 4), relay.clone(), 100);

        tokio::time::sleep(Duration::from_millis(100)).await;
        session.stop();
        session.join().await;

        let produced = relay.stats().produced;
        assert!(produced > 0, "capture task never produced a frame");

        // No frames after the loop exited
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(relay.stats().produced, produced);
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_stays_set() {
        let relay = Arc::new(FrameRelay::new(4));
        let session = CaptureSession::start(SyntheticSource::new(4, 4), relay, 100);

        session.stop();
        session.stop();
        assert!(session.is_stopping());
        session.join().await;
    }

    #[tokio::test]
    async fn read_failure_ends_the_session_gracefully() {
        struct FailingSource;
        impl crate::capture::FrameSource for FailingSource {
            fn next_frame(&mut self) -> color_eyre::Result<crate::capture::Frame> {
                Err(color_eyre::eyre::eyre!("device unplugged"))
            }
        }

        let relay = Arc::new(FrameRelay::new(4));
        let session = CaptureSession::start(FailingSource, relay, 100);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(session.is_finished());

        let events: Vec<SessionEvent> = session.events().drain().collect();
        assert!(matches!(events.first(), Some(SessionEvent::Started)));
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::ReadFailed(_))));
        assert!(matches!(events.last(), Some(SessionEvent::Stopped)));
    }

    #[tokio::test]
    async fn buffered_frames_remain_consumable_after_stop() {
        let relay = Arc::new(FrameRelay::new(30));
        let session = CaptureSession::start(SyntheticSource::new(4, 4), relay.clone(), 200);

        tokio::time::sleep(Duration::from_millis(80)).await;
        session.stop();
        session.join().await;

        assert!(relay.consume_latest().is_some());
    }
}
