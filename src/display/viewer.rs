//! Foreground viewer loop.
//!
//! Runs on a fixed refresh tick: pulls the newest frame from the relay,
//! refreshes the displayed state, and forwards at most one frame per
//! throttle interval to the gateway. Gateway failures become status text;
//! they never touch the capture task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use tracing::{info, trace, warn};

use crate::capture::codec;
use crate::display::status::{render, ViewerState};
use crate::inference::GatewayClient;
use crate::pipeline::{CaptureSession, FrameRelay, SessionEvent, Throttle};
use crate::Config;

pub struct Viewer {
    relay: Arc<FrameRelay>,
    client: GatewayClient,
    throttle: Throttle,
    state: ViewerState,
    refresh: Duration,
    last_line: String,
}

impl Viewer {
    pub fn new(relay: Arc<FrameRelay>, client: GatewayClient, config: &Config) -> Self {
        Self {
            relay,
            client,
            throttle: Throttle::new(Duration::from_secs_f64(config.gateway.interval_secs)),
            state: ViewerState::default(),
            refresh: Duration::from_millis(config.viewer.tick_ms),
            last_line: String::new(),
        }
    }

    /// Drive the display until the session ends and the relay is drained.
    /// Ctrl-c requests a stop; the loop then drains what is left.
    pub async fn run(mut self, session: CaptureSession) -> Result<()> {
        let events = session.events().clone();
        let mut ticker = tokio::time::interval(self.refresh);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(&events).await;
                    if session.is_finished() && self.relay.is_empty() {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Stop requested");
                    session.stop();
                }
            }
        }

        session.join().await;

        let stats = self.relay.stats();
        info!(
            "Relay totals: produced {} consumed {} dropped {} skipped {}",
            stats.produced, stats.consumed, stats.dropped, stats.skipped
        );
        Ok(())
    }

    async fn tick(&mut self, events: &flume::Receiver<SessionEvent>) {
        while let Ok(event) = events.try_recv() {
            match event {
                SessionEvent::Started => info!("Session running"),
                SessionEvent::ReadFailed(reason) => {
                    self.state.session_ended = Some(reason);
                }
                SessionEvent::Stopped => trace!("Capture task exited"),
            }
        }

        if let Some(frame) = self.relay.consume_latest() {
            self.state.frame_sequence = frame.meta.sequence;
            self.state.frame_dims = (frame.meta.width, frame.meta.height);

            // The throttle is consulted only on ticks that yielded a frame,
            // so a cadence boundary that lands on an empty buffer skips
            // that tick instead of deferring the call.
            if self.throttle.ready(Instant::now()) {
                self.forward(&frame).await;
            }
        }

        let line = render(&self.state);
        if line != self.last_line {
            info!("{}", line);
            self.last_line = line;
        }
    }

    async fn forward(&mut self, frame: &crate::capture::Frame) {
        let jpeg = match codec::to_jpeg(frame) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!("Frame encode failed: {}", e);
                self.state.last_error = Some(format!("encode failed: {}", e));
                return;
            }
        };

        self.state.last_forwarded_at = Some(Instant::now());
        match self.client.process_frame(jpeg, frame.meta.captured_at).await {
            Ok(result) => {
                self.state.last_error = None;
                self.state.last_result = Some(result);
            }
            Err(e) => {
                warn!("Gateway call failed: {}", e);
                self.state.last_error = Some(e.to_string());
            }
        }
    }
}
