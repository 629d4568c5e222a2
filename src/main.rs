//! Lectern: live webcam tester for the classroom gateway
//!
//! Captures webcam frames into a bounded relay and forwards the newest one
//! to the process-frame endpoint at a fixed cadence. Given an image path
//! argument it sends that single image instead of opening a camera.

use std::sync::Arc;

use color_eyre::Result;
use time::OffsetDateTime;
use tracing::info;

use lectern::capture::V4l2Capture;
use lectern::display::Viewer;
use lectern::inference::GatewayClient;
use lectern::pipeline::{CaptureSession, FrameRelay};
use lectern::{utils, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter("lectern=info")
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    info!("Lectern launching...");

    let config = Config::load()?;
    lectern::CONFIG.store(Arc::new(config.clone()));

    let client = GatewayClient::new(&config.gateway)?;

    // One-shot mode: send a stored image through the gateway and exit
    if let Some(path) = std::env::args().nth(1) {
        return oneshot(&client, &path).await;
    }

    // Auto-detect capture device if needed
    let device = if config.capture.device.path.is_empty() {
        utils::auto_detect_device().await?
    } else {
        config.capture.device.clone()
    };

    info!("Using capture device: {:?}", device);

    let mut capture_config = config.capture.clone();
    capture_config.format = device.format;
    capture_config.device = device;
    let fps = capture_config.fps;

    let mut capture = V4l2Capture::new(capture_config)?;
    capture.start_stream()?;

    let relay = Arc::new(FrameRelay::new(config.relay.capacity));
    let session = CaptureSession::start(capture, relay.clone(), fps);

    Viewer::new(relay, client, &config).run(session).await?;

    info!("Lectern shutting down");
    Ok(())
}

async fn oneshot(client: &GatewayClient, path: &str) -> Result<()> {
    info!("Sending {} to the gateway", path);

    let jpeg = bytes::Bytes::from(std::fs::read(path)?);
    let result = client.process_frame(jpeg, OffsetDateTime::now_utc()).await?;

    println!(
        "faces: {} (known {}, new {})",
        result.total_detections, result.known_faces, result.new_faces
    );
    println!("focused: {} / unfocused: {}", result.focused, result.unfocused);
    println!("hands raised: {}", result.hands_raised);
    for face in &result.faces {
        let b = face.bounding_box;
        println!(
            "  {} @ ({}, {}) {}x{} attention={} hand_raised={}",
            face.person_id, b.x, b.y, b.width, b.height, face.attention_status, face.is_hand_raised
        );
    }
    Ok(())
}
