pub mod capture;
pub mod display;
pub mod inference;
pub mod pipeline;
pub mod utils;

use arc_swap::ArcSwap;
use capture::frame::PixelFormat;
use color_eyre::Result;
use serde::{Deserialize, Serialize};

use crate::utils::FoundDevice;

/// Global configuration that can be atomically swapped at runtime
pub static CONFIG: once_cell::sync::Lazy<ArcSwap<Config>> =
    once_cell::sync::Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub relay: RelayConfig,
    pub viewer: ViewerConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub device: FoundDevice,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub format: PixelFormat,
    pub buffer_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Maximum number of buffered frames before drop-oldest kicks in
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Display refresh tick in milliseconds
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Full URL of the process-frame endpoint
    pub endpoint: String,
    /// Lecture identifier sent with every forwarded frame
    pub lecture_id: String,
    /// Minimum seconds between forwarded frames
    pub interval_secs: f64,
    /// Bound on a single gateway call
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from `lectern.toml` (if present) with
    /// `LECTERN_`-prefixed environment overrides, on top of the defaults.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("lectern").required(false))
            .add_source(config::Environment::with_prefix("LECTERN").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: FoundDevice::new("/dev/video0".into(), PixelFormat::Mjpeg),
            width: 800,
            height: 600,
            fps: 30,
            format: PixelFormat::Mjpeg,
            buffer_count: 4,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { capacity: 30 }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { tick_ms: 33 } // ~30fps refresh
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/api/process-frame".into(),
            lecture_id: "demo-lecture".into(),
            interval_secs: 1.0,
            request_timeout_secs: 5,
        }
    }
}
