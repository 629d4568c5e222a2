pub mod client;
pub mod types;

pub use client::{GatewayClient, InferenceError};
pub use types::{BoundingBox, FaceDetection, ProcessFrameResponse};
