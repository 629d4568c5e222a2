//! Frame source seam between the capture session and the device backend.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use color_eyre::Result;
use time::OffsetDateTime;

use crate::capture::frame::{Frame, FrameMetadata, PixelFormat};

/// Anything that can yield timestamped frames to a capture session.
///
/// A failed read ends the session; sources are not expected to recover.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Frame>;
}

/// In-memory source producing solid RGB frames at whatever rate it is
/// polled. Used by the pipeline tests and for running without a camera.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    sequence: u64,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sequence: 0,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Frame> {
        self.sequence += 1;

        // Shade varies with sequence so consecutive frames differ
        let shade = (self.sequence % 256) as u8;
        let data = vec![shade; (self.width * self.height * 3) as usize];

        Ok(Frame {
            data: Bytes::from(data),
            meta: Arc::new(FrameMetadata {
                sequence: self.sequence,
                width: self.width,
                height: self.height,
                format: PixelFormat::Rgb24,
                captured_at: OffsetDateTime::now_utc(),
            }),
            timestamp: Instant::now(),
        })
    }
}
