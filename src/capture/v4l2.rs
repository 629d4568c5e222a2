//! V4L2 capture backend with memory-mapped streaming

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use color_eyre::{eyre::eyre, Result};
use time::OffsetDateTime;
use tracing::info;
use v4l::buffer::Type;
use v4l::capability::Flags as CapFlags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::MmapStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::{
    capture::frame::{Frame, FrameMetadata, PixelFormat},
    capture::source::FrameSource,
    CaptureConfig,
};

/// V4L2 capture device, exclusively owned by the capture task for the
/// session's lifetime. Dropping it releases the device.
pub struct V4l2Capture {
    device: Box<Device>,
    stream: Option<MmapStream<'static>>,
    config: CaptureConfig,
    sequence: u64,
}

impl V4l2Capture {
    /// Open and configure the device. Failure here means the session
    /// never starts producing.
    pub fn new(config: CaptureConfig) -> Result<Self> {
        info!("Initializing V4L2 capture: {:?}", config.device);

        let device = Device::with_path(&config.device.path)
            .map_err(|e| eyre!("could not start: failed to open {}: {}", config.device.path, e))?;

        // Query capabilities
        let caps = device.query_caps()?;
        info!("Device: {} ({})", caps.card, caps.driver);

        if !caps.capabilities.contains(CapFlags::VIDEO_CAPTURE) {
            return Err(eyre!("could not start: device doesn't support video capture"));
        }

        // Set format
        let mut fmt = device.format()?;
        fmt.width = config.width;
        fmt.height = config.height;
        fmt.fourcc = match config.format {
            PixelFormat::Mjpeg => FourCC::new(b"MJPG"),
            PixelFormat::Yuyv4 => FourCC::new(b"YUYV"),
            _ => return Err(eyre!("unsupported pixel format")),
        };

        device.set_format(&fmt)?;

        Ok(Self {
            device: Box::new(device),
            stream: None,
            config,
            sequence: 0,
        })
    }

    /// Start streaming with memory-mapped buffers
    pub fn start_stream(&mut self) -> Result<()> {
        let stream =
            MmapStream::with_buffers(&self.device, Type::VideoCapture, self.config.buffer_count)?;

        self.stream = Some(stream);
        info!(
            "Capture stream started with {} buffers",
            self.config.buffer_count
        );
        Ok(())
    }
}

impl FrameSource for V4l2Capture {
    fn next_frame(&mut self) -> Result<Frame> {
        let timestamp = Instant::now();
        let captured_at = OffsetDateTime::now_utc();

        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| eyre!("stream not started"))?;

        let (buf, _meta) = stream.next()?;

        // The mmap'd buffer is recycled on the next dequeue, so the frame
        // takes its own copy
        let data = Bytes::copy_from_slice(buf);

        self.sequence += 1;

        Ok(Frame {
            data,
            meta: Arc::new(FrameMetadata {
                sequence: self.sequence,
                width: self.config.width,
                height: self.config.height,
                format: self.config.format,
                captured_at,
            }),
            timestamp,
        })
    }
}
