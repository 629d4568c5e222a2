use bytes::Bytes;
use color_eyre::{eyre::eyre, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use jpeg_decoder::Decoder;

use super::frame::{Frame, PixelFormat};

const JPEG_QUALITY: u8 = 85;

/// Decode a raw frame payload to packed RGB24.
pub fn decode_frame(data: &[u8], format: PixelFormat, width: u32, height: u32) -> Result<Vec<u8>> {
    match format {
        PixelFormat::Mjpeg => {
            let mut decoder = Decoder::new(data);
            let pixels = decoder.decode()?;
            Ok(pixels)
        }
        PixelFormat::Rgb24 => {
            // Already in RGB format
            Ok(data.to_vec())
        }
        PixelFormat::Yuyv4 => yuyv_to_rgb(data, width, height),
    }
}

/// Re-encode a frame as JPEG for the gateway boundary. MJPEG frames pass
/// through untouched.
pub fn to_jpeg(frame: &Frame) -> Result<Bytes> {
    match frame.meta.format {
        PixelFormat::Mjpeg => Ok(frame.data.clone()),
        format => {
            let rgb = decode_frame(&frame.data, format, frame.meta.width, frame.meta.height)?;
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode(
                &rgb,
                frame.meta.width,
                frame.meta.height,
                ExtendedColorType::Rgb8,
            )?;
            Ok(Bytes::from(out))
        }
    }
}

/// YUYV 4:2:2 to RGB24, integer BT.601.
fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected = (width * height * 2) as usize;
    if data.len() < expected {
        return Err(eyre!(
            "YUYV buffer too short: {} < {}",
            data.len(),
            expected
        ));
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for chunk in data[..expected].chunks_exact(4) {
        let [y0, u, y1, v] = [chunk[0], chunk[1], chunk[2], chunk[3]];
        for y in [y0, y1] {
            let c = i32::from(y) - 16;
            let d = i32::from(u) - 128;
            let e = i32::from(v) - 128;
            rgb.push(clamp8((298 * c + 409 * e + 128) >> 8));
            rgb.push(clamp8((298 * c - 100 * d - 208 * e + 128) >> 8));
            rgb.push(clamp8((298 * c + 516 * d + 128) >> 8));
        }
    }
    Ok(rgb)
}

fn clamp8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}
