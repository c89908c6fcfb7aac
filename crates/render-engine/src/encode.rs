//! Pixel readback and image encoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use propshot_common::error::{PropshotError, PropshotResult};
use propshot_project_model::request::ImageFormat;
use propshot_scene::{ClearColor, RenderTarget};

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Background the capture camera must clear to for `format`.
pub fn clear_color_for(format: ImageFormat) -> ClearColor {
    if format.needs_opaque_background() {
        ClearColor::White
    } else {
        ClearColor::Transparent
    }
}

/// Turns render target contents into file bytes.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    jpeg_quality: u8,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameEncoder {
    /// Encoder with the given JPEG quality, clamped to `[1, 100]`.
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Read back the whole target and encode it.
    pub fn encode(&self, target: &RenderTarget, format: ImageFormat) -> PropshotResult<Vec<u8>> {
        self.encode_pixels(
            target.read_pixels(),
            target.width(),
            target.height(),
            format,
        )
    }

    /// Encode an RGBA8 buffer (row-major, top row first).
    pub fn encode_pixels(
        &self,
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> PropshotResult<Vec<u8>> {
        let mut bytes = Vec::new();
        match format {
            ImageFormat::Raw => return Ok(pixels),
            ImageFormat::Png => {
                DynamicImage::ImageRgba8(rgba_image(pixels, width, height)?)
                    .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                    .map_err(|e| PropshotError::encode(format!("PNG encoding failed: {e}")))?;
            }
            ImageFormat::Jpg => {
                let rgb = DynamicImage::ImageRgba8(rgba_image(pixels, width, height)?).to_rgb8();
                JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality)
                    .encode_image(&rgb)
                    .map_err(|e| PropshotError::encode(format!("JPEG encoding failed: {e}")))?;
            }
        }
        Ok(bytes)
    }
}

fn rgba_image(pixels: Vec<u8>, width: u32, height: u32) -> PropshotResult<RgbaImage> {
    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| PropshotError::encode(format!("pixel buffer does not match {width}x{height}")))
}
