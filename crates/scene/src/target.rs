//! Offscreen render target.

use std::marker::PhantomData;
use std::rc::Rc;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// An RGBA8 color buffer, row-major with the top row first.
///
/// A target belongs to the thread that created it. Readback produces an
/// owned copy; only that copy may travel to other threads.
#[derive(Debug)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    _not_send: PhantomData<Rc<()>>,
}

impl RenderTarget {
    /// Allocate a cleared target. Dimensions below one are clamped to one.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
            _not_send: PhantomData,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fill every pixel with `rgba`.
    pub fn clear(&mut self, rgba: [u8; 4]) {
        for pixel in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// Write one pixel. Out-of-range coordinates are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(out)
    }

    /// Borrow the raw buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Read back the full rectangle `(0,0)-(W,H)` into an owned buffer.
    pub fn read_pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_to_one_pixel() {
        let target = RenderTarget::new(0, 0);
        assert_eq!(target.size(), (1, 1));
        assert_eq!(target.pixels().len(), 4);
    }

    #[test]
    fn test_put_pixel_is_row_major_top_first() {
        let mut target = RenderTarget::new(3, 2);
        target.put_pixel(2, 0, [1, 2, 3, 4]);
        target.put_pixel(0, 1, [9, 9, 9, 9]);
        target.put_pixel(7, 7, [5, 5, 5, 5]);
        let raw = target.read_pixels();
        assert_eq!(&raw[8..12], &[1, 2, 3, 4]);
        assert_eq!(&raw[12..16], &[9, 9, 9, 9]);
        assert_eq!(target.pixel(7, 7), None);
    }

    #[test]
    fn test_clear_overwrites_everything() {
        let mut target = RenderTarget::new(4, 4);
        target.put_pixel(1, 1, [10, 20, 30, 40]);
        target.clear([255; 4]);
        assert!(target.pixels().iter().all(|&b| b == 255));
    }
}
