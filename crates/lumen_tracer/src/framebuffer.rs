//! Framebuffer boundary.
//!
//! The tracer only ever writes finished pixels through [`Framebuffer`].
//! [`PixelBuffer`] is a plain in-memory implementation used by the viewer and
//! by tests; display backends implement the trait themselves.

use crate::color::Rgba;
use thiserror::Error;

/// Errors reported by a framebuffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferError {
    #[error("Pixel out of bounds - x: {x} y: {y} (framebuffer is {width}x{height})")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

/// Destination for rendered pixels.
pub trait Framebuffer {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Store one display-encoded pixel. Coordinates outside
    /// `[0, width) x [0, height)` must be rejected without modifying the buffer.
    fn draw_point(&mut self, x: i32, y: i32, color: Rgba) -> Result<(), FramebufferError>;
}

/// Row-major RGBA8 pixel storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Create a new buffer filled with opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width as usize * height as usize],
        }
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Get the pixel at (x, y), if it is inside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x as i32, y as i32).map(|i| self.pixels[i])
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Pixels as a flat byte slice (4 bytes per pixel), e.g. for texture upload
    /// or image encoding.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_flattened()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl Framebuffer for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw_point(&mut self, x: i32, y: i32, color: Rgba) -> Result<(), FramebufferError> {
        let index = self.index(x, y).ok_or(FramebufferError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        self.pixels[index] = color;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_opaque_black() {
        let fb = PixelBuffer::new(4, 3);
        assert_eq!(fb.pixels().len(), 12);
        assert_eq!(fb.as_bytes().len(), 48);
        assert!(fb.pixels().iter().all(|&p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_draw_point_row_major() {
        let mut fb = PixelBuffer::new(4, 3);
        fb.draw_point(3, 1, [1, 2, 3, 4]).unwrap();

        assert_eq!(fb.get(3, 1), Some([1, 2, 3, 4]));
        assert_eq!(fb.pixels()[7], [1, 2, 3, 4]);
        assert_eq!(&fb.as_bytes()[28..32], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut fb = PixelBuffer::new(4, 3);
        let before = fb.clone();

        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (i32::MAX, i32::MIN)] {
            let err = fb.draw_point(x, y, [255; 4]).unwrap_err();
            assert_eq!(
                err,
                FramebufferError::OutOfBounds {
                    x,
                    y,
                    width: 4,
                    height: 3
                }
            );
        }
        assert_eq!(fb, before);
        assert_eq!(fb.get(4, 0), None);
    }

    #[test]
    fn test_clear() {
        let mut fb = PixelBuffer::new(2, 2);
        fb.clear([9, 8, 7, 6]);
        assert!(fb.pixels().iter().all(|&p| p == [9, 8, 7, 6]));
    }
}
