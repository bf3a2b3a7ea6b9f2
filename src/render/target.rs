//! Mutable view over a frame buffer and Z-buffer pair.
//!
//! A [`RenderTarget`] covers a contiguous band of rows. The sequential path
//! uses a single band over the whole image; the threaded path hands each
//! worker its own disjoint band, so no pixel is ever shared between workers.

use std::ops::Range;

use super::framebuffer::FrameBuffer;
use super::zbuffer::{depth_test, ZBuffer};
use crate::colors::Color;

pub struct RenderTarget<'a> {
    color: &'a mut [Color],
    depth: &'a mut [f32],
    width: u32,
    first_row: u32,
    rows: u32,
}

impl<'a> RenderTarget<'a> {
    /// A target covering the whole image.
    ///
    /// # Panics
    /// Panics in debug builds if the buffers disagree on size.
    pub fn new(frame: &'a mut FrameBuffer, zbuffer: &'a mut ZBuffer) -> Self {
        debug_assert_eq!(
            (frame.width(), frame.height()),
            (zbuffer.width(), zbuffer.height()),
            "Frame buffer and Z-buffer dimensions differ"
        );
        let width = frame.width();
        Self::band(frame.pixels_mut(), zbuffer.depths_mut(), width, 0)
    }

    /// A target over rows `first_row..first_row + color.len() / width`.
    pub(crate) fn band(
        color: &'a mut [Color],
        depth: &'a mut [f32],
        width: u32,
        first_row: u32,
    ) -> Self {
        debug_assert_eq!(color.len(), depth.len(), "Band buffers differ in size");
        let rows = if width == 0 {
            0
        } else {
            (color.len() / width as usize) as u32
        };
        Self {
            color,
            depth,
            width,
            first_row,
            rows,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image rows covered by this target.
    pub fn rows(&self) -> Range<i32> {
        self.first_row as i32..(self.first_row + self.rows) as i32
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && self.rows().contains(&y)
    }

    /// Set a pixel at (x, y) with depth testing.
    ///
    /// The color is written only if `depth` is strictly less than the stored
    /// depth. Coordinates outside the target are ignored. Returns true if the
    /// pixel was written.
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: Color) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let idx = (y as u32 - self.first_row) as usize * self.width as usize + x as usize;
        if depth_test(&mut self.depth[idx], depth) {
            self.color[idx] = color;
            true
        } else {
            false
        }
    }
}
