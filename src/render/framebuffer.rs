//! Color buffer for one render pass.

use crate::colors::Color;
use crate::config::BufferConfig;

/// A `width * height` grid of RGB colors, stored row by row from the top.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    pixels: Vec<Color>,
    width: u32,
    height: u32,
    background: Color,
}

impl FrameBuffer {
    /// Allocates a buffer filled with the configured background color.
    pub fn new(config: &BufferConfig) -> Self {
        let size = config.width as usize * config.height as usize;
        Self {
            pixels: vec![config.background; size],
            width: config.width,
            height: config.height,
            background: config.background,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Reset every pixel to the background color.
    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel without depth testing. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Number of pixels that differ from the background.
    pub fn covered_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&c| c != self.background).count()
    }

    /// Quantize into an 8-bit RGB image for encoding.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(self.pixels[(y * self.width + x) as usize].to_rgb8())
        })
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}
