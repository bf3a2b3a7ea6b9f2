//! Depth buffer for hidden surface removal.
//!
//! Stores camera-space depth per pixel. Smaller is closer. Every cell starts
//! at `+inf` and only ever decreases, so after any sequence of
//! [`check`](ZBuffer::check) calls a cell holds the minimum depth accepted at
//! that pixel, whatever the order of the calls.

use crate::config::BufferConfig;

/// Replace `stored` with `depth` if `depth` is strictly closer.
///
/// Returns true if the caller should write its color. NaN never passes.
#[inline]
pub(crate) fn depth_test(stored: &mut f32, depth: f32) -> bool {
    if depth < *stored {
        *stored = depth;
        true
    } else {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZBuffer {
    depths: Vec<f32>,
    width: u32,
    height: u32,
}

impl ZBuffer {
    pub fn new(config: &BufferConfig) -> Self {
        let size = config.width as usize * config.height as usize;
        Self {
            depths: vec![f32::INFINITY; size],
            width: config.width,
            height: config.height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self) {
        self.depths.fill(f32::INFINITY);
    }

    /// Depth test at (x, y). Stores `depth` and returns true if it is closer
    /// than the current value. Out-of-bounds coordinates always fail.
    #[inline]
    pub fn check(&mut self, x: i32, y: i32, depth: f32) -> bool {
        match self.index(x, y) {
            Some(i) => depth_test(&mut self.depths[i], depth),
            None => false,
        }
    }

    /// Stored depth at (x, y); `+inf` where nothing was drawn.
    pub fn depth(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|i| self.depths[i])
    }

    pub fn depths(&self) -> &[f32] {
        &self.depths
    }

    pub(crate) fn depths_mut(&mut self) -> &mut [f32] {
        &mut self.depths
    }

    /// Minimum and maximum over written cells.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.depths
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }

    /// Depths rescaled to `[0, 1]` between the nearest and farthest written
    /// cell; `None` where nothing was drawn. A flat buffer maps to 0.
    pub fn normalized(&self) -> Vec<Option<f32>> {
        let Some((lo, hi)) = self.range() else {
            return vec![None; self.depths.len()];
        };
        let span = hi - lo;
        self.depths
            .iter()
            .map(|&d| {
                d.is_finite()
                    .then(|| if span > 0.0 { (d - lo) / span } else { 0.0 })
            })
            .collect()
    }

    /// Grayscale visualization: near is white, far is dark, empty is black.
    pub fn to_luma_image(&self) -> image::GrayImage {
        let normalized = self.normalized();
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            let value = match normalized[(y * self.width + x) as usize] {
                Some(n) => ((1.0 - n) * 255.0).round() as u8,
                None => 0,
            };
            image::Luma([value])
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
