//! Render configuration.
//!
//! Everything a render pass needs besides the mesh is passed in explicitly
//! through these values. Buffers are sized and cleared from a
//! [`BufferConfig`], the camera is framed against a [`Viewport`].

use crate::camera::RotationPreset;
use crate::colors::{self, Color};

/// Target image size and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Roll the camera 180 degrees about its view axis.
    pub flip_upside_down: bool,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            flip_upside_down: false,
        }
    }

    pub const fn flipped(mut self, flip: bool) -> Self {
        self.flip_upside_down = flip;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(512, 512)
    }
}

/// Size and clear value for a frame buffer / Z-buffer pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

impl BufferConfig {
    pub const fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub viewport: Viewport,
    pub background: Color,
    /// Used for vertices that carry no color of their own.
    pub default_color: Color,
    pub preset: RotationPreset,
    /// Camera distance from the bounding box center, in bounding box diagonals.
    pub standoff: f32,
    /// Number of horizontal bands rendered in parallel. `1` renders on the
    /// calling thread.
    pub threads: usize,
    pub show_progress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            background: colors::BLACK,
            default_color: colors::WHITE,
            preset: RotationPreset::default(),
            standoff: 3.0,
            threads: 1,
            show_progress: false,
        }
    }
}

impl RenderConfig {
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    pub fn with_preset(mut self, preset: RotationPreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_standoff(mut self, standoff: f32) -> Self {
        self.standoff = standoff;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn buffer_config(&self) -> BufferConfig {
        BufferConfig::new(self.viewport.width, self.viewport.height, self.background)
    }
}
