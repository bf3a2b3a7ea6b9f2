//! A CPU mesh rasterizer.
//!
//! A triangle mesh is framed by an auto-calibrated pinhole camera, projected
//! to pixels, scan-converted edge by edge into per-scanline spans, and
//! composited through a Z-buffer. The depth test keeps the nearest fragment
//! per pixel, so the image does not depend on triangle order.
//!
//! # Quick Start
//!
//! ```ignore
//! use meshraster::prelude::*;
//!
//! let mesh = Mesh::from_obj("bunny.obj")?;
//! let config = RenderConfig::default().with_viewport(Viewport::new(640, 480));
//! let output = Engine::new(config).render(&mesh)?;
//! output.frame.to_rgb_image().save("bunny.png")?;
//! ```

pub mod camera;
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod render;

pub use camera::{Camera, CameraCalibrator, Intrinsics, RotationPreset};
pub use config::{BufferConfig, RenderConfig, Viewport};
pub use engine::{Engine, RenderOutput, RenderStats};
pub use error::{ConfigurationError, RenderError};
pub use mesh::{Face, LoadError, Mesh, Vertex};
pub use projection::{ProjectedPoint, Projector};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::camera::{Camera, CameraCalibrator, Intrinsics, RotationPreset};
    pub use crate::colors::Color;
    pub use crate::config::{RenderConfig, Viewport};
    pub use crate::engine::{Engine, RenderOutput, RenderStats};
    pub use crate::error::{ConfigurationError, RenderError};
    pub use crate::mesh::{Face, Mesh};

    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;

    pub use crate::render::{FrameBuffer, ZBuffer};
}
