//! Errors that abort a render pass.
//!
//! Degenerate triangles are not errors: they are skipped and counted in
//! [`RenderStats`](crate::engine::RenderStats).

use std::fmt;

/// Camera calibration cannot proceed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The mesh has no vertices to frame.
    EmptyMesh,
    /// Width or height is zero.
    EmptyViewport { width: u32, height: u32 },
    /// The bounding box diagonal is zero or not finite.
    DegenerateBoundingBox { diagonal: f32 },
    /// Every vertex projects onto the image center at unit focal length.
    DegenerateExtent,
    /// The stand-off factor must be finite and greater than one half.
    InvalidStandoff(f32),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::EmptyMesh => write!(f, "mesh has no vertices"),
            ConfigurationError::EmptyViewport { width, height } => {
                write!(f, "viewport {}x{} has no pixels", width, height)
            }
            ConfigurationError::DegenerateBoundingBox { diagonal } => {
                write!(f, "bounding box is degenerate (diagonal = {})", diagonal)
            }
            ConfigurationError::DegenerateExtent => {
                write!(f, "projected silhouette has zero extent on both axes")
            }
            ConfigurationError::InvalidStandoff(k) => {
                write!(f, "stand-off factor must be finite and greater than 0.5, got {}", k)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    Configuration(ConfigurationError),
    /// A face references a vertex that does not exist.
    Index {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
}

impl From<ConfigurationError> for RenderError {
    fn from(err: ConfigurationError) -> Self {
        RenderError::Configuration(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Configuration(err) => write!(f, "configuration error: {}", err),
            RenderError::Index {
                face,
                index,
                vertex_count,
            } => write!(
                f,
                "face {} references vertex {} but the mesh has {} vertices",
                face, index, vertex_count
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Configuration(err) => Some(err),
            RenderError::Index { .. } => None,
        }
    }
}
