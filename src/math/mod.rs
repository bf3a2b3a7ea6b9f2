//! Small fixed-size linear algebra used by the camera and the projector.
//!
//! All matrices are stored row-major as `data[row][col]` and multiply column
//! vectors on the right: `M * v`.

pub mod mat3;
pub mod mat3x4;
pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;
