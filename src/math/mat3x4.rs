//! 3x4 matrices: the pinhole intrinsics `K` and the combined `K * [R|t]`.

use std::ops::Mul;

use super::mat4::Mat4;
use super::vec3::Vec3;
use super::vec4::Vec4;

/// 3x4 matrix stored as `data[row][col]`.
///
/// Multiplying by a homogeneous point yields `(u*z, v*z, z)`: image-plane
/// coordinates scaled by camera-space depth. The perspective divide is left
/// to the caller so the undivided depth stays available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3x4 {
    data: [[f32; 4]; 3],
}

impl Mat3x4 {
    pub fn new(data: [[f32; 4]; 3]) -> Self {
        Mat3x4 { data }
    }

    /// Builds the intrinsic matrix for a square-pixel pinhole camera.
    pub fn intrinsic(focal_length: f32, cx: f32, cy: f32) -> Self {
        Mat3x4::new([
            [focal_length, 0.0, cx, 0.0],
            [0.0, focal_length, cy, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }
}

/// Combine with a 4x4 transform: `(K * E) * v == K * (E * v)`.
impl Mul<Mat4> for Mat3x4 {
    type Output = Mat3x4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 3];

        for row in 0..3 {
            for col in 0..4 {
                result[row][col] = self.data[row][0] * rhs.get(0, col)
                    + self.data[row][1] * rhs.get(1, col)
                    + self.data[row][2] * rhs.get(2, col)
                    + self.data[row][3] * rhs.get(3, col);
            }
        }

        Mat3x4::new(result)
    }
}

impl Mul<Vec4> for Mat3x4 {
    type Output = Vec3;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: usize| {
            self.data[r][0] * v.x + self.data[r][1] * v.y + self.data[r][2] * v.z + self.data[r][3] * v.w
        };
        Vec3::new(row(0), row(1), row(2))
    }
}
