//! Perspective projection through a calibrated camera.
//!
//! The [`Projector`] folds `K * [R | t]` into a single 3x4 matrix once and
//! reuses it for every vertex of the render pass.

use crate::camera::Camera;
use crate::math::mat3x4::Mat3x4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

/// A vertex after projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Pixel-space position, or `None` when the camera-space depth is exactly
    /// zero and the perspective divide is undefined.
    pub pixel: Option<Vec2>,
    /// Camera-space z, not divided. Only used for ordering and interpolation.
    pub depth: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Projector {
    matrix: Mat3x4,
}

impl Projector {
    pub fn new(camera: &Camera) -> Self {
        Self {
            matrix: camera.projection_matrix(),
        }
    }

    #[inline]
    pub fn project(&self, position: Vec3) -> ProjectedPoint {
        let h = self.matrix * Vec4::from(position);
        let pixel = (h.z != 0.0).then(|| Vec2::new(h.x / h.z, h.y / h.z));
        ProjectedPoint { pixel, depth: h.z }
    }

    pub fn project_all(&self, positions: &[Vec3]) -> Vec<ProjectedPoint> {
        positions.iter().map(|&p| self.project(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Intrinsics;
    use crate::math::mat3::Mat3;
    use approx::assert_relative_eq;

    fn camera(f: f32, cx: f32, cy: f32, t: Vec3) -> Camera {
        Camera::new(
            Mat3::IDENTITY,
            t,
            Intrinsics {
                focal_length: f,
                cx,
                cy,
            },
        )
    }

    #[test]
    fn projects_with_perspective_divide() {
        let projector = Projector::new(&camera(10.0, 50.0, 40.0, Vec3::new(0.0, 0.0, 5.0)));
        let p = projector.project(Vec3::new(1.0, -2.0, 5.0));

        // Camera space: (1, -2, 10).
        assert_relative_eq!(p.depth, 10.0);
        let pixel = p.pixel.unwrap();
        assert_relative_eq!(pixel.x, 51.0);
        assert_relative_eq!(pixel.y, 38.0);
    }

    #[test]
    fn depth_is_not_divided() {
        let projector = Projector::new(&camera(1.0, 0.0, 0.0, Vec3::ZERO));
        let near = projector.project(Vec3::new(1.0, 1.0, 2.0));
        let far = projector.project(Vec3::new(2.0, 2.0, 4.0));
        assert_eq!(near.pixel, far.pixel);
        assert!(near.depth < far.depth);
    }

    #[test]
    fn zero_depth_leaves_pixel_undefined() {
        let projector = Projector::new(&camera(1.0, 5.0, 5.0, Vec3::new(0.0, 0.0, -3.0)));
        let p = projector.project(Vec3::new(1.0, 1.0, 3.0));
        assert_eq!(p.pixel, None);
        assert_eq!(p.depth, 0.0);
    }

    #[test]
    fn combined_matrix_matches_two_step_transform() {
        let rotation = Mat3::new([[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]]);
        let cam = Camera::new(
            rotation,
            Vec3::new(0.5, 0.25, 8.0),
            Intrinsics {
                focal_length: 3.0,
                cx: 2.0,
                cy: 1.0,
            },
        );
        let projector = Projector::new(&cam);
        let v = Vec3::new(0.3, -0.7, 1.1);

        let camera_space = cam.extrinsic() * Vec4::from(v);
        let expected = cam.intrinsics().matrix() * camera_space;
        let p = projector.project_all(&[Vec3::ZERO, v])[1];
        assert_relative_eq!(p.depth, expected.z, epsilon = 1e-5);
        assert_relative_eq!(p.pixel.unwrap().x, expected.x / expected.z, epsilon = 1e-5);
        assert_relative_eq!(p.pixel.unwrap().y, expected.y / expected.z, epsilon = 1e-5);
    }
}
