//! Auto-calibrated pinhole camera.
//!
//! # Coordinate System
//!
//! Camera space is right-handed with the camera at the origin:
//! - X: positive right in the image
//! - Y: positive down in the image
//! - Z: positive forward (into the screen); this is the depth channel
//!
//! A [`Camera`] is never edited after it is built. [`CameraCalibrator`]
//! derives one from a mesh's vertices so that the whole mesh is in front of
//! the camera and its silhouette fills the viewport on the binding axis.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::config::Viewport;
use crate::error::ConfigurationError;
use crate::math::mat3::Mat3;
use crate::math::mat3x4::Mat3x4;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::projection::Projector;

/// Object space with Z up, seen from -Y looking along +Y.
pub const Z_UP: Mat3 = Mat3::new([[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]]);

/// [`Z_UP`] with the camera raised 45 degrees, looking down at the object.
pub const Z_UP_ELEVATED_45: Mat3 = Mat3::new([
    [1.0, 0.0, 0.0],
    [0.0, -FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
    [0.0, FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
]);

/// 180 degree roll about the view axis.
pub const ROLL_180: Mat3 = Mat3::new([[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]]);

/// Fixed rotations from object-space "up" to camera-space "forward".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationPreset {
    /// Object space is already camera space: +Z is forward.
    Identity,
    #[default]
    ZUp,
    ZUpElevated45,
}

impl RotationPreset {
    /// Returns the preset's rotation, rolled upside down if `flip` is set.
    pub fn matrix(self, flip: bool) -> Mat3 {
        let base = match self {
            RotationPreset::Identity => Mat3::IDENTITY,
            RotationPreset::ZUp => Z_UP,
            RotationPreset::ZUpElevated45 => Z_UP_ELEVATED_45,
        };
        if flip {
            ROLL_180 * base
        } else {
            base
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "identity" => Some(RotationPreset::Identity),
            "z-up" => Some(RotationPreset::ZUp),
            "z-up-45" => Some(RotationPreset::ZUpElevated45),
            _ => None,
        }
    }
}

impl std::fmt::Display for RotationPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationPreset::Identity => write!(f, "identity"),
            RotationPreset::ZUp => write!(f, "z-up"),
            RotationPreset::ZUpElevated45 => write!(f, "z-up-45"),
        }
    }
}

/// Pinhole intrinsics with square pixels and no skew.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intrinsics {
    pub focal_length: f32,
    pub cx: f32,
    pub cy: f32,
}

impl Intrinsics {
    /// Unit focal length, principal point at the origin.
    pub const UNIT: Intrinsics = Intrinsics {
        focal_length: 1.0,
        cx: 0.0,
        cy: 0.0,
    };

    pub fn matrix(&self) -> Mat3x4 {
        Mat3x4::intrinsic(self.focal_length, self.cx, self.cy)
    }
}

/// An immutable pinhole camera: `K * [R | t]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    rotation: Mat3,
    translation: Vec3,
    intrinsics: Intrinsics,
}

impl Camera {
    pub fn new(rotation: Mat3, translation: Vec3, intrinsics: Intrinsics) -> Self {
        debug_assert!(rotation.is_orthonormal(1e-4), "rotation must be orthonormal");
        Self {
            rotation,
            translation,
            intrinsics,
        }
    }

    pub fn rotation(&self) -> &Mat3 {
        &self.rotation
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// The 4x4 extrinsic matrix `[R | t; 0 0 0 1]`.
    pub fn extrinsic(&self) -> Mat4 {
        Mat4::rigid(&self.rotation, self.translation)
    }

    /// The combined 3x4 projection `K * [R | t]`.
    pub fn projection_matrix(&self) -> Mat3x4 {
        self.intrinsics.matrix() * self.extrinsic()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Returns `None` for an empty point set.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).magnitude()
    }
}

/// Projected silhouette bounds at unit focal length.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl Extent {
    fn measure(projector: &Projector, positions: &[Vec3]) -> Option<Self> {
        positions
            .iter()
            .filter_map(|&p| projector.project(p).pixel)
            .fold(None, |acc: Option<Extent>, p| {
                Some(match acc {
                    None => Extent {
                        min_x: p.x,
                        max_x: p.x,
                        min_y: p.y,
                        max_y: p.y,
                    },
                    Some(e) => Extent {
                        min_x: e.min_x.min(p.x),
                        max_x: e.max_x.max(p.x),
                        min_y: e.min_y.min(p.y),
                        max_y: e.max_y.max(p.y),
                    },
                })
            })
    }

    /// Focal length that fits the extent into the viewport.
    ///
    /// Each axis proposes `dimension / (2 * half_extent)`; the smaller one is
    /// binding. An axis with zero extent proposes nothing.
    fn focal_length(&self, viewport: &Viewport) -> Option<f32> {
        let half_x = self.min_x.abs().max(self.max_x.abs());
        let half_y = self.min_y.abs().max(self.max_y.abs());

        let fit = |dimension: u32, half: f32| {
            let f = dimension as f32 / (2.0 * half);
            (half > 0.0 && f.is_finite()).then_some(f)
        };

        match (fit(viewport.width, half_x), fit(viewport.height, half_y)) {
            (Some(fx), Some(fy)) => Some(fx.min(fy)),
            (Some(f), None) | (None, Some(f)) => Some(f),
            (None, None) => None,
        }
    }
}

/// Stand-off factors at or below this can put vertices behind the camera.
pub const MIN_STANDOFF: f32 = 0.5;

/// Frames a mesh inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraCalibrator {
    preset: RotationPreset,
    standoff: f32,
}

impl Default for CameraCalibrator {
    fn default() -> Self {
        Self::new(RotationPreset::default(), 3.0)
    }
}

impl CameraCalibrator {
    /// `standoff` is the camera distance from the bounding box center in
    /// bounding box diagonals. It must exceed [`MIN_STANDOFF`].
    pub fn new(preset: RotationPreset, standoff: f32) -> Self {
        Self { preset, standoff }
    }

    pub fn calibrate(
        &self,
        positions: &[Vec3],
        viewport: &Viewport,
    ) -> Result<Camera, ConfigurationError> {
        if viewport.is_empty() {
            return Err(ConfigurationError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        // Vertices lie within half a diagonal of the center, so any factor
        // above one half keeps every camera depth positive.
        if !(self.standoff > MIN_STANDOFF && self.standoff.is_finite()) {
            return Err(ConfigurationError::InvalidStandoff(self.standoff));
        }

        let bounds = BoundingBox::from_points(positions).ok_or(ConfigurationError::EmptyMesh)?;
        let diagonal = bounds.diagonal();
        if !(diagonal > 0.0 && diagonal.is_finite()) {
            return Err(ConfigurationError::DegenerateBoundingBox { diagonal });
        }

        let rotation = self.preset.matrix(viewport.flip_upside_down);
        let translation =
            rotation * (-bounds.center()) + Vec3::new(0.0, 0.0, self.standoff * diagonal);

        // First pass at unit focal length to measure the silhouette.
        let unit = Camera::new(rotation, translation, Intrinsics::UNIT);
        let focal_length = Extent::measure(&Projector::new(&unit), positions)
            .and_then(|extent| extent.focal_length(viewport))
            .ok_or(ConfigurationError::DegenerateExtent)?;

        let intrinsics = Intrinsics {
            focal_length,
            cx: viewport.width as f32 / 2.0,
            cy: viewport.height as f32 / 2.0,
        };

        log::info!(
            "Calibrated camera: preset {}, f = {:.3}, principal point = ({:.1}, {:.1}), stand-off = {:.3}.",
            self.preset,
            intrinsics.focal_length,
            intrinsics.cx,
            intrinsics.cy,
            self.standoff * diagonal
        );

        Ok(Camera::new(rotation, translation, intrinsics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube() -> Vec<Vec3> {
        let mut points = Vec::new();
        for &x in &[-1.0, 1.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-1.0, 1.0] {
                    points.push(Vec3::new(x, y, z));
                }
            }
        }
        points
    }

    #[test]
    fn presets_are_rotations() {
        for preset in [
            RotationPreset::Identity,
            RotationPreset::ZUp,
            RotationPreset::ZUpElevated45,
        ] {
            for flip in [false, true] {
                let m = preset.matrix(flip);
                assert!(m.is_orthonormal(1e-6), "{} flip={}", preset, flip);
                assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn preset_names_round_trip() {
        for name in ["identity", "z-up", "z-up-45"] {
            let preset = RotationPreset::from_name(name).unwrap();
            assert_eq!(preset.to_string(), name);
        }
        assert_eq!(RotationPreset::from_name("sideways"), None);
    }

    #[test]
    fn calibration_is_deterministic() {
        let points = cube();
        let viewport = Viewport::new(64, 48);
        let calibrator = CameraCalibrator::default();
        let a = calibrator.calibrate(&points, &viewport).unwrap();
        let b = calibrator.calibrate(&points, &viewport).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bounding_box_center_is_in_front_of_camera() {
        let points: Vec<Vec3> = cube().iter().map(|&p| p + Vec3::new(10.0, -4.0, 2.0)).collect();
        let bounds = BoundingBox::from_points(&points).unwrap();
        let camera = CameraCalibrator::default()
            .calibrate(&points, &Viewport::new(32, 32))
            .unwrap();

        let center = Projector::new(&camera).project(bounds.center());
        let pixel = center.pixel.unwrap();
        assert_relative_eq!(pixel.x, 16.0, epsilon = 1e-3);
        assert_relative_eq!(pixel.y, 16.0, epsilon = 1e-3);
        assert_relative_eq!(center.depth, 3.0 * bounds.diagonal(), epsilon = 1e-4);
    }

    #[test]
    fn every_vertex_is_framed() {
        let points: Vec<Vec3> = cube()
            .iter()
            .map(|&p| Vec3::new(p.x * 4.0, p.y, p.z * 0.5))
            .collect();
        for viewport in [Viewport::new(100, 40), Viewport::new(40, 100), Viewport::new(7, 7)] {
            for preset in [RotationPreset::ZUp, RotationPreset::ZUpElevated45] {
                let camera = CameraCalibrator::new(preset, 3.0)
                    .calibrate(&points, &viewport)
                    .unwrap();
                let projector = Projector::new(&camera);
                let eps = 1e-3;
                for &p in &points {
                    let pixel = projector.project(p).pixel.unwrap();
                    assert!(pixel.x >= -eps && pixel.x <= viewport.width as f32 + eps);
                    assert!(pixel.y >= -eps && pixel.y <= viewport.height as f32 + eps);
                }
            }
        }
    }

    #[test]
    fn binding_axis_touches_the_viewport_edge() {
        // Wide object in a square viewport: X is binding.
        let points: Vec<Vec3> = cube()
            .iter()
            .map(|&p| Vec3::new(p.x * 4.0, p.y, p.z))
            .collect();
        let viewport = Viewport::new(50, 50);
        let camera = CameraCalibrator::default().calibrate(&points, &viewport).unwrap();
        let projector = Projector::new(&camera);

        let (min_x, max_x) = points
            .iter()
            .map(|&p| projector.project(p).pixel.unwrap().x)
            .fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        assert_relative_eq!(min_x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(max_x, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn flip_mirrors_about_the_principal_point() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(0.5, 0.0, 3.0),
        ];
        let upright = Viewport::new(40, 40);
        let flipped = upright.flipped(true);
        let calibrator = CameraCalibrator::default();
        let a = Projector::new(&calibrator.calibrate(&points, &upright).unwrap());
        let b = Projector::new(&calibrator.calibrate(&points, &flipped).unwrap());

        for &p in &points {
            let pa = a.project(p).pixel.unwrap();
            let pb = b.project(p).pixel.unwrap();
            assert_relative_eq!(pa.x + pb.x, 40.0, epsilon = 1e-3);
            assert_relative_eq!(pa.y + pb.y, 40.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn degenerate_bounding_box_is_rejected() {
        let points = vec![Vec3::new(1.0, 2.0, 3.0); 4];
        let err = CameraCalibrator::default()
            .calibrate(&points, &Viewport::new(10, 10))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::DegenerateBoundingBox { diagonal: 0.0 });
    }

    #[test]
    fn zero_extent_is_rejected() {
        // Both points lie on the Z_UP view axis (object +Y).
        let points = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let err = CameraCalibrator::default()
            .calibrate(&points, &Viewport::new(10, 10))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::DegenerateExtent);
    }

    #[test]
    fn zero_extent_on_one_axis_uses_the_other() {
        // A segment along object X projects to a horizontal line.
        let points = vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        let camera = CameraCalibrator::default()
            .calibrate(&points, &Viewport::new(20, 10))
            .unwrap();
        assert!(camera.intrinsics().focal_length.is_finite());
        let pixel = Projector::new(&camera).project(points[1]).pixel.unwrap();
        assert_relative_eq!(pixel.x, 20.0, epsilon = 1e-3);
        assert_relative_eq!(pixel.y, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let calibrator = CameraCalibrator::default();
        assert_eq!(
            calibrator.calibrate(&[], &Viewport::new(10, 10)),
            Err(ConfigurationError::EmptyMesh)
        );
        assert_eq!(
            calibrator.calibrate(&cube(), &Viewport::new(0, 10)),
            Err(ConfigurationError::EmptyViewport {
                width: 0,
                height: 10
            })
        );
        assert_eq!(
            CameraCalibrator::new(RotationPreset::ZUp, 0.0).calibrate(&cube(), &Viewport::new(4, 4)),
            Err(ConfigurationError::InvalidStandoff(0.0))
        );
    }

    #[test]
    fn standoff_must_keep_mesh_in_front() {
        let viewport = Viewport::new(40, 40);
        for k in [0.25, 0.5, -1.0, f32::INFINITY] {
            assert_eq!(
                CameraCalibrator::new(RotationPreset::ZUp, k).calibrate(&cube(), &viewport),
                Err(ConfigurationError::InvalidStandoff(k)),
                "k = {}",
                k
            );
        }

        // Just above the limit every corner of the cube is in front.
        for preset in [
            RotationPreset::Identity,
            RotationPreset::ZUp,
            RotationPreset::ZUpElevated45,
        ] {
            let camera = CameraCalibrator::new(preset, 0.51)
                .calibrate(&cube(), &viewport)
                .unwrap();
            let projector = Projector::new(&camera);
            for p in cube() {
                assert!(projector.project(p).depth > 0.0, "{} {:?}", preset, p);
            }
        }
    }
}
