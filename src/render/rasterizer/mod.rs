//! Triangle scan conversion and depth-tested compositing.
//!
//! A triangle goes through two stages:
//! - [`SpanTable::from_triangle`] rasterizes its three edges into a sorted
//!   per-scanline table of fragments.
//! - [`composite`] fills each scanline between its outermost fragments,
//!   interpolating depth and color, and writes every fragment that wins the
//!   depth test into a [`RenderTarget`].

mod line;
mod scanline;
mod span;

pub use line::{rasterize_line, Pixel};
pub use scanline::{composite, ScanlineRasterizer};
pub use span::{Fragment, SpanTable, SpanTableBuilder};

use std::fmt;
use std::ops::{Add, AddAssign, Range};

use super::target::RenderTarget;
use crate::colors::Color;
use crate::projection::ProjectedPoint;

/// A vertex snapped to the pixel grid, ready for scan conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedVertex {
    pub pixel: Pixel,
    /// Camera-space depth.
    pub depth: f32,
    pub color: Color,
}

impl ProjectedVertex {
    pub const fn new(pixel: Pixel, depth: f32, color: Color) -> Self {
        Self {
            pixel,
            depth,
            color,
        }
    }
}

/// Why a triangle was dropped before scan conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// A vertex has zero camera depth, so it has no pixel position.
    UndefinedVertex,
    /// A coordinate or depth is NaN or infinite.
    NonFinite,
    /// A vertex lands outside the guard band around the viewport.
    OutOfRange,
    /// The snapped vertices are colinear.
    ZeroArea,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UndefinedVertex => write!(f, "vertex has zero camera depth"),
            SkipReason::NonFinite => write!(f, "non-finite coordinate"),
            SkipReason::OutOfRange => write!(f, "vertex outside guard band"),
            SkipReason::ZeroArea => write!(f, "zero area"),
        }
    }
}

/// A screen-space triangle with a non-zero snapped area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [ProjectedVertex; 3],
}

impl Triangle {
    /// Snap three projected points to the pixel grid.
    ///
    /// Pixel positions are rounded to the nearest integer. `guard` bounds the
    /// absolute value of every snapped coordinate; triangles reaching past it
    /// are rejected instead of rasterizing arbitrarily long edges.
    pub fn assemble(
        points: [ProjectedPoint; 3],
        colors: [Color; 3],
        guard: i32,
    ) -> Result<Self, SkipReason> {
        let mut vertices = [ProjectedVertex::new(Pixel::new(0, 0), 0.0, Color::default()); 3];

        for (i, (point, color)) in points.iter().zip(colors).enumerate() {
            let pixel = point.pixel.ok_or(SkipReason::UndefinedVertex)?;
            if !pixel.is_finite() || !point.depth.is_finite() {
                return Err(SkipReason::NonFinite);
            }
            let limit = guard as f32;
            let (x, y) = (pixel.x.round(), pixel.y.round());
            if x.abs() > limit || y.abs() > limit {
                return Err(SkipReason::OutOfRange);
            }
            vertices[i] = ProjectedVertex::new(Pixel::new(x as i32, y as i32), point.depth, color);
        }

        let triangle = Self { vertices };
        if triangle.doubled_area() == 0 {
            return Err(SkipReason::ZeroArea);
        }
        Ok(triangle)
    }

    /// Twice the signed area of the snapped triangle.
    pub fn doubled_area(&self) -> i64 {
        let [a, b, c] = self.vertices.map(|v| v.pixel);
        let (abx, aby) = (b.x as i64 - a.x as i64, b.y as i64 - a.y as i64);
        let (acx, acy) = (c.x as i64 - a.x as i64, c.y as i64 - a.y as i64);
        abx * acy - aby * acx
    }

    /// Scanlines touched by the triangle.
    pub fn rows(&self) -> Range<i32> {
        let ys = self.vertices.map(|v| v.pixel.y);
        let top = ys.iter().copied().min().unwrap_or(0);
        let bottom = ys.iter().copied().max().unwrap_or(-1);
        top..bottom + 1
    }
}

/// Depth-test counters for one or more fills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillStats {
    /// In-bounds pixels that went through the depth test.
    pub tested: u64,
    /// Pixels that passed it and were written.
    pub written: u64,
}

impl Add for FillStats {
    type Output = FillStats;

    fn add(self, rhs: FillStats) -> Self::Output {
        FillStats {
            tested: self.tested + rhs.tested,
            written: self.written + rhs.written,
        }
    }
}

impl AddAssign for FillStats {
    fn add_assign(&mut self, rhs: FillStats) {
        *self = *self + rhs;
    }
}

/// Trait for triangle fill algorithms.
pub trait Rasterizer {
    /// Scan-convert `vertices` and composite the result into `target`.
    fn fill_triangle(&self, vertices: &[ProjectedVertex; 3], target: &mut RenderTarget) -> FillStats;
}
