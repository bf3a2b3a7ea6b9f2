//! Per-triangle span table ("edge list").
//!
//! Each edge of a triangle is rasterized into pixels and every pixel becomes a
//! [`Fragment`] carrying depth and color interpolated along the edge. The
//! fragments are grouped by scanline in a [`SpanTableBuilder`] and sorted once
//! when the table is built; a finished [`SpanTable`] is read-only.

use std::collections::BTreeMap;

use super::line::{rasterize_line, Pixel};
use super::ProjectedVertex;
use crate::colors::Color;

/// An edge crossing on one scanline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub depth: f32,
    pub color: Color,
}

/// Collects edge fragments by scanline in insertion order.
#[derive(Debug, Default)]
pub struct SpanTableBuilder {
    rows: BTreeMap<i32, Vec<Fragment>>,
}

impl SpanTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterize the edge `a`-`b` and record one fragment per pixel.
    ///
    /// The pixel that coincides with `a` takes `a`'s attributes exactly, the
    /// pixel that coincides with `b` takes `b`'s, and the pixels in between
    /// are evenly interpolated.
    pub fn add_edge(&mut self, a: &ProjectedVertex, b: &ProjectedVertex) {
        let pixels = rasterize_line(a.pixel, b.pixel);
        let (from, to) = if pixels.first() == Some(&a.pixel) {
            (a, b)
        } else {
            (b, a)
        };

        let last = pixels.len().saturating_sub(1);
        for (i, &Pixel { x, y }) in pixels.iter().enumerate() {
            let (depth, color) = if i == 0 {
                (from.depth, from.color)
            } else if i == last {
                (to.depth, to.color)
            } else {
                let t = i as f32 / last as f32;
                (
                    from.depth + (to.depth - from.depth) * t,
                    from.color.lerp(to.color, t),
                )
            };
            self.push(y, Fragment { x, depth, color });
        }
    }

    pub fn push(&mut self, y: i32, fragment: Fragment) {
        self.rows.entry(y).or_default().push(fragment);
    }

    /// Sort every scanline by x and drop repeated x positions, keeping the
    /// fragment that was pushed first.
    pub fn build(mut self) -> SpanTable {
        for row in self.rows.values_mut() {
            row.sort_by_key(|f| f.x);
            row.dedup_by_key(|f| f.x);
        }
        SpanTable { rows: self.rows }
    }
}

/// Scanlines in ascending order, each with fragments in ascending x.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanTable {
    rows: BTreeMap<i32, Vec<Fragment>>,
}

impl SpanTable {
    /// Builds the table for the three edges of a triangle.
    pub fn from_triangle(vertices: &[ProjectedVertex; 3]) -> Self {
        let [v0, v1, v2] = vertices;
        let mut builder = SpanTableBuilder::new();
        builder.add_edge(v0, v1);
        builder.add_edge(v1, v2);
        builder.add_edge(v0, v2);
        builder.build()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, y: i32) -> Option<&[Fragment]> {
        self.rows.get(&y).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = (i32, &[Fragment])> + '_ {
        self.rows.iter().map(|(&y, row)| (y, row.as_slice()))
    }

    /// Leftmost and rightmost fragment of a scanline.
    pub fn bounds(&self, y: i32) -> Option<(Fragment, Fragment)> {
        let row = self.rows.get(&y)?;
        Some((*row.first()?, *row.last()?))
    }
}
