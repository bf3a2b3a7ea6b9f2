//! Span-table scanline fill.
//!
//! The edges of the triangle are rasterized into a [`SpanTable`]; every
//! occupied scanline is then filled from its leftmost to its rightmost
//! fragment:
//!
//! ```text
//!   y=2        L . . . . R        L, R: edge fragments
//!   y=3         L . . . R         . : interpolated fragments
//!   y=4          L . . R
//! ```
//!
//! Depth and color advance by a fixed step per pixel. The last pixel of a
//! span takes the right fragment's values exactly instead of the accumulated
//! ones, so floating-point drift never reaches a span boundary.

use super::span::SpanTable;
use super::{FillStats, ProjectedVertex, Rasterizer};
use crate::render::target::RenderTarget;

/// Fill every span of `table` into `target`.
///
/// Rows outside the target are skipped. Pixels outside its columns are
/// walked but not tested.
pub fn composite(table: &SpanTable, target: &mut RenderTarget) -> FillStats {
    let band = target.rows();
    let mut stats = FillStats::default();

    for (y, row) in table.rows() {
        if !band.contains(&y) {
            continue;
        }
        let (Some(&left), Some(&right)) = (row.first(), row.last()) else {
            continue;
        };

        // A one-pixel span takes the whole delta in its single step.
        let steps = (right.x - left.x).max(1) as f32;
        let depth_step = (right.depth - left.depth) / steps;
        let color_step = (right.color - left.color) * (1.0 / steps);

        let mut depth = left.depth;
        let mut color = left.color;
        for x in left.x..=right.x {
            if x == right.x {
                depth = right.depth;
                color = right.color;
            }
            if target.contains(x, y) {
                stats.tested += 1;
                if target.set_pixel_with_depth(x, y, depth, color) {
                    stats.written += 1;
                }
            }
            depth += depth_step;
            color = color + color_step;
        }
    }

    stats
}

/// Rasterizer that fills triangles through a per-triangle span table.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanlineRasterizer;

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for ScanlineRasterizer {
    fn fill_triangle(&self, vertices: &[ProjectedVertex; 3], target: &mut RenderTarget) -> FillStats {
        let table = SpanTable::from_triangle(vertices);
        composite(&table, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{Color, BLACK, BLUE, GREEN, RED};
    use crate::config::BufferConfig;
    use crate::render::framebuffer::FrameBuffer;
    use crate::render::rasterizer::{Fragment, Pixel, SpanTableBuilder};
    use crate::render::zbuffer::ZBuffer;
    use approx::assert_relative_eq;

    fn vertex(x: i32, y: i32, depth: f32, color: Color) -> ProjectedVertex {
        ProjectedVertex::new(Pixel::new(x, y), depth, color)
    }

    fn buffers(size: u32) -> (FrameBuffer, ZBuffer) {
        let config = BufferConfig::new(size, size, BLACK);
        (FrameBuffer::new(&config), ZBuffer::new(&config))
    }

    fn fill(tris: &[[ProjectedVertex; 3]], frame: &mut FrameBuffer, zbuffer: &mut ZBuffer) -> FillStats {
        let rasterizer = ScanlineRasterizer::new();
        let mut target = RenderTarget::new(frame, zbuffer);
        let mut stats = FillStats::default();
        for tri in tris {
            stats += rasterizer.fill_triangle(tri, &mut target);
        }
        stats
    }

    #[test]
    fn fills_single_triangle() {
        let (mut frame, mut zbuffer) = buffers(20);
        let tri = [vertex(0, 0, 5.0, RED), vertex(10, 0, 5.0, RED), vertex(5, 10, 5.0, RED)];
        let stats = fill(&[tri], &mut frame, &mut zbuffer);

        assert!(stats.written > 40);
        assert_eq!(stats.tested, stats.written);
        assert_eq!(frame.covered_pixels(), stats.written as usize);

        for (x, y) in [(0, 0), (10, 0), (5, 10), (5, 5), (5, 0)] {
            assert_eq!(frame.get_pixel(x, y), Some(RED), "({}, {})", x, y);
            assert_eq!(zbuffer.depth(x, y), Some(5.0));
        }
        for (x, y) in [(11, 0), (0, 5), (10, 5), (5, 11), (19, 19)] {
            assert_eq!(frame.get_pixel(x, y), Some(BLACK), "({}, {})", x, y);
            assert_eq!(zbuffer.depth(x, y), Some(f32::INFINITY));
        }
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        let far = [vertex(2, 2, 10.0, RED), vertex(16, 2, 10.0, RED), vertex(9, 16, 10.0, RED)];
        let near = [vertex(2, 2, 2.0, BLUE), vertex(16, 2, 2.0, BLUE), vertex(9, 16, 2.0, BLUE)];

        let (mut frame_a, mut zbuffer_a) = buffers(20);
        fill(&[far, near], &mut frame_a, &mut zbuffer_a);
        let (mut frame_b, mut zbuffer_b) = buffers(20);
        fill(&[near, far], &mut frame_b, &mut zbuffer_b);

        assert_eq!(frame_a.get_pixel(9, 6), Some(BLUE));
        assert_eq!(zbuffer_a.depth(9, 6), Some(2.0));
        assert_eq!(frame_a.pixels(), frame_b.pixels());
        assert_eq!(zbuffer_a.depths(), zbuffer_b.depths());
    }

    #[test]
    fn intersecting_triangles_keep_per_pixel_minimum() {
        // Two sloped triangles crossing each other halfway.
        let a = [vertex(0, 0, 1.0, RED), vertex(19, 0, 9.0, RED), vertex(0, 19, 1.0, RED)];
        let b = [vertex(0, 0, 9.0, GREEN), vertex(19, 0, 1.0, GREEN), vertex(0, 19, 9.0, GREEN)];

        let (mut frame_a, mut zbuffer_a) = buffers(20);
        fill(&[a, b], &mut frame_a, &mut zbuffer_a);
        let (mut frame_b, mut zbuffer_b) = buffers(20);
        fill(&[b, a], &mut frame_b, &mut zbuffer_b);

        assert_eq!(zbuffer_a.depths(), zbuffer_b.depths());
        assert_eq!(frame_a.get_pixel(1, 1), Some(RED));
        assert_eq!(frame_a.get_pixel(17, 1), Some(GREEN));
    }

    #[test]
    fn colinear_triangle_is_harmless() {
        let (mut frame, mut zbuffer) = buffers(20);
        let flat = [vertex(0, 0, 3.0, RED), vertex(4, 4, 3.0, RED), vertex(8, 8, 3.0, RED)];
        let next = [vertex(10, 10, 4.0, GREEN), vertex(18, 10, 4.0, GREEN), vertex(10, 18, 4.0, GREEN)];
        let stats = fill(&[flat, next], &mut frame, &mut zbuffer);

        // The degenerate triangle covers at most its own diagonal.
        for (x, y) in [(1, 0), (0, 1), (7, 8)] {
            assert_eq!(frame.get_pixel(x, y), Some(BLACK));
        }
        assert!(zbuffer.depths().iter().all(|d| !d.is_nan()));
        assert_eq!(frame.get_pixel(12, 12), Some(GREEN));
        assert!(stats.written > 9);
    }

    #[test]
    fn span_endpoints_match_boundary_fragments() {
        let left = Fragment {
            x: 1,
            depth: 0.3,
            color: Color::new(0.1, 0.7, 0.2),
        };
        let right = Fragment {
            x: 18,
            depth: 7.9,
            color: Color::new(0.9, 0.3, 0.6),
        };
        let mut builder = SpanTableBuilder::new();
        builder.push(4, right);
        builder.push(4, left);
        let table = builder.build();

        let (mut frame, mut zbuffer) = buffers(20);
        let stats = {
            let mut target = RenderTarget::new(&mut frame, &mut zbuffer);
            composite(&table, &mut target)
        };

        assert_eq!(stats.written, 18);
        assert_eq!(zbuffer.depth(1, 4), Some(left.depth));
        assert_eq!(frame.get_pixel(1, 4), Some(left.color));
        assert_eq!(zbuffer.depth(18, 4), Some(right.depth));
        assert_eq!(frame.get_pixel(18, 4), Some(right.color));

        let mid = zbuffer.depth(10, 4).unwrap();
        assert_relative_eq!(mid, 0.3 + 7.6 * 9.0 / 17.0, epsilon = 1e-4);
    }

    #[test]
    fn clips_to_target_bounds() {
        let (mut frame, mut zbuffer) = buffers(10);
        let tri = [vertex(-5, -5, 1.0, RED), vertex(30, -5, 1.0, RED), vertex(-5, 30, 1.0, RED)];
        let stats = fill(&[tri], &mut frame, &mut zbuffer);
        assert_eq!(stats.tested, 100);
        assert_eq!(frame.covered_pixels(), 100);
    }

    #[test]
    fn band_only_receives_its_rows() {
        let tri = [vertex(0, 0, 1.0, RED), vertex(9, 0, 1.0, RED), vertex(0, 9, 1.0, RED)];
        let table = SpanTable::from_triangle(&tri);
        let mut color = vec![BLACK; 30];
        let mut depth = vec![f32::INFINITY; 30];
        let stats = {
            let mut band = RenderTarget::band(&mut color, &mut depth, 10, 3);
            composite(&table, &mut band)
        };
        // Rows 3, 4 and 5 span x = 0..=6, 0..=5 and 0..=4.
        assert_eq!(stats.written, 7 + 6 + 5);
        assert_eq!(color[6], RED);
        assert_eq!(color[7], BLACK);
    }
}
