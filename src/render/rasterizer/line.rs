//! Integer line rasterization.
//!
//! Every segment is first mapped into the first octant (`0 <= dy <= dx`) by
//! at most three reversible steps: ordering the endpoints, mirroring Y, and
//! transposing X/Y. A single Bresenham loop then runs in that octant and the
//! mapping is undone on the way out.
//!
//! ```text
//!   order:      (x0,y0) <= (x1,y1) lexicographically
//!   mirror:     dy < 0        => y := -y
//!   transpose:  dy > dx       => (x, y) := (y, x)
//! ```
//!
//! Because the endpoint ordering is total, `(a, b)` and `(b, a)` produce the
//! exact same pixel sequence.

/// An integer pixel coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    fn mirrored(self) -> Self {
        Self::new(self.x, -self.y)
    }

    #[inline]
    fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }
}

/// The reversible mapping from an arbitrary segment into the first octant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Octant {
    mirror_y: bool,
    transpose: bool,
}

impl Octant {
    /// Returns the mapping and the mapped endpoints, ordered by x.
    fn normalize(a: Pixel, b: Pixel) -> (Self, Pixel, Pixel) {
        let (start, end) = if (a.x, a.y) <= (b.x, b.y) { (a, b) } else { (b, a) };

        let mirror_y = end.y < start.y;
        let (start, end) = if mirror_y {
            (start.mirrored(), end.mirrored())
        } else {
            (start, end)
        };

        let transpose = end.y - start.y > end.x - start.x;
        let (start, end) = if transpose {
            (start.transposed(), end.transposed())
        } else {
            (start, end)
        };

        (Self { mirror_y, transpose }, start, end)
    }

    #[inline]
    fn restore(self, p: Pixel) -> Pixel {
        let p = if self.transpose { p.transposed() } else { p };
        if self.mirror_y {
            p.mirrored()
        } else {
            p
        }
    }
}

/// Rasterize the segment from `a` to `b`, endpoints included.
///
/// The first pixel of the result is whichever endpoint is smaller in
/// `(x, y)` order; callers that care about direction must check it.
pub fn rasterize_line(a: Pixel, b: Pixel) -> Vec<Pixel> {
    let (octant, start, end) = Octant::normalize(a, b);
    let mut line = bresenham(start, end);
    for p in &mut line {
        *p = octant.restore(*p);
    }
    line
}

/// Midpoint Bresenham for `start.x <= end.x` and `0 <= dy <= dx`.
fn bresenham(start: Pixel, end: Pixel) -> Vec<Pixel> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    debug_assert!(dx >= 0 && (0..=dx).contains(&dy), "segment not in first octant");

    let mut line = Vec::with_capacity(dx as usize + 1);
    let mut y = start.y;
    let mut d = 2 * dy - dx;

    for x in start.x..=end.x {
        line.push(Pixel::new(x, y));
        if d < 0 {
            d += 2 * dy;
        } else {
            d += 2 * (dy - dx);
            y += 1;
        }
    }

    line
}
