use crate::vector::{Vec2, Vec4};

/// Number of sub-pixel bits vertex positions are snapped to before setup.
pub const SUBPIXEL_BITS: u32 = 4;
pub const SUBPIXEL_SCALE: i64 = 1 << SUBPIXEL_BITS;

/// Fractional bits of an edge weight: the product of two sub-pixel distances.
pub const WEIGHT_FRAC_BITS: u32 = 2 * SUBPIXEL_BITS;

// Snapped coordinates stay below 2^27 sub-pixels so edge products fit an i64
const MAX_SUBPIXEL: f64 = (1i64 << 27) as f64;

/// Signed area of the parallelogram spanned by `a -> b` and `a -> c`.
///
/// Positive when `c` lies on the interior side of `a -> b` for the front-facing
/// winding, so (0,0), (10,0), (0,10) yields +100. Only x and y are used.
pub fn edge_function_float(a: &Vec4, b: &Vec4, c: &Vec4) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// The same edge function on snapped sub-pixel coordinates.
///
/// The result is exact and has [`WEIGHT_FRAC_BITS`] fractional bits, so
/// (0,0), (160,0), (0,160) yields 100 pixels squared as 25600.
pub fn edge_function_fixed(a: [i64; 2], b: [i64; 2], c: [i64; 2]) -> i64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Rounds a window coordinate onto the sub-pixel grid.
///
/// Returns the coordinate in sub-pixel units, or `None` when it is not finite
/// or too far off screen to set up.
#[inline(always)]
pub fn snap_to_subpixel(value: f32) -> Option<i64> {
    let scaled = (value as f64 * SUBPIXEL_SCALE as f64).round();
    (scaled.abs() <= MAX_SUBPIXEL).then_some(scaled as i64)
}

/// Sub-pixel position of the centre of pixel `i`.
#[inline(always)]
pub fn pixel_center(i: i64) -> i64 {
    i * SUBPIXEL_SCALE + SUBPIXEL_SCALE / 2
}

/// Half-open range of pixel indices whose centres lie in `[min, max]`, both
/// given in sub-pixel units.
///
/// The range is empty (`start >= end`) when no pixel centre falls inside.
pub fn pixel_center_span(min: i64, max: i64) -> (i64, i64) {
    let half = SUBPIXEL_SCALE / 2;
    let start = -(half - min).div_euclid(SUBPIXEL_SCALE);
    let end = (max - half).div_euclid(SUBPIXEL_SCALE) + 1;
    (start, end)
}

/// Edge function of the directed edge `from -> to` as `a*x + b*y + c` over
/// sub-pixel coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EdgeEquation {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

impl EdgeEquation {
    pub fn new(from: [i64; 2], to: [i64; 2]) -> Self {
        let a = from[1] - to[1];
        let b = to[0] - from[0];
        let c = -(a * from[0] + b * from[1]);
        EdgeEquation { a, b, c }
    }

    #[inline(always)]
    pub fn eval(&self, x: i64, y: i64) -> i64 {
        self.a * x + self.b * y + self.c
    }

    /// Weight at the centre of pixel `(x, y)`.
    pub fn at_pixel_center(&self, x: i64, y: i64) -> i64 {
        self.eval(pixel_center(x), pixel_center(y))
    }

    /// Change of the weight from one pixel to the next along x.
    pub fn x_step(&self) -> i64 {
        self.a * SUBPIXEL_SCALE
    }

    pub fn y_step(&self) -> i64 {
        self.b * SUBPIXEL_SCALE
    }

    pub fn negated(self) -> Self {
        EdgeEquation { a: -self.a, b: -self.b, c: -self.c }
    }

    /// Top-left fill rule with y growing downwards, for an edge whose interior is
    /// on the positive side: left edges have the interior to their right, top edges
    /// are horizontal with the interior below.
    pub fn is_top_left(&self) -> bool {
        self.a > 0 || (self.a == 0 && self.b > 0)
    }
}

/// Floating-point coverage test of the pixel centre `p` under the top-left rule.
///
/// Accepts both windings. Used as a reference for the integer weights.
pub fn point_in_triangle(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> bool {
    let pts = [a, b, c].map(|v| [v.x as f64, v.y as f64]);
    let (px, py) = (p.x as f64, p.y as f64);
    let area = (pts[1][0] - pts[0][0]) * (pts[2][1] - pts[0][1])
        - (pts[1][1] - pts[0][1]) * (pts[2][0] - pts[0][0]);
    if area == 0.0 {
        return false;
    }
    let sign = area.signum();
    // Fail fast on any edge
    for i in 0..3 {
        let (from, to) = (pts[(i + 1) % 3], pts[(i + 2) % 3]);
        let ea = sign * (from[1] - to[1]);
        let eb = sign * (to[0] - from[0]);
        let w = ea * (px - from[0]) + eb * (py - from[1]);
        let top_left = ea > 0.0 || (ea == 0.0 && eb > 0.0);
        if w < 0.0 || (w == 0.0 && !top_left) {
            return false;
        }
    }
    true
}
