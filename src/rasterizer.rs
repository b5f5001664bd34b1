//! Triangle setup: floating-point vertices in, fixed-point stepping record out.
//!
//! Nothing here keeps state between calls. A [`Rasterizer`] is an immutable
//! configuration value, so any number of threads can set up triangles with the
//! same one, and [`calc_line_increment`] can be called for any band of a record
//! in any order.

use log::{debug, trace};

use crate::color::Color;
use crate::error::RejectReason;
use crate::fixed::{Fixed, OverflowPolicy, Rounding};
use crate::geometry::{EdgeEquation, edge_function_fixed, pixel_center_span, snap_to_subpixel};
use crate::triangle::RasterizedTriangle;
use crate::vector::{Vec2, Vec4};

/// Binary point of the default [`Rasterizer`].
pub const DEFAULT_FRAC_BITS: u32 = 12;

/// Which winding is discarded. Positive [`crate::edge_function_float`] area is
/// front facing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CullMode {
    /// Accept both windings.
    None,
    /// Reject negative area.
    #[default]
    Back,
    /// Reject positive area.
    Front,
}

/// Render target size in pixels. Bounding boxes are clipped to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

/// Triangle setup configuration with `FRAC` fractional bits in the texture and
/// depth fields.
///
/// Edge weights do not depend on `FRAC`: they are exact integers with
/// [`WEIGHT_FRAC_BITS`](crate::geometry::WEIGHT_FRAC_BITS) fractional bits and stay in range up to 2^23 pixels
/// squared, which covers any triangle inside a 2048 x 2048 viewport. Larger
/// triangles are rejected (or clamped) like any other overflow.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rasterizer<const FRAC: u32 = DEFAULT_FRAC_BITS> {
    viewport: Viewport,
    cull_mode: CullMode,
    rounding: Rounding,
    overflow: OverflowPolicy,
    static_color: Color,
    textured: bool,
}

impl Rasterizer {
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_viewport(Viewport { width, height })
    }
}

/// Linear function over the bounding box, before quantization.
#[derive(Debug, Copy, Clone)]
struct Plane {
    init: f64,
    x_inc: f64,
    y_inc: f64,
}

impl Plane {
    /// Plane through three per-vertex values, using the normalized edge weights
    /// as barycentric coordinates.
    fn through(values: [f64; 3], edges: &[EdgeEquation; 3], area: f64, origin: (i64, i64)) -> Plane {
        let mut plane = Plane { init: 0.0, x_inc: 0.0, y_inc: 0.0 };
        for (value, edge) in values.iter().zip(edges) {
            plane.init += value * edge.at_pixel_center(origin.0, origin.1) as f64;
            plane.x_inc += value * edge.x_step() as f64;
            plane.y_inc += value * edge.y_step() as f64;
        }
        Plane {
            init: plane.init / area,
            x_inc: plane.x_inc / area,
            y_inc: plane.y_inc / area,
        }
    }

    /// Largest magnitude of the increments and of the value at any box corner.
    fn bound(&self, last: (i64, i64)) -> f64 {
        let (last_x, last_y) = (last.0 as f64, last.1 as f64);
        [
            self.init,
            self.init + last_x * self.x_inc,
            self.init + last_y * self.y_inc,
            self.init + last_x * self.x_inc + last_y * self.y_inc,
            self.x_inc,
            self.y_inc,
        ]
        .iter()
        .fold(0.0, |max, value| value.abs().max(max))
    }
}

impl<const FRAC: u32> Rasterizer<FRAC> {
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            cull_mode: CullMode::default(),
            rounding: Rounding::default(),
            overflow: OverflowPolicy::default(),
            static_color: Color::WHITE,
            textured: true,
        }
    }

    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// With [`OverflowPolicy::Saturate`] out-of-range fields are clamped and the
    /// bounding box corners are not checked; the backend must step with
    /// saturating arithmetic. Vertex w values are never clamped.
    pub fn with_overflow_policy(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_static_color(mut self, color: Color) -> Self {
        self.static_color = color;
        self
    }

    pub fn with_texturing(mut self, textured: bool) -> Self {
        self.textured = textured;
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    pub fn frac_bits(&self) -> u32 {
        FRAC
    }

    /// Sets up one triangle.
    ///
    /// `v*` are window coordinates: x and y in pixels (y down), z is ignored and
    /// w is the clip-space w, not yet inverted. `st*` are the texture coordinates.
    pub fn rasterize(
        &self,
        v0: &Vec4,
        st0: &Vec2,
        v1: &Vec4,
        st1: &Vec2,
        v2: &Vec4,
        st2: &Vec2,
    ) -> Result<RasterizedTriangle, RejectReason> {
        self.setup([v0, v1, v2], [st0, st1, st2])
            .inspect_err(|reason| trace!("triangle rejected: {reason}"))
    }

    fn setup(&self, verts: [&Vec4; 3], sts: [&Vec2; 3]) -> Result<RasterizedTriangle, RejectReason> {
        let finite = verts.iter().all(|v| v.x.is_finite() && v.y.is_finite() && v.w.is_finite())
            && sts.iter().all(|st| st.x.is_finite() && st.y.is_finite());
        if !finite {
            return Err(RejectReason::InvalidVertex);
        }
        if verts.iter().any(|v| v.w <= 0.0) {
            return Err(RejectReason::NonPositiveW);
        }

        let mut pts = [[0i64; 2]; 3];
        for (pt, v) in pts.iter_mut().zip(verts) {
            *pt = [
                snap_to_subpixel(v.x).ok_or(RejectReason::InvalidVertex)?,
                snap_to_subpixel(v.y).ok_or(RejectReason::InvalidVertex)?,
            ];
        }

        // Edge i is opposite vertex i, so its weight is largest at vertex i
        let mut edges = [
            EdgeEquation::new(pts[1], pts[2]),
            EdgeEquation::new(pts[2], pts[0]),
            EdgeEquation::new(pts[0], pts[1]),
        ];
        let mut area = edge_function_fixed(pts[0], pts[1], pts[2]);
        if area == 0 {
            return Err(RejectReason::Degenerate);
        }
        let clockwise = area < 0;
        match (self.cull_mode, clockwise) {
            (CullMode::Back, true) | (CullMode::Front, false) => return Err(RejectReason::Culled),
            _ => {}
        }
        if clockwise {
            edges = edges.map(EdgeEquation::negated);
            area = -area;
        }

        let (min_x, max_x) = min_max(pts.map(|p| p[0]));
        let (min_y, max_y) = min_max(pts.map(|p| p[1]));
        let (start_x, end_x) = pixel_center_span(min_x, max_x);
        let (start_y, end_y) = pixel_center_span(min_y, max_y);
        if start_x >= end_x || start_y >= end_y {
            return Err(RejectReason::EmptyBoundingBox);
        }
        let start_x = start_x.max(0);
        let start_y = start_y.max(0);
        let end_x = end_x.min(self.viewport.width as i64);
        let end_y = end_y.min(self.viewport.height as i64);
        if start_x >= end_x || start_y >= end_y {
            return Err(RejectReason::OutsideViewport);
        }
        let last = (end_x - start_x - 1, end_y - start_y - 1);
        // Everything is sampled at the centre of the box origin pixel
        let origin = (start_x, start_y);

        let mut tri = RasterizedTriangle {
            bb_start_x: start_x as u16,
            bb_start_y: start_y as u16,
            bb_end_x: end_x as u16,
            bb_end_y: end_y as u16,
            ..Default::default()
        };

        for (i, edge) in edges.iter().enumerate() {
            let weights = [edge.at_pixel_center(origin.0, origin.1), edge.x_step(), edge.y_step()];
            [tri.w_init[i], tri.w_x_inc[i], tri.w_y_inc[i]] = self.fit_weights(weights, last)?;
        }

        let w = self.fixed_w(verts)?;
        let area = area as f64;
        let planes = |recip_w: [f64; 3]| -> [Plane; 3] {
            let depth = Plane::through(recip_w, &edges, area, origin);
            let [s, t] = [0, 1].map(|axis| {
                let values = std::array::from_fn(|i| sts[i][axis] as f64 * recip_w[i]);
                Plane::through(values, &edges, area, origin)
            });
            [depth, s, t]
        };

        // Scale 1/w by a power of two so the planes use most of the i32 range
        let estimate = planes(w.map(|w| 1.0 / w.to_f64()));
        let bound = estimate.iter().fold(0.0, |max: f64, plane| plane.bound(last).max(max));
        let shift = Self::depth_shift(bound);

        let mut recip_w = [0.0; 3];
        for (recip, w) in recip_w.iter_mut().zip(w) {
            *recip = Self::calc_recip(w, shift)?;
        }
        let [depth, s, t] = planes(recip_w);
        [tri.depth_w_init, tri.depth_w_x_inc, tri.depth_w_y_inc] = self.quantize(depth, last, "depth_w")?;
        for (axis, plane) in [s, t].into_iter().enumerate() {
            [tri.tex_st_init[axis], tri.tex_st_x_inc[axis], tri.tex_st_y_inc[axis]] =
                self.quantize(plane, last, "tex_st")?;
        }

        let mut configuration = (shift as u16) << RasterizedTriangle::DEPTH_SHIFT_OFFSET;
        for (i, edge) in edges.iter().enumerate() {
            if edge.is_top_left() {
                configuration |= RasterizedTriangle::TOP_LEFT_EDGE0 << i;
            }
        }
        if clockwise {
            configuration |= RasterizedTriangle::CLOCKWISE;
        }
        if self.textured {
            configuration |= RasterizedTriangle::TEXTURED;
        }
        tri.triangle_configuration = configuration;
        tri.triangle_static_color = self.static_color.to_rgba4444();

        Ok(tri)
    }

    /// Vertex w on the fixed-point grid. A w that does not fit, or that rounds
    /// to zero, has no usable reciprocal.
    fn fixed_w(&self, verts: [&Vec4; 3]) -> Result<[Fixed<FRAC>; 3], RejectReason> {
        let mut out = [Fixed::ZERO; 3];
        for (fixed, v) in out.iter_mut().zip(verts) {
            *fixed = Fixed::from_f64(v.w as f64, self.rounding)
                .filter(|w| w.raw() > 0)
                .ok_or(RejectReason::Overflow { field: "depth_w" })?;
        }
        Ok(out)
    }

    /// Largest shift that keeps every scaled depth and texture value below
    /// 2^30 raw units.
    fn depth_shift(bound: f64) -> u32 {
        if bound <= 0.0 {
            return 0;
        }
        let limit = (1u64 << (30 - FRAC)) as f64;
        let shift = (limit / bound).log2().floor();
        shift.clamp(0.0, RasterizedTriangle::MAX_DEPTH_SHIFT as f64) as u32
    }

    /// `2^shift / w` through the fixed-point reciprocal, so depth values do not
    /// depend on the host's float division.
    fn calc_recip(w: Fixed<FRAC>, shift: u32) -> Result<f64, RejectReason> {
        w.recip_scaled(shift)
            .map(Fixed::to_f64)
            .ok_or(RejectReason::Overflow { field: "depth_w" })
    }

    fn fit_weights(&self, weights: [i64; 3], last: (i64, i64)) -> Result<[i32; 3], RejectReason> {
        let mut fitted = [0; 3];
        for (out, value) in fitted.iter_mut().zip(weights) {
            *out = match self.overflow {
                OverflowPolicy::Reject => {
                    i32::try_from(value).map_err(|_| RejectReason::Overflow { field: "w" })?
                }
                OverflowPolicy::Saturate => value.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            };
        }
        if self.overflow == OverflowPolicy::Reject {
            check_corners(weights, last, "w")?;
        }
        Ok(fitted)
    }

    fn quantize(&self, plane: Plane, last: (i64, i64), field: &'static str) -> Result<[i32; 3], RejectReason> {
        let convert = |value: f64| {
            Fixed::<FRAC>::convert(value, self.rounding, self.overflow)
                .map(Fixed::raw)
                .ok_or(RejectReason::Overflow { field })
        };
        let fixed = [convert(plane.init)?, convert(plane.x_inc)?, convert(plane.y_inc)?];

        if self.overflow == OverflowPolicy::Reject {
            check_corners(fixed.map(i64::from), last, field)?;
        }
        Ok(fixed)
    }
}

/// Stepping is linear, so the corners bound every pixel in the box.
fn check_corners(plane: [i64; 3], last: (i64, i64), field: &'static str) -> Result<(), RejectReason> {
    let [init, x_inc, y_inc] = plane;
    let (last_x, last_y) = last;
    for (dx, dy) in [(0, 0), (last_x, 0), (0, last_y), (last_x, last_y)] {
        let value = init + dx * x_inc + dy * y_inc;
        if i32::try_from(value).is_err() {
            debug!("{field} leaves the i32 range at box offset ({dx}, {dy})");
            return Err(RejectReason::Overflow { field });
        }
    }
    Ok(())
}

fn min_max(values: [i64; 3]) -> (i64, i64) {
    let min = values[0].min(values[1]).min(values[2]);
    let max = values[0].max(values[1]).max(values[2]);
    (min, max)
}

/// Restricts a record to the scanlines `[line_start, line_end)`.
///
/// The bounding box is clipped vertically, every init field is advanced to the
/// new first line and the increments are copied. The cost does not depend on
/// how many lines are skipped, and the result equals stepping the input
/// record down to that line.
pub fn calc_line_increment(
    triangle: &RasterizedTriangle,
    line_start: u16,
    line_end: u16,
) -> Result<RasterizedTriangle, RejectReason> {
    if line_start >= line_end {
        return Err(RejectReason::InvalidLineRange { start: line_start, end: line_end });
    }
    let start = triangle.bb_start_y.max(line_start);
    let end = triangle.bb_end_y.min(line_end);
    if start >= end {
        return Err(RejectReason::LinesOutsideBoundingBox);
    }

    let lines = (start - triangle.bb_start_y) as i64;
    let advance = |init: i32, y_inc: i32, field: &'static str| {
        i32::try_from(init as i64 + y_inc as i64 * lines).map_err(|_| RejectReason::Overflow { field })
    };

    let mut out = *triangle;
    out.bb_start_y = start;
    out.bb_end_y = end;
    for i in 0..3 {
        out.w_init[i] = advance(triangle.w_init[i], triangle.w_y_inc[i], "w")?;
    }
    for i in 0..2 {
        out.tex_st_init[i] = advance(triangle.tex_st_init[i], triangle.tex_st_y_inc[i], "tex_st")?;
    }
    out.depth_w_init = advance(triangle.depth_w_init, triangle.depth_w_y_inc, "depth_w")?;
    Ok(out)
}
