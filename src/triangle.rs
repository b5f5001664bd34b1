use bytemuck::{Pod, Zeroable};

use crate::color::Color;
use crate::vector::Vec2;

/// Fixed-point description of one triangle, stepped by the renderer.
///
/// The layout is the contract with the renderer backend: `#[repr(C)]`, 84 bytes,
/// fields in declaration order, no padding.
///
/// Edge weights (`w_*`) are exact and always carry
/// [`crate::geometry::WEIGHT_FRAC_BITS`] fractional bits. The `tex_st_*` and
/// `depth_w_*` fields use the binary point of the [`crate::Rasterizer`] that
/// produced the record and are scaled by `2^depth_shift()`, which cancels in
/// the texture divide.
///
/// For a pixel `(x, y)` inside the bounding box every attribute is
/// `init + (x - bb_start_x) * x_inc + (y - bb_start_y) * y_inc`, sampled at the
/// pixel centre. Records from [`crate::Rasterizer::rasterize`] never overflow an
/// `i32` anywhere inside their box.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct RasterizedTriangle {
    pub triangle_configuration: u16,
    /// RGBA4444, see [`Color::to_rgba4444`].
    pub triangle_static_color: u16,
    pub bb_start_x: u16,
    pub bb_start_y: u16,
    /// Exclusive.
    pub bb_end_x: u16,
    /// Exclusive.
    pub bb_end_y: u16,
    pub w_init: [i32; 3],
    pub w_x_inc: [i32; 3],
    pub w_y_inc: [i32; 3],
    pub tex_st_init: [i32; 2],
    pub tex_st_x_inc: [i32; 2],
    pub tex_st_y_inc: [i32; 2],
    pub depth_w_init: i32,
    pub depth_w_x_inc: i32,
    pub depth_w_y_inc: i32,
}

const _: () = assert!(std::mem::size_of::<RasterizedTriangle>() == RasterizedTriangle::SIZE);

impl RasterizedTriangle {
    pub const SIZE: usize = 84;

    /// Edge `i` is a top or left edge: a weight of exactly zero is inside.
    pub const TOP_LEFT_EDGE0: u16 = 1 << 0;
    pub const TOP_LEFT_EDGE1: u16 = 1 << 1;
    pub const TOP_LEFT_EDGE2: u16 = 1 << 2;
    /// The input had negative area; the weights were negated.
    pub const CLOCKWISE: u16 = 1 << 3;
    /// Sample the texture instead of using the static color.
    pub const TEXTURED: u16 = 1 << 4;
    /// Bits 8..=12: power of two the 1/w and s/w, t/w planes are scaled by.
    pub const DEPTH_SHIFT_OFFSET: u32 = 8;
    pub const DEPTH_SHIFT_MASK: u16 = 0x1F << Self::DEPTH_SHIFT_OFFSET;
    pub const MAX_DEPTH_SHIFT: u32 = 31;

    pub fn is_top_left(&self, edge: usize) -> bool {
        self.triangle_configuration & (Self::TOP_LEFT_EDGE0 << edge) != 0
    }

    pub fn is_clockwise(&self) -> bool {
        self.triangle_configuration & Self::CLOCKWISE != 0
    }

    pub fn is_textured(&self) -> bool {
        self.triangle_configuration & Self::TEXTURED != 0
    }

    pub fn depth_shift(&self) -> u32 {
        ((self.triangle_configuration & Self::DEPTH_SHIFT_MASK) >> Self::DEPTH_SHIFT_OFFSET) as u32
    }

    /// W-buffer key for a stepped `depth_w` value, comparable across records:
    /// 1/w with [`Self::MAX_DEPTH_SHIFT`] extra fractional bits. Larger is nearer.
    pub fn depth_key(&self, depth_w: i32) -> i64 {
        (depth_w as i64) << (Self::MAX_DEPTH_SHIFT - self.depth_shift())
    }

    pub fn static_color(&self) -> Color {
        Color::from_rgba4444(self.triangle_static_color)
    }

    pub fn width(&self) -> u32 {
        self.bb_end_x.saturating_sub(self.bb_start_x) as u32
    }

    pub fn height(&self) -> u32 {
        self.bb_end_y.saturating_sub(self.bb_start_y) as u32
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.bb_start_x as u32
            && x < self.bb_end_x as u32
            && y >= self.bb_start_y as u32
            && y < self.bb_end_y as u32
    }

    /// Saturates like a backend stepping a clamped record.
    #[inline(always)]
    fn step(&self, init: i32, x_inc: i32, y_inc: i32, x: u32, y: u32) -> i32 {
        let dx = x as i64 - self.bb_start_x as i64;
        let dy = y as i64 - self.bb_start_y as i64;
        let value = init as i64 + dx * x_inc as i64 + dy * y_inc as i64;
        value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Edge weights at pixel `(x, y)` in screen coordinates.
    pub fn weights_at(&self, x: u32, y: u32) -> [i32; 3] {
        std::array::from_fn(|i| self.step(self.w_init[i], self.w_x_inc[i], self.w_y_inc[i], x, y))
    }

    /// Top-left coverage test for pixel `(x, y)`; false outside the bounding box.
    pub fn covers(&self, x: u32, y: u32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        self.weights_inside(self.weights_at(x, y))
    }

    /// Coverage test on already stepped weights.
    #[inline(always)]
    pub fn weights_inside(&self, weights: [i32; 3]) -> bool {
        weights
            .iter()
            .enumerate()
            .all(|(edge, &w)| w > 0 || (w == 0 && self.is_top_left(edge)))
    }

    /// Interpolated 1/w at pixel `(x, y)`.
    pub fn depth_w_at(&self, x: u32, y: u32) -> i32 {
        self.step(self.depth_w_init, self.depth_w_x_inc, self.depth_w_y_inc, x, y)
    }

    /// Interpolated 1/w at pixel `(x, y)` with the depth shift removed, in raw
    /// units of the producing rasterizer's binary point.
    pub fn recip_w_at(&self, x: u32, y: u32) -> f64 {
        self.depth_w_at(x, y) as f64 / (1u64 << self.depth_shift()) as f64
    }

    /// Interpolated s/w and t/w at pixel `(x, y)`.
    pub fn tex_st_at(&self, x: u32, y: u32) -> [i32; 2] {
        std::array::from_fn(|i| {
            self.step(self.tex_st_init[i], self.tex_st_x_inc[i], self.tex_st_y_inc[i], x, y)
        })
    }

    /// Perspective-correct texture coordinate at pixel `(x, y)`.
    ///
    /// Numerator and 1/w share the binary point and the depth shift, so the
    /// divide depends on neither. `None` where the interpolated 1/w is zero.
    pub fn tex_coord_at(&self, x: u32, y: u32) -> Option<Vec2> {
        let depth_w = self.depth_w_at(x, y);
        if depth_w == 0 {
            return None;
        }
        let [s, t] = self.tex_st_at(x, y);
        Some(Vec2::new(
            (s as f64 / depth_w as f64) as f32,
            (t as f64 / depth_w as f64) as f32,
        ))
    }

    /// Raw bytes in native endianness, as handed to the backend.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
