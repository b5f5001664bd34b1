use anyhow::{Result, anyhow};
use image::RgbaImage;
use std::path::Path;

use crate::color::Color;
use crate::rectangle::Rect;
use crate::texture::Texture;
use crate::triangle::RasterizedTriangle;

/// Color and W-buffer for one rectangle of the screen.
///
/// The depth buffer holds [`RasterizedTriangle::depth_key`] of the nearest pixel
/// so far: 1/w with the per-record scale removed. Larger is nearer and 0
/// (cleared) is infinitely far away.
pub struct ScreenSpace {
    pub rect: Rect,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub depth: Vec<i64>,
}

#[inline(always)]
fn step<const N: usize>(values: [i32; N], inc: [i32; N]) -> [i32; N] {
    std::array::from_fn(|i| values[i].saturating_add(inc[i]))
}

impl ScreenSpace {
    pub fn new(width: u32, height: u32) -> Self {
        Self::for_rect(Rect { min_x: 0, min_y: 0, max_x: width, max_y: height })
    }

    pub fn for_rect(rect: Rect) -> Self {
        let size_calc = (rect.width() * rect.height()) as usize;
        Self {
            rect,
            width: rect.width(),
            height: rect.height(),
            rgba: vec![0; size_calc * 4],
            depth: vec![0; size_calc],
        }
    }

    /// Pixel coordinates are relative to `rect`.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height { return; }
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba[i..i + 4].copy_from_slice(&color.to_bytes());
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height { return None }
        let i = ((y * self.width + x) * 4) as usize;
        Some(Color::with_alpha(self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]))
    }

    pub fn get_depth(&self, x: u32, y: u32) -> i64 {
        let i = (y * self.width + x) as usize;
        self.depth[i]
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for pixel in self.rgba.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
        self.depth.fill(0);
    }

    /// Steps a record across its bounding box and shades the covered pixels
    /// that lie inside this rectangle and pass the depth test.
    ///
    /// Only additions are used per pixel, the way a hardware backend would walk
    /// the record. Returns the number of pixels written.
    pub fn draw_triangle(&mut self, tri: &RasterizedTriangle, texture: Option<&Texture>) -> u32 {
        let static_color = tri.static_color();
        let texture = texture.filter(|_| tri.is_textured());
        let mut written = 0;

        let mut row_w = tri.w_init;
        let mut row_st = tri.tex_st_init;
        let mut row_depth = tri.depth_w_init;

        for y in tri.bb_start_y as u32..tri.bb_end_y as u32 {
            if y >= self.rect.max_y {
                break;
            }
            if y >= self.rect.min_y {
                let mut w = row_w;
                let mut st = row_st;
                let mut depth = row_depth;
                for x in tri.bb_start_x as u32..tri.bb_end_x as u32 {
                    let inside_rect = x >= self.rect.min_x && x < self.rect.max_x;
                    if inside_rect && tri.weights_inside(w) {
                        let (lx, ly) = (x - self.rect.min_x, y - self.rect.min_y);
                        let key = tri.depth_key(depth);
                        if key > self.get_depth(lx, ly) {
                            let color = match texture {
                                Some(tex) if depth != 0 => tex.sample(
                                    (st[0] as f64 / depth as f64) as f32,
                                    (st[1] as f64 / depth as f64) as f32,
                                ),
                                _ => static_color,
                            };
                            self.set_pixel(lx, ly, color);
                            self.depth[(ly * self.width + lx) as usize] = key;
                            written += 1;
                        }
                    }
                    w = step(w, tri.w_x_inc);
                    st = step(st, tri.tex_st_x_inc);
                    depth = depth.saturating_add(tri.depth_w_x_inc);
                }
            }
            row_w = step(row_w, tri.w_y_inc);
            row_st = step(row_st, tri.tex_st_y_inc);
            row_depth = row_depth.saturating_add(tri.depth_w_y_inc);
        }
        written
    }

    /// Copy a band rendered on its own into this (full screen) buffer.
    pub fn copy_from_band(&mut self, band: &ScreenSpace) {
        for y in 0..band.height {
            let screen_y = band.rect.min_y + y;
            if screen_y < self.rect.min_y || screen_y >= self.rect.max_y {
                continue;
            }
            let local_y = screen_y - self.rect.min_y;
            let local_x = band.rect.min_x.saturating_sub(self.rect.min_x);
            if local_x >= self.width {
                continue;
            }
            let copy_width = band.width.min(self.width - local_x);

            let dst = ((local_y * self.width + local_x) * 4) as usize;
            let src = (y * band.width * 4) as usize;
            let len = (copy_width * 4) as usize;
            self.rgba[dst..dst + len].copy_from_slice(&band.rgba[src..src + len]);

            let dst = (local_y * self.width + local_x) as usize;
            let src = (y * band.width) as usize;
            self.depth[dst..dst + copy_width as usize]
                .copy_from_slice(&band.depth[src..src + copy_width as usize]);
        }
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let img = RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or_else(|| anyhow!("framebuffer size does not match {}x{}", self.width, self.height))?;
        img.save(path)?;
        Ok(())
    }
}
