use std::path::Path;
use image::{DynamicImage, GenericImageView};

use crate::color::Color;

pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> image::ImageResult<Self> {
        let img: DynamicImage = image::open(path)?;
        let (width, height) = img.dimensions();
        let rgba_img = img.to_rgba8();
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        // Bottom row first so t = 0 is the bottom of the image
        for y in (0..height).rev() {
            let row_start = (y * width * 4) as usize;
            let row_end = row_start + (width * 4) as usize;
            rgba.extend_from_slice(&rgba_img.as_raw()[row_start..row_end]);
        }
        Ok(Self { width, height, rgba })
    }

    /// `size` x `size` texels in squares of `cell` texels.
    pub fn checkerboard(size: u32, cell: u32, a: Color, b: Color) -> Self {
        let cell = cell.max(1);
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
                rgba.extend_from_slice(&color.to_bytes());
            }
        }
        Self { width: size, height: size, rgba }
    }

    /// Nearest texel, repeating outside [0, 1). An empty texture samples as
    /// transparent black.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::default();
        }
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        let idx = ((y * self.width + x) * 4) as usize;
        Color::with_alpha(self.rgba[idx], self.rgba[idx + 1], self.rgba[idx + 2], self.rgba[idx + 3])
    }
}
