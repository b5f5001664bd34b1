#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

// helper methods
impl Rect {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }
}

// Number of bands so each core gets a couple of them to steal when one band is
// nearly empty
pub fn compute_band_count(cores: usize, height: u32) -> u32 {
    let wanted = (cores.max(1) * 2) as u32;
    wanted.clamp(1, height.max(1))
}

/// Split the screen into horizontal bands of (nearly) equal height.
/// The first `height % count` bands are one line taller.
pub fn split_into_bands(width: u32, height: u32, count: u32) -> Vec<Rect> {
    let count = count.clamp(1, height.max(1));
    let base = height / count;
    let extra = height % count;

    let mut bands = Vec::with_capacity(count as usize);
    let mut min_y = 0;
    for i in 0..count {
        let band_height = base + u32::from(i < extra);
        bands.push(Rect { min_x: 0, min_y, max_x: width, max_y: min_y + band_height });
        min_y += band_height;
    }
    bands
}
