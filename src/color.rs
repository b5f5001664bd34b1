/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack into the 16-bit RGBA4444 format used by `triangle_static_color`.
    /// Red is in the top nibble.
    pub fn to_rgba4444(self) -> u16 {
        let r = (self.r >> 4) as u16;
        let g = (self.g >> 4) as u16;
        let b = (self.b >> 4) as u16;
        let a = (self.a >> 4) as u16;
        (r << 12) | (g << 8) | (b << 4) | a
    }

    /// Expand RGBA4444; each nibble is replicated so 0xF becomes 255.
    pub fn from_rgba4444(packed: u16) -> Self {
        let expand = |nibble: u16| -> u8 {
            let n = (nibble & 0xF) as u8;
            (n << 4) | n
        };
        Self {
            r: expand(packed >> 12),
            g: expand(packed >> 8),
            b: expand(packed >> 4),
            a: expand(packed),
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}
