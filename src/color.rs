/// RGBA color. Overlay tints are authored in sRGB and linearised in the shaders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build an opaque color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )
    }

    /// Base tone of the smoke overlay.
    pub const TERRACOTTA: Color = Color::rgb(0.757, 0.498, 0.349);

    pub fn rgb_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn rgba_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        let c = Color::hex(0x927867);
        assert!((c.r - 0x92 as f32 / 255.0).abs() < 1e-6);
        assert!((c.g - 0x78 as f32 / 255.0).abs() < 1e-6);
        assert!((c.b - 0x67 as f32 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }
}
