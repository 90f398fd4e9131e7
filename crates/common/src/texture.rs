/// Tightly packed RGBA8 image, row-major from the top-left texel.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Single-colour texture of the given size.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Fill by sampling `f(u, v)` at each texel centre, with `u`, `v` in `[0, 1]`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(f32, f32) -> [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            let v = (y as f32 + 0.5) / height as f32;
            for x in 0..width {
                let u = (x as f32 + 0.5) / width as f32;
                pixels.extend_from_slice(&f(u, v));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Bytes per row, as the GPU upload wants it.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}
