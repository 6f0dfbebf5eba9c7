use stagecraft_common::srgb_to_linear;

/// CPU-side RGBA8 image used to bake base color textures into vertex colors.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, first row at the top (v = 0).
    pub pixels: Vec<u8>,
}

impl Texture {
    /// Convert decoded glTF image data. Formats without 8-bit RGB(A) channels
    /// return `None`.
    pub fn from_gltf(image: &gltf::image::Data) -> Option<Self> {
        use gltf::image::Format;

        let pixels = match image.format {
            Format::R8G8B8A8 => image.pixels.clone(),
            Format::R8G8B8 => image
                .pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
            Format::R8G8 => image
                .pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            other => {
                tracing::warn!(format = ?other, "unsupported texture format, ignoring texture");
                return None;
            }
        };
        Self::new(image.width, image.height, pixels)
    }

    /// `None` when the pixel buffer does not match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|texels| texels.checked_mul(4))?;
        if expected == 0 || pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Nearest texel at `uv` with repeat wrapping, decoded to linear RGB.
    pub fn sample_linear(&self, uv: [f32; 2]) -> [f32; 3] {
        let wrap = |v: f32| {
            let f = v - v.floor();
            if f.is_finite() { f } else { 0.0 }
        };
        let x = ((wrap(uv[0]) * self.width as f32) as u32).min(self.width - 1);
        let y = ((wrap(uv[1]) * self.height as f32) as u32).min(self.height - 1);
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let channel = |c: u8| srgb_to_linear(c as f32 / 255.0);
        [
            channel(self.pixels[i]),
            channel(self.pixels[i + 1]),
            channel(self.pixels[i + 2]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // 2x2: red, green / blue, white
        #[rustfmt::skip]
        let pixels = vec![
            255, 0, 0, 255,   0, 255, 0, 255,
            0, 0, 255, 255,   255, 255, 255, 255,
        ];
        Texture::new(2, 2, pixels).unwrap()
    }

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(Texture::new(2, 2, vec![0; 15]).is_none());
        assert!(Texture::new(0, 2, Vec::new()).is_none());
    }

    #[test]
    fn huge_dimensions_are_rejected_without_overflow() {
        assert!(Texture::new(65536, 65536, vec![0; 16]).is_none());
        assert!(Texture::new(u32::MAX, u32::MAX, Vec::new()).is_none());
    }

    #[test]
    fn samples_nearest_texel() {
        let tex = checker();
        assert!(close(tex.sample_linear([0.25, 0.25]), [1.0, 0.0, 0.0]));
        assert!(close(tex.sample_linear([0.75, 0.25]), [0.0, 1.0, 0.0]));
        assert!(close(tex.sample_linear([0.25, 0.75]), [0.0, 0.0, 1.0]));
        assert!(close(tex.sample_linear([0.75, 0.75]), [1.0, 1.0, 1.0]));
    }

    #[test]
    fn wraps_out_of_range_coordinates() {
        let tex = checker();
        assert_eq!(tex.sample_linear([1.25, -0.75]), tex.sample_linear([0.25, 0.25]));
        assert_eq!(tex.sample_linear([1.0, 1.0]), tex.sample_linear([0.0, 0.0]));
    }
}
