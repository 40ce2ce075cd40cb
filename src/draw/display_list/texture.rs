//! Shared circle texture
//!
//! One blurred disc rendered once and sampled by every filled circle and
//! segment end cap, whatever its radius.

/// Default texture edge length in pixels
pub const CIRCLE_TEXTURE_SIZE: usize = 512;

/// Transparent border kept around the disc, in pixels, so the blur never
/// reaches the texture edge
pub const CIRCLE_TEXTURE_BORDER: usize = 8;

/// Single-channel alpha texture, row major
#[derive(Debug, Clone, PartialEq)]
pub struct CircleTexture {
    size: usize,
    pixels: Vec<u8>,
}

impl CircleTexture {
    pub fn generate(size: usize) -> Self {
        let size = size.max(CIRCLE_TEXTURE_BORDER * 2 + 2);
        let center = size as f32 / 2.0;
        let radius = (size - CIRCLE_TEXTURE_BORDER) as f32 / 2.0;

        let mut coverage = vec![0.0f32; size * size];
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - center;
                let dy = y as f32 + 0.5 - center;
                let d = (dx * dx + dy * dy).sqrt();
                coverage[y * size + x] = (radius + 0.5 - d).clamp(0.0, 1.0);
            }
        }

        let blurred = box_blur(&coverage, size);
        let pixels = blurred.iter().map(|v| (v * 255.0).round() as u8).collect();
        Self { size, pixels }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.size || y >= self.size {
            return 0;
        }
        self.pixels[y * self.size + x]
    }

    /// Disc radius in texture coordinates
    pub fn uv_radius(&self) -> f32 {
        disc_uv_radius(self.size)
    }
}

impl Default for CircleTexture {
    fn default() -> Self {
        Self::generate(CIRCLE_TEXTURE_SIZE)
    }
}

pub fn disc_uv_radius(size: usize) -> f32 {
    0.5 * (1.0 - CIRCLE_TEXTURE_BORDER as f32 / size as f32)
}

/// 3x3 box blur, edges clamped
fn box_blur(src: &[f32], size: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; src.len()];
    let last = size as isize - 1;
    for y in 0..size as isize {
        for x in 0..size as isize {
            let mut sum = 0.0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let sx = (x + dx).clamp(0, last) as usize;
                    let sy = (y + dy).clamp(0, last) as usize;
                    sum += src[sy * size + sx];
                }
            }
            out[y as usize * size + x as usize] = sum / 9.0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disc_shape() {
        let tex = CircleTexture::generate(64);
        assert_eq!(tex.size(), 64);
        assert_eq!(tex.pixels().len(), 64 * 64);
        assert_eq!(tex.alpha_at(32, 32), 255);
        assert_eq!(tex.alpha_at(0, 0), 0);
        assert_eq!(tex.alpha_at(1, 32), 0);
        assert_eq!(tex.alpha_at(64, 0), 0);
        // Symmetric about the centre
        assert_eq!(tex.alpha_at(10, 32), tex.alpha_at(53, 32));
        assert_eq!(tex.alpha_at(32, 10), tex.alpha_at(32, 53));
    }

    #[test]
    fn test_edge_is_soft() {
        let tex = CircleTexture::generate(64);
        let row: Vec<u8> = (0..32).map(|x| tex.alpha_at(x, 32)).collect();
        assert!(row.iter().any(|&a| a > 0 && a < 255));
        assert!(row.windows(2).all(|w| w[0] <= w[1]));
    }
}
