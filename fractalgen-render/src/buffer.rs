use rayon::prelude::*;

use fractalgen_core::{hsv_to_rgb, Hsv8};

/// An HSV pixel buffer: 3 bytes per pixel, row-major, index
/// `(y * width + x) * 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// A buffer filled with HSV black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 3],
        }
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Hsv8 {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Convert every pixel to RGB in parallel. The result has the same
    /// layout, ready for an 8-bit RGB encoder.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = vec![0u8; self.pixels.len()];
        rgb.par_chunks_mut(3)
            .zip(self.pixels.par_chunks(3))
            .for_each(|(out, hsv)| {
                out.copy_from_slice(&hsv_to_rgb([hsv[0], hsv[1], hsv[2]]));
            });
        rgb
    }
}
