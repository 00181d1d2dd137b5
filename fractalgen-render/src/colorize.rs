use rayon::prelude::*;

use fractalgen_core::ColorSpec;

use crate::buffer::PixelBuffer;
use crate::histogram::OrbitHistogram;
use crate::iteration_buffer::IterationBuffer;

/// Encode escape-time results as HSV. Each pixel is written exactly once.
pub fn colorize_escape(iter_buf: &IterationBuffer, color: &ColorSpec) -> PixelBuffer {
    let mut pixels = vec![0u8; iter_buf.data.len() * 3];
    pixels
        .par_chunks_mut(3)
        .zip(iter_buf.data.par_iter())
        .for_each(|(pixel, &result)| {
            pixel.copy_from_slice(&color.encode_escape(result, iter_buf.max_iterations));
        });
    PixelBuffer {
        width: iter_buf.width,
        height: iter_buf.height,
        pixels,
    }
}

/// Normalize a histogram against its global maximum and encode it as HSV.
pub fn colorize_density(histogram: &OrbitHistogram, color: &ColorSpec) -> PixelBuffer {
    let counts = histogram.snapshot();
    let max_count = counts.par_iter().copied().max().unwrap_or(0);
    let mut pixels = vec![0u8; counts.len() * 3];
    pixels
        .par_chunks_mut(3)
        .zip(counts.par_iter())
        .for_each(|(pixel, &count)| {
            pixel.copy_from_slice(&color.encode_density(count, max_count));
        });
    PixelBuffer {
        width: histogram.width(),
        height: histogram.height(),
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalgen_core::IterationResult;

    #[test]
    fn escape_colorize_produces_correct_size() {
        let buf = IterationBuffer::new(64, 48, 256);
        let pb = colorize_escape(&buf, &ColorSpec::default());
        assert_eq!((pb.width, pb.height), (64, 48));
        assert_eq!(pb.pixels.len(), 64 * 48 * 3);
        // All interior.
        assert!(pb.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn escaped_pixels_take_the_hue() {
        let mut buf = IterationBuffer::new(2, 1, 80);
        buf.data[1] = IterationResult::Escaped {
            iterations: 30,
            norm_sq: 6.0,
        };
        let color = ColorSpec::default();
        let pb = colorize_escape(&buf, &color);
        assert_eq!(pb.pixel(0, 0), [0, 0, 0]);
        assert_eq!(pb.pixel(1, 0), color.encode_escape(buf.data[1], 80));
    }

    #[test]
    fn densest_cell_reaches_full_value() {
        let h = OrbitHistogram::from_counts(3, 1, vec![0, 4, 8]);
        let color = ColorSpec::new(204, 0.64, 1.0).unwrap();
        let pb = colorize_density(&h, &color);
        assert_eq!(pb.pixel(2, 0)[2], 255);
        assert_eq!(pb.pixel(1, 0)[2], 127);
        assert_eq!(pb.pixel(0, 0)[2], 0);
    }

    #[test]
    fn empty_histogram_is_black_valued() {
        let h = OrbitHistogram::new(4, 4);
        let pb = colorize_density(&h, &ColorSpec::default());
        assert!(pb.pixels.chunks_exact(3).all(|p| p[2] == 0));
    }
}
