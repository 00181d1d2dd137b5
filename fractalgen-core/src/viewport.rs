use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Output raster dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        let vp = Self { width, height };
        vp.validate()?;
        Ok(vp)
    }

    /// Check the invariant on a value that may have been deserialized.
    pub fn validate(&self) -> crate::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {}×{}", self.width, self.height),
            });
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Starting `z` for a Julia pixel under the centered, aspect-scaled remap.
    ///
    /// The image center maps to `z = 0`; the real axis spans `[-1.5, 1.5]`
    /// and the imaginary axis `[-1, 1]` regardless of the plane region.
    #[inline]
    pub fn julia_start(&self, px: u32, py: u32) -> Complex {
        let w = self.width as f64;
        let h = self.height as f64;
        Complex::new(
            1.5 * (px as f64 - w / 2.0) / (0.5 * w),
            (py as f64 - h / 2.0) / (0.5 * h),
        )
    }
}

/// The rectangle of the complex plane mapped onto the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneRegion {
    pub re_min: f64,
    pub re_max: f64,
    pub im_min: f64,
    pub im_max: f64,
}

impl PlaneRegion {
    pub fn new(re_min: f64, re_max: f64, im_min: f64, im_max: f64) -> crate::Result<Self> {
        let region = Self {
            re_min,
            re_max,
            im_min,
            im_max,
        };
        region.validate()?;
        Ok(region)
    }

    pub fn validate(&self) -> crate::Result<()> {
        let bounds = [self.re_min, self.re_max, self.im_min, self.im_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(CoreError::InvalidRegion {
                reason: format!("bounds must be finite, got {self}"),
            });
        }
        if self.re_max <= self.re_min {
            return Err(CoreError::InvalidRegion {
                reason: format!("re_max ({}) must exceed re_min ({})", self.re_max, self.re_min),
            });
        }
        if self.im_max <= self.im_min {
            return Err(CoreError::InvalidRegion {
                reason: format!("im_max ({}) must exceed im_min ({})", self.im_max, self.im_min),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn re_span(&self) -> f64 {
        self.re_max - self.re_min
    }

    #[inline]
    pub fn im_span(&self) -> f64 {
        self.im_max - self.im_min
    }

    /// Map a pixel coordinate to a point on the complex plane.
    ///
    /// `(0, 0)` maps to `(re_min, im_min)`; the mapping is affine along each
    /// axis and never reaches `re_max`/`im_max`.
    #[inline]
    pub fn pixel_to_complex(&self, viewport: &Viewport, px: u32, py: u32) -> Complex {
        Complex::new(
            self.re_min + (px as f64 / viewport.width as f64) * self.re_span(),
            self.im_min + (py as f64 / viewport.height as f64) * self.im_span(),
        )
    }

    /// Inverse of [`pixel_to_complex`](Self::pixel_to_complex), truncating
    /// toward zero.
    ///
    /// Only pixels strictly inside `(0, width) × (0, height)` are returned:
    /// the first row and column are never hit.
    #[inline]
    pub fn complex_to_pixel(&self, viewport: &Viewport, z: Complex) -> Option<(u32, u32)> {
        let fx = ((z.re - self.re_min) / (self.re_span() / viewport.width as f64)).trunc();
        let fy = ((z.im - self.im_min) / (self.im_span() / viewport.height as f64)).trunc();
        // NaN fails both comparisons.
        if fx > 0.0 && fx < viewport.width as f64 && fy > 0.0 && fy < viewport.height as f64 {
            Some((fx as u32, fy as u32))
        } else {
            None
        }
    }
}

impl std::fmt::Display for PlaneRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}] × [{}, {}]i",
            self.re_min, self.re_max, self.im_min, self.im_max
        )
    }
}
