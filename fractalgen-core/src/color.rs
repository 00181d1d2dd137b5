use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::fractal::IterationResult;

/// An HSV triple on byte channels. `h` spans the full hue circle over 0–255.
pub type Hsv8 = [u8; 3];

/// Black in HSV byte form.
pub const HSV_BLACK: Hsv8 = [0, 0, 0];

/// Hue, saturation and intensity shared by every escaped pixel.
///
/// `intensity` scales the brightness ramp: at 2.0 a pixel reaches full value
/// halfway to `max_iterations`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSpec {
    /// Hue in degrees, 0–360.
    pub hue: u16,
    /// 0–1.
    pub saturation: f64,
    /// Strictly positive.
    pub intensity: f64,
}

impl ColorSpec {
    pub const DEFAULT_HUE: u16 = 204;
    pub const DEFAULT_SATURATION: f64 = 0.64;
    pub const DEFAULT_INTENSITY: f64 = 2.0;

    pub fn new(hue: u16, saturation: f64, intensity: f64) -> crate::Result<Self> {
        let spec = Self {
            hue,
            saturation,
            intensity,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.hue > 360 {
            return Err(CoreError::InvalidColor {
                reason: format!("hue must be within 0–360, got {}", self.hue),
            });
        }
        if !(0.0..=1.0).contains(&self.saturation) {
            return Err(CoreError::InvalidColor {
                reason: format!("saturation must be within 0–1, got {}", self.saturation),
            });
        }
        if !(self.intensity > 0.0 && self.intensity.is_finite()) {
            return Err(CoreError::InvalidColor {
                reason: format!("intensity must be positive and finite, got {}", self.intensity),
            });
        }
        Ok(())
    }

    #[inline]
    fn hue_byte(&self) -> u8 {
        (255.0 * (self.hue as f64 / 360.0)) as u8
    }

    #[inline]
    fn saturation_byte(&self) -> u8 {
        (255.0 * self.saturation) as u8
    }

    /// Encode an escape-time result. Interior points are black whatever the
    /// hue and intensity.
    #[inline]
    pub fn encode_escape(&self, result: IterationResult, max_iterations: u32) -> Hsv8 {
        match result {
            IterationResult::Interior => HSV_BLACK,
            IterationResult::Escaped {
                iterations,
                norm_sq,
            } => {
                let smooth = smooth_iterations(iterations, norm_sq);
                let value = unit_fraction(self.intensity * smooth / max_iterations as f64);
                [self.hue_byte(), self.saturation_byte(), value_byte(value)]
            }
        }
    }

    /// Encode a histogram cell against the global maximum.
    ///
    /// An empty histogram (`max_count == 0`) leaves every value at zero.
    #[inline]
    pub fn encode_density(&self, count: u32, max_count: u32) -> Hsv8 {
        let value = if max_count == 0 {
            0.0
        } else {
            unit_fraction(self.intensity * count as f64 / max_count as f64)
        };
        [self.hue_byte(), self.saturation_byte(), value_byte(value)]
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self {
            hue: Self::DEFAULT_HUE,
            saturation: Self::DEFAULT_SATURATION,
            intensity: Self::DEFAULT_INTENSITY,
        }
    }
}

/// Continuous iteration count: `n − ln(ln|z|²) + 4`.
///
/// Not clamped: the result can be negative, exceed the iteration bound, or be
/// non-finite when `|z|² <= 1` or overflowed. [`ColorSpec::encode_escape`]
/// clamps the derived brightness instead.
#[inline]
pub fn smooth_iterations(iterations: u32, norm_sq: f64) -> f64 {
    iterations as f64 - norm_sq.ln().ln() + 4.0
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
#[inline]
fn unit_fraction(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[inline]
fn value_byte(fraction: f64) -> u8 {
    (255.0 * fraction) as u8
}

/// Convert an HSV byte triple to RGB.
///
/// Six-sector cylindrical transform; the hue byte covers 0–360° over 0–255.
pub fn hsv_to_rgb(hsv: Hsv8) -> [u8; 3] {
    let [h, s, v] = hsv;
    if s == 0 {
        return [v, v, v];
    }
    let sector_pos = h as f64 * 6.0 / 255.0;
    let sector = sector_pos.floor();
    let f = sector_pos - sector;
    let fs = s as f64 / 255.0;
    let vf = v as f64;
    let p = channel(vf * (1.0 - fs));
    let q = channel(vf * (1.0 - fs * f));
    let t = channel(vf * (1.0 - fs * (1.0 - f)));
    match sector as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[inline]
fn channel(x: f64) -> u8 {
    x.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ColorSpec {
        ColorSpec::default()
    }

    #[test]
    fn interior_is_black() {
        assert_eq!(spec().encode_escape(IterationResult::Interior, 80), HSV_BLACK);
    }

    #[test]
    fn escaped_uses_hue_and_saturation() {
        let hsv = spec().encode_escape(
            IterationResult::Escaped {
                iterations: 10,
                norm_sq: 9.0,
            },
            80,
        );
        assert_eq!(hsv[0], (255.0 * 204.0 / 360.0) as u8);
        assert_eq!(hsv[1], (255.0 * 0.64) as u8);
        let smooth = 10.0 - 9.0f64.ln().ln() + 4.0;
        assert_eq!(hsv[2], (255.0 * (2.0 * smooth / 80.0)) as u8);
    }

    #[test]
    fn value_is_clamped_high_and_low() {
        let s = spec();
        // Deep escape with strong intensity saturates.
        let hi = s.encode_escape(
            IterationResult::Escaped {
                iterations: 79,
                norm_sq: 4.5,
            },
            80,
        );
        assert_eq!(hi[2], 255);
        // A huge |z|² drives the smoothed count negative.
        let lo = s.encode_escape(
            IterationResult::Escaped {
                iterations: 0,
                norm_sq: 1e300,
            },
            80,
        );
        assert_eq!(lo[2], 0);
    }

    #[test]
    fn ill_defined_smoothing_never_yields_nan_pixels() {
        let s = spec();
        for norm_sq in [1.0, 0.5, 0.0, f64::INFINITY, f64::NAN] {
            let hsv = s.encode_escape(
                IterationResult::Escaped {
                    iterations: 3,
                    norm_sq,
                },
                50,
            );
            assert!(hsv[2] == 0 || hsv[2] == 255, "norm_sq {norm_sq} gave {}", hsv[2]);
        }
    }

    #[test]
    fn density_normalizes_against_max() {
        let s = ColorSpec::new(204, 0.64, 1.0).unwrap();
        assert_eq!(s.encode_density(10, 10)[2], 255);
        assert_eq!(s.encode_density(5, 10)[2], 127);
        assert_eq!(s.encode_density(0, 10)[2], 0);
        assert_eq!(s.encode_density(0, 0)[2], 0);
    }

    #[test]
    fn v_zero_is_black_for_any_hue_and_saturation() {
        for h in [0u8, 42, 128, 200, 255] {
            for sat in [0u8, 1, 100, 255] {
                assert_eq!(hsv_to_rgb([h, sat, 0]), [0, 0, 0]);
            }
        }
    }

    #[test]
    fn hsv_to_rgb_is_pure() {
        let input = [144, 163, 200];
        let first = hsv_to_rgb(input);
        for _ in 0..10 {
            assert_eq!(hsv_to_rgb(input), first);
        }
    }

    #[test]
    fn primary_hues() {
        assert_eq!(hsv_to_rgb([0, 255, 255]), [255, 0, 0]);
        assert_eq!(hsv_to_rgb([85, 255, 255]), [0, 255, 0]);
        assert_eq!(hsv_to_rgb([170, 255, 255]), [0, 0, 255]);
    }

    #[test]
    fn zero_saturation_is_gray() {
        assert_eq!(hsv_to_rgb([77, 0, 90]), [90, 90, 90]);
    }

    #[test]
    fn invalid_specs_rejected() {
        assert!(ColorSpec::new(361, 0.5, 1.0).is_err());
        assert!(ColorSpec::new(204, 1.5, 1.0).is_err());
        assert!(ColorSpec::new(204, -0.1, 1.0).is_err());
        assert!(ColorSpec::new(204, 0.5, 0.0).is_err());
        assert!(ColorSpec::new(204, 0.5, f64::NAN).is_err());
        assert!(ColorSpec::new(360, 1.0, 8.0).is_ok());
    }
}
