use crate::complex::Complex;
use crate::viewport::{PlaneRegion, Viewport};

/// Squared bailout radius for the escape-time variants.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Squared bailout radius for Buddhabrot trajectories. Wider than the display
/// radius so escaping orbits separate more cleanly from bounded ones.
pub const TRAJECTORY_RADIUS_SQ: f64 = 100.0;

/// One step of a recurrence: `(z, c) -> z'`.
pub type StepFn = fn(Complex, Complex) -> Complex;

/// `z² + c` (Mandelbrot and Julia).
#[inline]
pub fn quadratic_step(z: Complex, c: Complex) -> Complex {
    z.square() + c
}

/// `(|Re z| + i|Im z|)² + c` (Burning Ship).
#[inline]
pub fn burning_ship_step(z: Complex, c: Complex) -> Complex {
    z.fold_abs().square() + c
}

/// The result of iterating a single point.
///
/// Only raw iteration data is kept here; smoothing and HSV encoding happen in
/// the color model so host and device renders share one coloring pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IterationResult {
    /// The orbit left the escape radius after `iterations` steps.
    /// `norm_sq` is `|z|²` at that moment.
    Escaped { iterations: u32, norm_sq: f64 },

    /// The orbit stayed bounded for `max_iterations` steps.
    Interior,
}

impl IterationResult {
    pub fn is_interior(&self) -> bool {
        matches!(self, Self::Interior)
    }
}

/// Iterate `step` from `z0` with constant `c` until `|z|² >= radius_sq` or
/// `max_iterations` steps have run.
///
/// The bound is tested before each step, so a starting point already outside
/// the radius escapes with zero iterations. A point that needs exactly
/// `max_iterations` steps is reported interior.
#[inline]
pub fn escape_time(
    z0: Complex,
    c: Complex,
    max_iterations: u32,
    radius_sq: f64,
    step: StepFn,
) -> IterationResult {
    let mut z = z0;
    let mut iterations = 0;
    while z.norm_sq() < radius_sq && iterations < max_iterations {
        z = step(z, c);
        iterations += 1;
    }
    if iterations >= max_iterations {
        IterationResult::Interior
    } else {
        IterationResult::Escaped {
            iterations,
            norm_sq: z.norm_sq(),
        }
    }
}

/// The successive values `z₁, z₂, …` of a recurrence started at `z0`.
///
/// Unbounded; callers decide when to stop.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    z: Complex,
    c: Complex,
    step: StepFn,
}

impl Orbit {
    pub fn new(z0: Complex, c: Complex, step: StepFn) -> Self {
        Self { z: z0, c, step }
    }
}

impl Iterator for Orbit {
    type Item = Complex;

    #[inline]
    fn next(&mut self) -> Option<Complex> {
        self.z = (self.step)(self.z, self.c);
        Some(self.z)
    }
}

/// How a Julia render chooses each pixel's starting `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JuliaMapping {
    /// Centered, aspect-scaled remap (see [`Viewport::julia_start`]).
    #[default]
    Centered,
    /// Map through the plane region like the other variants.
    Region,
}

#[derive(Debug, Clone, Copy)]
enum Origin {
    /// `z₀ = 0`, `c` = the pixel's point.
    Parameter,
    /// `c` fixed, `z₀` = the pixel's point.
    Julia { c: Complex, mapping: JuliaMapping },
}

/// Per-pixel evaluation for one escape-time variant: a step function plus the
/// rule that turns a pixel into `(z₀, c)`.
#[derive(Debug, Clone, Copy)]
pub struct EscapeKernel {
    step: StepFn,
    origin: Origin,
}

impl EscapeKernel {
    pub fn mandelbrot() -> Self {
        Self {
            step: quadratic_step,
            origin: Origin::Parameter,
        }
    }

    pub fn burning_ship() -> Self {
        Self {
            step: burning_ship_step,
            origin: Origin::Parameter,
        }
    }

    pub fn julia(c: Complex, mapping: JuliaMapping) -> Self {
        Self {
            step: quadratic_step,
            origin: Origin::Julia { c, mapping },
        }
    }

    /// `(z₀, c)` for a pixel.
    #[inline]
    pub fn start(&self, viewport: &Viewport, region: &PlaneRegion, px: u32, py: u32) -> (Complex, Complex) {
        match self.origin {
            Origin::Parameter => (Complex::ZERO, region.pixel_to_complex(viewport, px, py)),
            Origin::Julia {
                c,
                mapping: JuliaMapping::Centered,
            } => (viewport.julia_start(px, py), c),
            Origin::Julia {
                c,
                mapping: JuliaMapping::Region,
            } => (region.pixel_to_complex(viewport, px, py), c),
        }
    }

    /// Iterate the point `(z₀, c)` with this kernel's recurrence.
    #[inline]
    pub fn iterate(&self, z0: Complex, c: Complex, max_iterations: u32) -> IterationResult {
        escape_time(z0, c, max_iterations, ESCAPE_RADIUS_SQ, self.step)
    }

    /// Map and iterate a single pixel.
    #[inline]
    pub fn evaluate(
        &self,
        viewport: &Viewport,
        region: &PlaneRegion,
        px: u32,
        py: u32,
        max_iterations: u32,
    ) -> IterationResult {
        let (z0, c) = self.start(viewport, region, px, py);
        self.iterate(z0, c, max_iterations)
    }
}
