use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::ColorSpec;
use crate::complex::Complex;
use crate::error::CoreError;
use crate::fractal::{EscapeKernel, JuliaMapping};
use crate::viewport::{PlaneRegion, Viewport};

/// Where the per-unit work runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Worker threads on the CPU.
    #[default]
    Host,
    /// A compute device (GPU). Never falls back to the host.
    Device,
}

impl std::fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Device => f.write_str("device"),
        }
    }
}

/// Sampling parameters for a Buddhabrot render.
///
/// The host strategy draws `total_samples`; the device strategy runs
/// `device_blocks × DEVICE_THREADS_PER_BLOCK` threads drawing
/// `samples_per_thread` each. The count for the other strategy is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuddhabrotParams {
    #[serde(default = "default_total_samples")]
    pub total_samples: u64,
    #[serde(default = "default_samples_per_thread")]
    pub samples_per_thread: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Samples escaping in `min_iterations` steps or fewer are rejected.
    #[serde(default = "default_min_iterations")]
    pub min_iterations: u32,
    #[serde(default = "default_device_blocks")]
    pub device_blocks: u32,
}

impl BuddhabrotParams {
    pub const DEFAULT_TOTAL_SAMPLES: u64 = 100_000_000;
    pub const DEFAULT_SAMPLES_PER_THREAD: u32 = 256;
    pub const DEFAULT_SEED: u64 = 3123;
    pub const DEFAULT_MIN_ITERATIONS: u32 = 20;
    pub const DEFAULT_DEVICE_BLOCKS: u32 = 2048;
    pub const DEVICE_THREADS_PER_BLOCK: u32 = 256;

    /// Number of samples the given strategy will draw.
    pub fn effective_samples(&self, strategy: ExecutionStrategy) -> u64 {
        match strategy {
            ExecutionStrategy::Host => self.total_samples,
            ExecutionStrategy::Device => {
                self.device_blocks as u64
                    * Self::DEVICE_THREADS_PER_BLOCK as u64
                    * self.samples_per_thread as u64
            }
        }
    }

    fn validate(&self, strategy: ExecutionStrategy) -> crate::Result<()> {
        match strategy {
            ExecutionStrategy::Host if self.total_samples == 0 => {
                Err(CoreError::InvalidSampleCount {
                    reason: "total_samples must be > 0".into(),
                })
            }
            ExecutionStrategy::Device if self.samples_per_thread == 0 => {
                Err(CoreError::InvalidSampleCount {
                    reason: "samples_per_thread must be > 0".into(),
                })
            }
            ExecutionStrategy::Device if self.device_blocks == 0 => {
                Err(CoreError::InvalidSampleCount {
                    reason: "device_blocks must be > 0".into(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl Default for BuddhabrotParams {
    fn default() -> Self {
        Self {
            total_samples: Self::DEFAULT_TOTAL_SAMPLES,
            samples_per_thread: Self::DEFAULT_SAMPLES_PER_THREAD,
            seed: Self::DEFAULT_SEED,
            min_iterations: Self::DEFAULT_MIN_ITERATIONS,
            device_blocks: Self::DEFAULT_DEVICE_BLOCKS,
        }
    }
}

fn default_total_samples() -> u64 {
    BuddhabrotParams::DEFAULT_TOTAL_SAMPLES
}
fn default_samples_per_thread() -> u32 {
    BuddhabrotParams::DEFAULT_SAMPLES_PER_THREAD
}
fn default_seed() -> u64 {
    BuddhabrotParams::DEFAULT_SEED
}
fn default_min_iterations() -> u32 {
    BuddhabrotParams::DEFAULT_MIN_ITERATIONS
}
fn default_device_blocks() -> u32 {
    BuddhabrotParams::DEFAULT_DEVICE_BLOCKS
}

/// The fractal variant and its variant-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fractal {
    Mandelbrot,
    BurningShip,
    Julia {
        c: Complex,
        #[serde(default)]
        mapping: JuliaMapping,
    },
    Buddhabrot(BuddhabrotParams),
}

/// How a variant turns the plane into pixels.
#[derive(Debug, Clone, Copy)]
pub enum RenderMode {
    /// One independent escape-time evaluation per pixel.
    EscapeTime(EscapeKernel),
    /// Monte-Carlo trajectory density.
    Density(BuddhabrotParams),
}

impl Fractal {
    pub fn mode(&self) -> RenderMode {
        match *self {
            Self::Mandelbrot => RenderMode::EscapeTime(EscapeKernel::mandelbrot()),
            Self::BurningShip => RenderMode::EscapeTime(EscapeKernel::burning_ship()),
            Self::Julia { c, mapping } => RenderMode::EscapeTime(EscapeKernel::julia(c, mapping)),
            Self::Buddhabrot(params) => RenderMode::Density(params),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::BurningShip => "Burning Ship",
            Self::Julia { .. } => "Julia",
            Self::Buddhabrot(_) => "Buddhabrot",
        }
    }
}

/// Everything one render needs. Built once per invocation and read-only
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub viewport: Viewport,
    pub region: PlaneRegion,
    pub max_iterations: u32,
    pub color: ColorSpec,
    pub fractal: Fractal,
    #[serde(default)]
    pub strategy: ExecutionStrategy,
}

impl RenderRequest {
    /// Reject any configuration that would divide by zero or render nothing
    /// meaningful. Called by the renderer before dispatch.
    pub fn validate(&self) -> crate::Result<()> {
        self.viewport.validate()?;
        self.region.validate()?;
        if self.max_iterations == 0 {
            return Err(CoreError::InvalidMaxIterations(self.max_iterations));
        }
        self.color.validate()?;
        match &self.fractal {
            Fractal::Julia { c, .. } if !c.is_finite() => {
                return Err(CoreError::InvalidJuliaConstant(*c));
            }
            Fractal::Buddhabrot(params) => params.validate(self.strategy)?,
            _ => {}
        }
        debug!(
            fractal = self.fractal.name(),
            width = self.viewport.width,
            height = self.viewport.height,
            max_iterations = self.max_iterations,
            strategy = %self.strategy,
            "Request validated"
        );
        Ok(())
    }
}
