use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use fractalgen_core::{
    BuddhabrotParams, ColorSpec, Complex, ExecutionStrategy, Fractal, JuliaMapping, PlaneRegion,
    RenderRequest, Viewport,
};

use crate::config;
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "fractal-gen", version)]
#[command(about = "Render Mandelbrot, Julia, Burning Ship and Buddhabrot images")]
pub struct Cli {
    /// Image width in pixels
    #[arg(long, global = true, default_value_t = 1920)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, global = true, default_value_t = 1080)]
    pub height: u32,

    /// Hue in degrees (0-360)
    #[arg(long, global = true, default_value_t = ColorSpec::DEFAULT_HUE)]
    pub color_hue: u16,

    /// Saturation (0-1)
    #[arg(long, global = true, default_value_t = ColorSpec::DEFAULT_SATURATION)]
    pub color_saturation: f64,

    /// Brightness scale [default: 2.0, buddhabrot 8.0]
    #[arg(long, global = true)]
    pub color_intensity: Option<f64>,

    /// Where to write the PNG
    #[arg(long, global = true, default_value = "fractal.png")]
    pub output_image: PathBuf,

    /// Run on the compute device instead of CPU threads
    #[arg(long, global = true)]
    pub use_gpu: bool,

    /// Load the render request from a JSON file instead of flags
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the effective request as JSON and exit without rendering
    #[arg(long, global = true)]
    pub dump_config: bool,

    /// Suppress the banner and argument table
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a Mandelbrot fractal
    Mandelbrot(EscapeArgs),
    /// Generate a Burning Ship fractal
    BurningShip(EscapeArgs),
    /// Generate a Julia fractal
    Julia(JuliaArgs),
    /// Generate a Buddhabrot
    Buddhabrot(BuddhabrotArgs),
}

/// Iteration bound and plane region. Unset values fall back to the
/// variant's defaults.
#[derive(Debug, Clone, Args)]
pub struct EscapeArgs {
    #[arg(long)]
    pub iterations: Option<u32>,
    #[arg(long, allow_hyphen_values = true)]
    pub real_start: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub real_end: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub imag_start: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub imag_end: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct JuliaArgs {
    #[command(flatten)]
    pub escape: EscapeArgs,

    /// Real part of the constant c
    #[arg(long, allow_hyphen_values = true, default_value_t = -0.4)]
    pub cx: f64,

    /// Imaginary part of the constant c
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.6)]
    pub cy: f64,

    /// Map pixels through the real/imaginary bounds instead of the
    /// centered remap
    #[arg(long)]
    pub use_region: bool,
}

#[derive(Debug, Clone, Args)]
pub struct BuddhabrotArgs {
    #[command(flatten)]
    pub escape: EscapeArgs,

    /// Samples drawn on the host
    #[arg(long, default_value_t = BuddhabrotParams::DEFAULT_TOTAL_SAMPLES)]
    pub total_samples: u64,

    /// Samples drawn by each device thread
    #[arg(long, default_value_t = BuddhabrotParams::DEFAULT_SAMPLES_PER_THREAD)]
    pub samples_per_thread: u32,

    /// Device workgroups of 256 threads
    #[arg(long, default_value_t = BuddhabrotParams::DEFAULT_DEVICE_BLOCKS)]
    pub device_blocks: u32,

    #[arg(long, default_value_t = BuddhabrotParams::DEFAULT_SEED)]
    pub seed: u64,

    /// Samples escaping in this many steps or fewer are discarded
    #[arg(long, default_value_t = BuddhabrotParams::DEFAULT_MIN_ITERATIONS)]
    pub min_iterations: u32,
}

/// Per-variant defaults for the escape arguments and intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantDefaults {
    pub iterations: u32,
    pub region: PlaneRegion,
    pub intensity: f64,
}

impl Command {
    pub fn defaults(&self) -> VariantDefaults {
        let (iterations, (re_min, re_max, im_min, im_max), intensity) = match self {
            Self::Mandelbrot(_) => (80, (-2.0, 1.0, -1.0, 1.0), 2.0),
            Self::BurningShip(_) => (400, (-2.0, 1.0, -2.0, 1.0), 2.0),
            Self::Julia(_) => (150, (-1.6, 1.6, -1.2, 1.2), 2.0),
            Self::Buddhabrot(_) => (200, (-2.2, 1.2, -1.2, 1.2), 8.0),
        };
        VariantDefaults {
            iterations,
            region: PlaneRegion {
                re_min,
                re_max,
                im_min,
                im_max,
            },
            intensity,
        }
    }

    fn escape_args(&self) -> &EscapeArgs {
        match self {
            Self::Mandelbrot(a) | Self::BurningShip(a) => a,
            Self::Julia(j) => &j.escape,
            Self::Buddhabrot(b) => &b.escape,
        }
    }

    fn fractal(&self) -> Fractal {
        match self {
            Self::Mandelbrot(_) => Fractal::Mandelbrot,
            Self::BurningShip(_) => Fractal::BurningShip,
            Self::Julia(j) => Fractal::Julia {
                c: Complex::new(j.cx, j.cy),
                mapping: if j.use_region {
                    JuliaMapping::Region
                } else {
                    JuliaMapping::Centered
                },
            },
            Self::Buddhabrot(b) => Fractal::Buddhabrot(BuddhabrotParams {
                total_samples: b.total_samples,
                samples_per_thread: b.samples_per_thread,
                seed: b.seed,
                min_iterations: b.min_iterations,
                device_blocks: b.device_blocks,
            }),
        }
    }
}

impl Cli {
    /// Build the render request described by the flags.
    ///
    /// Values are checked here only as far as constructing the request
    /// needs; the renderer validates the whole request before dispatch.
    pub fn request(&self) -> Result<RenderRequest, CliError> {
        let command = self.command.as_ref().ok_or(CliError::MissingCommand)?;
        let defaults = command.defaults();
        let args = command.escape_args();

        Ok(RenderRequest {
            viewport: Viewport {
                width: self.width,
                height: self.height,
            },
            region: PlaneRegion {
                re_min: args.real_start.unwrap_or(defaults.region.re_min),
                re_max: args.real_end.unwrap_or(defaults.region.re_max),
                im_min: args.imag_start.unwrap_or(defaults.region.im_min),
                im_max: args.imag_end.unwrap_or(defaults.region.im_max),
            },
            max_iterations: args.iterations.unwrap_or(defaults.iterations),
            color: ColorSpec {
                hue: self.color_hue,
                saturation: self.color_saturation,
                intensity: self.color_intensity.unwrap_or(defaults.intensity),
            },
            fractal: command.fractal(),
            strategy: self.strategy(),
        })
    }

    /// The request to render: read from `--config` when given, built from
    /// the flags otherwise. `--use-gpu` applies to either source.
    pub fn effective_request(&self) -> Result<RenderRequest, CliError> {
        let mut request = match (&self.config, &self.command) {
            (Some(_), Some(_)) => return Err(CliError::ConfigWithCommand),
            (Some(path), None) => config::load_request(path)?,
            (None, _) => self.request()?,
        };
        if self.use_gpu {
            request.strategy = ExecutionStrategy::Device;
        }
        Ok(request)
    }

    fn strategy(&self) -> ExecutionStrategy {
        if self.use_gpu {
            ExecutionStrategy::Device
        } else {
            ExecutionStrategy::Host
        }
    }
}
