pub mod buddhabrot;
pub mod buffer;
pub mod colorize;
#[cfg(feature = "gpu")]
pub mod device;
pub mod error;
pub mod export;
pub mod histogram;
pub mod iteration_buffer;
pub mod renderer;
pub mod tile;

use std::time::{Duration, Instant};

use tracing::info;

use fractalgen_core::{BuddhabrotParams, ExecutionStrategy, RenderMode, RenderRequest};

pub use buddhabrot::{accumulate_host, BuddhabrotResult};
pub use buffer::PixelBuffer;
pub use colorize::{colorize_density, colorize_escape};
#[cfg(feature = "gpu")]
pub use device::DeviceContext;
pub use error::RenderError;
pub use export::{export_png, write_png, ExportMetadata};
pub use histogram::OrbitHistogram;
pub use iteration_buffer::IterationBuffer;
pub use renderer::{render_escape_time, EscapeTimeResult};
pub use tile::TILE_SIZE;

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Variant-specific figures from a completed render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDetail {
    EscapeTime {
        interior_pixels: usize,
    },
    Density {
        samples_drawn: u64,
        samples_accepted: u64,
        histogram_mass: u64,
        max_count: u32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct RenderStats {
    pub strategy: ExecutionStrategy,
    /// Wall time of the whole call, coloring included.
    pub elapsed: Duration,
    /// Time spent producing iterations or the histogram.
    pub dispatch: Duration,
    pub detail: RenderDetail,
}

/// A colored frame and how it was produced.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub pixels: PixelBuffer,
    pub stats: RenderStats,
}

/// Validate a request, run it with the requested strategy and color it.
///
/// The device strategy never falls back to the host: without a usable
/// adapter (or without the `gpu` feature) this returns
/// [`RenderError::DeviceUnavailable`].
pub fn render(request: &RenderRequest) -> Result<RenderOutput> {
    request.validate()?;
    let start = Instant::now();

    let (pixels, dispatch, detail) = match request.fractal.mode() {
        RenderMode::EscapeTime(kernel) => {
            let (iterations, dispatch) = match request.strategy {
                ExecutionStrategy::Host => {
                    let result = render_escape_time(
                        &kernel,
                        &request.viewport,
                        &request.region,
                        request.max_iterations,
                    );
                    (result.iterations, result.elapsed)
                }
                ExecutionStrategy::Device => {
                    let iterations = device_escape_time(request)?;
                    (iterations, start.elapsed())
                }
            };
            let detail = RenderDetail::EscapeTime {
                interior_pixels: iterations.interior_count(),
            };
            (colorize_escape(&iterations, &request.color), dispatch, detail)
        }
        RenderMode::Density(params) => {
            let result = match request.strategy {
                ExecutionStrategy::Host => accumulate_host(
                    &request.viewport,
                    &request.region,
                    request.max_iterations,
                    &params,
                ),
                ExecutionStrategy::Device => device_buddhabrot(request, &params)?,
            };
            let detail = RenderDetail::Density {
                samples_drawn: result.samples_drawn,
                samples_accepted: result.samples_accepted,
                histogram_mass: result.histogram.total(),
                max_count: result.histogram.max(),
            };
            (
                colorize_density(&result.histogram, &request.color),
                result.elapsed,
                detail,
            )
        }
    };

    let elapsed = start.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        dispatch_ms = dispatch.as_millis(),
        fractal = request.fractal.name(),
        strategy = %request.strategy,
        "Render complete"
    );
    Ok(RenderOutput {
        pixels,
        stats: RenderStats {
            strategy: request.strategy,
            elapsed,
            dispatch,
            detail,
        },
    })
}

#[cfg(feature = "gpu")]
fn device_escape_time(request: &RenderRequest) -> Result<IterationBuffer> {
    DeviceContext::new()?.render_escape_time(request)
}

#[cfg(feature = "gpu")]
fn device_buddhabrot(request: &RenderRequest, params: &BuddhabrotParams) -> Result<BuddhabrotResult> {
    DeviceContext::new()?.accumulate_buddhabrot(
        &request.viewport,
        &request.region,
        request.max_iterations,
        params,
    )
}

#[cfg(not(feature = "gpu"))]
fn device_escape_time(_request: &RenderRequest) -> Result<IterationBuffer> {
    Err(gpu_disabled())
}

#[cfg(not(feature = "gpu"))]
fn device_buddhabrot(
    _request: &RenderRequest,
    _params: &BuddhabrotParams,
) -> Result<BuddhabrotResult> {
    Err(gpu_disabled())
}

#[cfg(not(feature = "gpu"))]
fn gpu_disabled() -> RenderError {
    RenderError::DeviceUnavailable("built without the `gpu` feature".into())
}
