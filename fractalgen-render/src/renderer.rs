use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use fractalgen_core::{EscapeKernel, IterationResult, PlaneRegion, Viewport};

use crate::iteration_buffer::IterationBuffer;
use crate::tile::{build_tile_grid, Tile, TILE_SIZE};

/// The result of a host escape-time render.
///
/// Contains raw iteration data (no coloring).
#[derive(Debug, Clone)]
pub struct EscapeTimeResult {
    pub iterations: IterationBuffer,
    pub elapsed: Duration,
    pub tiles_rendered: usize,
}

/// Iterate every pixel of a single tile, row-major.
fn render_tile(
    kernel: &EscapeKernel,
    viewport: &Viewport,
    region: &PlaneRegion,
    tile: &Tile,
    max_iterations: u32,
) -> Vec<IterationResult> {
    tile.pixels()
        .map(|(px, py)| kernel.evaluate(viewport, region, px, py, max_iterations))
        .collect()
}

/// Render a full frame on the host using the tiled, multithreaded pipeline.
///
/// Tiles are processed in parallel via Rayon and each tile's results are
/// blitted into the buffer after all workers have joined, so no two workers
/// ever touch the same pixel.
pub fn render_escape_time(
    kernel: &EscapeKernel,
    viewport: &Viewport,
    region: &PlaneRegion,
    max_iterations: u32,
) -> EscapeTimeResult {
    let start = Instant::now();

    let tiles = build_tile_grid(viewport.width, viewport.height, TILE_SIZE);
    debug!(
        tile_count = tiles.len(),
        width = viewport.width,
        height = viewport.height,
        "Starting tiled render"
    );

    let tile_data: Vec<Vec<IterationResult>> = tiles
        .par_iter()
        .map(|tile| render_tile(kernel, viewport, region, tile, max_iterations))
        .collect();

    let mut iterations = IterationBuffer::new(viewport.width, viewport.height, max_iterations);
    for (tile, data) in tiles.iter().zip(&tile_data) {
        iterations.blit_tile(tile, data);
    }

    let elapsed = start.elapsed();
    let tiles_rendered = tiles.len();
    info!(
        elapsed_ms = elapsed.as_millis(),
        tiles_rendered,
        interior = iterations.interior_count(),
        "Escape-time render complete"
    );

    EscapeTimeResult {
        iterations,
        elapsed,
        tiles_rendered,
    }
}
