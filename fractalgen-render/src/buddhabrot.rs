//! Host Buddhabrot: Monte-Carlo sampling of the plane region, an escape
//! pre-check at the trajectory radius, and orbit accumulation into a shared
//! atomic histogram.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use fractalgen_core::{
    escape_time, quadratic_step, BuddhabrotParams, Complex, IterationResult, Orbit, PlaneRegion,
    Viewport, TRAJECTORY_RADIUS_SQ,
};

use crate::histogram::OrbitHistogram;

/// Samples drawn by one host work unit. Fixed so that the partition of the
/// sample stream, and therefore the output, is independent of thread count.
pub const SAMPLES_PER_CHUNK: u64 = 1 << 16;

/// SplitMix64 finalizer.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Generator seed for chunk `k`. Both inputs go through the mixer, so
/// neighbouring seeds never share a chunk stream.
fn chunk_seed(seed: u64, k: u64) -> u64 {
    splitmix64(splitmix64(seed) ^ k)
}

/// The result of a Buddhabrot accumulation, before normalization.
#[derive(Debug)]
pub struct BuddhabrotResult {
    pub histogram: OrbitHistogram,
    pub samples_drawn: u64,
    pub samples_accepted: u64,
    pub elapsed: Duration,
}

/// The bounds a sample's escape count must fall strictly between.
#[derive(Debug, Clone, Copy)]
struct AcceptWindow {
    min_iterations: u32,
    max_iterations: u32,
}

/// Run the escape pre-check for `c` and, if accepted, retrace its orbit
/// into the histogram. Returns whether the sample was accepted.
fn trace_sample(
    histogram: &OrbitHistogram,
    viewport: &Viewport,
    region: &PlaneRegion,
    c: Complex,
    window: AcceptWindow,
) -> bool {
    let iterations = match escape_time(
        Complex::ZERO,
        c,
        window.max_iterations,
        TRAJECTORY_RADIUS_SQ,
        quadratic_step,
    ) {
        IterationResult::Escaped { iterations, .. } if iterations > window.min_iterations => {
            iterations
        }
        _ => return false,
    };

    // The pre-check already found the step at which |z|² reaches the
    // trajectory radius, so the retrace stops there.
    for z in Orbit::new(Complex::ZERO, c, quadratic_step).take(iterations as usize) {
        if let Some((x, y)) = region.complex_to_pixel(viewport, z) {
            histogram.increment(x, y);
        }
    }
    true
}

/// Draw `count` samples from `rng` and trace each one.
fn sample_chunk(
    histogram: &OrbitHistogram,
    viewport: &Viewport,
    region: &PlaneRegion,
    window: AcceptWindow,
    rng: &mut StdRng,
    count: u64,
) -> u64 {
    let mut accepted = 0;
    for _ in 0..count {
        let re = region.re_min + rng.gen::<f64>() * region.re_span();
        let im = region.im_min + rng.gen::<f64>() * region.im_span();
        if trace_sample(histogram, viewport, region, Complex::new(re, im), window) {
            accepted += 1;
        }
    }
    accepted
}

/// Accumulate `params.total_samples` trajectories on the host.
///
/// The sample stream is cut into chunks of [`SAMPLES_PER_CHUNK`]; chunk `k`
/// draws from its own generator seeded from `(seed, k)`. The histogram is
/// therefore reproducible for a fixed seed, and raising `total_samples`
/// only appends samples, so total mass never decreases.
pub fn accumulate_host(
    viewport: &Viewport,
    region: &PlaneRegion,
    max_iterations: u32,
    params: &BuddhabrotParams,
) -> BuddhabrotResult {
    let start = Instant::now();
    let histogram = OrbitHistogram::new(viewport.width, viewport.height);
    let window = AcceptWindow {
        min_iterations: params.min_iterations,
        max_iterations,
    };
    let total = params.total_samples;
    let chunks = total.div_ceil(SAMPLES_PER_CHUNK);
    debug!(
        total_samples = total,
        chunks,
        seed = params.seed,
        min_iterations = params.min_iterations,
        "Starting host Buddhabrot"
    );

    let samples_accepted: u64 = (0..chunks)
        .into_par_iter()
        .map(|k| {
            let mut rng = StdRng::seed_from_u64(chunk_seed(params.seed, k));
            let count = SAMPLES_PER_CHUNK.min(total - k * SAMPLES_PER_CHUNK);
            sample_chunk(&histogram, viewport, region, window, &mut rng, count)
        })
        .sum();

    let elapsed = start.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        samples_drawn = total,
        samples_accepted,
        mass = histogram.total(),
        "Buddhabrot accumulation complete"
    );

    BuddhabrotResult {
        histogram,
        samples_drawn: total,
        samples_accepted,
        elapsed,
    }
}
