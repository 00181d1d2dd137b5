use fractalgen_core::{
    escape_time, quadratic_step, BuddhabrotParams, ColorSpec, Complex, CoreError,
    ExecutionStrategy, Fractal, JuliaMapping, PlaneRegion, RenderRequest, Viewport,
    ESCAPE_RADIUS_SQ,
};
use fractalgen_render::{render, RenderDetail, RenderError};

fn request(fractal: Fractal, width: u32, height: u32) -> RenderRequest {
    let (region, max_iterations, intensity) = match fractal {
        Fractal::Mandelbrot => ((-2.0, 1.0, -1.0, 1.0), 80, 2.0),
        Fractal::BurningShip => ((-2.0, 1.0, -2.0, 1.0), 400, 2.0),
        Fractal::Julia { .. } => ((-1.6, 1.6, -1.2, 1.2), 150, 2.0),
        Fractal::Buddhabrot(_) => ((-2.2, 1.2, -1.2, 1.2), 200, 8.0),
    };
    RenderRequest {
        viewport: Viewport::new(width, height).unwrap(),
        region: PlaneRegion::new(region.0, region.1, region.2, region.3).unwrap(),
        max_iterations,
        color: ColorSpec::new(204, 0.64, intensity).unwrap(),
        fractal,
        strategy: ExecutionStrategy::Host,
    }
}

fn buddhabrot(total_samples: u64) -> Fractal {
    Fractal::Buddhabrot(BuddhabrotParams {
        total_samples,
        ..BuddhabrotParams::default()
    })
}

#[test]
fn end_to_end_mandelbrot_render() {
    let output = render(&request(Fractal::Mandelbrot, 200, 150)).unwrap();

    assert_eq!(output.pixels.width, 200);
    assert_eq!(output.pixels.height, 150);
    assert_eq!(output.pixels.pixels.len(), 200 * 150 * 3);
    assert!(output.stats.dispatch <= output.stats.elapsed);
    match output.stats.detail {
        RenderDetail::EscapeTime { interior_pixels } => {
            assert!(interior_pixels > 0);
            assert!(interior_pixels < 200 * 150);
        }
        other => panic!("unexpected detail {other:?}"),
    }

    let rgb = output.pixels.to_rgb();
    assert!(
        rgb.chunks_exact(3).any(|px| px != [0, 0, 0]),
        "rendered image should contain non-black pixels"
    );
}

#[test]
fn interior_pixels_are_black() {
    let output = render(&request(Fractal::Mandelbrot, 90, 60)).unwrap();
    // The pixel mapping to c = -0.5 + 0i sits inside the main cardioid.
    let x = (1.5 / 3.0 * 90.0) as u32;
    let y = 30;
    assert_eq!(output.pixels.pixel(x, y), [0, 0, 0]);
}

#[test]
fn end_to_end_burning_ship_and_julia() {
    let ship = render(&request(Fractal::BurningShip, 96, 96)).unwrap();
    assert_eq!(ship.pixels.pixels.len(), 96 * 96 * 3);

    let julia = request(
        Fractal::Julia {
            c: Complex::new(-0.4, 0.6),
            mapping: JuliaMapping::Centered,
        },
        120,
        80,
    );
    let out = render(&julia).unwrap();
    // The center pixel starts at z = 0, so it colors like the plain
    // fixed-c recurrence from the origin.
    let c = Complex::new(-0.4, 0.6);
    let expected = escape_time(Complex::ZERO, c, 150, ESCAPE_RADIUS_SQ, quadratic_step);
    assert_eq!(out.pixels.pixel(60, 40), julia.color.encode_escape(expected, 150));
}

#[test]
fn render_determinism() {
    let r = request(Fractal::Mandelbrot, 128, 96);
    let a = render(&r).unwrap();
    let b = render(&r).unwrap();
    assert_eq!(a.pixels, b.pixels, "renders must be deterministic");
}

#[test]
fn zero_iterations_is_a_configuration_error() {
    let mut r = request(Fractal::Mandelbrot, 32, 32);
    r.max_iterations = 0;
    assert!(matches!(
        render(&r),
        Err(RenderError::Core(CoreError::InvalidMaxIterations(0)))
    ));
}

#[test]
fn zero_samples_is_a_configuration_error() {
    let r = request(buddhabrot(0), 32, 32);
    assert!(matches!(
        render(&r),
        Err(RenderError::Core(CoreError::InvalidSampleCount { .. }))
    ));
}

#[test]
fn buddhabrot_peak_reaches_full_value() {
    let mut r = request(buddhabrot(200_000), 64, 48);
    r.color = ColorSpec::new(204, 0.64, 1.0).unwrap();
    let output = render(&r).unwrap();

    match output.stats.detail {
        RenderDetail::Density {
            samples_drawn,
            samples_accepted,
            histogram_mass,
            max_count,
        } => {
            assert_eq!(samples_drawn, 200_000);
            assert!(samples_accepted > 0 && samples_accepted <= samples_drawn);
            assert!(histogram_mass >= max_count as u64);
            assert!(max_count > 0);
        }
        other => panic!("unexpected detail {other:?}"),
    }
    assert!(output.stats.dispatch <= output.stats.elapsed);
    // With unit intensity the densest cell normalizes to exactly 1.0.
    let peak = output
        .pixels
        .pixels
        .chunks_exact(3)
        .map(|p| p[2])
        .max()
        .unwrap();
    assert_eq!(peak, 255);
}

#[test]
fn buddhabrot_mass_grows_with_samples() {
    let mass = |n| match render(&request(buddhabrot(n), 64, 48)).unwrap().stats.detail {
        RenderDetail::Density { histogram_mass, .. } => histogram_mass,
        other => panic!("unexpected detail {other:?}"),
    };
    let small = mass(20_000);
    let large = mass(160_000);
    assert!(large >= small);
}

#[test]
fn buddhabrot_seed_reproducibility() {
    let r = request(buddhabrot(100_000), 64, 48);
    let a = render(&r).unwrap();
    let b = render(&r).unwrap();
    assert_eq!(a.pixels, b.pixels);
}

#[cfg(not(feature = "gpu"))]
#[test]
fn device_strategy_without_gpu_feature_is_unavailable() {
    let mut r = request(Fractal::Mandelbrot, 32, 32);
    r.strategy = ExecutionStrategy::Device;
    assert!(matches!(render(&r), Err(RenderError::DeviceUnavailable(_))));

    let mut r = request(buddhabrot(1000), 32, 32);
    r.strategy = ExecutionStrategy::Device;
    assert!(matches!(render(&r), Err(RenderError::DeviceUnavailable(_))));
}

#[cfg(feature = "gpu")]
mod gpu {
    use super::*;
    use fractalgen_core::RenderMode;
    use fractalgen_render::{colorize_escape, render_escape_time, DeviceContext};

    /// Minimum share of pixels both strategies must classify alike. The
    /// device runs in f32, so points near the boundary may disagree.
    const CLASSIFICATION_AGREEMENT: f64 = 0.97;

    /// Largest V-byte difference allowed between the colored host and device
    /// frames for a pixel both classify alike. Smoothing is continuous in
    /// |z|², so f32 rounding only moves V by a few steps away from the
    /// boundary.
    const VALUE_TOLERANCE: u8 = 8;

    /// Minimum share of alike-classified pixels whose V bytes must fall
    /// within [`VALUE_TOLERANCE`]. Chaotic orbits next to the boundary can
    /// drift further in f32.
    const VALUE_AGREEMENT: f64 = 0.97;

    fn device() -> Option<DeviceContext> {
        match DeviceContext::new() {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                eprintln!("skipping device test: {e}");
                None
            }
        }
    }

    fn agreement(r: &RenderRequest, ctx: &DeviceContext) -> f64 {
        let RenderMode::EscapeTime(kernel) = r.fractal.mode() else {
            panic!("escape-time variant expected");
        };
        let host = render_escape_time(&kernel, &r.viewport, &r.region, r.max_iterations).iterations;
        let dev = ctx.render_escape_time(r).unwrap();
        let same = host
            .data
            .iter()
            .zip(&dev.data)
            .filter(|(a, b)| a.is_interior() == b.is_interior())
            .count();
        same as f64 / host.data.len() as f64
    }

    #[test]
    fn host_and_device_agree_on_classification() {
        let Some(ctx) = device() else { return };
        for fractal in [
            Fractal::Mandelbrot,
            Fractal::BurningShip,
            Fractal::Julia {
                c: Complex::new(-0.4, 0.6),
                mapping: JuliaMapping::Centered,
            },
        ] {
            let r = request(fractal, 160, 120);
            let share = agreement(&r, &ctx);
            assert!(
                share >= CLASSIFICATION_AGREEMENT,
                "{}: only {:.3} of pixels agree",
                fractal.name(),
                share
            );
        }
    }

    /// Share of alike-classified pixels whose colored V bytes stay within
    /// [`VALUE_TOLERANCE`], and the H/S bytes of every escaped pixel match.
    fn value_agreement(r: &RenderRequest, ctx: &DeviceContext) -> f64 {
        let RenderMode::EscapeTime(kernel) = r.fractal.mode() else {
            panic!("escape-time variant expected");
        };
        let host = render_escape_time(&kernel, &r.viewport, &r.region, r.max_iterations).iterations;
        let dev = ctx.render_escape_time(r).unwrap();
        let host_px = colorize_escape(&host, &r.color);
        let dev_px = colorize_escape(&dev, &r.color);

        let mut alike = 0usize;
        let mut close = 0usize;
        for (i, (a, b)) in host.data.iter().zip(&dev.data).enumerate() {
            if a.is_interior() != b.is_interior() {
                continue;
            }
            alike += 1;
            let h = &host_px.pixels[i * 3..i * 3 + 3];
            let d = &dev_px.pixels[i * 3..i * 3 + 3];
            if !a.is_interior() {
                assert_eq!(h[..2], d[..2], "hue/saturation differ at pixel {i}");
            }
            if h[2].abs_diff(d[2]) <= VALUE_TOLERANCE {
                close += 1;
            }
        }
        close as f64 / alike as f64
    }

    #[test]
    fn host_and_device_colors_agree() {
        let Some(ctx) = device() else { return };
        for fractal in [
            Fractal::Mandelbrot,
            Fractal::BurningShip,
            Fractal::Julia {
                c: Complex::new(-0.4, 0.6),
                mapping: JuliaMapping::Centered,
            },
        ] {
            let r = request(fractal, 160, 120);
            let share = value_agreement(&r, &ctx);
            assert!(
                share >= VALUE_AGREEMENT,
                "{}: only {:.3} of pixels within {VALUE_TOLERANCE} value steps",
                fractal.name(),
                share
            );
        }
    }

    #[test]
    fn device_buddhabrot_accumulates() {
        let Some(ctx) = device() else { return };
        let params = BuddhabrotParams {
            device_blocks: 8,
            samples_per_thread: 64,
            ..BuddhabrotParams::default()
        };
        let r = request(Fractal::Buddhabrot(params), 64, 48);
        let result = ctx
            .accumulate_buddhabrot(&r.viewport, &r.region, r.max_iterations, &params)
            .unwrap();
        assert_eq!(result.samples_drawn, 8 * 256 * 64);
        assert!(result.samples_accepted > 0);
        assert!(result.histogram.total() > 0);
        // Edge cells are excluded by the projection.
        assert!((0..64).all(|x| result.histogram.get(x, 0) == 0));
    }
}
