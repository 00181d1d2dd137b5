use std::path::Path;

use fractalgen_core::{ExecutionStrategy, Fractal, JuliaMapping, RenderRequest};

pub const BANNER: &str = r"
______              _        _        _____
|  ___|            | |      | |      |  __ \
| |_ _ __ __ _  ___| |_ __ _| |______| |  \/ ___ _ __
|  _| '__/ _` |/ __| __/ _` | |______| | __ / _ \ '_ \
| | | | | (_| | (__| || (_| | |      | |_\ \  __/ | | |
\_| |_|  \__,_|\___|\__\__,_|_|       \____/\___|_| |_|

Fractal generator for the terminal
";

/// Rows of the "Arguments" table for the effective request.
pub fn argument_rows(request: &RenderRequest, output: &Path) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Fractal", request.fractal.name().to_string()),
        ("Width", request.viewport.width.to_string()),
        ("Height", request.viewport.height.to_string()),
        ("Output Image", output.display().to_string()),
        ("Color Hue", request.color.hue.to_string()),
        ("Color Saturation", request.color.saturation.to_string()),
        ("Color Intensity", request.color.intensity.to_string()),
        ("Iterations", request.max_iterations.to_string()),
    ];

    let region_used = !matches!(
        request.fractal,
        Fractal::Julia {
            mapping: JuliaMapping::Centered,
            ..
        }
    );
    if region_used {
        rows.push(("Real Start", request.region.re_min.to_string()));
        rows.push(("Real End", request.region.re_max.to_string()));
        rows.push(("Imaginary Start", request.region.im_min.to_string()));
        rows.push(("Imaginary End", request.region.im_max.to_string()));
    }

    match request.fractal {
        Fractal::Julia { c, .. } => {
            rows.push(("CX", c.re.to_string()));
            rows.push(("CY", c.im.to_string()));
        }
        Fractal::Buddhabrot(p) => match request.strategy {
            ExecutionStrategy::Host => {
                rows.push(("Total Samples", p.total_samples.to_string()));
            }
            ExecutionStrategy::Device => {
                rows.push(("Samples per Thread", p.samples_per_thread.to_string()));
                rows.push(("Device Blocks", p.device_blocks.to_string()));
            }
        },
        Fractal::Mandelbrot | Fractal::BurningShip => {}
    }
    if let Fractal::Buddhabrot(p) = request.fractal {
        rows.push(("Seed", p.seed.to_string()));
        rows.push(("Min Iterations", p.min_iterations.to_string()));
    }

    rows.push((
        "Use GPU",
        (request.strategy == ExecutionStrategy::Device).to_string(),
    ));
    rows
}

/// Render rows as a two-column box table, names left-aligned and values
/// right-aligned.
pub fn format_table(title: &str, rows: &[(&str, String)]) -> String {
    let name_w = rows
        .iter()
        .map(|(n, _)| n.chars().count())
        .chain(std::iter::once("Argument".len()))
        .max()
        .unwrap_or(0);
    let value_w = rows
        .iter()
        .map(|(_, v)| v.chars().count())
        .chain(std::iter::once("Value".len()))
        .max()
        .unwrap_or(0);
    let rule = format!("+-{}-+-{}-+", "-".repeat(name_w), "-".repeat(value_w));

    let mut out = String::new();
    let inner = rule.chars().count();
    out.push_str(&format!("{title:^inner$}\n"));
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("| {:<name_w$} | {:>value_w$} |\n", "Argument", "Value"));
    out.push_str(&rule);
    out.push('\n');
    for (name, value) in rows {
        out.push_str(&format!("| {name:<name_w$} | {value:>value_w$} |\n"));
    }
    out.push_str(&rule);
    out.push('\n');
    out
}
