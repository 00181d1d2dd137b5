//! PNG export with embedded metadata (tEXt chunks).

use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use fractalgen_core::{Fractal, RenderRequest};

use crate::buffer::PixelBuffer;
use crate::Result;

const SOFTWARE: &str = "FractalGen";

/// Key/value pairs describing a render, embedded in exported PNGs.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pairs: Vec<(String, String)>,
    description: String,
}

impl ExportMetadata {
    pub fn from_request(request: &RenderRequest) -> Self {
        let region = &request.region;
        let color = &request.color;
        let mut pairs = vec![
            ("FractalType", request.fractal.name().to_string()),
            ("Region", region.to_string()),
            ("MaxIterations", request.max_iterations.to_string()),
            ("Hue", color.hue.to_string()),
            ("Saturation", color.saturation.to_string()),
            ("Intensity", color.intensity.to_string()),
            ("Strategy", request.strategy.to_string()),
            (
                "Resolution",
                format!("{}x{}", request.viewport.width, request.viewport.height),
            ),
        ];
        match request.fractal {
            Fractal::Julia { c, mapping } => {
                pairs.push(("JuliaC", c.to_string()));
                pairs.push(("JuliaMapping", format!("{mapping:?}")));
            }
            Fractal::Buddhabrot(p) => {
                pairs.push((
                    "Samples",
                    p.effective_samples(request.strategy).to_string(),
                ));
                pairs.push(("Seed", p.seed.to_string()));
                pairs.push(("MinIterations", p.min_iterations.to_string()));
            }
            Fractal::Mandelbrot | Fractal::BurningShip => {}
        }

        let mut description = format!(
            "{} - Region: {}, Iterations: {}",
            request.fractal.name(),
            region,
            request.max_iterations
        );
        if let Fractal::Julia { c, .. } = request.fractal {
            description.push_str(&format!(", Julia C: {c}"));
        }

        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (format!("{SOFTWARE}.{k}"), v))
                .collect(),
            description,
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Encode an HSV pixel buffer as 8-bit RGB PNG into `writer`.
pub fn write_png<W: Write>(
    writer: W,
    pixels: &PixelBuffer,
    metadata: &ExportMetadata,
) -> Result<()> {
    let mut encoder = png::Encoder::new(writer, pixels.width, pixels.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), SOFTWARE.to_string())?;
    encoder.add_text_chunk("Description".to_string(), metadata.description.clone())?;
    for (key, value) in &metadata.pairs {
        encoder.add_text_chunk(key.clone(), value.clone())?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&pixels.to_rgb())?;
    png_writer.finish()?;
    Ok(())
}

/// Write a PNG file with embedded render metadata.
///
/// Uses the `png` crate directly to inject custom tEXt chunks readable by
/// exiftool and most image viewers.
pub fn export_png(pixels: &PixelBuffer, path: &Path, metadata: &ExportMetadata) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_png(BufWriter::new(file), pixels, metadata)?;
    debug!(
        "Exported PNG {}x{} to {}",
        pixels.width,
        pixels.height,
        path.display()
    );
    Ok(())
}
