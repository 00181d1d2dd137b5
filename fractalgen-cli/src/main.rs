mod cli;
mod config;
mod display;
mod error;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use fractalgen_render::{export_png, render, ExportMetadata, RenderDetail};

use cli::Cli;
use error::CliError;

fn run(cli: Cli) -> Result<(), CliError> {
    let request = cli.effective_request()?;

    if cli.dump_config {
        println!("{}", config::dump_request(&request)?);
        return Ok(());
    }

    if !cli.quiet {
        println!("{}", display::BANNER);
        let rows = display::argument_rows(&request, &cli.output_image);
        println!("{}", display::format_table("Arguments", &rows));
    }

    info!("Generating {} fractal...", request.fractal.name());
    let output = render(&request)?;
    match output.stats.detail {
        RenderDetail::EscapeTime { interior_pixels } => info!(
            elapsed_ms = output.stats.elapsed.as_millis(),
            dispatch_ms = output.stats.dispatch.as_millis(),
            interior_pixels,
            "Fractal generated"
        ),
        RenderDetail::Density {
            samples_drawn,
            samples_accepted,
            histogram_mass,
            max_count,
        } => info!(
            elapsed_ms = output.stats.elapsed.as_millis(),
            dispatch_ms = output.stats.dispatch.as_millis(),
            samples_drawn,
            samples_accepted,
            histogram_mass,
            max_count,
            "Fractal generated"
        ),
    }

    info!("Saving output image...");
    export_png(
        &output.pixels,
        &cli.output_image,
        &ExportMetadata::from_request(&request),
    )?;
    info!(path = %cli.output_image.display(), "Image saved");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
