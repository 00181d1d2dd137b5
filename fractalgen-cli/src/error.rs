use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("a fractal subcommand or --config <file> is required")]
    MissingCommand,

    #[error("--config <file> cannot be combined with a fractal subcommand")]
    ConfigWithCommand,

    #[error(transparent)]
    Invalid(#[from] fractalgen_core::CoreError),

    #[error("cannot read {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize request: {0}")]
    DumpConfig(#[from] serde_json::Error),

    #[error(transparent)]
    Render(#[from] fractalgen_render::RenderError),
}
