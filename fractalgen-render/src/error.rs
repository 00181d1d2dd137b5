use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Core(#[from] fractalgen_core::CoreError),

    /// The device strategy was requested but no compute device can run it.
    /// Never recovered by falling back to the host.
    #[error("compute device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("device error: {0}")]
    Device(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}
