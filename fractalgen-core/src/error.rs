use thiserror::Error;

/// Configuration errors detected before any work is dispatched.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error("invalid plane region: {reason}")]
    InvalidRegion { reason: String },

    #[error("invalid color: {reason}")]
    InvalidColor { reason: String },

    #[error("invalid sample count: {reason}")]
    InvalidSampleCount { reason: String },

    #[error("invalid julia constant: {0}")]
    InvalidJuliaConstant(crate::Complex),
}
