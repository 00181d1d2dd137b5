pub mod color;
pub mod complex;
pub mod error;
pub mod fractal;
pub mod request;
pub mod viewport;

// Re-export primary types for convenience.
pub use color::{hsv_to_rgb, smooth_iterations, ColorSpec, Hsv8};
pub use complex::Complex;
pub use error::CoreError;
pub use fractal::{
    burning_ship_step, escape_time, quadratic_step, EscapeKernel, IterationResult, JuliaMapping,
    Orbit, StepFn, ESCAPE_RADIUS_SQ, TRAJECTORY_RADIUS_SQ,
};
pub use request::{BuddhabrotParams, ExecutionStrategy, Fractal, RenderMode, RenderRequest};
pub use viewport::{PlaneRegion, Viewport};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
