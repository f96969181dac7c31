//! Error types for the transition engine.
//!
//! Every variant is absorbed inside the engine: the driver logs it and skips the
//! visual effect rather than failing the host's navigation.

/// Failures that can occur while setting up or drawing a transition overlay.
#[derive(thiserror::Error, Debug)]
pub enum TransitionError {
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, TransitionError>;
