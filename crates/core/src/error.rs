//! Error types for the particle-sphere core.

use thiserror::Error;

/// Errors produced by field construction, ticking, and lookup.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A particle field was requested with zero particles.
    #[error("invalid particle count: a field needs at least one particle")]
    InvalidParticleCount,

    /// The sphere radius was zero, negative, or not finite.
    #[error("invalid sphere radius {0}: must be finite and positive")]
    InvalidRadius(f64),

    /// A scatter extent or visual radius range was unusable.
    #[error("invalid extent: {0}")]
    InvalidExtent(String),

    /// A frame delta was negative or not finite.
    #[error("invalid time step {0}: must be finite and non-negative")]
    InvalidTimeStep(f64),

    /// No visualization is registered under the given name.
    #[error("unknown visualization: {0}")]
    UnknownVisualization(String),

    /// A requested parameter name was not found in the params object.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Writing a snapshot or reading an input file failed.
    #[error("i/o error: {0}")]
    Io(String),
}
