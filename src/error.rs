//! Error types for the planning engine.
//!
//! Only invalid input fails. Degenerate geometry (zero-length segments,
//! cusps) is clamped inside the profiler and reported by the collision
//! evaluator as a finding, never as an error.

use std::io;
use thiserror::Error;

/// Errors raised at the entry point of a computation.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A kinematic or footprint setting is out of range.
    #[error("Invalid setting '{name}': {value} ({reason})")]
    InvalidSettings {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A polygon does not have enough vertices.
    #[error("Shape {index} has {vertices} vertices (need at least 3)")]
    InvalidShape { index: usize, vertices: usize },

    /// A line cannot be evaluated.
    #[error("Invalid line '{id}': {reason}")]
    InvalidLine { id: String, reason: String },

    /// A sequence item refers to a line that does not exist.
    #[error("Sequence references unknown line '{0}'")]
    UnknownLine(String),

    /// A wait item has an unusable duration.
    #[error("Invalid wait at sequence index {index}: {reason}")]
    InvalidWait { index: usize, reason: &'static str },

    /// Optimizer parameters are unusable.
    #[error("Invalid optimizer settings: {0}")]
    InvalidOptimizerSettings(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while reading project files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;
