//! Error types for the thread art engine.
//!
//! This module provides structured error types for image preprocessing,
//! parameter validation, and the path optimizer.

use std::io;
use thiserror::Error;
use threadkit_settings::SettingsError;

/// Errors that can occur while generating thread art.
#[derive(Error, Debug)]
pub enum ThreadArtError {
    /// The source image could not be decoded.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Invalid parameters were provided to the generator.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The engine reached a state its own wiring should rule out.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// The run was cancelled at an iteration boundary.
    #[error("Generation cancelled after {iteration} iterations")]
    Cancelled { iteration: usize },

    /// The preview raster could not be encoded.
    #[error("Image encoding error: {0}")]
    ImageEncoding(String),

    /// I/O error while reading a source image.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Settings could not be turned into generation parameters.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors related to generation parameter validation.
#[derive(Error, Debug)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Parameters are mutually incompatible.
    #[error("Incompatible parameters: {0}")]
    Incompatible(String),
}

impl ThreadArtError {
    /// True for the caller-facing parameter failures.
    pub fn is_invalid_parameters(&self) -> bool {
        matches!(self, Self::InvalidParameters(_) | Self::Parameter(_))
    }
}

/// Result type alias for thread art operations.
pub type ThreadArtResult<T> = Result<T, ThreadArtError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
