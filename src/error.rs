//! Defines the crate-level error.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    field::FieldError, integrate::IntegrationFailure, io::ValidationError,
    template::TemplateError, time::TimeSpecError,
};

/// A result whose error is [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error type for every operation exposed by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An input or output path was rejected before any work started.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No preset has the requested name.
    #[error("unknown preset {name:?} (available: {available})")]
    UnknownPreset {
        /// The requested name.
        name: String,
        /// Comma separated list of the known names.
        available: String,
    },
    /// The integrator could not reach the horizon.
    #[error("integration failed: {0}")]
    Integration(#[from] IntegrationFailure),
    /// The time points are not a valid time span.
    #[error("invalid time span: {0}")]
    TimeSpec(#[from] TimeSpecError),
    /// The template could not be built.
    #[error("invalid template: {0}")]
    Template(#[from] TemplateError),
    /// Two fields did not have matching shapes.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// The image codec could not read the input.
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        /// The input path.
        path: PathBuf,
        /// The codec error.
        #[source]
        source: image::ImageError,
    },
    /// The image codec could not write the output.
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        /// The output path.
        path: PathBuf,
        /// The codec error.
        #[source]
        source: image::ImageError,
    },
}
