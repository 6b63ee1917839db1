//! Defines field errors.

use thiserror::Error;

/// An error type for all operations on fields.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The number of elements does not match the layout.
    #[error("unexpected element count (want {expected}, but got {actual})")]
    ElementCount {
        /// Capacity of the layout.
        expected: usize,
        /// Length of the supplied data.
        actual: usize,
    },
    /// An operation was performed on 2 fields with different shapes.
    #[error("incompatible shapes {lhs:?} and {rhs:?}")]
    ShapeMismatch {
        /// Shape of the left operand.
        lhs: [usize; 2],
        /// Shape of the right operand.
        rhs: [usize; 2],
    },
    /// A field was requested with a zero or overflowing extent.
    #[error("invalid field extent {rows}x{cols}")]
    InvalidExtent {
        /// Requested number of rows.
        rows: usize,
        /// Requested number of columns.
        cols: usize,
    },
}
