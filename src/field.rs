//! A 2-D field of real numbers.
//!
//! A [`Field`] represents both an image channel and the evolving network state. The integrator
//! works on the flattened form, a [`StateVector`], and the conversion between the two is a pure
//! reshape through the field's [`Layout`].

pub mod error;
pub mod layout;
pub mod ops;

pub use error::FieldError;
pub use layout::Layout;

use crate::template::Kernel;

/// The flattened, row-major form of a [`Field`].
pub type StateVector = Vec<f64>;

/// An owned 2-D array of `f64` with a row-major layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    buffer: Vec<f64>,
    layout: Layout,
}

impl Field {
    /// Create a field given its layout and data.
    ///
    /// The order of the elements in `data` is row-major.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not hold exactly as many elements as the layout.
    pub fn new(layout: Layout, data: Vec<f64>) -> Result<Self, FieldError> {
        if data.len() != layout.capacity() {
            return Err(FieldError::ElementCount {
                expected: layout.capacity(),
                actual: data.len(),
            });
        }
        Ok(Self {
            buffer: data,
            layout,
        })
    }

    /// Create a field filled with a single value.
    #[must_use]
    pub fn fill(layout: Layout, value: f64) -> Self {
        Self {
            buffer: vec![value; layout.capacity()],
            layout,
        }
    }

    /// Create a field filled with zeros.
    #[must_use]
    pub fn zeros(layout: Layout) -> Self {
        Self::fill(layout, 0.0)
    }

    /// Create a field by evaluating `op` at every `(row, col)` index.
    #[must_use]
    pub fn from_fn<F>(layout: Layout, mut op: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let buffer = layout.iter().map(|(row, col)| op(row, col)).collect();
        Self { buffer, layout }
    }

    /// Rebuild a field from a state vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the state vector's length does not match the layout.
    pub fn unflatten(layout: Layout, state: &[f64]) -> Result<Self, FieldError> {
        Self::new(layout, state.to_vec())
    }

    /// Flatten the field into a state vector.
    #[must_use]
    pub fn flatten(&self) -> StateVector {
        self.buffer.clone()
    }

    /// Consume the field and return its state vector without copying.
    #[must_use]
    pub fn into_state(self) -> StateVector {
        self.buffer
    }

    /// Return the layout of the field.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Return the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    /// Return the number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    /// Return the shape as `[rows, cols]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 2] {
        self.layout.shape()
    }

    /// Return the element at `(row, col)`, or `None` if the index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if !self.layout.contains(row, col) {
            return None;
        }
        Some(self.buffer[self.layout.translate(row, col)])
    }

    /// Borrow the underlying row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.buffer
    }

    /// Create a row-major iterator over the field.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.buffer.iter()
    }

    /// Apply `op` to each element.
    #[must_use]
    pub fn map<F>(&self, op: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            buffer: self.buffer.iter().map(|&x| op(x)).collect(),
            layout: self.layout,
        }
    }

    /// Combine two fields of the same shape element-wise.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes differ.
    pub fn zip_with<F>(&self, other: &Self, op: F) -> Result<Self, FieldError>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.layout != other.layout {
            return Err(FieldError::ShapeMismatch {
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }
        let buffer = self
            .buffer
            .iter()
            .zip(other.buffer.iter())
            .map(|(&x, &y)| op(x, y))
            .collect();
        Ok(Self {
            buffer,
            layout: self.layout,
        })
    }

    /// Multiply every element by `factor`.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        self.map(|x| x * factor)
    }

    /// Convolve the field with a 3×3 kernel, see [`ops::convolve_into`].
    #[must_use]
    pub fn convolve(&self, kernel: &Kernel) -> Self {
        let mut buffer = vec![0.0; self.buffer.len()];
        ops::convolve_into(&self.layout, &self.buffer, kernel, &mut buffer);
        Self {
            buffer,
            layout: self.layout,
        }
    }

    /// Apply the output nonlinearity to each element, see [`ops::saturate`].
    #[must_use]
    pub fn saturate(&self) -> Self {
        self.map(ops::saturate)
    }
}

impl<'a> IntoIterator for &'a Field {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.buffer.iter()
    }
}
