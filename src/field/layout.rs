//! The row-major layout shared by every field in a simulation.

use std::num::NonZeroUsize;

/// A layout describes how a 2-D field is laid out in its flat buffer.
///
/// The order is row-major: position `row * cols + col` holds element `(row, col)`. Flattening a
/// field into a state vector and unflattening it back both go through [`Layout::translate`] and
/// [`Layout::position_to_index`], so the two directions cannot disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    /// The number of rows (height) and columns (width).
    shape: [NonZeroUsize; 2],

    /// The number of elements in the buffer that need to be skipped to move to the next element
    /// in each axis.
    strides: [usize; 2],
}

impl Layout {
    /// Creates a row-major layout with the given number of rows and columns.
    ///
    /// Returns `None` if either extent is zero or if the element count overflows.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Option<Self> {
        let rows = NonZeroUsize::new(rows)?;
        let cols = NonZeroUsize::new(cols)?;
        rows.checked_mul(cols)?;
        Some(Self {
            shape: [rows, cols],
            strides: [cols.get(), 1],
        })
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.shape[0].get()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.shape[1].get()
    }

    /// Returns the shape as `[rows, cols]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 2] {
        [self.rows(), self.cols()]
    }

    /// Returns the strides as `[row stride, column stride]`.
    #[must_use]
    pub fn strides(&self) -> [usize; 2] {
        self.strides
    }

    /// Returns the number of elements in a field having this layout.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Translates a field index into a position in the flat buffer.
    #[must_use]
    pub fn translate(&self, row: usize, col: usize) -> usize {
        row * self.strides[0] + col * self.strides[1]
    }

    /// Translates a position in the flat buffer back into a field index.
    #[must_use]
    pub fn position_to_index(&self, position: usize) -> (usize, usize) {
        (position / self.strides[0], position % self.strides[0])
    }

    /// Returns `true` if the index lies inside the field.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols()
    }

    /// Creates a row-major iterator over all indices of the field.
    #[must_use]
    pub fn iter(&self) -> IndexIter {
        self.into_iter()
    }
}

impl IntoIterator for &Layout {
    type Item = (usize, usize);
    type IntoIter = IndexIter;

    fn into_iter(self) -> Self::IntoIter {
        IndexIter {
            layout: *self,
            position: 0,
        }
    }
}

/// A row-major iterator over a field's indices.
#[derive(Debug)]
pub struct IndexIter {
    layout: Layout,
    position: usize,
}

impl Iterator for IndexIter {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.layout.capacity() {
            return None;
        }
        let index = self.layout.position_to_index(self.position);
        self.position += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.layout.capacity().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndexIter {}
