//! The convolution engine and the output nonlinearity.
//!
//! Both work on flat row-major buffers so the ODE right-hand side can run them on the state
//! vector directly, without building a [`Field`](crate::field::Field) per evaluation.

use std::ops::Range;

use crate::{field::Layout, template::Kernel};

/// Kernel index paired with the spatial offset it weights.
const TAPS: [(usize, isize); 3] = [(0, -1), (1, 0), (2, 1)];

/// Convolve `src` with a 3×3 kernel into `dst`, both laid out by `layout`.
///
/// Computes `dst[i, j] = Σ K[1 + di, 1 + dj] * src[i - di, j - dj]` for `di, dj ∈ {-1, 0, 1}`,
/// treating every index outside the field as zero. The output has the same shape as the input.
/// The kernel is applied in true-convolution orientation, so an impulse reproduces the kernel
/// unflipped around it.
///
/// # Panics
///
/// Panics if either buffer's length differs from the layout's capacity.
pub fn convolve_into(layout: &Layout, src: &[f64], kernel: &Kernel, dst: &mut [f64]) {
    assert_eq!(src.len(), layout.capacity(), "convolve: source size");
    assert_eq!(dst.len(), layout.capacity(), "convolve: destination size");
    let cols = layout.cols();
    dst.fill(0.0);
    for (ki, di) in TAPS {
        for (kj, dj) in TAPS {
            let weight = kernel.get(ki, kj);
            if weight == 0.0 {
                continue;
            }
            for row in shifted(layout.rows(), di) {
                let src_row = row.wrapping_add_signed(-di);
                let dst_line = &mut dst[layout.translate(row, 0)..][..cols];
                let src_line = &src[layout.translate(src_row, 0)..][..cols];
                for col in shifted(cols, dj) {
                    dst_line[col] += weight * src_line[col.wrapping_add_signed(-dj)];
                }
            }
        }
    }
}

/// Indices `i` of an axis of length `len` for which `i - offset` is also inside the axis.
fn shifted(len: usize, offset: isize) -> Range<usize> {
    match offset {
        -1 => 0..len - 1,
        1 => 1..len,
        _ => 0..len,
    }
}

/// The piecewise-linear output nonlinearity `0.5 * (|x + 1| - |x - 1|)`.
///
/// Identity on `[-1, 1]`, saturating to `-1` below and `1` above.
#[must_use]
pub fn saturate(x: f64) -> f64 {
    0.5 * ((x + 1.0).abs() - (x - 1.0).abs())
}

/// Apply [`saturate`] to every element of `values`.
pub fn saturate_in_place(values: &mut [f64]) {
    for x in values {
        *x = saturate(*x);
    }
}
