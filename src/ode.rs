//! The CNN state equation.

use std::cell::RefCell;

use crate::{
    field::{ops, Field, FieldError, Layout},
    template::Kernel,
};

/// An autonomous or time-dependent system `dx/dt = f(t, x)` on a flat state vector.
pub trait OdeSystem {
    /// The length of the state vector.
    fn dimension(&self) -> usize;

    /// Write `f(t, x)` into `dx`.
    ///
    /// Both slices have length [`OdeSystem::dimension`].
    fn derivative(&self, t: f64, x: &[f64], dx: &mut [f64]);
}

/// The right-hand side of a cellular neural network.
///
/// For a state field `X` the derivative is `-X + Ib + Bu + A ⊛ f(X)`, where `f` is the output
/// nonlinearity, `A` the feedback kernel and `Bu` the control kernel convolved with the input
/// image, computed once before the integration starts.
#[derive(Debug)]
pub struct CnnSystem {
    layout: Layout,
    feedback: Kernel,
    bias: f64,
    control_term: Vec<f64>,
    /// Saturated output of the current state, reused across evaluations.
    output: RefCell<Vec<f64>>,
}

impl CnnSystem {
    /// Build the system for one simulation.
    ///
    /// # Errors
    ///
    /// Returns an error if `control_term` does not have the shape given by `layout`.
    pub fn new(
        layout: Layout,
        feedback: Kernel,
        bias: f64,
        control_term: Field,
    ) -> Result<Self, FieldError> {
        if *control_term.layout() != layout {
            return Err(FieldError::ShapeMismatch {
                lhs: layout.shape(),
                rhs: control_term.shape(),
            });
        }
        Ok(Self {
            layout,
            feedback,
            bias,
            control_term: control_term.into_state(),
            output: RefCell::new(vec![0.0; layout.capacity()]),
        })
    }

    /// The layout of the state field.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl OdeSystem for CnnSystem {
    fn dimension(&self) -> usize {
        self.layout.capacity()
    }

    fn derivative(&self, _t: f64, x: &[f64], dx: &mut [f64]) {
        let mut output = self.output.borrow_mut();
        output.copy_from_slice(x);
        ops::saturate_in_place(&mut output);
        ops::convolve_into(&self.layout, &output, &self.feedback, dx);
        for ((d, &xi), &bu) in dx.iter_mut().zip(x).zip(&self.control_term) {
            *d = -xi + self.bias + bu + *d;
        }
    }
}
