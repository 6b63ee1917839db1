//! Time integration of an [`OdeSystem`].
//!
//! The simulator only sees the [`Integrator`] trait; [`DormandPrince`] is the adaptive default
//! and [`RungeKutta4`] a fixed-step baseline.

pub mod dormand_prince;
pub mod rk4;

pub use dormand_prince::DormandPrince;
pub use rk4::RungeKutta4;

use thiserror::Error;

use crate::{field::StateVector, ode::OdeSystem, time::TimeSpec};

/// An error raised when the integrator cannot reach the requested time.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum IntegrationFailure {
    /// A NaN or infinite value appeared in the state or its derivative.
    #[error("state became non-finite at t = {t}")]
    NonFinite {
        /// Time of the last valid state.
        t: f64,
    },
    /// The step size shrank below what the floating point resolution at `t` allows.
    #[error("step size {step:e} underflowed at t = {t}")]
    StepSizeUnderflow {
        /// Time of the last accepted step.
        t: f64,
        /// The rejected step size.
        step: f64,
    },
    /// Too many consecutive steps were rejected by the error control.
    #[error("{rejections} consecutive steps rejected at t = {t}")]
    TooManyRejections {
        /// Time of the last accepted step.
        t: f64,
        /// Number of consecutive rejections.
        rejections: usize,
    },
    /// The step budget ran out before the target time was reached.
    #[error("gave up after {steps} steps at t = {t}")]
    MaxStepsExceeded {
        /// Time of the last accepted step.
        t: f64,
        /// Number of steps taken.
        steps: usize,
    },
    /// The target time lies before the start time or is not finite.
    #[error("cannot integrate from t = {t0} to t = {t_target}")]
    InvalidInterval {
        /// Start time.
        t0: f64,
        /// Requested target time.
        t_target: f64,
    },
    /// The initial state does not have the dimension of the system.
    #[error("initial state has {actual} elements, the system has {expected}")]
    DimensionMismatch {
        /// Dimension of the system.
        expected: usize,
        /// Length of the initial state.
        actual: usize,
    },
}

/// Relative and absolute local error tolerance.
///
/// A step is accepted when the RMS over all components of
/// `error[i] / (absolute + relative * max(|x_old[i]|, |x_new[i]|))` is at most one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    relative: f64,
    absolute: f64,
}

impl Tolerance {
    /// Create a tolerance. Returns `None` unless both values are finite and positive.
    #[must_use]
    pub fn new(relative: f64, absolute: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(relative) && valid(absolute)).then_some(Self { relative, absolute })
    }

    /// The relative tolerance.
    #[must_use]
    pub fn relative(&self) -> f64 {
        self.relative
    }

    /// The absolute tolerance.
    #[must_use]
    pub fn absolute(&self) -> f64 {
        self.absolute
    }

    /// The error scale of one component.
    fn scale(&self, old: f64, new: f64) -> f64 {
        self.absolute + self.relative * old.abs().max(new.abs())
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 1e-6,
            absolute: 1e-9,
        }
    }
}

/// Advances an [`OdeSystem`] in time.
pub trait Integrator {
    /// Integrate `system` from state `x0` at `t0` up to `t_target` and return the final state.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrationFailure`] if the target cannot be reached within tolerance or a
    /// non-finite value appears.
    fn advance<S>(
        &self,
        system: &S,
        x0: &[f64],
        t0: f64,
        t_target: f64,
        tolerance: Tolerance,
    ) -> Result<StateVector, IntegrationFailure>
    where
        S: OdeSystem + ?Sized;

    /// Integrate `system` through every point of `time` and return the state at the last one.
    ///
    /// # Errors
    ///
    /// Returns the first [`IntegrationFailure`] raised by [`Integrator::advance`].
    fn integrate<S>(
        &self,
        system: &S,
        x0: &[f64],
        time: &TimeSpec,
        tolerance: Tolerance,
    ) -> Result<StateVector, IntegrationFailure>
    where
        S: OdeSystem + ?Sized,
    {
        let mut t = time.start();
        let mut x = x0.to_vec();
        for &target in time.targets() {
            x = self.advance(system, &x, t, target, tolerance)?;
            t = target;
        }
        Ok(x)
    }
}

/// Checks shared by every integrator before the first step.
fn check_problem<S>(system: &S, x0: &[f64], t0: f64, t_target: f64) -> Result<(), IntegrationFailure>
where
    S: OdeSystem + ?Sized,
{
    if x0.len() != system.dimension() {
        return Err(IntegrationFailure::DimensionMismatch {
            expected: system.dimension(),
            actual: x0.len(),
        });
    }
    if !t0.is_finite() || !t_target.is_finite() || t_target < t0 {
        return Err(IntegrationFailure::InvalidInterval { t0, t_target });
    }
    if !all_finite(x0) {
        return Err(IntegrationFailure::NonFinite { t: t0 });
    }
    Ok(())
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
