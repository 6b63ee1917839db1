//! Classical fixed-step Runge–Kutta.

use crate::{
    field::StateVector,
    integrate::{all_finite, check_problem, IntegrationFailure, Integrator, Tolerance},
    ode::OdeSystem,
};

/// The classical 4th order Runge–Kutta method with a fixed number of steps per time unit.
///
/// The tolerance passed to [`Integrator::advance`] is ignored. Useful as a reference to compare
/// the adaptive integrator against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RungeKutta4 {
    steps_per_unit: f64,
}

impl RungeKutta4 {
    /// Create an integrator taking `steps_per_unit` steps per unit of time (at least one step
    /// per call).
    #[must_use]
    pub fn new(steps_per_unit: f64) -> Self {
        Self {
            steps_per_unit: if steps_per_unit.is_finite() && steps_per_unit > 0.0 {
                steps_per_unit
            } else {
                1.0
            },
        }
    }
}

impl Default for RungeKutta4 {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Integrator for RungeKutta4 {
    #[allow(clippy::needless_range_loop)]
    fn advance<S>(
        &self,
        system: &S,
        x0: &[f64],
        t0: f64,
        t_target: f64,
        _tolerance: Tolerance,
    ) -> Result<StateVector, IntegrationFailure>
    where
        S: OdeSystem + ?Sized,
    {
        check_problem(system, x0, t0, t_target)?;
        let mut x = x0.to_vec();
        if t_target == t0 {
            return Ok(x);
        }

        let n = x.len();
        let steps = ((t_target - t0) * self.steps_per_unit).ceil().max(1.0) as usize;
        let h = (t_target - t0) / steps as f64;
        let mut k1 = vec![0.0; n];
        let mut k2 = vec![0.0; n];
        let mut k3 = vec![0.0; n];
        let mut k4 = vec![0.0; n];
        let mut stage = vec![0.0; n];

        for step in 0..steps {
            let t = t0 + step as f64 * h;
            system.derivative(t, &x, &mut k1);
            for i in 0..n {
                stage[i] = x[i] + 0.5 * h * k1[i];
            }
            system.derivative(t + 0.5 * h, &stage, &mut k2);
            for i in 0..n {
                stage[i] = x[i] + 0.5 * h * k2[i];
            }
            system.derivative(t + 0.5 * h, &stage, &mut k3);
            for i in 0..n {
                stage[i] = x[i] + h * k3[i];
            }
            system.derivative(t + h, &stage, &mut k4);
            for i in 0..n {
                x[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
            }
            if !all_finite(&x) {
                return Err(IntegrationFailure::NonFinite { t });
            }
        }
        Ok(x)
    }
}
