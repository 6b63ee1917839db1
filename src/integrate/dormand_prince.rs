//! The Dormand–Prince RK5(4) embedded pair with adaptive step-size control.

use tracing::{debug, trace};

use crate::{
    field::StateVector,
    integrate::{all_finite, check_problem, IntegrationFailure, Integrator, Tolerance},
    ode::OdeSystem,
};

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights, also the last stage's coefficients (first same as last).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between the 5th and the embedded 4th order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

/// Adaptive explicit Runge–Kutta integrator of order 5 with an embedded order 4 error estimate.
///
/// Rejected steps are retried with a smaller step; integration fails after `max_rejections`
/// consecutive rejections or `max_steps` accepted steps within one [`Integrator::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DormandPrince {
    max_steps: usize,
    max_rejections: usize,
    safety: f64,
    min_factor: f64,
    max_factor: f64,
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            max_rejections: 50,
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 10.0,
        }
    }
}

impl DormandPrince {
    /// Create an integrator with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of accepted steps per call to [`Integrator::advance`].
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Limit the number of consecutive rejected steps.
    #[must_use]
    pub fn with_max_rejections(mut self, max_rejections: usize) -> Self {
        self.max_rejections = max_rejections;
        self
    }

    /// The step budget per call.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// The rejection budget.
    #[must_use]
    pub fn max_rejections(&self) -> usize {
        self.max_rejections
    }

    /// Step size multiplier for a step whose scaled error norm is `err`.
    fn factor(&self, err: f64) -> f64 {
        if err == 0.0 {
            return self.max_factor;
        }
        (self.safety * err.powf(-0.2)).clamp(self.min_factor, self.max_factor)
    }
}

impl Integrator for DormandPrince {
    #[allow(clippy::needless_range_loop)]
    fn advance<S>(
        &self,
        system: &S,
        x0: &[f64],
        t0: f64,
        t_target: f64,
        tolerance: Tolerance,
    ) -> Result<StateVector, IntegrationFailure>
    where
        S: OdeSystem + ?Sized,
    {
        check_problem(system, x0, t0, t_target)?;
        let mut x = x0.to_vec();
        let n = x.len();
        if t_target == t0 || n == 0 {
            return Ok(x);
        }

        let mut k1 = vec![0.0; n];
        let mut k2 = vec![0.0; n];
        let mut k3 = vec![0.0; n];
        let mut k4 = vec![0.0; n];
        let mut k5 = vec![0.0; n];
        let mut k6 = vec![0.0; n];
        let mut k7 = vec![0.0; n];
        let mut stage = vec![0.0; n];
        let mut next = vec![0.0; n];

        system.derivative(t0, &x, &mut k1);
        if !all_finite(&k1) {
            return Err(IntegrationFailure::NonFinite { t: t0 });
        }

        let mut t = t0;
        let mut h = initial_step(system, &x, &k1, t0, t_target - t0, tolerance, &mut stage);
        let mut steps = 0;
        let mut rejections = 0;
        let mut total_rejections = 0;
        let mut evaluations = 2;
        // Set while the last trial step produced a non-finite value.
        let mut non_finite = false;

        loop {
            if steps >= self.max_steps {
                return Err(IntegrationFailure::MaxStepsExceeded { t, steps });
            }
            let min_step = 16.0 * f64::EPSILON * t.abs().max(t_target.abs());
            let remaining = t_target - t;
            let last = h >= remaining;
            if last {
                h = remaining;
            }
            if h <= min_step && !last {
                if non_finite {
                    return Err(IntegrationFailure::NonFinite { t });
                }
                return Err(IntegrationFailure::StepSizeUnderflow { t, step: h });
            }

            for i in 0..n {
                stage[i] = x[i] + h * A21 * k1[i];
            }
            system.derivative(t + C2 * h, &stage, &mut k2);
            for i in 0..n {
                stage[i] = x[i] + h * (A31 * k1[i] + A32 * k2[i]);
            }
            system.derivative(t + C3 * h, &stage, &mut k3);
            for i in 0..n {
                stage[i] = x[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
            }
            system.derivative(t + C4 * h, &stage, &mut k4);
            for i in 0..n {
                stage[i] = x[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
            }
            system.derivative(t + C5 * h, &stage, &mut k5);
            for i in 0..n {
                stage[i] = x[i]
                    + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
            }
            system.derivative(t + h, &stage, &mut k6);
            for i in 0..n {
                next[i] = x[i]
                    + h * (B1 * k1[i] + B3 * k3[i] + B4 * k4[i] + B5 * k5[i] + B6 * k6[i]);
            }
            let t_next = if last { t_target } else { t + h };
            system.derivative(t_next, &next, &mut k7);
            evaluations += 6;

            let mut sum = 0.0;
            for i in 0..n {
                let estimate = h
                    * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i]
                        + E7 * k7[i]);
                let scaled = estimate / tolerance.scale(x[i], next[i]);
                sum += scaled * scaled;
            }
            let err = (sum / n as f64).sqrt();

            non_finite = !(err.is_finite() && all_finite(&next) && all_finite(&k7));
            if !non_finite && err <= 1.0 {
                steps += 1;
                t = t_next;
                std::mem::swap(&mut x, &mut next);
                std::mem::swap(&mut k1, &mut k7);
                if last {
                    break;
                }
                let factor = self.factor(err);
                h *= if rejections > 0 { factor.min(1.0) } else { factor };
                rejections = 0;
            } else {
                rejections += 1;
                total_rejections += 1;
                trace!(t, h, err, "step rejected");
                if rejections > self.max_rejections {
                    if non_finite {
                        return Err(IntegrationFailure::NonFinite { t });
                    }
                    return Err(IntegrationFailure::TooManyRejections { t, rejections });
                }
                let factor = if non_finite {
                    self.min_factor
                } else {
                    self.factor(err).min(1.0)
                };
                h *= factor;
            }
        }

        debug!(
            t0,
            t_target,
            steps,
            rejections = total_rejections,
            evaluations,
            "segment integrated"
        );
        Ok(x)
    }
}

/// Estimates a first step size from the initial state and slope.
///
/// Follows the starting step algorithm of Hairer, Nørsett & Wanner, "Solving Ordinary
/// Differential Equations I", section II.4.
fn initial_step<S>(
    system: &S,
    x0: &[f64],
    f0: &[f64],
    t0: f64,
    span: f64,
    tolerance: Tolerance,
    scratch: &mut [f64],
) -> f64
where
    S: OdeSystem + ?Sized,
{
    let scale = |i: usize| tolerance.scale(x0[i], x0[i]);
    let d0 = rms((0..x0.len()).map(|i| x0[i] / scale(i)));
    let d1 = rms((0..x0.len()).map(|i| f0[i] / scale(i)));
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    }
    .min(span);

    for ((s, &x), &f) in scratch.iter_mut().zip(x0).zip(f0) {
        *s = x + h0 * f;
    }
    let mut f1 = vec![0.0; x0.len()];
    system.derivative(t0 + h0, scratch, &mut f1);
    let d2 = rms((0..x0.len()).map(|i| (f1[i] - f0[i]) / scale(i))) / h0;

    let h1 = if d1.max(d2) <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(0.2)
    };
    let h = (100.0 * h0).min(h1).min(span);
    if h.is_finite() && h > 0.0 {
        h
    } else {
        span
    }
}

/// Root mean square of the values.
fn rms<I>(values: I) -> f64
where
    I: ExactSizeIterator<Item = f64>,
{
    let n = values.len().max(1) as f64;
    (values.map(|v| v * v).sum::<f64>() / n).sqrt()
}
