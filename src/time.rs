//! Time points at which the integrator must report the state.

use thiserror::Error;

/// An error raised for an invalid sequence of time points.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TimeSpecError {
    /// No time points were given.
    #[error("a time span needs at least one point")]
    Empty,
    /// A time point is NaN or infinite.
    #[error("time point {index} is not finite")]
    NonFinite {
        /// Position of the offending point.
        index: usize,
    },
    /// A time point is not greater than its predecessor.
    #[error("time point {index} does not increase strictly")]
    NotIncreasing {
        /// Position of the offending point.
        index: usize,
    },
    /// A single time point must be a positive step size.
    #[error("a single time point must be positive, got {0}")]
    NonPositiveSingle(f64),
}

/// A strictly increasing sequence of time points.
///
/// The first point is the start of the integration and the last one is the horizon. A single
/// point `p` stands for one macro-step of size `p` starting at zero.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSpec {
    points: Vec<f64>,
}

impl TimeSpec {
    /// Create a time spec from explicit points.
    ///
    /// # Errors
    ///
    /// Returns an error unless the points are finite and strictly increasing.
    pub fn new(points: Vec<f64>) -> Result<Self, TimeSpecError> {
        if points.is_empty() {
            return Err(TimeSpecError::Empty);
        }
        if let Some(index) = points.iter().position(|t| !t.is_finite()) {
            return Err(TimeSpecError::NonFinite { index });
        }
        if let Some(index) = points
            .windows(2)
            .position(|w| w[1] <= w[0])
            .map(|i| i + 1)
        {
            return Err(TimeSpecError::NotIncreasing { index });
        }
        if let [single] = points[..] {
            if single <= 0.0 {
                return Err(TimeSpecError::NonPositiveSingle(single));
            }
        }
        Ok(Self { points })
    }

    /// Create `samples` evenly spaced points from `start` to `end`, both included.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting points are not a valid time spec, e.g. when
    /// `samples == 0` or `end <= start` with more than one sample.
    pub fn linspace(start: f64, end: f64, samples: usize) -> Result<Self, TimeSpecError> {
        let points = match samples {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (samples - 1) as f64;
                let mut points: Vec<f64> =
                    (0..samples).map(|i| start + i as f64 * step).collect();
                points[samples - 1] = end;
                points
            }
        };
        Self::new(points)
    }

    /// The time at which the integration starts.
    #[must_use]
    pub fn start(&self) -> f64 {
        match self.points[..] {
            [_] => 0.0,
            _ => self.points[0],
        }
    }

    /// The horizon of the integration.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// The implied step: the distance between the first two points, or the single point.
    #[must_use]
    pub fn step(&self) -> f64 {
        match self.points[..] {
            [single] => single,
            _ => self.points[1] - self.points[0],
        }
    }

    /// The points the integrator must pass through after the start, in order.
    #[must_use]
    pub fn targets(&self) -> &[f64] {
        match self.points[..] {
            [_] => &self.points,
            _ => &self.points[1..],
        }
    }

    /// All points as given.
    #[must_use]
    pub fn points(&self) -> &[f64] {
        &self.points
    }
}
