//! Per-run simulator configuration.

use std::{fmt, str::FromStr};

use crate::integrate::Tolerance;

/// Which channel of the decoded image drives the network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The red channel of the image converted to RGB.
    #[default]
    Red,
    /// The green channel of the image converted to RGB.
    Green,
    /// The blue channel of the image converted to RGB.
    Blue,
    /// The luminance of the image.
    Luma,
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Self::Red),
            "green" | "g" => Ok(Self::Green),
            "blue" | "b" => Ok(Self::Blue),
            "luma" | "gray" | "grey" => Ok(Self::Luma),
            other => Err(format!("unknown channel {other:?}")),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Luma => "luma",
        };
        f.write_str(name)
    }
}

/// How an output value in `[-1, 1]` becomes an 8-bit sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rescale {
    /// Map `[-1, 1]` linearly onto `[0, 255]`, rounding half to even.
    #[default]
    Linear,
    /// Round to the nearest integer (half to even) and wrap into a byte, so `-1` becomes `255`,
    /// `0` stays `0` and `1` stays `1`, like NumPy's `uint8(round(v))`.
    Legacy,
}

impl Rescale {
    /// Convert one output value into a sample.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(self, value: f64) -> u8 {
        match self {
            Self::Linear => ((value + 1.0) * 0.5 * 255.0)
                .round_ties_even()
                .clamp(0.0, 255.0) as u8,
            Self::Legacy => (value.round_ties_even() as i64).rem_euclid(256) as u8,
        }
    }
}

/// Configuration of one simulation.
///
/// A plain value: build one per call, nothing is shared between runs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulatorConfig {
    tolerance: Tolerance,
    channel: Channel,
    rescale: Rescale,
}

impl SimulatorConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different error tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Drive the network from a different channel.
    #[must_use]
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Use a different output rescaling.
    #[must_use]
    pub fn with_rescale(mut self, rescale: Rescale) -> Self {
        self.rescale = rescale;
        self
    }

    /// The integrator tolerance.
    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// The input channel.
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The output rescaling.
    #[must_use]
    pub fn rescale(&self) -> Rescale {
        self.rescale
    }
}
