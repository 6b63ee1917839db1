//! Templates: the 3×3 kernel pair, bias and initial condition that program the network.

use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error raised while building or parsing a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A kernel string did not hold exactly nine numbers.
    #[error("invalid kernel {input:?}: {reason}")]
    Parse {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
    /// A template file could not be read.
    #[error("failed to read template file {path}: {source}")]
    Read {
        /// The file that was read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A template document was not valid JSON for a template.
    #[error("invalid template document: {0}")]
    Json(#[from] serde_json::Error),
    /// A template held a non-finite weight or constant.
    #[error("template contains a non-finite value")]
    NonFinite,
}

/// A 3×3 weight matrix, indexed `[row][col]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kernel([[f64; 3]; 3]);

impl Kernel {
    /// The all-zero kernel.
    pub const ZERO: Self = Self([[0.0; 3]; 3]);

    /// Create a kernel from its rows.
    #[must_use]
    pub const fn new(weights: [[f64; 3]; 3]) -> Self {
        Self(weights)
    }

    /// A kernel holding `value` at the center and zeros elsewhere.
    #[must_use]
    pub const fn center(value: f64) -> Self {
        Self([[0.0, 0.0, 0.0], [0.0, value, 0.0], [0.0, 0.0, 0.0]])
    }

    /// Return the weight at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not in `0..3`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row][col]
    }

    /// Return the rows of the kernel.
    #[must_use]
    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.0
    }

    /// Return the kernel rotated by 180°.
    ///
    /// Convolving with the flipped kernel is the same as correlating with this one.
    #[must_use]
    pub fn flipped(&self) -> Self {
        let mut out = [[0.0; 3]; 3];
        for (row, line) in out.iter_mut().enumerate() {
            for (col, w) in line.iter_mut().enumerate() {
                *w = self.0[2 - row][2 - col];
            }
        }
        Self(out)
    }

    /// Returns `true` if every weight is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().flatten().all(|w| w.is_finite())
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for Kernel {
    type Err = TemplateError;

    /// Parse nine numbers in row-major order, separated by commas and/or whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = |reason: String| TemplateError::Parse {
            input: s.to_owned(),
            reason,
        };
        let values = s
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|e| parse_error(format!("{token:?}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() != 9 {
            return Err(parse_error(format!("expected 9 values, got {}", values.len())));
        }
        let mut weights = [[0.0; 3]; 3];
        for (i, v) in values.into_iter().enumerate() {
            weights[i / 3][i % 3] = v;
        }
        Ok(Self(weights))
    }
}

/// A CNN template.
///
/// The `feedback` kernel (A) is applied to the network's own output at every step, the `control`
/// kernel (B) is applied once to the input image. `bias` (Ib) is added to every cell's derivative
/// and `initial_condition` is the fraction of the input intensity used to seed the state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    feedback: Kernel,
    control: Kernel,
    #[serde(default)]
    bias: f64,
    #[serde(default)]
    initial_condition: f64,
}

impl Template {
    /// Create a template.
    #[must_use]
    pub const fn new(feedback: Kernel, control: Kernel, bias: f64, initial_condition: f64) -> Self {
        Self {
            feedback,
            control,
            bias,
            initial_condition,
        }
    }

    /// Parse a template from a JSON document.
    ///
    /// ```json
    /// { "feedback": [[0, 0, 0], [0, 1, 0], [0, 0, 0]],
    ///   "control": [[-1, -1, -1], [-1, 8, -1], [-1, -1, -1]],
    ///   "bias": -1.0, "initial_condition": 0.0 }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or holds non-finite values.
    pub fn from_json_str(document: &str) -> Result<Self, TemplateError> {
        let template: Self = serde_json::from_str(document)?;
        template.validate()?;
        Ok(template)
    }

    /// Read a template from a JSON file, see [`Template::from_json_str`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a valid template.
    pub fn from_json_file(path: &Path) -> Result<Self, TemplateError> {
        let document = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&document)
    }

    /// Check that every weight and constant is finite.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::NonFinite`] otherwise.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let finite = self.feedback.is_finite()
            && self.control.is_finite()
            && self.bias.is_finite()
            && self.initial_condition.is_finite();
        if finite {
            Ok(())
        } else {
            Err(TemplateError::NonFinite)
        }
    }

    /// The feedback kernel (A).
    #[must_use]
    pub fn feedback(&self) -> &Kernel {
        &self.feedback
    }

    /// The control kernel (B).
    #[must_use]
    pub fn control(&self) -> &Kernel {
        &self.control
    }

    /// The bias (Ib).
    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// The initial condition factor.
    #[must_use]
    pub fn initial_condition(&self) -> f64 {
        self.initial_condition
    }
}
