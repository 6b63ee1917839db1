//! The catalog of built-in operations.

use std::path::Path;

use crate::{
    config::SimulatorConfig,
    error::{Error, Result},
    simulator::Simulator,
    template::{Kernel, Template},
    time::{TimeSpec, TimeSpecError},
};

/// Evenly spaced time points, `samples` of them from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    /// First time point.
    pub start: f64,
    /// Last time point.
    pub end: f64,
    /// Number of points, both ends included.
    pub samples: usize,
}

impl Span {
    /// Build the time spec of this span.
    ///
    /// # Errors
    ///
    /// Returns an error if the span does not describe an increasing sequence.
    pub fn time_spec(&self) -> Result<TimeSpec, TimeSpecError> {
        TimeSpec::linspace(self.start, self.end, self.samples)
    }
}

/// A named template together with the time span it is meant to run for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preset {
    name: &'static str,
    slug: &'static str,
    label: &'static str,
    template: Template,
    span: Span,
}

impl Preset {
    /// The lookup name, e.g. `edgeDetection`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The kebab-case alias of the name, e.g. `edge-detection`.
    #[must_use]
    pub fn slug(&self) -> &'static str {
        self.slug
    }

    /// A human readable label, e.g. `Edge detection`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The time span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// The time points of the span.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in presets.
    pub fn time_spec(&self) -> Result<TimeSpec, TimeSpecError> {
        self.span.time_spec()
    }
}

const IDENTITY: Kernel = Kernel::center(1.0);

const LAPLACIAN: Kernel = Kernel::new([[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]]);

static PRESETS: [Preset; 6] = [
    Preset {
        name: "edgeDetection",
        slug: "edge-detection",
        label: "Edge detection",
        template: Template::new(IDENTITY, LAPLACIAN, -1.0, 0.0),
        span: Span {
            start: 0.0,
            end: 10.0,
            samples: 2,
        },
    },
    Preset {
        name: "grayScaleEdgeDetection",
        slug: "gray-scale-edge-detection",
        label: "Grayscale edge detection",
        template: Template::new(Kernel::center(2.0), LAPLACIAN, -0.5, 0.0),
        span: Span {
            start: 0.0,
            end: 1.0,
            samples: 101,
        },
    },
    Preset {
        name: "cornerDetection",
        slug: "corner-detection",
        label: "Corner detection",
        template: Template::new(
            IDENTITY,
            Kernel::new([[-1.0, -1.0, -1.0], [-1.0, 4.0, -1.0], [-1.0, -1.0, -1.0]]),
            -5.0,
            0.0,
        ),
        span: Span {
            start: 0.0,
            end: 10.0,
            samples: 11,
        },
    },
    Preset {
        name: "diagonalLineDetection",
        slug: "diagonal-line-detection",
        label: "Diagonal line detection",
        template: Template::new(
            IDENTITY,
            Kernel::new([[-1.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0, -1.0]]),
            -4.0,
            0.0,
        ),
        span: Span {
            start: 0.0,
            end: 0.2,
            samples: 101,
        },
    },
    Preset {
        name: "inversion",
        slug: "inversion",
        label: "Inversion",
        template: Template::new(
            IDENTITY,
            Kernel::new([[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]]),
            -2.0,
            0.0,
        ),
        span: Span {
            start: 0.0,
            end: 10.0,
            samples: 101,
        },
    },
    Preset {
        name: "optimalEdgeDetection",
        slug: "optimal-edge-detection",
        label: "Optimal edge detection",
        template: Template::new(
            Kernel::ZERO,
            Kernel::new([[-0.11, 0.0, 0.11], [-0.28, 0.0, 0.28], [-0.11, 0.0, 0.11]]),
            0.0,
            0.0,
        ),
        span: Span {
            start: 0.0,
            end: 10.0,
            samples: 101,
        },
    },
];

/// All built-in presets.
#[must_use]
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

/// Find a preset by its name or its kebab-case alias.
///
/// # Errors
///
/// Returns [`Error::UnknownPreset`] if no preset matches.
pub fn lookup_preset(name: &str) -> Result<&'static Preset> {
    PRESETS
        .iter()
        .find(|p| p.name == name || p.slug == name)
        .ok_or_else(|| Error::UnknownPreset {
            name: name.to_owned(),
            available: PRESETS.iter().map(|p| p.name).collect::<Vec<_>>().join(", "),
        })
}

fn run_preset(name: &str, input: &Path, output: &Path) -> Result<()> {
    Simulator::new(SimulatorConfig::default()).process_preset(name, input, output)
}

/// Edge detection: a binary image showing the edges of the input in black.
///
/// # Errors
///
/// See [`Simulator::process`].
pub fn edge_detection(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    run_preset("edgeDetection", input.as_ref(), output.as_ref())
}

/// Grayscale edge detection: a grayscale edge map of the input.
///
/// # Errors
///
/// See [`Simulator::process`].
pub fn gray_scale_edge_detection(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    run_preset("grayScaleEdgeDetection", input.as_ref(), output.as_ref())
}

/// Corner detection: a binary image marking the convex corners of objects.
///
/// # Errors
///
/// See [`Simulator::process`].
pub fn corner_detection(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    run_preset("cornerDetection", input.as_ref(), output.as_ref())
}

/// Diagonal line detection: a binary image marking diagonal lines.
///
/// # Errors
///
/// See [`Simulator::process`].
pub fn diagonal_line_detection(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    run_preset("diagonalLineDetection", input.as_ref(), output.as_ref())
}

/// Inversion (logic NOT) of the input.
///
/// # Errors
///
/// See [`Simulator::process`].
pub fn inversion(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    run_preset("inversion", input.as_ref(), output.as_ref())
}

/// Optimal edge detection.
///
/// # Errors
///
/// See [`Simulator::process`].
pub fn optimal_edge_detection(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    run_preset("optimalEdgeDetection", input.as_ref(), output.as_ref())
}
