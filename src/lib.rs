//! Image processing with Cellular Neural Networks.
//!
//! A cellular neural network is a grid of coupled cells whose state `x` follows
//! `dx/dt = -x + Ib + B ⊛ u + A ⊛ f(x)`, where `u` is the input image, `A` and `B` are 3×3
//! templates, `Ib` a bias and `f` a saturating nonlinearity. Integrating the network to a steady
//! state performs operations such as edge, corner and line detection without trained weights.
//!
//! ```no_run
//! use cnnsim::{Simulator, SimulatorConfig};
//!
//! let simulator = Simulator::new(SimulatorConfig::default());
//! simulator.process_preset("edgeDetection", "in.png".as_ref(), "out.png".as_ref())?;
//! # Ok::<(), cnnsim::Error>(())
//! ```

#![deny(unsafe_code, rust_2018_idioms, rust_2021_compatibility)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod field;
pub mod integrate;
pub mod io;
pub mod ode;
pub mod preset;
pub mod simulator;
pub mod template;
pub mod time;

pub use config::{Channel, Rescale, SimulatorConfig};
pub use error::{Error, Result};
pub use field::{Field, Layout, StateVector};
pub use integrate::{DormandPrince, IntegrationFailure, Integrator, RungeKutta4, Tolerance};
pub use io::ValidationError;
pub use preset::{lookup_preset, presets, Preset, Span};
pub use simulator::{simulate, Simulator};
pub use template::{Kernel, Template};
pub use time::TimeSpec;
