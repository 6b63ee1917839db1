//! Runs a template over an image.

use std::path::Path;

use image::{DynamicImage, RgbImage};
use tracing::{debug, info};

use crate::{
    config::SimulatorConfig,
    error::Result,
    field::Field,
    integrate::{DormandPrince, Integrator},
    io,
    ode::CnnSystem,
    preset::lookup_preset,
    template::Template,
    time::TimeSpec,
};

/// Simulates a cellular neural network with a given integrator.
///
/// A simulator holds no state between runs, so one instance can process any number of images.
#[derive(Clone, Debug, Default)]
pub struct Simulator<I = DormandPrince> {
    integrator: I,
    config: SimulatorConfig,
}

impl Simulator<DormandPrince> {
    /// Create a simulator using the adaptive Dormand–Prince integrator.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_integrator(DormandPrince::default(), config)
    }
}

impl<I> Simulator<I>
where
    I: Integrator,
{
    /// Create a simulator using `integrator`.
    #[must_use]
    pub fn with_integrator(integrator: I, config: SimulatorConfig) -> Self {
        Self { integrator, config }
    }

    /// The configuration of the simulator.
    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Integrate the network driven by `input` and return its output field.
    ///
    /// The state starts at `input * initial_condition` and the control term is `B ⊛ input`. The
    /// returned field is the nonlinearity applied to the state at the last time point, so every
    /// value lies in `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is invalid or the integration fails.
    pub fn run(&self, input: &Field, template: &Template, time: &TimeSpec) -> Result<Field> {
        template.validate()?;
        let layout = *input.layout();
        let x0 = input.scale(template.initial_condition()).into_state();
        let control_term = input.convolve(template.control());
        let system = CnnSystem::new(layout, *template.feedback(), template.bias(), control_term)?;
        debug!(
            rows = layout.rows(),
            cols = layout.cols(),
            start = time.start(),
            end = time.end(),
            targets = time.targets().len(),
            "integrating"
        );
        let state = self
            .integrator
            .integrate(&system, &x0, time, self.config.tolerance())?;
        Ok(Field::unflatten(layout, &state)?.saturate())
    }

    /// Turn an output field into a grayscale RGB image using the configured rescaling.
    #[must_use]
    pub fn render(&self, output: &Field) -> RgbImage {
        let rescale = self.config.rescale();
        let samples: Vec<u8> = output.iter().map(|&v| rescale.apply(v)).collect();
        io::to_rgb(output.layout(), &samples)
    }

    /// Process a decoded image: extract the configured channel, run the network and render the
    /// output as grayscale RGB with the same width and height.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty or the simulation fails.
    pub fn simulate(
        &self,
        image: &DynamicImage,
        template: &Template,
        time: &TimeSpec,
    ) -> Result<RgbImage> {
        let input = io::channel(image, self.config.channel())?;
        let output = self.run(&input, template, time)?;
        Ok(self.render(&output))
    }

    /// Validate, decode, simulate and encode. Nothing is written if any step fails.
    ///
    /// # Errors
    ///
    /// Returns a validation error before decoding if either path is rejected, otherwise the
    /// first codec or simulation error.
    pub fn process(
        &self,
        input: &Path,
        output: &Path,
        template: &Template,
        time: &TimeSpec,
    ) -> Result<()> {
        io::validate(input)?;
        io::validate_output(output)?;
        let image = io::load(input)?;
        let rendered = self.simulate(&image, template, time)?;
        io::save(&rendered, output)?;
        info!(input = %input.display(), output = %output.display(), "processing complete");
        Ok(())
    }

    /// [`Simulator::process`] with a preset from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPreset`](crate::Error::UnknownPreset) if no preset is called
    /// `name`, otherwise see [`Simulator::process`].
    pub fn process_preset(&self, name: &str, input: &Path, output: &Path) -> Result<()> {
        let preset = lookup_preset(name)?;
        info!(preset = preset.label(), input = %input.display(), "initialized");
        self.process(input, output, preset.template(), &preset.time_spec()?)
    }
}

/// Process a decoded image with the default configuration, see [`Simulator::simulate`].
///
/// # Errors
///
/// Returns an error if the image is empty or the simulation fails.
pub fn simulate(image: &DynamicImage, template: &Template, time: &TimeSpec) -> Result<RgbImage> {
    Simulator::new(SimulatorConfig::default()).simulate(image, template, time)
}
