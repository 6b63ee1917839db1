use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use cnnsim::{
    presets, Channel, Kernel, Rescale, Simulator, SimulatorConfig, Template, TimeSpec, Tolerance,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Image processing with Cellular Neural Networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in presets
    List,
    /// Process an image with a built-in preset
    Run {
        /// Preset name, e.g. edgeDetection or edge-detection
        preset: String,
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Process an image with a custom template
    Custom {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        solver: SolverArgs,
        /// JSON file holding the template; overrides the kernel flags
        #[arg(long)]
        template: Option<PathBuf>,
        /// Feedback template A, nine numbers in row-major order
        #[arg(long, default_value = "0,0,0,0,0,0,0,0,0", allow_hyphen_values = true)]
        feedback: Kernel,
        /// Control template B, nine numbers in row-major order
        #[arg(long, default_value = "0,0,0,0,0,0,0,0,0", allow_hyphen_values = true)]
        control: Kernel,
        /// System bias Ib
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        bias: f64,
        /// Initial state as a fraction of the input intensity
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        initial: f64,
        /// First time point
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        /// Last time point
        #[arg(long, default_value_t = 10.0)]
        end: f64,
        /// Number of evenly spaced time points
        #[arg(long, default_value_t = 2)]
        samples: usize,
    },
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input image
    input: PathBuf,
    /// Output image
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct SolverArgs {
    /// Relative error tolerance of the integrator
    #[arg(long, default_value_t = 1e-6)]
    rtol: f64,
    /// Absolute error tolerance of the integrator
    #[arg(long, default_value_t = 1e-9)]
    atol: f64,
    /// Input channel: red, green, blue or luma
    #[arg(long, default_value_t = Channel::Red)]
    channel: Channel,
    /// Write the raw rounded output (-1 -> 255, 0 -> 0, 1 -> 1) instead of the linear map
    #[arg(long)]
    legacy_rescale: bool,
}

impl SolverArgs {
    fn config(&self) -> Result<SimulatorConfig> {
        let tolerance = Tolerance::new(self.rtol, self.atol)
            .ok_or_else(|| anyhow!("tolerances must be positive, got {} and {}", self.rtol, self.atol))?;
        let rescale = if self.legacy_rescale {
            Rescale::Legacy
        } else {
            Rescale::Linear
        };
        Ok(SimulatorConfig::new()
            .with_tolerance(tolerance)
            .with_channel(self.channel)
            .with_rescale(rescale))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::List => {
            for preset in presets() {
                let span = preset.span();
                println!(
                    "{:<24} {:<26} Ib = {:>5}  t = [{}, {}] ({} samples)",
                    preset.name(),
                    preset.label(),
                    preset.template().bias(),
                    span.start,
                    span.end,
                    span.samples
                );
            }
        }
        Command::Run { preset, io, solver } => {
            let simulator = Simulator::new(solver.config()?);
            simulator
                .process_preset(&preset, &io.input, &io.output)
                .with_context(|| format!("{preset} failed on {}", io.input.display()))?;
            report(&io.output);
        }
        Command::Custom {
            io,
            solver,
            template,
            feedback,
            control,
            bias,
            initial,
            start,
            end,
            samples,
        } => {
            let template = match template {
                Some(path) => Template::from_json_file(&path)
                    .with_context(|| format!("cannot load template {}", path.display()))?,
                None => Template::new(feedback, control, bias, initial),
            };
            let time = TimeSpec::linspace(start, end, samples).context("invalid time span")?;
            info!(input = %io.input.display(), "image processing initialized");
            let simulator = Simulator::new(solver.config()?);
            simulator
                .process(&io.input, &io.output, &template, &time)
                .with_context(|| format!("custom template failed on {}", io.input.display()))?;
            report(&io.output);
        }
    }
    Ok(())
}

fn report(output: &Path) {
    info!("result is saved at {}", output.display());
}
