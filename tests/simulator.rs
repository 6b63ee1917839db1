use std::path::Path;

use cnnsim::{
    field::FieldError, io, lookup_preset, preset, simulate, Channel, DormandPrince, Error, Field,
    IntegrationFailure, Kernel, Layout, Rescale, RungeKutta4, Simulator, SimulatorConfig,
    Template, TimeSpec, Tolerance, ValidationError,
};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// An 8×8 dark image with a 4×4 bright square at rows and columns 2..6.
fn square_image() -> DynamicImage {
    let img = RgbImage::from_fn(8, 8, |x, y| {
        if (2..6).contains(&x) && (2..6).contains(&y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    DynamicImage::ImageRgb8(img)
}

fn random_image(seed: u64, width: u32, height: u32) -> DynamicImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let img = RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]));
    DynamicImage::ImageRgb8(img)
}

fn preset_parts(name: &str) -> (Template, TimeSpec) {
    let preset = lookup_preset(name).unwrap();
    (*preset.template(), preset.time_spec().unwrap())
}

fn is_square_boundary(x: u32, y: u32) -> bool {
    let inside = (2..6).contains(&x) && (2..6).contains(&y);
    inside && (x == 2 || x == 5 || y == 2 || y == 5)
}

#[test]
fn rescale_linear() {
    assert_eq!(Rescale::Linear.apply(-1.0), 0);
    assert_eq!(Rescale::Linear.apply(1.0), 255);
    // 127.5 rounds half to even.
    assert_eq!(Rescale::Linear.apply(0.0), 128);
    assert_eq!(Rescale::Linear.apply(-2.0), 0);
    assert_eq!(Rescale::Linear.apply(2.0), 255);
}

#[test]
fn rescale_legacy() {
    assert_eq!(Rescale::Legacy.apply(-1.0), 255);
    assert_eq!(Rescale::Legacy.apply(0.0), 0);
    assert_eq!(Rescale::Legacy.apply(1.0), 1);
    assert_eq!(Rescale::Legacy.apply(0.5), 0);
    assert_eq!(Rescale::Legacy.apply(-0.5), 0);
    assert_eq!(Rescale::Legacy.apply(-0.6), 255);
}

#[test]
fn channel_parsing() {
    assert_eq!("red".parse::<Channel>().unwrap(), Channel::Red);
    assert_eq!("Luma".parse::<Channel>().unwrap(), Channel::Luma);
    assert!("alpha".parse::<Channel>().is_err());
    assert_eq!(Channel::Blue.to_string(), "blue");
}

#[test]
fn channel_extraction() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, Rgb([200, 100, 50])));
    let red = io::channel(&img, Channel::Red).unwrap();
    assert_eq!(red.shape(), [2, 3]);
    assert!(red.iter().all(|&v| v == 200.0));
    let green = io::channel(&img, Channel::Green).unwrap();
    assert!(green.iter().all(|&v| v == 100.0));
    let blue = io::channel(&img, Channel::Blue).unwrap();
    assert!(blue.iter().all(|&v| v == 50.0));

    // Grayscale input is converted to RGB first.
    let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([77])));
    let red = io::channel(&gray, Channel::Red).unwrap();
    assert!(red.iter().all(|&v| v == 77.0));
}

#[test]
fn channel_keeps_orientation() {
    let img = RgbImage::from_fn(3, 2, |x, y| Rgb([(10 * y + x) as u8, 0, 0]));
    let field = io::channel(&DynamicImage::ImageRgb8(img), Channel::Red).unwrap();
    assert_eq!(field.get(0, 2), Some(2.0));
    assert_eq!(field.get(1, 0), Some(10.0));

    let rendered = io::to_rgb(field.layout(), &[0, 1, 2, 3, 4, 5]);
    assert_eq!(rendered.dimensions(), (3, 2));
    assert_eq!(rendered.get_pixel(2, 0), &Rgb([2, 2, 2]));
    assert_eq!(rendered.get_pixel(0, 1), &Rgb([3, 3, 3]));
}

#[test]
fn inversion_of_uniform_gray() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([128, 128, 128])));
    let (template, time) = preset_parts("inversion");
    let out = simulate(&img, &template, &time).unwrap();
    assert_eq!(out.dimensions(), (4, 4));
    for pixel in out.pixels() {
        assert_ne!(pixel[0], 128);
        assert_eq!(pixel[0], pixel[1]);
        assert_eq!(pixel[1], pixel[2]);
        assert_eq!(pixel[0], 255);
    }
}

#[test]
fn edge_detection_of_square() {
    let (template, time) = preset_parts("edgeDetection");
    let out = simulate(&square_image(), &template, &time).unwrap();
    assert_eq!(out.dimensions(), (8, 8));
    for (x, y, pixel) in out.enumerate_pixels() {
        let expected = if is_square_boundary(x, y) { 255 } else { 0 };
        assert_eq!(pixel, &Rgb([expected; 3]), "pixel ({x}, {y})");
    }
}

#[test]
fn edge_detection_legacy_rescale() {
    let (template, time) = preset_parts("edgeDetection");
    let simulator = Simulator::new(SimulatorConfig::new().with_rescale(Rescale::Legacy));
    let out = simulator.simulate(&square_image(), &template, &time).unwrap();
    for (x, y, pixel) in out.enumerate_pixels() {
        let expected = if is_square_boundary(x, y) { 1 } else { 255 };
        assert_eq!(pixel[0], expected, "pixel ({x}, {y})");
    }
}

#[test]
fn run_output_is_saturated() {
    let (template, time) = preset_parts("grayScaleEdgeDetection");
    let image = random_image(1, 9, 7);
    let input = io::channel(&image, Channel::Red).unwrap();
    let output = Simulator::new(SimulatorConfig::default())
        .run(&input, &template, &time)
        .unwrap();
    assert_eq!(output.shape(), [7, 9]);
    assert!(output.iter().all(|v| (-1.0..=1.0).contains(v)));
}

#[test]
fn simulation_is_deterministic() {
    let image = random_image(42, 12, 10);
    for name in ["grayScaleEdgeDetection", "diagonalLineDetection", "cornerDetection"] {
        let (template, time) = preset_parts(name);
        let simulator = Simulator::new(SimulatorConfig::default());
        let input = io::channel(&image, Channel::Red).unwrap();
        let first = simulator.run(&input, &template, &time).unwrap();
        let second = simulator.run(&input, &template, &time).unwrap();
        let bits = |f: &Field| f.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second), "{name}");
        assert_eq!(
            simulator.simulate(&image, &template, &time).unwrap(),
            simulator.simulate(&image, &template, &time).unwrap()
        );
    }
}

#[test]
fn initial_condition_seeds_state() {
    // Without any coupling or input the state decays from its seed: x(t) = x0 * exp(-t).
    let layout = Layout::new(2, 2).unwrap();
    let input = Field::fill(layout, 2.0);
    let template = Template::new(Kernel::ZERO, Kernel::ZERO, 0.0, 0.25);
    let time = TimeSpec::linspace(0.0, 1.0, 11).unwrap();
    let output = Simulator::new(SimulatorConfig::default())
        .run(&input, &template, &time)
        .unwrap();
    let expected = 0.5 * (-1.0f64).exp();
    assert!(output.iter().all(|v| (v - expected).abs() < 1e-5));
}

#[test]
fn fixed_step_integrator_agrees() {
    let (template, time) = preset_parts("edgeDetection");
    let adaptive = simulate(&square_image(), &template, &time).unwrap();
    let fixed = Simulator::with_integrator(RungeKutta4::new(50.0), SimulatorConfig::default())
        .simulate(&square_image(), &template, &time)
        .unwrap();
    assert_eq!(adaptive, fixed);
}

#[test]
fn integration_failure_is_reported() {
    let (template, _) = preset_parts("inversion");
    let simulator = Simulator::with_integrator(
        DormandPrince::default().with_max_steps(1),
        SimulatorConfig::default(),
    );
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([128, 128, 128])));
    let long = TimeSpec::new(vec![0.0, 1000.0]).unwrap();
    match simulator.simulate(&img, &template, &long) {
        Err(Error::Integration(IntegrationFailure::MaxStepsExceeded { .. })) => {}
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn simulator_keeps_its_config() {
    let tolerance = Tolerance::new(1e-4, 1e-7).unwrap();
    let config = SimulatorConfig::new()
        .with_tolerance(tolerance)
        .with_channel(Channel::Luma)
        .with_rescale(Rescale::Legacy);
    let simulator = Simulator::new(config);
    assert_eq!(simulator.config(), &config);
    assert_eq!(simulator.config().tolerance(), tolerance);
    assert_eq!(simulator.config().channel(), Channel::Luma);
    assert_eq!(simulator.config().rescale(), Rescale::Legacy);
    assert_eq!(
        Simulator::new(SimulatorConfig::default()).config(),
        &SimulatorConfig::default()
    );
}

#[test]
fn empty_image_is_rejected() {
    let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
    let (template, time) = preset_parts("inversion");
    match simulate(&img, &template, &time) {
        Err(Error::Field(FieldError::InvalidExtent { rows: 0, cols: 0 })) => {}
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        io::channel(&img, Channel::Red).unwrap_err(),
        FieldError::InvalidExtent { rows: 0, cols: 0 }
    );
}

#[test]
fn invalid_template_is_rejected() {
    let template = Template::new(Kernel::ZERO, Kernel::ZERO, f64::NAN, 0.0);
    let time = TimeSpec::linspace(0.0, 1.0, 2).unwrap();
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([0, 0, 0])));
    assert!(matches!(
        simulate(&img, &template, &time),
        Err(Error::Template(_))
    ));
}

fn write_square(path: &Path) {
    square_image().to_rgb8().save(path).unwrap();
}

#[test]
fn process_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("square.png");
    let output = dir.path().join("edges.png");
    write_square(&input);
    preset::edge_detection(&input, &output).unwrap();
    let written = image::open(&output).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (8, 8));
    assert_eq!(written.get_pixel(2, 2), &Rgb([255, 255, 255]));
    assert_eq!(written.get_pixel(0, 0), &Rgb([0, 0, 0]));
}

#[test]
fn process_rejects_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "not an image").unwrap();
    let output = dir.path().join("out.png");
    let err = preset::edge_detection(&input, &output).unwrap_err();
    match err {
        Error::Validation(ValidationError::UnsupportedExtension { extension }) => {
            assert_eq!(extension, "txt");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn process_rejects_missing_and_directory_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.png");
    let missing = dir.path().join("missing.png");
    assert!(matches!(
        preset::inversion(&missing, &output),
        Err(Error::Validation(ValidationError::NotFound(_)))
    ));

    let folder = dir.path().join("folder.png");
    std::fs::create_dir(&folder).unwrap();
    assert!(matches!(
        preset::inversion(&folder, &output),
        Err(Error::Validation(ValidationError::NotAFile(_)))
    ));
    assert!(!output.exists());
}

#[test]
fn process_rejects_unsupported_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("square.PNG");
    let staged = dir.path().join("staged.png");
    write_square(&staged);
    std::fs::rename(&staged, &input).unwrap();
    let output = dir.path().join("edges.raw");
    assert!(matches!(
        preset::edge_detection(&input, &output),
        Err(Error::Validation(ValidationError::UnsupportedExtension { .. }))
    ));
    assert!(!output.exists());
}

#[test]
fn process_reports_decode_errors() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    std::fs::write(&input, b"definitely not a png").unwrap();
    let output = dir.path().join("out.png");
    assert!(matches!(
        preset::corner_detection(&input, &output),
        Err(Error::Decode { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn process_no_output_on_integration_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("square.png");
    let output = dir.path().join("out.png");
    write_square(&input);
    let simulator = Simulator::with_integrator(
        DormandPrince::default().with_max_steps(1),
        SimulatorConfig::default(),
    );
    let (template, _) = preset_parts("inversion");
    let long = TimeSpec::new(vec![0.0, 1000.0]).unwrap();
    assert!(matches!(
        simulator.process(&input, &output, &template, &long),
        Err(Error::Integration(_))
    ));
    assert!(!output.exists());
}

#[test]
fn process_unknown_preset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("square.png");
    write_square(&input);
    let simulator = Simulator::new(SimulatorConfig::default());
    assert!(matches!(
        simulator.process_preset("blur", &input, &dir.path().join("out.png")),
        Err(Error::UnknownPreset { .. })
    ));
}
