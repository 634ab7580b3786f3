use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

mod annotate;
mod calibration;
mod detection;
mod measurement;
mod report;
mod segmentation;

/// Measure shapes in a photo using a pinhole camera model
#[derive(Parser, Debug)]
#[command(name = "shape-measure")]
#[command(
    about = "Measure triangle angles, rectangle sides and circle radii in a photo",
    long_about = None
)]
struct Args {
    /// Input image file path
    image: PathBuf,

    /// Camera intrinsics JSON file (needs `ffx` and `ffy`)
    intrinsics: PathBuf,

    /// Distance from the camera to the objects in millimeters
    #[arg(value_parser = parse_distance, allow_negative_numbers = true)]
    distance_mm: f64,

    /// Draw detected shapes and save the annotated image
    #[arg(long)]
    show: bool,

    /// Where to save the annotated image [default: <image>_shapes.png]
    #[arg(long)]
    annotated_output: Option<PathBuf>,

    /// Binarization level; brighter pixels are foreground
    #[arg(long, default_value = "50")]
    threshold: u8,

    /// Polygon approximation tolerance as a fraction of the contour perimeter
    #[arg(long, default_value = "0.01", value_parser = parse_epsilon_ratio)]
    epsilon_ratio: f64,

    /// Ignore contours enclosing fewer square pixels than this
    #[arg(long, default_value = "0")]
    min_area: f64,

    /// Font used for shape labels (TTF/OTF)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_distance(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(distance) if distance.is_finite() && distance > 0.0 => Ok(distance),
        _ => Err("Please provide correct input for distance in millimeters!".to_string()),
    }
}

fn parse_epsilon_ratio(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(ratio) if ratio.is_finite() && ratio > 0.0 => Ok(ratio),
        _ => Err(format!("epsilon ratio must be a positive number, got '{}'", value)),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("Input: {}", args.image.display());
    info!("Intrinsics: {}", args.intrinsics.display());
    info!("Distance: {}mm", args.distance_mm);

    // Step 1: Camera model
    let intrinsics = calibration::load_intrinsics(&args.intrinsics)?;
    let focal_length = intrinsics.focal_length();
    info!("Step 1: focal length {:.3}px", focal_length);

    // Step 2: Load and binarize
    let mut image = image::open(&args.image)
        .with_context(|| format!("Failed to open image {}", args.image.display()))?
        .to_rgb8();
    let gray = image::imageops::grayscale(&image);
    let binary = segmentation::binarize(&gray, args.threshold);
    info!(
        "Step 2: binarized {}x{} image at threshold {}",
        binary.width(),
        binary.height(),
        args.threshold
    );

    // Step 3: Contours
    let contours = segmentation::extract_contours(&binary, args.min_area);
    info!("Step 3: {} contour(s)", contours.len());

    // Step 4: Classify and measure
    let shapes = detection::detect_shapes(&contours, args.epsilon_ratio);
    let report = report::build_report(contours.len(), &shapes, focal_length, args.distance_mm);
    info!("Step 4: {} shape(s) classified", shapes.len());

    if args.json {
        println!("{}", report::format_json(&report)?);
    } else {
        print!("{}", report::format_summary(&report));
    }

    // Step 5: Optional annotation
    if args.show {
        let font = annotate::load_font(args.font.as_deref())?;
        annotate::annotate(&mut image, &shapes, font.as_ref());

        let output = args
            .annotated_output
            .clone()
            .unwrap_or_else(|| annotate::default_output_path(&args.image));
        annotate::save_annotated(&image, &output, &report.detected_names().join(", "))?;
    }

    Ok(())
}
