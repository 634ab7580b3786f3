// Camera calibration module
// Loads the pinhole focal length and converts pixel lengths to millimeters

use anyhow::{bail, Context, Result};
use log::debug;
use shape_measure_common::CameraIntrinsics;
use std::path::Path;

/// Load camera intrinsics from a JSON file with `ffx` and `ffy` keys
pub fn load_intrinsics(path: &Path) -> Result<CameraIntrinsics> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read camera intrinsics file {}", path.display()))?;

    parse_intrinsics(&text)
        .with_context(|| format!("Invalid camera intrinsics in {}", path.display()))
}

/// Parse camera intrinsics and check that they give a usable focal length
pub fn parse_intrinsics(json: &str) -> Result<CameraIntrinsics> {
    let intrinsics: CameraIntrinsics =
        serde_json::from_str(json).context("Expected a JSON object with numeric `ffx` and `ffy`")?;

    let focal_length = intrinsics.focal_length();
    if !focal_length.is_finite() || focal_length <= 0.0 {
        bail!(
            "Focal length must be a positive number, got {} (ffx={}, ffy={})",
            focal_length,
            intrinsics.ffx,
            intrinsics.ffy
        );
    }

    debug!(
        "Camera intrinsics: ffx={}, ffy={}, focal length={}",
        intrinsics.ffx, intrinsics.ffy, focal_length
    );

    Ok(intrinsics)
}

/// Convert a length measured in pixels to millimeters.
/// Similar triangles: size / distance = pixels / focal length.
pub fn pixels_to_mm(pixels: f64, focal_length: f64, distance_mm: f64) -> f64 {
    distance_mm * pixels / focal_length
}
