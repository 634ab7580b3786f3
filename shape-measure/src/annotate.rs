// Annotation module
// Draws detected shape outlines and labels onto the source image

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use log::{debug, info, warn};
use shape_measure_common::{PixelPoint, Shape};
use std::path::{Path, PathBuf};

const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const OUTLINE_THICKNESS: i32 = 4;
const LABEL_SCALE: f32 = 28.0;

/// Fonts tried when no font is given on the command line
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load the label font from `path`, or from the first system font found
pub fn load_font(path: Option<&Path>) -> Result<Option<FontVec>> {
    if let Some(path) = path {
        let font = read_font(path)?;
        return Ok(Some(font));
    }

    for candidate in SYSTEM_FONTS {
        let candidate = Path::new(candidate);
        if !candidate.exists() {
            continue;
        }
        match read_font(candidate) {
            Ok(font) => {
                debug!("Using label font {}", candidate.display());
                return Ok(Some(font));
            }
            Err(err) => debug!("Skipping font {}: {:#}", candidate.display(), err),
        }
    }

    warn!("No label font found, drawing outlines only (use --font to pick one)");
    Ok(None)
}

fn read_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read font {}", path.display()))?;
    FontVec::try_from_vec(bytes).with_context(|| format!("Invalid font file {}", path.display()))
}

/// Draw every shape outline and, when a font is available, its name
pub fn annotate(image: &mut RgbImage, shapes: &[Shape], font: Option<&FontVec>) {
    for shape in shapes {
        draw_thick_polygon(image, shape.vertices(), OUTLINE_COLOR, OUTLINE_THICKNESS);

        let Some(font) = font else {
            continue;
        };
        let vertices = shape.vertices().iter().map(|v| (v.x, v.y));
        if let Some(rect) = crate::segmentation::bounding_rect(vertices) {
            let label = shape.kind().to_string();
            let y = rect.y - 4 - LABEL_SCALE as i32;
            draw_text_mut(image, LABEL_COLOR, rect.x, y, PxScale::from(LABEL_SCALE), font, &label);
        }
    }
}

/// Closed polygon outline `thickness` pixels wide
fn draw_thick_polygon(image: &mut RgbImage, vertices: &[PixelPoint], color: Rgb<u8>, thickness: i32) {
    if vertices.len() < 2 {
        return;
    }

    let low = -(thickness / 2);
    let high = low + thickness;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        for dx in low..high {
            for dy in low..high {
                draw_line_segment_mut(
                    image,
                    ((a.x + dx) as f32, (a.y + dy) as f32),
                    ((b.x + dx) as f32, (b.y + dy) as f32),
                    color,
                );
            }
        }
    }
}

/// Default location of the annotated image: `<stem>_shapes.png` beside the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}_shapes.png", stem))
}

/// Save the annotated image so it can be opened in a viewer
pub fn save_annotated(image: &RgbImage, path: &Path, title: &str) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("Failed to save annotated image to {}", path.display()))?;
    info!("Detected shapes - {}: saved annotated image to {}", title, path.display());
    Ok(())
}
