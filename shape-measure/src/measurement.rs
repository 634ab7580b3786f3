// Measurement module
// Turns classified shapes into physical quantities via the pinhole model

use crate::calibration::pixels_to_mm;
use crate::segmentation::bounding_rect;
use shape_measure_common::{Measurement, PixelPoint, Shape};

/// Angle between two vectors in degrees, or None if either has zero length
pub fn angle_between(a: (f64, f64), b: (f64, f64)) -> Option<f64> {
    let norm_a = (a.0 * a.0 + a.1 * a.1).sqrt();
    let norm_b = (b.0 * b.0 + b.1 * b.1).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let cos = (a.0 * b.0 + a.1 * b.1) / (norm_a * norm_b);
    Some(cos.clamp(-1.0, 1.0).acos().to_degrees())
}

/// Interior angle at the second vertex of a triangle
pub fn triangle_angle(vertices: &[PixelPoint; 3]) -> Option<f64> {
    let [v0, v1, v2] = vertices;
    let a = ((v0.x - v1.x) as f64, (v0.y - v1.y) as f64);
    let b = ((v2.x - v1.x) as f64, (v2.y - v1.y) as f64);
    angle_between(a, b)
}

/// Length of the first rectangle side in pixels
pub fn rectangle_side_px(vertices: &[PixelPoint; 4]) -> f64 {
    vertices[0].distance_to(&vertices[1])
}

/// Radius in pixels, from the mean of the bounding box width and height
pub fn circle_radius_px(vertices: &[PixelPoint]) -> Option<f64> {
    let rect = bounding_rect(vertices.iter().map(|v| (v.x, v.y)))?;
    Some((rect.width + rect.height) as f64 / 4.0)
}

/// Physical measurement of a shape; only triangles, rectangles and circles have one
pub fn measure(shape: &Shape, focal_length: f64, distance_mm: f64) -> Option<Measurement> {
    match shape {
        Shape::Triangle(vertices) => {
            triangle_angle(vertices).map(|degrees| Measurement::Angle { degrees })
        }
        Shape::Rectangle(vertices) => Some(Measurement::Side {
            mm: pixels_to_mm(rectangle_side_px(vertices), focal_length, distance_mm),
        }),
        Shape::Circle(vertices) => circle_radius_px(vertices).map(|radius| Measurement::Radius {
            mm: pixels_to_mm(radius, focal_length, distance_mm),
        }),
        Shape::Polygon { .. } => None,
    }
}
