// Report module
// Collects measurements into a Report and renders the summary

use crate::measurement::measure;
use anyhow::Result;
use shape_measure_common::{Measurement, Report, Shape, ShapeKind, ShapeRecord};
use std::fmt::Write;

/// Measure every shape and assemble the report
pub fn build_report(
    shape_count: usize,
    shapes: &[Shape],
    focal_length: f64,
    distance_mm: f64,
) -> Report {
    let records = shapes
        .iter()
        .map(|shape| ShapeRecord {
            kind: shape.kind(),
            vertices: shape.vertices().to_vec(),
            measurement: measure(shape, focal_length, distance_mm),
        })
        .collect();

    Report {
        shape_count,
        focal_length,
        distance_mm,
        shapes: records,
    }
}

/// Plain-text summary, one value per line
pub fn format_summary(report: &Report) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "amount of shapes: {}", report.shape_count);
    let _ = writeln!(out, "Detected shapes: {}", report.detected_names().join(", "));

    match report.last_measurement(ShapeKind::Rectangle) {
        Some(Measurement::Side { mm }) => {
            let _ = writeln!(out, "Rectangle side: {:.6}mm", mm);
        }
        _ => {
            let _ = writeln!(out, "Rectangle side: not detected");
        }
    }

    match report.last_measurement(ShapeKind::Circle) {
        Some(Measurement::Radius { mm }) => {
            let _ = writeln!(out, "Circle radius: {:.6}mm", mm);
        }
        _ => {
            let _ = writeln!(out, "Circle radius: not detected");
        }
    }

    match report.last_measurement(ShapeKind::Triangle) {
        Some(Measurement::Angle { degrees }) => {
            let _ = writeln!(out, "Triangle angle: {:.6}°", degrees);
        }
        _ => {
            let _ = writeln!(out, "Triangle angle: not detected");
        }
    }

    out
}

pub fn format_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shape_measure_common::PixelPoint;

    fn p(x: i32, y: i32) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn sample_shapes() -> Vec<Shape> {
        vec![
            Shape::Triangle([p(10, 0), p(0, 0), p(0, 10)]),
            Shape::from_vertices(vec![p(0, 0), p(4, 0), p(6, 3), p(4, 6), p(0, 6), p(-2, 3)]).unwrap(),
            Shape::Rectangle([p(0, 0), p(100, 0), p(100, 50), p(0, 50)]),
        ]
    }

    #[test]
    fn summary_lists_measured_shapes() {
        let report = build_report(4, &sample_shapes(), 1000.0, 300.0);
        let summary = format_summary(&report);

        assert_eq!(
            summary,
            "amount of shapes: 4\n\
             Detected shapes: triangle, rectangle\n\
             Rectangle side: 30.000000mm\n\
             Circle radius: not detected\n\
             Triangle angle: 90.000000°\n"
        );
    }

    #[test]
    fn empty_scene_reports_nothing_detected() {
        let report = build_report(0, &[], 1000.0, 300.0);
        let summary = format_summary(&report);

        assert!(summary.starts_with("amount of shapes: 0\nDetected shapes: \n"));
        assert!(summary.contains("Triangle angle: not detected"));
    }

    #[test]
    fn json_report_round_trips() {
        let report = build_report(3, &sample_shapes(), 1000.0, 300.0);
        let json = format_json(&report).unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, report);
        assert_eq!(parsed.shapes[1].kind, ShapeKind::Hexagon);
        assert!(json.contains(r#""kind": "rectangle""#));
    }
}
