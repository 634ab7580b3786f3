use serde::{Deserialize, Serialize};
use std::fmt;

/// Camera intrinsics as written by the calibration tool
///
/// Only the focal lengths are read; any other keys in the file are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Horizontal focal length in pixels
    pub ffx: f64,
    /// Vertical focal length in pixels
    pub ffy: f64,
}

impl CameraIntrinsics {
    pub fn new(ffx: f64, ffy: f64) -> Self {
        Self { ffx, ffy }
    }

    /// Average of the horizontal and vertical focal lengths, in pixels
    pub fn focal_length(&self) -> f64 {
        (self.ffx + self.ffy) / 2.0
    }
}

/// 2D point in image pixel coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in pixels
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Shape category derived from the vertex count of an approximated polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Triangle,
    Rectangle,
    Pentagon,
    Hexagon,
    Heptagon,
    Octagon,
    Nonagon,
    Decagon,
    /// Anything with more than ten vertices
    Circle,
}

impl ShapeKind {
    /// Maps a polygon vertex count to a shape kind.
    /// Returns None for degenerate polygons (fewer than 3 vertices).
    pub fn from_vertex_count(count: usize) -> Option<Self> {
        match count {
            0..=2 => None,
            3 => Some(ShapeKind::Triangle),
            4 => Some(ShapeKind::Rectangle),
            5 => Some(ShapeKind::Pentagon),
            6 => Some(ShapeKind::Hexagon),
            7 => Some(ShapeKind::Heptagon),
            8 => Some(ShapeKind::Octagon),
            9 => Some(ShapeKind::Nonagon),
            10 => Some(ShapeKind::Decagon),
            _ => Some(ShapeKind::Circle),
        }
    }

    /// Lowercase name used in the summary line
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Triangle => "triangle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Pentagon => "pentagon",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Heptagon => "heptagon",
            ShapeKind::Octagon => "octagon",
            ShapeKind::Nonagon => "nonagon",
            ShapeKind::Decagon => "decagon",
            ShapeKind::Circle => "circle",
        }
    }

    /// Whether a physical measurement is computed for this kind
    pub fn is_measured(&self) -> bool {
        matches!(self, ShapeKind::Triangle | ShapeKind::Rectangle | ShapeKind::Circle)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Triangle => write!(f, "Triangle"),
            ShapeKind::Rectangle => write!(f, "Rectangle"),
            ShapeKind::Pentagon => write!(f, "Pentagon"),
            ShapeKind::Hexagon => write!(f, "Hexagon"),
            ShapeKind::Heptagon => write!(f, "Heptagon"),
            ShapeKind::Octagon => write!(f, "Octagon"),
            ShapeKind::Nonagon => write!(f, "Nonagon"),
            ShapeKind::Decagon => write!(f, "Decagon"),
            ShapeKind::Circle => write!(f, "Circle"),
        }
    }
}

/// A classified contour together with its approximated polygon
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Triangle([PixelPoint; 3]),
    Rectangle([PixelPoint; 4]),
    /// Pentagon through decagon; no measurement is taken for these
    Polygon {
        kind: ShapeKind,
        vertices: Vec<PixelPoint>,
    },
    Circle(Vec<PixelPoint>),
}

impl Shape {
    /// Classifies an approximated polygon by its vertex count
    pub fn from_vertices(vertices: Vec<PixelPoint>) -> Option<Self> {
        let kind = ShapeKind::from_vertex_count(vertices.len())?;
        let shape = match kind {
            ShapeKind::Triangle => Shape::Triangle([vertices[0], vertices[1], vertices[2]]),
            ShapeKind::Rectangle => {
                Shape::Rectangle([vertices[0], vertices[1], vertices[2], vertices[3]])
            }
            ShapeKind::Circle => Shape::Circle(vertices),
            kind => Shape::Polygon { kind, vertices },
        };
        Some(shape)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Triangle(_) => ShapeKind::Triangle,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Polygon { kind, .. } => *kind,
            Shape::Circle(_) => ShapeKind::Circle,
        }
    }

    pub fn vertices(&self) -> &[PixelPoint] {
        match self {
            Shape::Triangle(v) => v.as_slice(),
            Shape::Rectangle(v) => v.as_slice(),
            Shape::Polygon { vertices, .. } => vertices.as_slice(),
            Shape::Circle(v) => v.as_slice(),
        }
    }
}

/// Physical measurement taken for a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Measurement {
    /// Interior angle at the second vertex of a triangle
    Angle { degrees: f64 },
    /// Length of the first side of a rectangle
    Side { mm: f64 },
    Radius { mm: f64 },
}

/// One entry of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub kind: ShapeKind,
    pub vertices: Vec<PixelPoint>,
    pub measurement: Option<Measurement>,
}

/// Result of one run over an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Number of contours considered, excluding the image frame
    pub shape_count: usize,
    pub focal_length: f64,
    pub distance_mm: f64,
    pub shapes: Vec<ShapeRecord>,
}

impl Report {
    /// Names of the measured shapes, in detection order
    pub fn detected_names(&self) -> Vec<&'static str> {
        self.shapes
            .iter()
            .filter(|s| s.kind.is_measured())
            .map(|s| s.kind.name())
            .collect()
    }

    /// Measurement of the last shape of the given kind that has one
    pub fn last_measurement(&self, kind: ShapeKind) -> Option<Measurement> {
        self.shapes
            .iter()
            .rev()
            .filter(|s| s.kind == kind)
            .find_map(|s| s.measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<PixelPoint> {
        vec![
            PixelPoint::new(0, 0),
            PixelPoint::new(10, 0),
            PixelPoint::new(10, 10),
            PixelPoint::new(0, 10),
        ]
    }

    #[test]
    fn focal_length_is_mean_of_axes() {
        let intrinsics = CameraIntrinsics::new(1000.0, 1200.0);
        assert_eq!(intrinsics.focal_length(), 1100.0);
    }

    #[test]
    fn vertex_count_maps_to_kind() {
        assert_eq!(ShapeKind::from_vertex_count(2), None);
        assert_eq!(ShapeKind::from_vertex_count(3), Some(ShapeKind::Triangle));
        assert_eq!(ShapeKind::from_vertex_count(4), Some(ShapeKind::Rectangle));
        assert_eq!(ShapeKind::from_vertex_count(7), Some(ShapeKind::Heptagon));
        assert_eq!(ShapeKind::from_vertex_count(10), Some(ShapeKind::Decagon));
        assert_eq!(ShapeKind::from_vertex_count(11), Some(ShapeKind::Circle));
        assert_eq!(ShapeKind::from_vertex_count(64), Some(ShapeKind::Circle));
    }

    #[test]
    fn shape_keeps_its_vertices() {
        let shape = Shape::from_vertices(square()).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Rectangle);
        assert_eq!(shape.vertices(), square().as_slice());

        let hexagon: Vec<PixelPoint> = (0..6).map(|i| PixelPoint::new(i, i * i)).collect();
        let shape = Shape::from_vertices(hexagon.clone()).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Hexagon);
        assert_eq!(shape.vertices(), hexagon.as_slice());

        assert!(Shape::from_vertices(vec![PixelPoint::new(0, 0), PixelPoint::new(1, 1)]).is_none());
    }

    #[test]
    fn report_uses_last_measurement_per_kind() {
        let record = |kind, measurement| ShapeRecord {
            kind,
            vertices: Vec::new(),
            measurement,
        };
        let report = Report {
            shape_count: 4,
            focal_length: 1000.0,
            distance_mm: 500.0,
            shapes: vec![
                record(ShapeKind::Rectangle, Some(Measurement::Side { mm: 10.0 })),
                record(ShapeKind::Hexagon, None),
                record(ShapeKind::Circle, Some(Measurement::Radius { mm: 3.0 })),
                record(ShapeKind::Rectangle, Some(Measurement::Side { mm: 20.0 })),
            ],
        };

        assert_eq!(report.detected_names(), vec!["rectangle", "circle", "rectangle"]);
        assert_eq!(
            report.last_measurement(ShapeKind::Rectangle),
            Some(Measurement::Side { mm: 20.0 })
        );
        assert_eq!(report.last_measurement(ShapeKind::Triangle), None);
    }

    #[test]
    fn measurement_serializes_with_type_tag() {
        let json = serde_json::to_string(&Measurement::Radius { mm: 2.5 }).unwrap();
        assert_eq!(json, r#"{"type":"radius","mm":2.5}"#);
    }
}
