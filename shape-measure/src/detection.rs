// Shape detection module
// Simplifies contours to polygons and classifies them by vertex count

use crate::segmentation::PixelContour;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use log::debug;
use shape_measure_common::{PixelPoint, Shape};

/// Approximate a closed contour by a polygon.
///
/// The tolerance is `epsilon_ratio` times the contour perimeter. The curve is
/// cut at two extreme points (the point farthest from the start, and the point
/// farthest from that one), each half is simplified as an open curve, and the
/// halves are joined. A cut point that ends up within the tolerance of the
/// line through its neighbours is dropped.
///
/// Vertices come back clockwise on screen, starting at the topmost (then
/// leftmost) vertex.
pub fn approximate_polygon(points: &[Point<i32>], epsilon_ratio: f64) -> Vec<PixelPoint> {
    if points.len() < 3 {
        return points.iter().map(to_pixel_point).collect();
    }

    let epsilon = epsilon_ratio * arc_length(points, true);
    if epsilon.is_nan() || epsilon <= 0.0 {
        return points.iter().map(to_pixel_point).collect();
    }

    let first = farthest_from(points, points[0]);
    let second = farthest_from(points, points[first]);
    if second == first {
        return vec![to_pixel_point(&points[first])];
    }

    let n = points.len();
    let rotated: Vec<Point<i32>> = points[first..].iter().chain(&points[..first]).copied().collect();
    let split = (second + n - first) % n;

    let mut approx = approximate_polygon_dp(&rotated[..=split], epsilon, false);
    approx.pop();
    let seam = approx.len();

    let mut closing = rotated[split..].to_vec();
    closing.push(rotated[0]);
    let mut tail = approximate_polygon_dp(&closing, epsilon, false);
    tail.pop();
    approx.append(&mut tail);

    let mut vertices: Vec<PixelPoint> = approx.iter().map(to_pixel_point).collect();
    // Later index first so the earlier one stays valid
    drop_flat_vertex(&mut vertices, seam, epsilon);
    drop_flat_vertex(&mut vertices, 0, epsilon);

    clockwise_from_top(vertices)
}

/// Index of the contour point farthest from `origin` (first one on ties)
fn farthest_from(points: &[Point<i32>], origin: Point<i32>) -> usize {
    let mut best = 0;
    let mut best_dist = 0;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        let dist = dx * dx + dy * dy;
        if dist > best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

fn drop_flat_vertex(vertices: &mut Vec<PixelPoint>, idx: usize, epsilon: f64) {
    let n = vertices.len();
    if n <= 3 || idx >= n {
        return;
    }

    let prev = vertices[(idx + n - 1) % n];
    let next = vertices[(idx + 1) % n];
    if distance_to_line(vertices[idx], prev, next) <= epsilon {
        vertices.remove(idx);
    }
}

/// Perpendicular distance from `p` to the line through `a` and `b`
fn distance_to_line(p: PixelPoint, a: PixelPoint, b: PixelPoint) -> f64 {
    let length = a.distance_to(&b);
    if length == 0.0 {
        return p.distance_to(&a);
    }
    let cross = (b.x - a.x) as f64 * (p.y - a.y) as f64 - (b.y - a.y) as f64 * (p.x - a.x) as f64;
    cross.abs() / length
}

/// Reorder a polygon clockwise on screen (y down), starting at its topmost vertex
fn clockwise_from_top(mut vertices: Vec<PixelPoint>) -> Vec<PixelPoint> {
    if vertices.len() < 3 {
        return vertices;
    }

    let top = topmost(&vertices);
    let n = vertices.len();
    let v = vertices[top];
    let next = vertices[(top + 1) % n];
    let prev = vertices[(top + n - 1) % n];
    // The topmost vertex is convex, so this turn gives the winding
    let turn = (next.x - v.x) as i64 * (prev.y - v.y) as i64 - (next.y - v.y) as i64 * (prev.x - v.x) as i64;
    if turn < 0 {
        vertices.reverse();
    }

    let top = topmost(&vertices);
    vertices.rotate_left(top);
    vertices
}

fn topmost(vertices: &[PixelPoint]) -> usize {
    vertices
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (v.y, v.x))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn to_pixel_point(p: &Point<i32>) -> PixelPoint {
    PixelPoint::new(p.x, p.y)
}

/// Classify an approximated polygon; None for degenerate polygons
pub fn classify(vertices: Vec<PixelPoint>) -> Option<Shape> {
    Shape::from_vertices(vertices)
}

/// Approximate and classify every contour, in contour order
pub fn detect_shapes(contours: &[PixelContour], epsilon_ratio: f64) -> Vec<Shape> {
    let mut shapes = Vec::with_capacity(contours.len());

    for (idx, contour) in contours.iter().enumerate() {
        let vertices = approximate_polygon(&contour.points, epsilon_ratio);
        let vertex_count = vertices.len();

        match classify(vertices) {
            Some(shape) => {
                debug!(
                    "  Contour {} ({}): {} points -> {} vertices, {}",
                    idx,
                    if contour.is_hole { "hole" } else { "outer" },
                    contour.points.len(),
                    vertex_count,
                    shape.kind()
                );
                shapes.push(shape);
            }
            None => debug!(
                "  Contour {}: degenerate polygon with {} vertices, skipped",
                idx, vertex_count
            ),
        }
    }

    shapes
}
