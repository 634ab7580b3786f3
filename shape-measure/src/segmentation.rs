// Segmentation module
// Binarizes the photo and extracts contour borders with imageproc

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{self, ThresholdType};
use imageproc::geometry::contour_area;
use imageproc::point::Point;
use log::debug;

/// A closed border traced in the binary image, in pixel coordinates
#[derive(Debug, Clone)]
pub struct PixelContour {
    pub points: Vec<Point<i32>>,
    /// Border of a hole (dark region inside a bright one) rather than an outer border
    pub is_hole: bool,
}

/// Axis-aligned bounding box with inclusive pixel extents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Binary threshold: pixels brighter than `threshold` become 255, all others 0
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    contrast::threshold(gray, threshold, ThresholdType::Binary)
}

/// Extract every contour border (outer and hole) in discovery order.
///
/// The first outer border is the frame of the scene (the sheet the shapes are
/// printed on) when it spans the whole image or encloses every other contour;
/// it is dropped. So are contours with fewer than 3 points and contours
/// enclosing less than `min_area` square pixels.
pub fn extract_contours(binary: &GrayImage, min_area: f64) -> Vec<PixelContour> {
    let (width, height) = binary.dimensions();
    let raw = find_contours::<i32>(binary);
    debug!("Found {} raw contour(s)", raw.len());

    let rects: Vec<Option<BoundingRect>> = raw
        .iter()
        .map(|c| bounding_rect(c.points.iter().map(|p| (p.x, p.y))))
        .collect();
    let frame = find_frame(&raw, &rects, width, height);

    let mut result = Vec::new();
    for (idx, contour) in raw.into_iter().enumerate() {
        if Some(idx) == frame {
            debug!("  Contour {}: scene frame, skipped", idx);
            continue;
        }

        if contour.points.len() < 3 {
            debug!("  Contour {}: only {} point(s), skipped", idx, contour.points.len());
            continue;
        }

        let area = contour_area(&contour.points).abs();
        if area < min_area {
            debug!("  Contour {}: area {:.1} below minimum {:.1}, skipped", idx, area, min_area);
            continue;
        }

        result.push(PixelContour {
            points: contour.points,
            is_hole: contour.border_type == BorderType::Hole,
        });
    }

    result
}

/// Index of the frame contour, if the first outer border is one
fn find_frame(
    contours: &[Contour<i32>],
    rects: &[Option<BoundingRect>],
    width: u32,
    height: u32,
) -> Option<usize> {
    let first = contours.first()?;
    if first.border_type != BorderType::Outer || first.parent.is_some() {
        return None;
    }
    let outer = rects[0]?;

    let spans_image =
        outer.x == 0 && outer.y == 0 && outer.width == width as i32 && outer.height == height as i32;
    let encloses_others = rects.len() > 1
        && rects[1..]
            .iter()
            .all(|rect| rect.map_or(true, |rect| outer.contains(&rect)));

    (spans_image || encloses_others).then_some(0)
}

impl BoundingRect {
    /// Whether `other` lies entirely inside this box (edges included)
    pub fn contains(&self, other: &BoundingRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// Bounding box of a point set, or None when it is empty
pub fn bounding_rect<I>(points: I) -> Option<BoundingRect>
where
    I: IntoIterator<Item = (i32, i32)>,
{
    let mut points = points.into_iter();
    let (x0, y0) = points.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);

    for (x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    Some(BoundingRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn rect_of(points: &[Point<i32>]) -> Option<BoundingRect> {
        bounding_rect(points.iter().map(|p| (p.x, p.y)))
    }

    fn dark_square_on_white() -> GrayImage {
        let mut img = GrayImage::from_pixel(100, 100, Luma([220]));
        draw_filled_rect_mut(&mut img, Rect::at(20, 30).of_size(40, 40), Luma([10]));
        img
    }

    #[test]
    fn binarize_uses_strict_threshold() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([49]));
        img.put_pixel(1, 0, Luma([50]));
        img.put_pixel(2, 0, Luma([51]));

        let binary = binarize(&img, 50);
        assert_eq!(binary.get_pixel(0, 0).0[0], 0);
        assert_eq!(binary.get_pixel(1, 0).0[0], 0);
        assert_eq!(binary.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn frame_contour_is_dropped() {
        let binary = binarize(&dark_square_on_white(), 50);
        let contours = extract_contours(&binary, 0.0);

        assert_eq!(contours.len(), 1);
        assert!(contours[0].is_hole);
        let rect = rect_of(&contours[0].points).unwrap();
        // Hole border runs along the bright pixels around the square
        assert!(rect.width >= 40 && rect.width <= 42);
        assert!(rect.height >= 40 && rect.height <= 42);
    }

    #[test]
    fn sheet_with_dark_margin_is_dropped() {
        let mut img = GrayImage::new(200, 200);
        draw_filled_rect_mut(&mut img, Rect::at(2, 2).of_size(196, 196), Luma([220]));
        draw_filled_rect_mut(&mut img, Rect::at(80, 80).of_size(30, 30), Luma([10]));

        let contours = extract_contours(&binarize(&img, 50), 0.0);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].is_hole);
        let rect = rect_of(&contours[0].points).unwrap();
        assert!(rect.width <= 32 && rect.height <= 32);
    }

    #[test]
    fn bright_shape_on_dark_background_is_kept() {
        let mut img = GrayImage::new(80, 80);
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(30, 20), Luma([255]));

        let contours = extract_contours(&binarize(&img, 50), 0.0);
        assert_eq!(contours.len(), 1);
        assert!(!contours[0].is_hole);
        assert_eq!(
            rect_of(&contours[0].points),
            Some(BoundingRect { x: 10, y: 10, width: 30, height: 20 })
        );
    }

    #[test]
    fn small_contours_are_filtered_by_area() {
        let mut img = GrayImage::new(80, 80);
        draw_filled_rect_mut(&mut img, Rect::at(5, 5).of_size(4, 4), Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(30, 30).of_size(30, 30), Luma([255]));

        let binary = binarize(&img, 50);
        assert_eq!(extract_contours(&binary, 0.0).len(), 2);
        assert_eq!(extract_contours(&binary, 100.0).len(), 1);
    }

    #[test]
    fn bounding_rect_is_inclusive() {
        let points = vec![Point::new(2, 3), Point::new(5, 3), Point::new(5, 9)];
        assert_eq!(
            rect_of(&points),
            Some(BoundingRect { x: 2, y: 3, width: 4, height: 7 })
        );
        assert_eq!(rect_of(&[]), None);
    }

    #[test]
    fn containment_includes_edges() {
        let outer = BoundingRect { x: 0, y: 0, width: 10, height: 10 };
        assert!(outer.contains(&BoundingRect { x: 0, y: 0, width: 10, height: 10 }));
        assert!(outer.contains(&BoundingRect { x: 2, y: 3, width: 4, height: 4 }));
        assert!(!outer.contains(&BoundingRect { x: 8, y: 8, width: 4, height: 1 }));
    }
}
