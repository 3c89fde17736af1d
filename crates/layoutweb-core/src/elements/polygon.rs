//! Fixed polygon outlines in a normalized 100×100 box.

use super::ElementKind;
use kurbo::{BezPath, Point, Rect};

const TRIANGLE: &[(f64, f64)] = &[(50.0, 0.0), (100.0, 100.0), (0.0, 100.0)];

const PENTAGON: &[(f64, f64)] = &[
    (50.0, 0.0),
    (100.0, 38.0),
    (82.0, 100.0),
    (18.0, 100.0),
    (0.0, 38.0),
];

const HEXAGON: &[(f64, f64)] = &[
    (25.0, 0.0),
    (75.0, 0.0),
    (100.0, 50.0),
    (75.0, 100.0),
    (25.0, 100.0),
    (0.0, 50.0),
];

const STAR: &[(f64, f64)] = &[
    (50.0, 0.0),
    (61.0, 35.0),
    (98.0, 35.0),
    (68.0, 57.0),
    (79.0, 91.0),
    (50.0, 70.0),
    (21.0, 91.0),
    (32.0, 57.0),
    (2.0, 35.0),
    (39.0, 35.0),
];

/// Vertices of a polygon kind in the 0..100 box, or `None` for other kinds.
pub fn normalized_points(kind: ElementKind) -> Option<&'static [(f64, f64)]> {
    match kind {
        ElementKind::Triangle => Some(TRIANGLE),
        ElementKind::Pentagon => Some(PENTAGON),
        ElementKind::Hexagon => Some(HEXAGON),
        ElementKind::Star => Some(STAR),
        _ => None,
    }
}

/// SVG `points` attribute, e.g. `"50,0 100,100 0,100"`.
pub fn svg_points(kind: ElementKind) -> Option<String> {
    let points = normalized_points(kind)?;
    Some(
        points
            .iter()
            .map(|(x, y)| format!("{},{}", x, y))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Closed polygon path stretched over `rect`.
pub fn polygon_path(kind: ElementKind, rect: Rect) -> Option<BezPath> {
    let points = normalized_points(kind)?;
    let map = |&(px, py): &(f64, f64)| {
        Point::new(
            rect.x0 + px / 100.0 * rect.width(),
            rect.y0 + py / 100.0 * rect.height(),
        )
    };

    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(map(first));
    }
    for point in iter {
        path.line_to(map(point));
    }
    path.close_path();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;

    #[test]
    fn test_svg_points() {
        assert_eq!(
            svg_points(ElementKind::Triangle).as_deref(),
            Some("50,0 100,100 0,100")
        );
        assert_eq!(svg_points(ElementKind::Rectangle), None);
    }

    #[test]
    fn test_star_has_ten_vertices() {
        assert_eq!(normalized_points(ElementKind::Star).map(<[_]>::len), Some(10));
    }

    #[test]
    fn test_polygon_path_fills_rect() {
        let rect = Rect::new(10.0, 20.0, 210.0, 120.0);
        let path = polygon_path(ElementKind::Hexagon, rect).expect("hexagon path");
        let bbox = path.bounding_box();
        assert!((bbox.x0 - 10.0).abs() < 1e-9);
        assert!((bbox.y1 - 120.0).abs() < 1e-9);
        assert!(path.contains(rect.center()));
    }
}
