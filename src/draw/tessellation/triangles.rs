//! Polygon sets to triangle shapes

use super::convert::board_to_render;
use crate::draw::geometry::{Container2D, ItemId, Shape2D};
use crate::draw::polygon::PolySet;

/// Triangulate `polys` and add one triangle shape per triangle.
/// Returns the number of shapes added; degenerate triangles are skipped.
pub fn convert_polygon_to_triangles(
    polys: &PolySet,
    container: &mut Container2D,
    biu_to_3d: f64,
    source: Option<ItemId>,
) -> usize {
    let mut added = 0;
    for [a, b, c] in polys.triangulate() {
        let shape = Shape2D::triangle(
            board_to_render(a, biu_to_3d),
            board_to_render(b, biu_to_3d),
            board_to_render(c, biu_to_3d),
            source,
        );
        if container.add_opt(shape) {
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::geometry::{Point, ShapeGeometry};
    use crate::draw::polygon::BoardPoint;

    fn rect(polys: &mut PolySet, x0: f64, y0: f64, x1: f64, y1: f64) -> usize {
        polys.add_outline(&[
            BoardPoint::new(x0, y0),
            BoardPoint::new(x1, y0),
            BoardPoint::new(x1, y1),
            BoardPoint::new(x0, y1),
        ])
    }

    fn triangle_area(container: &Container2D) -> f32 {
        container
            .shapes()
            .iter()
            .map(|s| match s.geometry() {
                ShapeGeometry::Triangle(t) => {
                    let [a, b, c] = t.vertices;
                    ((b - a).cross(c - a) * 0.5).abs()
                }
                _ => 0.0,
            })
            .sum()
    }

    #[test]
    fn test_rectangle_area() {
        let mut polys = PolySet::new();
        rect(&mut polys, 0.0, 0.0, 4.0e6, 2.0e6);
        let mut container = Container2D::new();
        let added = convert_polygon_to_triangles(&polys, &mut container, 1.0e-6, Some(ItemId(3)));
        assert_eq!(added, 2);
        assert!((triangle_area(&container) - 8.0).abs() < 1e-4);
        assert!(container.shapes().iter().all(|s| s.source() == Some(ItemId(3))));
    }

    #[test]
    fn test_hole_excluded() {
        let mut polys = PolySet::new();
        let outer = rect(&mut polys, 0.0, 0.0, 10.0e6, 10.0e6);
        polys.add_hole(
            outer,
            &[
                BoardPoint::new(4.0e6, 4.0e6),
                BoardPoint::new(6.0e6, 4.0e6),
                BoardPoint::new(6.0e6, 6.0e6),
                BoardPoint::new(4.0e6, 6.0e6),
            ],
        );
        let mut container = Container2D::new();
        convert_polygon_to_triangles(&polys, &mut container, 1.0e-6, None);
        assert!((triangle_area(&container) - 96.0).abs() < 1e-3);
        let inside_hole = Point::new(5.0, -5.0);
        assert!(container.shapes().iter().all(|s| !s.is_point_inside(inside_hole)));
        assert!(container.shapes().iter().any(|s| s.is_point_inside(Point::new(1.0, -1.0))));
    }

    #[test]
    fn test_empty_set() {
        let mut container = Container2D::new();
        assert_eq!(convert_polygon_to_triangles(&PolySet::new(), &mut container, 1.0e-6, None), 0);
        assert!(container.is_empty());
    }
}
