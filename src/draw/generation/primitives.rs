//! Board-unit primitives emitted by the item builders
//!
//! Every item is first broken into `BoardShape`s; the same list then feeds
//! the layer's spatial container (render units) and, when requested, the
//! layer's polygon set (board units).

use crate::draw::geometry::{Container2D, ItemId, Shape2D};
use crate::draw::polygon::{circle_contour, circle_polygon, contour_to_polygon, segment_polygon, BoardPoint, PolySet};
use crate::draw::tessellation::{board_to_render, convert_polygon_to_triangles};
use geo::{Coord, LineString, Polygon};

/// Below this length (board units) a segment is treated as a dot
const MIN_SEGMENT_LENGTH: f64 = 1.0;

#[derive(Debug, Clone)]
pub enum BoardShape {
    Circle { center: BoardPoint, radius: f64 },
    Ring { center: BoardPoint, inner: f64, outer: f64 },
    Segment { start: BoardPoint, end: BoardPoint, width: f64 },
    Quad([BoardPoint; 4]),
    Triangle([BoardPoint; 3]),
    Polygon(PolySet),
}

impl BoardShape {
    /// Round segment; zero-length segments become discs
    pub fn segment(start: BoardPoint, end: BoardPoint, width: f64) -> BoardShape {
        if start.distance(end) < MIN_SEGMENT_LENGTH {
            BoardShape::Circle { center: start, radius: width / 2.0 }
        } else {
            BoardShape::Segment { start, end, width }
        }
    }

    /// Ring, or a disc when nothing is left of the hole
    pub fn ring(center: BoardPoint, inner: f64, outer: f64) -> BoardShape {
        if inner <= 0.0 {
            BoardShape::Circle { center, radius: outer }
        } else {
            BoardShape::Ring { center, inner, outer }
        }
    }

    /// Add render-unit shapes to `container`. Returns how many were added;
    /// degenerate geometry adds nothing.
    pub fn add_to_container(&self, container: &mut Container2D, biu_to_3d: f64, source: Option<ItemId>) -> usize {
        let scale = biu_to_3d as f32;
        let added = match self {
            BoardShape::Circle { center, radius } => {
                container.add_opt(Shape2D::filled_circle(board_to_render(*center, biu_to_3d), *radius as f32 * scale, source))
            }
            BoardShape::Ring { center, inner, outer } => container.add_opt(Shape2D::ring(
                board_to_render(*center, biu_to_3d),
                *inner as f32 * scale,
                *outer as f32 * scale,
                source,
            )),
            BoardShape::Segment { start, end, width } => {
                let a = board_to_render(*start, biu_to_3d);
                let b = board_to_render(*end, biu_to_3d);
                let w = *width as f32 * scale;
                // Segments that collapse in render units still show up as a dot
                let shape = if a == b { Shape2D::filled_circle(a, w / 2.0, source) } else { Shape2D::round_segment(a, b, w, source) };
                container.add_opt(shape)
            }
            BoardShape::Quad(corners) => {
                let pts = corners.map(|p| board_to_render(p, biu_to_3d));
                container.add_opt(Shape2D::polygon_4pt(pts, source))
            }
            BoardShape::Triangle([a, b, c]) => container.add_opt(Shape2D::triangle(
                board_to_render(*a, biu_to_3d),
                board_to_render(*b, biu_to_3d),
                board_to_render(*c, biu_to_3d),
                source,
            )),
            BoardShape::Polygon(polys) => {
                return convert_polygon_to_triangles(polys, container, biu_to_3d, source);
            }
        };
        usize::from(added)
    }

    /// Append the shape's outline(s) to `polys` without merging
    pub fn add_to_polyset(&self, polys: &mut PolySet, max_error: f64) {
        match self {
            BoardShape::Circle { center, radius } => {
                if *radius > 0.0 {
                    polys.add_polygon(circle_polygon(*center, *radius, max_error));
                }
            }
            BoardShape::Ring { center, inner, outer } => {
                if *outer > *inner && *inner > 0.0 {
                    let ring = |r: f64| {
                        LineString::from(
                            circle_contour(*center, r, max_error)
                                .iter()
                                .map(|p| Coord { x: p.x, y: p.y })
                                .collect::<Vec<_>>(),
                        )
                    };
                    polys.add_polygon(Polygon::new(ring(*outer), vec![ring(*inner)]));
                }
            }
            BoardShape::Segment { start, end, width } => {
                if *width > 0.0 {
                    polys.add_polygon(segment_polygon(*start, *end, width / 2.0, max_error));
                }
            }
            BoardShape::Quad(corners) => polys.add_polygon(contour_to_polygon(corners)),
            BoardShape::Triangle(corners) => polys.add_polygon(contour_to_polygon(corners)),
            BoardShape::Polygon(other) => polys.append(other),
        }
    }
}

/// Add every shape to `container`; returns the number of primitives added
pub fn add_shapes_to_container(shapes: &[BoardShape], container: &mut Container2D, biu_to_3d: f64, source: Option<ItemId>) -> usize {
    shapes.iter().map(|s| s.add_to_container(container, biu_to_3d, source)).sum()
}

pub fn add_shapes_to_polyset(shapes: &[BoardShape], polys: &mut PolySet, max_error: f64) {
    for shape in shapes {
        shape.add_to_polyset(polys, max_error);
    }
}

/// Merged polygon of a shape list
pub fn shapes_to_polyset(shapes: &[BoardShape], max_error: f64) -> PolySet {
    let mut polys = PolySet::new();
    add_shapes_to_polyset(shapes, &mut polys, max_error);
    polys.simplify();
    polys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::geometry::{ShapeGeometry, ShapeKind};

    #[test]
    fn test_zero_length_segment_is_disc() {
        let p = BoardPoint::new(1.0e6, 2.0e6);
        let shape = BoardShape::segment(p, p, 0.4e6);
        let mut container = Container2D::new();
        assert_eq!(shape.add_to_container(&mut container, 1.0e-6, None), 1);
        match container.shapes()[0].geometry() {
            ShapeGeometry::FilledCircle(c) => assert!((c.radius - 0.2).abs() < 1e-6),
            other => panic!("expected a filled circle, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_adds_nothing() {
        let mut container = Container2D::new();
        let circle = BoardShape::Circle { center: BoardPoint::default(), radius: 0.0 };
        assert_eq!(circle.add_to_container(&mut container, 1.0e-6, None), 0);
        let ring = BoardShape::Ring { center: BoardPoint::default(), inner: 2.0, outer: 1.0 };
        assert_eq!(ring.add_to_container(&mut container, 1.0e-6, None), 0);
        assert!(container.is_empty());
    }

    #[test]
    fn test_ring_polygon_has_hole() {
        let ring = BoardShape::ring(BoardPoint::default(), 150_000.0, 300_000.0);
        let polys = shapes_to_polyset(&[ring], 1_000.0);
        let expected = std::f64::consts::PI * (300_000.0f64.powi(2) - 150_000.0f64.powi(2));
        assert!((polys.area() - expected).abs() / expected < 0.02);
        assert!(!polys.contains_point(BoardPoint::default()));
    }

    #[test]
    fn test_ring_without_hole_is_disc() {
        let mut container = Container2D::new();
        BoardShape::ring(BoardPoint::default(), 0.0, 1.0e6).add_to_container(&mut container, 1.0e-6, None);
        assert_eq!(container.shapes()[0].kind(), ShapeKind::FilledCircle);
    }
}
