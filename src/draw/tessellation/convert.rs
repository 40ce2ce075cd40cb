//! Board units to render units

use crate::draw::geometry::{signed_area2, OutlineWithHoles, Point};
use crate::draw::polygon::{BoardPoint, PolySet};
use geo::LineString;

/// Scale into render units and flip Y (board Y grows downwards)
#[inline]
pub fn board_to_render(p: BoardPoint, biu_to_3d: f64) -> Point {
    Point::new((p.x * biu_to_3d) as f32, (-p.y * biu_to_3d) as f32)
}

fn ring_to_render(ring: &LineString<f64>, biu_to_3d: f64) -> Vec<Point> {
    let coords = &ring.0;
    let n = if coords.len() > 1 && coords[0] == coords[coords.len() - 1] { coords.len() - 1 } else { coords.len() };
    coords[..n].iter().map(|c| board_to_render((*c).into(), biu_to_3d)).collect()
}

/// Outlines counter-clockwise and holes clockwise in render coordinates,
/// whatever the winding in board units
pub fn render_contours(polys: &PolySet, biu_to_3d: f64) -> Vec<OutlineWithHoles> {
    polys
        .polygons()
        .iter()
        .filter_map(|poly| {
            let mut outline = ring_to_render(poly.exterior(), biu_to_3d);
            if outline.len() < 3 {
                return None;
            }
            if signed_area2(&outline) < 0.0 {
                outline.reverse();
            }
            let holes = poly
                .interiors()
                .iter()
                .map(|ring| {
                    let mut hole = ring_to_render(ring, biu_to_3d);
                    if signed_area2(&hole) > 0.0 {
                        hole.reverse();
                    }
                    hole
                })
                .filter(|hole| hole.len() >= 3)
                .collect();
            Some(OutlineWithHoles { outline, holes })
        })
        .collect()
}
