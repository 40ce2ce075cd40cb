//! Plated hole barrels

use super::extrude::{add_annulus, add_contour_walls, capsule_points};
use super::list::TriangleDisplayList;
use crate::draw::geometry::{Container2D, Point, ShapeGeometry};
use crate::draw::layers::CompileStats;
use crate::draw::polygon::{circle_segment_count, MIN_SEGMENTS_PER_CIRCLE};

/// One segment count for every barrel, sized on the mean drill of the
/// compiled board
pub fn barrel_segment_count(stats: &CompileStats, max_error: f64) -> usize {
    let count = stats.via_count + stats.hole_count;
    if count == 0 {
        return MIN_SEGMENTS_PER_CIRCLE;
    }
    let total = stats.average_via_hole * stats.via_count as f64 + stats.average_hole * stats.hole_count as f64;
    circle_segment_count(total / count as f64 / 2.0, max_error)
}

/// Tubes from each drill wall out by `plating`, between `z_range`.
/// `drills` holds the finished hole shapes in render units.
pub fn through_hole_barrels(drills: &Container2D, z_range: (f32, f32), plating: f32, segments: usize) -> TriangleDisplayList {
    let (z_bottom, z_top) = z_range;
    let mut list = TriangleDisplayList::new(z_bottom, z_top);
    let plating = plating.max(0.0);
    for shape in drills.shapes() {
        match shape.geometry() {
            ShapeGeometry::FilledCircle(circle) => {
                add_annulus(&mut list, circle.center, circle.radius, circle.radius + plating, segments, None);
            }
            ShapeGeometry::RoundSegment(slot) => add_slot_walls(&mut list, slot.start, slot.end, slot.radius, plating, segments),
            _ => {}
        }
    }
    list
}

fn add_slot_walls(list: &mut TriangleDisplayList, start: Point, end: Point, radius: f32, plating: f32, segments: usize) {
    let (z_bottom, z_top) = (list.z_bottom, list.z_top);
    let mut wall: Vec<Point> = capsule_points(start, end, radius, segments);
    wall.reverse();
    add_contour_walls(&mut list.middle, &wall, z_bottom, z_top, None);
    if plating > 0.0 {
        let outer = capsule_points(start, end, radius + plating, segments);
        add_contour_walls(&mut list.middle, &outer, z_bottom, z_top, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::geometry::Shape2D;

    #[test]
    fn test_segment_count_from_stats() {
        let stats = CompileStats::default();
        assert_eq!(barrel_segment_count(&stats, 5_000.0), MIN_SEGMENTS_PER_CIRCLE);

        let mut stats = CompileStats::default();
        stats.add_via(300_000.0);
        stats.add_hole(1_000_000.0);
        assert_eq!(barrel_segment_count(&stats, 5_000.0), circle_segment_count(325_000.0, 5_000.0));
    }

    #[test]
    fn test_barrel_walls_face_the_hole() {
        let mut drills = Container2D::new();
        drills.add_opt(Shape2D::filled_circle(Point::new(0.0, 0.0), 0.15, None));
        let list = through_hole_barrels(&drills, (-0.8, 0.8), 0.02, 16);
        assert_eq!(list.top.triangle_count(), 32);
        assert_eq!(list.middle.triangle_count(), 64);

        // Inner wall normals point at the hole axis
        let inner = list
            .middle
            .vertices
            .iter()
            .zip(&list.middle.normals)
            .filter(|(v, _)| Point::new(v[0], v[1]).length() < 0.16);
        let mut checked = 0;
        for (v, n) in inner {
            assert!(Point::new(v[0], v[1]).dot(Point::new(n[0], n[1])) < 0.0);
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_slot_barrel() {
        let mut drills = Container2D::new();
        drills.add_opt(Shape2D::round_segment(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 0.4, None));
        let list = through_hole_barrels(&drills, (0.0, 1.6), 0.0, 16);
        assert!(list.top.is_empty());
        assert!(!list.middle.is_empty());
    }
}
