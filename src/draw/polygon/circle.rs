//! Circle and arc approximation helpers (board units)

use super::polyset::BoardPoint;
use geo::{Coord, LineString, Polygon};

/// Lower bound on segments for a full circle
pub const MIN_SEGMENTS_PER_CIRCLE: usize = 8;

/// Upper bound on segments for a full circle
pub const MAX_SEGMENTS_PER_CIRCLE: usize = 128;

/// Number of chords approximating an arc of `angle_deg` so that no chord
/// strays more than `max_error` from the true arc
pub fn arc_segment_count(radius: f64, max_error: f64, angle_deg: f64) -> usize {
    let radius = radius.max(1.0);
    let max_error = max_error.max(1.0);
    let rel_error = (max_error / radius).min(1.0);

    let mut arc_increment = (1.0 - rel_error).acos().to_degrees() * 2.0;
    arc_increment = arc_increment.min(360.0 / MIN_SEGMENTS_PER_CIRCLE as f64);

    let angle = angle_deg.abs();
    let count = (angle / arc_increment).round() as usize;
    let cap = ((MAX_SEGMENTS_PER_CIRCLE as f64) * angle / 360.0).ceil() as usize;
    count.min(cap.max(2)).max(2)
}

pub fn circle_segment_count(radius: f64, max_error: f64) -> usize {
    arc_segment_count(radius, max_error, 360.0).max(MIN_SEGMENTS_PER_CIRCLE)
}

/// Closed circle contour with every vertex on the circle, counter-clockwise
pub fn circle_contour(center: BoardPoint, radius: f64, max_error: f64) -> Vec<BoardPoint> {
    let n = circle_segment_count(radius, max_error);
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            BoardPoint::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

pub fn circle_polygon(center: BoardPoint, radius: f64, max_error: f64) -> Polygon<f64> {
    contour_to_polygon(&circle_contour(center, radius, max_error))
}

/// Capsule around the segment `a`-`b`
pub fn segment_polygon(a: BoardPoint, b: BoardPoint, radius: f64, max_error: f64) -> Polygon<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f64::EPSILON {
        return circle_polygon(a, radius, max_error);
    }
    let base = dy.atan2(dx);
    let half = (circle_segment_count(radius, max_error) / 2).max(2);
    let mut pts = Vec::with_capacity(2 * half + 2);
    // End cap at `b`, from -90 to +90 degrees around the direction
    for i in 0..=half {
        let a_ = base - std::f64::consts::FRAC_PI_2 + std::f64::consts::PI * i as f64 / half as f64;
        pts.push(BoardPoint::new(b.x + radius * a_.cos(), b.y + radius * a_.sin()));
    }
    for i in 0..=half {
        let a_ = base + std::f64::consts::FRAC_PI_2 + std::f64::consts::PI * i as f64 / half as f64;
        pts.push(BoardPoint::new(a.x + radius * a_.cos(), a.y + radius * a_.sin()));
    }
    contour_to_polygon(&pts)
}

/// Points along an arc from `start`, sweeping `angle_deg` around `center`,
/// endpoints included
pub fn arc_points(center: BoardPoint, start: BoardPoint, angle_deg: f64, max_error: f64) -> Vec<BoardPoint> {
    let radius = ((start.x - center.x).powi(2) + (start.y - center.y).powi(2)).sqrt();
    let n = arc_segment_count(radius, max_error, angle_deg);
    let start_angle = (start.y - center.y).atan2(start.x - center.x);
    let sweep = angle_deg.to_radians();
    (0..=n)
        .map(|i| {
            let a = start_angle + sweep * i as f64 / n as f64;
            BoardPoint::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

pub fn contour_to_polygon(points: &[BoardPoint]) -> Polygon<f64> {
    Polygon::new(
        LineString::from(points.iter().map(|p| Coord { x: p.x, y: p.y }).collect::<Vec<_>>()),
        vec![],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_count_bounds() {
        // Huge radius, tiny error: capped
        assert_eq!(circle_segment_count(1.0e9, 1.0), MAX_SEGMENTS_PER_CIRCLE);
        // Error larger than the radius: floor
        assert_eq!(circle_segment_count(10.0, 1000.0), MIN_SEGMENTS_PER_CIRCLE);
        // Arc counts scale with the sweep and never drop below two
        assert!(arc_segment_count(1.0e6, 5000.0, 90.0) >= 2);
        assert!(arc_segment_count(1.0e9, 1.0, 90.0) <= MAX_SEGMENTS_PER_CIRCLE / 4);
    }

    #[test]
    fn test_arc_points_endpoints() {
        let pts = arc_points(BoardPoint::new(0.0, 0.0), BoardPoint::new(1000.0, 0.0), 90.0, 5.0);
        let last = pts[pts.len() - 1];
        assert!((pts[0].x - 1000.0).abs() < 1e-6);
        assert!(last.x.abs() < 1e-6 && (last.y - 1000.0).abs() < 1e-6);
    }
}
