//! Pad and drill shapes
//!
//! A pad is described by its effective shape: a small list of circles,
//! segments, quads and polygons in board coordinates. Isotropic positive
//! clearance grows each sub-shape directly. Negative or per-axis clearance
//! cannot be expressed that way, so a stand-in pad with the clearance folded
//! into its size is built instead and the remaining clearance is zero.

use super::primitives::BoardShape;
use crate::draw::board::{DrillShape, Pad, PadAnchor, PadDrill, PadShape};
use crate::draw::polygon::{arc_points, contour_to_polygon, BoardPoint, PolySet};

/// Local pad coordinates to board coordinates
fn place(pad: &Pad, local: BoardPoint) -> BoardPoint {
    BoardPoint::new(pad.position.x + local.x, pad.position.y + local.y).rotated_about(pad.position, pad.orientation_deg)
}

fn rect_corners(w: f64, h: f64) -> [BoardPoint; 4] {
    let (hw, hh) = (w / 2.0, h / 2.0);
    [
        BoardPoint::new(-hw, -hh),
        BoardPoint::new(hw, -hh),
        BoardPoint::new(hw, hh),
        BoardPoint::new(-hw, hh),
    ]
}

fn trapezoid_corners(w: f64, h: f64, delta: (f64, f64)) -> [BoardPoint; 4] {
    let (hw, hh) = (w / 2.0, h / 2.0);
    let (dx, dy) = (delta.0 / 2.0, delta.1 / 2.0);
    [
        BoardPoint::new(-hw - dy, hh + dx),
        BoardPoint::new(hw + dy, hh - dx),
        BoardPoint::new(hw - dy, -hh + dx),
        BoardPoint::new(-hw + dy, -hh - dx),
    ]
}

/// Rectangle with rounded corners, corner radius clamped to half the short side
pub fn rounded_rect_contour(w: f64, h: f64, radius: f64, max_error: f64) -> Vec<BoardPoint> {
    let r = radius.clamp(0.0, w.min(h) / 2.0);
    if r <= 0.0 {
        return rect_corners(w, h).to_vec();
    }
    let (cx, cy) = (w / 2.0 - r, h / 2.0 - r);
    let corners = [(cx, cy, 0.0), (-cx, cy, 90.0), (-cx, -cy, 180.0), (cx, -cy, 270.0)];
    let mut pts = Vec::new();
    for (x, y, start_deg) in corners {
        let center = BoardPoint::new(x, y);
        let start = BoardPoint::new(x + r, y).rotated_about(center, start_deg);
        pts.extend(arc_points(center, start, 90.0, max_error));
    }
    pts
}

fn chamfered_contour(w: f64, h: f64, chamfer: f64) -> Vec<BoardPoint> {
    let c = chamfer.clamp(0.0, w.min(h) / 2.0);
    let (hw, hh) = (w / 2.0, h / 2.0);
    if c <= 0.0 {
        return rect_corners(w, h).to_vec();
    }
    vec![
        BoardPoint::new(-hw + c, -hh),
        BoardPoint::new(hw - c, -hh),
        BoardPoint::new(hw, -hh + c),
        BoardPoint::new(hw, hh - c),
        BoardPoint::new(hw - c, hh),
        BoardPoint::new(-hw + c, hh),
        BoardPoint::new(-hw, hh - c),
        BoardPoint::new(-hw, -hh + c),
    ]
}

/// Sub-shapes of a pad at its nominal size, board coordinates
pub fn pad_effective_shapes(pad: &Pad, max_error: f64) -> Vec<BoardShape> {
    let (w, h) = pad.size;
    if w <= 0.0 || h <= 0.0 {
        return Vec::new();
    }
    match &pad.shape {
        PadShape::Circle => vec![BoardShape::Circle { center: pad.position, radius: w / 2.0 }],
        PadShape::Oval => {
            if (w - h).abs() < f64::EPSILON {
                return vec![BoardShape::Circle { center: pad.position, radius: w / 2.0 }];
            }
            let (half_len, width) = if w > h { ((w - h) / 2.0, h) } else { ((h - w) / 2.0, w) };
            let (a, b) = if w > h {
                (BoardPoint::new(-half_len, 0.0), BoardPoint::new(half_len, 0.0))
            } else {
                (BoardPoint::new(0.0, -half_len), BoardPoint::new(0.0, half_len))
            };
            vec![BoardShape::segment(place(pad, a), place(pad, b), width)]
        }
        PadShape::Rect => vec![BoardShape::Quad(rect_corners(w, h).map(|p| place(pad, p)))],
        PadShape::Trapezoid { delta } => {
            vec![BoardShape::Quad(trapezoid_corners(w, h, *delta).map(|p| place(pad, p)))]
        }
        PadShape::RoundRect { radius_ratio } => {
            let contour = rounded_rect_contour(w, h, radius_ratio * w.min(h), max_error);
            let placed: Vec<BoardPoint> = contour.into_iter().map(|p| place(pad, p)).collect();
            vec![BoardShape::Polygon(PolySet::from_polygons(vec![contour_to_polygon(&placed)]))]
        }
        PadShape::ChamferedRect { chamfer_ratio } => {
            let placed: Vec<BoardPoint> =
                chamfered_contour(w, h, chamfer_ratio * w.min(h)).into_iter().map(|p| place(pad, p)).collect();
            vec![BoardShape::Polygon(PolySet::from_polygons(vec![contour_to_polygon(&placed)]))]
        }
        PadShape::Custom { anchor, primitives } => {
            let mut polys = primitives.map_points(|p| place(pad, p));
            let anchor_shape = match anchor {
                PadAnchor::Circle => BoardShape::Circle { center: pad.position, radius: w.min(h) / 2.0 },
                PadAnchor::Rect => BoardShape::Quad(rect_corners(w, h).map(|p| place(pad, p))),
            };
            anchor_shape.add_to_polyset(&mut polys, max_error);
            polys.simplify();
            vec![BoardShape::Polygon(polys)]
        }
    }
}

/// Pad sub-shapes grown by `clearance` (x, y)
pub fn pad_shapes(pad: &Pad, clearance: (f64, f64), max_error: f64) -> Vec<BoardShape> {
    let is_custom = matches!(pad.shape, PadShape::Custom { .. });
    let (shapes, margin) = if (clearance.0 < 0.0 || clearance.0 != clearance.1) && !is_custom {
        let mut stand_in = pad.clone();
        stand_in.size = (pad.size.0 + 2.0 * clearance.0, pad.size.1 + 2.0 * clearance.1);
        if let PadShape::RoundRect { radius_ratio } = pad.shape {
            // Keep the corner radius offset by the clearance
            let radius = radius_ratio * pad.size.0.min(pad.size.1) + clearance.0;
            let short = stand_in.size.0.min(stand_in.size.1);
            if short > 0.0 {
                stand_in.shape = PadShape::RoundRect { radius_ratio: (radius / short).clamp(0.0, 0.5) };
            }
        }
        (pad_effective_shapes(&stand_in, max_error), 0.0)
    } else {
        (pad_effective_shapes(pad, max_error), clearance.0)
    };

    if margin == 0.0 {
        return shapes;
    }
    shapes
        .into_iter()
        .filter_map(|shape| grow(shape, margin, max_error))
        .collect()
}

/// Grow one sub-shape by `margin`; `None` when nothing is left
fn grow(shape: BoardShape, margin: f64, max_error: f64) -> Option<BoardShape> {
    match shape {
        BoardShape::Circle { center, radius } => {
            let r = radius + margin;
            (r > 0.0).then_some(BoardShape::Circle { center, radius: r })
        }
        BoardShape::Segment { start, end, width } => {
            let w = width + 2.0 * margin;
            (w > 0.0).then_some(BoardShape::Segment { start, end, width: w })
        }
        BoardShape::Ring { center, inner, outer } => {
            let outer = outer + margin;
            (outer > 0.0).then(|| BoardShape::ring(center, inner - margin, outer))
        }
        other => {
            let mut polys = PolySet::new();
            other.add_to_polyset(&mut polys, max_error);
            polys.inflate(margin, max_error);
            (!polys.is_empty()).then_some(BoardShape::Polygon(polys))
        }
    }
}

/// Drill hole of `drill` at `center`, grown by `inflate`. Oblong drills
/// become round segments along their long axis.
pub fn drill_shape(center: BoardPoint, drill: &PadDrill, orientation_deg: f64, inflate: f64) -> Option<BoardShape> {
    let (w, h) = drill.size;
    if w <= 0.0 {
        return None;
    }
    let is_slot = drill.shape == DrillShape::Oblong && h > 0.0 && (w - h).abs() > f64::EPSILON;
    if !is_slot {
        let r = w / 2.0 + inflate;
        return (r > 0.0).then_some(BoardShape::Circle { center, radius: r });
    }
    let (half_len, width) = if w > h { ((w - h) / 2.0, h) } else { ((h - w) / 2.0, w) };
    let (a, b) = if w > h {
        (BoardPoint::new(center.x - half_len, center.y), BoardPoint::new(center.x + half_len, center.y))
    } else {
        (BoardPoint::new(center.x, center.y - half_len), BoardPoint::new(center.x, center.y + half_len))
    };
    let width = width + 2.0 * inflate;
    (width > 0.0).then(|| {
        BoardShape::segment(a.rotated_about(center, orientation_deg), b.rotated_about(center, orientation_deg), width)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::board::{DrillMachining, PcbLayer};

    fn pad(shape: PadShape, size: (f64, f64)) -> Pad {
        Pad {
            position: BoardPoint::new(1.0e6, 1.0e6),
            size,
            shape,
            orientation_deg: 0.0,
            layers: vec![PcbLayer::FCu],
            drill: None,
            solder_mask_margin: 0.0,
            paste_margin: 0.0,
            paste_margin_ratio: 0.0,
            machining: DrillMachining::default(),
        }
    }

    #[test]
    fn test_circle_pad_is_filled_circle() {
        let shapes = pad_shapes(&pad(PadShape::Circle, (600_000.0, 600_000.0)), (50_000.0, 50_000.0), 1_000.0);
        assert_eq!(shapes.len(), 1);
        match shapes[0] {
            BoardShape::Circle { radius, .. } => assert!((radius - 350_000.0).abs() < 1e-6),
            ref other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rect_without_clearance_is_quad() {
        let shapes = pad_shapes(&pad(PadShape::Rect, (1.0e6, 0.5e6)), (0.0, 0.0), 1_000.0);
        assert!(matches!(shapes[0], BoardShape::Quad(_)));
    }

    #[test]
    fn test_rect_positive_clearance_is_rounded_polygon() {
        let shapes = pad_shapes(&pad(PadShape::Rect, (1.0e6, 0.5e6)), (0.1e6, 0.1e6), 1_000.0);
        match &shapes[0] {
            BoardShape::Polygon(polys) => {
                // 1.2 x 0.7 minus the four rounded corners
                let expected = 1.0e6 * 0.5e6 + 2.0 * 0.1e6 * (1.0e6 + 0.5e6) + std::f64::consts::PI * 0.1e6 * 0.1e6;
                assert!((polys.area() - expected).abs() / expected < 0.01);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_anisotropic_clearance_uses_stand_in() {
        let shapes = pad_shapes(&pad(PadShape::Rect, (1.0e6, 0.5e6)), (0.1e6, 0.05e6), 1_000.0);
        match &shapes[0] {
            BoardShape::Quad(corners) => {
                let w = corners[1].x - corners[0].x;
                let h = corners[2].y - corners[1].y;
                assert!((w - 1.2e6).abs() < 1e-3);
                assert!((h - 0.6e6).abs() < 1e-3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_negative_clearance_shrinks_circle() {
        let shapes = pad_shapes(&pad(PadShape::Circle, (600_000.0, 600_000.0)), (-100_000.0, -100_000.0), 1_000.0);
        match shapes[0] {
            BoardShape::Circle { radius, .. } => assert!((radius - 200_000.0).abs() < 1e-6),
            ref other => panic!("unexpected {:?}", other),
        }
        let gone = pad_shapes(&pad(PadShape::Circle, (600_000.0, 600_000.0)), (-400_000.0, -400_000.0), 1_000.0);
        assert!(gone.is_empty());
    }

    #[test]
    fn test_oval_is_segment() {
        let shapes = pad_shapes(&pad(PadShape::Oval, (2.0e6, 1.0e6)), (0.0, 0.0), 1_000.0);
        match shapes[0] {
            BoardShape::Segment { start, end, width } => {
                assert!((start.distance(end) - 1.0e6).abs() < 1e-6);
                assert!((width - 1.0e6).abs() < 1e-6);
            }
            ref other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_roundrect_area() {
        let shapes = pad_shapes(&pad(PadShape::RoundRect { radius_ratio: 0.25 }, (2.0e6, 1.0e6)), (0.0, 0.0), 500.0);
        let BoardShape::Polygon(polys) = &shapes[0] else { panic!("expected polygon") };
        let r: f64 = 0.25e6;
        let expected = 2.0e6 * 1.0e6 - (4.0 - std::f64::consts::PI) * r * r;
        assert!((polys.area() - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_slot_drill() {
        let drill = PadDrill { size: (1.0e6, 0.4e6), shape: DrillShape::Oblong, plated: true };
        match drill_shape(BoardPoint::default(), &drill, 90.0, 0.0) {
            Some(BoardShape::Segment { start, end, width }) => {
                assert!((width - 0.4e6).abs() < 1e-6);
                // Rotated onto the y axis
                assert!(start.x.abs() < 1e-3 && end.x.abs() < 1e-3);
                assert!((start.distance(end) - 0.6e6).abs() < 1e-3);
            }
            other => panic!("unexpected {:?}", other),
        }
        let round = PadDrill { size: (0.3e6, 0.3e6), shape: DrillShape::Circle, plated: false };
        assert!(matches!(drill_shape(BoardPoint::default(), &round, 0.0, 0.0), Some(BoardShape::Circle { .. })));
    }
}
