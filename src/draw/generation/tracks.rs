//! Track, arc and via shapes

use super::primitives::BoardShape;
use crate::draw::board::{ArcTrack, PcbLayer, Side, Track, Via};
use crate::draw::polygon::arc_points;

pub fn track_shapes(track: &Track) -> Vec<BoardShape> {
    if track.width <= 0.0 {
        return Vec::new();
    }
    vec![BoardShape::segment(track.start, track.end, track.width)]
}

/// Chain of round segments following the arc; collinear arcs fall back
/// to a straight segment
pub fn arc_shapes(arc: &ArcTrack, max_error: f64) -> Vec<BoardShape> {
    if arc.width <= 0.0 {
        return Vec::new();
    }
    let (center, angle) = match (arc.center(), arc.angle_deg()) {
        (Some(c), Some(a)) => (c, a),
        _ => return vec![BoardShape::segment(arc.start, arc.end, arc.width)],
    };
    let points = arc_points(center, arc.start, angle, max_error);
    points
        .windows(2)
        .map(|pair| BoardShape::segment(pair[0], pair[1], arc.width))
        .collect()
}

/// Via pads on the layers they span; openings on untented mask layers.
/// The drill is not cut here, the through-hole set removes it.
pub fn via_shapes(via: &Via, layer: PcbLayer, copper_count: usize) -> Vec<BoardShape> {
    let outer = via.width / 2.0;
    if outer <= 0.0 {
        return Vec::new();
    }
    if layer.is_copper() {
        if !via.span(copper_count).contains(&layer) {
            return Vec::new();
        }
        return vec![BoardShape::Circle { center: via.position, radius: outer }];
    }
    let exposed = match layer {
        PcbLayer::FMask => !via.tented_front && via.span(copper_count).contains(&PcbLayer::copper_of(Side::Front)),
        PcbLayer::BMask => !via.tented_back && via.span(copper_count).contains(&PcbLayer::copper_of(Side::Back)),
        _ => false,
    };
    if exposed {
        vec![BoardShape::Circle { center: via.position, radius: outer }]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::board::{DrillMachining, ViaKind};
    use crate::draw::polygon::BoardPoint;

    fn via() -> Via {
        Via {
            position: BoardPoint::new(5.0e6, 5.0e6),
            width: 600_000.0,
            drill: 300_000.0,
            kind: ViaKind::Through,
            top: PcbLayer::FCu,
            bottom: PcbLayer::BCu,
            tented_front: true,
            tented_back: false,
            machining: DrillMachining::default(),
        }
    }

    #[test]
    fn test_zero_length_track_is_circle() {
        let p = BoardPoint::new(1.0, 1.0);
        let shapes = track_shapes(&Track { start: p, end: p, width: 200.0, layer: PcbLayer::FCu });
        assert!(matches!(shapes[0], BoardShape::Circle { radius, .. } if (radius - 100.0).abs() < 1e-9));
    }

    #[test]
    fn test_arc_is_chain() {
        let arc = ArcTrack {
            start: BoardPoint::new(1.0e6, 0.0),
            mid: BoardPoint::new(0.0, 1.0e6),
            end: BoardPoint::new(-1.0e6, 0.0),
            width: 100_000.0,
            layer: PcbLayer::FCu,
        };
        let shapes = arc_shapes(&arc, 5_000.0);
        assert!(shapes.len() >= 2);
        // Half circle never needs more than half the segment cap
        assert!(shapes.len() <= 64);
        assert!(shapes.iter().all(|s| matches!(s, BoardShape::Segment { .. })));
    }

    #[test]
    fn test_via_layers() {
        let v = via();
        let pad = via_shapes(&v, PcbLayer::FCu, 2);
        assert_eq!(pad.len(), 1);
        assert!(matches!(pad[0], BoardShape::Circle { radius, .. } if radius == 300_000.0));
        assert!(via_shapes(&v, PcbLayer::FMask, 2).is_empty());
        assert_eq!(via_shapes(&v, PcbLayer::BMask, 2).len(), 1);
        assert!(via_shapes(&v, PcbLayer::FSilkS, 2).is_empty());
    }
}
