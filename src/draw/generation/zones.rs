//! Zone fills

use crate::draw::board::{PcbLayer, Zone};
use crate::draw::geometry::{Container2D, ItemId};
use crate::draw::polygon::PolySet;
use crate::draw::tessellation::{convert_polygon_to_blocks, convert_polygon_to_triangles};

/// The precomputed fill of `zone` on `layer`, if it has one
pub fn zone_fill(zone: &Zone, layer: PcbLayer) -> Option<&PolySet> {
    zone.fills
        .iter()
        .find(|(l, fill)| *l == layer && !fill.is_empty())
        .map(|(_, fill)| fill)
}

/// Render shapes for a zone fill
pub fn add_zone_triangles(fill: &PolySet, container: &mut Container2D, biu_to_3d: f64, source: Option<ItemId>) -> usize {
    convert_polygon_to_triangles(fill, container, biu_to_3d, source)
}

/// Query shapes for a zone fill, grid blocks sized by `div_factor`
pub fn add_zone_blocks(
    fill: &PolySet,
    container: &mut Container2D,
    biu_to_3d: f64,
    div_factor: f32,
    source: Option<ItemId>,
) -> usize {
    convert_polygon_to_blocks(fill, container, biu_to_3d, Some(div_factor), source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::polygon::BoardPoint;

    #[test]
    fn test_fill_lookup() {
        let mut fill = PolySet::new();
        fill.add_outline(&[
            BoardPoint::new(0.0, 0.0),
            BoardPoint::new(1.0e6, 0.0),
            BoardPoint::new(1.0e6, 1.0e6),
        ]);
        let zone = Zone { fills: vec![(PcbLayer::BCu, PolySet::new()), (PcbLayer::FCu, fill)] };
        assert!(zone_fill(&zone, PcbLayer::FCu).is_some());
        assert!(zone_fill(&zone, PcbLayer::BCu).is_none());
        assert!(zone_fill(&zone, PcbLayer::InCu(1)).is_none());

        let mut container = Container2D::new();
        let added = add_zone_triangles(zone_fill(&zone, PcbLayer::FCu).unwrap(), &mut container, 1.0e-6, Some(ItemId(0)));
        assert_eq!(added, 1);
    }
}
