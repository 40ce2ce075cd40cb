//! Hole and via bookkeeping
//!
//! Every drill feeds several overlapping accumulators: all through-hole
//! outer diameters (silk and copper clipping, board body), inner diameters
//! (barrels and side-wall culling), via outer diameters, via annuli, and
//! per-layer holes for blind/buried vias. Post-machining is recorded twice:
//! once per layer it cuts through, for clipping, and once in a global
//! container per cutout kind, for rendering the step geometry.

use super::stackup::Stackup;
use super::stats::CompileStats;
use crate::draw::board::{
    Backdrill, Board, BoardItem, DrillMachining, PcbLayer, PostMachining, PostMachiningKind, Side, ViaKind,
};
use crate::draw::generation::{drill_shape, BoardShape};
use crate::draw::geometry::{Container2D, ItemId};
use crate::draw::polygon::{BoardPoint, PolySet};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CutoutKind {
    FrontCounterbore,
    BackCounterbore,
    FrontCountersink,
    BackCountersink,
    Backdrill,
    TertiaryDrill,
}

impl CutoutKind {
    fn post_machining(kind: PostMachiningKind, side: Side) -> CutoutKind {
        match (kind, side) {
            (PostMachiningKind::Counterbore, Side::Front) => CutoutKind::FrontCounterbore,
            (PostMachiningKind::Counterbore, Side::Back) => CutoutKind::BackCounterbore,
            (PostMachiningKind::Countersink, Side::Front) => CutoutKind::FrontCountersink,
            (PostMachiningKind::Countersink, Side::Back) => CutoutKind::BackCountersink,
        }
    }
}

/// A container and the matching polygon set (board units)
#[derive(Debug, Clone, Default)]
pub struct HoleProduct {
    pub container: Container2D,
    pub polygon: PolySet,
}

impl HoleProduct {
    fn add(&mut self, shape: &BoardShape, biu_to_3d: f64, max_error: f64, source: Option<ItemId>) {
        shape.add_to_container(&mut self.container, biu_to_3d, source);
        shape.add_to_polyset(&mut self.polygon, max_error);
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty() && self.polygon.is_empty()
    }
}

/// One global cutout, for rendering: where it starts and how deep it goes
#[derive(Debug, Clone)]
pub struct Cutout {
    pub kind: CutoutKind,
    pub center: BoardPoint,
    pub diameter: f64,
    pub depth: f64,
    pub side: Side,
    pub source: ItemId,
}

#[derive(Debug, Clone, Default)]
pub struct HoleSet {
    /// Every through hole at its outer (plated) diameter
    pub th_od: HoleProduct,
    /// Every through hole at its drill diameter
    pub th_id: HoleProduct,
    pub via_od: HoleProduct,
    /// Via pads, for clipping silkscreen to the annulus
    pub via_annulus: HoleProduct,
    /// Blind/buried/micro vias and post-machining, per layer cut
    pub layer_holes: IndexMap<PcbLayer, HoleProduct>,
    pub cutouts: IndexMap<CutoutKind, Container2D>,
    pub cutout_list: Vec<Cutout>,
    /// Union of every cutout footprint
    pub cutout_polygon: PolySet,
}

struct HoleCollector<'a> {
    stackup: &'a Stackup,
    copper_layers: Vec<PcbLayer>,
    biu_to_3d: f64,
    max_error: f64,
    set: HoleSet,
}

impl HoleSet {
    pub fn collect(board: &Board, stackup: &Stackup, biu_to_3d: f64, stats: &mut CompileStats) -> HoleSet {
        let mut collector = HoleCollector {
            stackup,
            copper_layers: board.copper_layers(),
            biu_to_3d,
            max_error: board.max_error,
            set: HoleSet::default(),
        };
        let plating = board.hole_plating_thickness.max(0.0);

        for (id, item) in board.items_with_ids() {
            match item {
                BoardItem::Via(via) => {
                    if via.drill <= 0.0 {
                        continue;
                    }
                    stats.add_via(via.drill);
                    let od = BoardShape::Circle { center: via.position, radius: via.drill / 2.0 + plating };
                    let id_shape = BoardShape::Circle { center: via.position, radius: via.drill / 2.0 };
                    match via.kind {
                        ViaKind::Through => {
                            collector.add_global(&od, &id_shape, id);
                            collector.set.via_od.add(&od, biu_to_3d, board.max_error, Some(id));
                        }
                        ViaKind::BlindBuried | ViaKind::Micro => {
                            for layer in via.span(board.copper_layer_count) {
                                collector.add_layer_hole(layer, &od, id);
                            }
                        }
                    }
                    if via.width > 0.0 {
                        let pad = BoardShape::Circle { center: via.position, radius: via.width / 2.0 };
                        collector.set.via_annulus.add(&pad, biu_to_3d, board.max_error, Some(id));
                    }
                    collector.add_machining(via.position, via.drill, &via.machining, id);
                }
                BoardItem::Pad(pad) => {
                    let Some(drill) = &pad.drill else { continue };
                    let inflate = if drill.plated { plating } else { 0.0 };
                    let od = drill_shape(pad.position, drill, pad.orientation_deg, inflate);
                    let id_shape = drill_shape(pad.position, drill, pad.orientation_deg, 0.0);
                    if let (Some(od), Some(id_shape)) = (od, id_shape) {
                        let smallest = if drill.size.1 > 0.0 { drill.size.0.min(drill.size.1) } else { drill.size.0 };
                        stats.add_hole(smallest);
                        collector.add_global(&od, &id_shape, id);
                        collector.add_machining(pad.position, drill.size.0, &pad.machining, id);
                    }
                }
                _ => {}
            }
        }

        let mut set = collector.set;
        // Annulus clipping must not bring back area a counterbore removed
        if !set.cutout_polygon.is_empty() {
            set.cutout_polygon.simplify();
            set.via_annulus.polygon.boolean_subtract(&set.cutout_polygon);
        }
        set
    }

    pub fn layer_hole_polygon(&self, layer: PcbLayer) -> Option<&PolySet> {
        self.layer_holes.get(&layer).map(|h| &h.polygon).filter(|p| !p.is_empty())
    }

    /// Every container, for the finalize pass
    pub fn containers_mut(&mut self) -> Vec<&mut Container2D> {
        let mut out = vec![
            &mut self.th_od.container,
            &mut self.th_id.container,
            &mut self.via_od.container,
            &mut self.via_annulus.container,
        ];
        out.extend(self.layer_holes.values_mut().map(|h| &mut h.container));
        out.extend(self.cutouts.values_mut());
        out
    }

    /// Every polygon set, for the finalize pass
    pub fn polygons_mut(&mut self) -> Vec<&mut PolySet> {
        let mut out = vec![
            &mut self.th_od.polygon,
            &mut self.th_id.polygon,
            &mut self.via_od.polygon,
            &mut self.via_annulus.polygon,
        ];
        out.extend(self.layer_holes.values_mut().map(|h| &mut h.polygon));
        out
    }
}

impl HoleCollector<'_> {
    fn add_global(&mut self, od: &BoardShape, id_shape: &BoardShape, source: ItemId) {
        self.set.th_od.add(od, self.biu_to_3d, self.max_error, Some(source));
        self.set.th_id.add(id_shape, self.biu_to_3d, self.max_error, Some(source));
    }

    fn add_layer_hole(&mut self, layer: PcbLayer, shape: &BoardShape, source: ItemId) {
        self.set
            .layer_holes
            .entry(layer)
            .or_default()
            .add(shape, self.biu_to_3d, self.max_error, Some(source));
    }

    fn add_cutout(&mut self, cutout: Cutout) {
        let shape = BoardShape::Circle { center: cutout.center, radius: cutout.diameter / 2.0 };
        let container = self.set.cutouts.entry(cutout.kind).or_default();
        shape.add_to_container(container, self.biu_to_3d, Some(cutout.source));
        shape.add_to_polyset(&mut self.set.cutout_polygon, self.max_error);
        self.set.cutout_list.push(cutout);
    }

    fn add_machining(&mut self, center: BoardPoint, drill: f64, machining: &DrillMachining, source: ItemId) {
        if machining.is_empty() {
            return;
        }
        for (side, post) in [(Side::Front, &machining.front), (Side::Back, &machining.back)] {
            if let Some(post) = post {
                self.add_post_machining(center, drill, side, post, source);
            }
        }
        if let Some(bd) = &machining.backdrill {
            self.add_backdrill(center, bd, CutoutKind::Backdrill, source);
        }
        if let Some(bd) = &machining.tertiary {
            self.add_backdrill(center, bd, CutoutKind::TertiaryDrill, source);
        }
    }

    fn add_post_machining(&mut self, center: BoardPoint, drill: f64, side: Side, post: &PostMachining, source: ItemId) {
        if post.diameter <= drill || post.depth <= 0.0 {
            return;
        }
        let kind = CutoutKind::post_machining(post.kind, side);
        self.add_cutout(Cutout { kind, center, diameter: post.diameter, depth: post.depth, side, source });

        // Face layers are always cut at the full diameter
        let face_layers = [PcbLayer::mask_of(side), PcbLayer::silk_of(side), PcbLayer::paste_of(side)];
        let full = BoardShape::Circle { center, radius: post.diameter / 2.0 };
        for layer in face_layers {
            self.add_layer_hole(layer, &full, source);
        }

        let half_angle = (post.angle_deg.clamp(1.0, 179.0) / 2.0).to_radians();
        let copper = self.copper_layers.clone();
        for layer in copper {
            let Some(depth) = self.stackup.copper_depth(layer, side) else { continue };
            if depth >= post.depth {
                continue;
            }
            let radius = match post.kind {
                PostMachiningKind::Counterbore => post.diameter / 2.0,
                // The cone narrows with depth down to the drill
                PostMachiningKind::Countersink => (post.diameter / 2.0 - depth * half_angle.tan()).max(drill / 2.0),
            };
            self.add_layer_hole(layer, &BoardShape::Circle { center, radius }, source);
        }
    }

    fn add_backdrill(&mut self, center: BoardPoint, bd: &Backdrill, kind: CutoutKind, source: ItemId) {
        if bd.diameter <= 0.0 {
            return;
        }
        let Some(end_depth) = self.stackup.copper_depth(bd.end_layer, bd.start) else { return };
        self.add_cutout(Cutout { kind, center, diameter: bd.diameter, depth: end_depth, side: bd.start, source });
        let shape = BoardShape::Circle { center, radius: bd.diameter / 2.0 };
        let copper = self.copper_layers.clone();
        for layer in copper {
            if let Some(depth) = self.stackup.copper_depth(layer, bd.start) {
                if depth <= end_depth {
                    self.add_layer_hole(layer, &shape, source);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::board::{DrillShape, Pad, PadDrill, PadShape, Via};

    fn via(kind: ViaKind, machining: DrillMachining) -> Via {
        Via {
            position: BoardPoint::new(2.0e6, 2.0e6),
            width: 600_000.0,
            drill: 300_000.0,
            kind,
            top: PcbLayer::FCu,
            bottom: PcbLayer::InCu(1),
            tented_front: false,
            tented_back: false,
            machining,
        }
    }

    fn collect(board: &Board) -> (HoleSet, CompileStats) {
        let stackup = Stackup::new(board, 1.0e-6);
        let mut stats = CompileStats::default();
        (HoleSet::collect(board, &stackup, 1.0e-6, &mut stats), stats)
    }

    #[test]
    fn test_through_via_accumulators() {
        let mut board = Board::new(4);
        board.add(BoardItem::Via(via(ViaKind::Through, DrillMachining::default())));
        let (holes, stats) = collect(&board);
        assert_eq!(stats.via_count, 1);
        assert_eq!(holes.th_od.container.len(), 1);
        assert_eq!(holes.th_id.container.len(), 1);
        assert_eq!(holes.via_od.container.len(), 1);
        assert_eq!(holes.via_annulus.container.len(), 1);
        assert!(holes.layer_holes.is_empty());
        assert!(holes.th_od.polygon.area() > holes.th_id.polygon.area());
    }

    #[test]
    fn test_blind_via_goes_per_layer() {
        let mut board = Board::new(4);
        board.add(BoardItem::Via(via(ViaKind::BlindBuried, DrillMachining::default())));
        let (holes, _) = collect(&board);
        assert!(holes.th_od.is_empty());
        assert!(holes.layer_hole_polygon(PcbLayer::FCu).is_some());
        assert!(holes.layer_hole_polygon(PcbLayer::InCu(1)).is_some());
        assert!(holes.layer_hole_polygon(PcbLayer::InCu(2)).is_none());
        assert!(holes.layer_hole_polygon(PcbLayer::BCu).is_none());
    }

    #[test]
    fn test_counterbore_recorded_twice() {
        let machining = DrillMachining {
            front: Some(PostMachining {
                kind: PostMachiningKind::Counterbore,
                diameter: 1.0e6,
                depth: 0.3e6,
                angle_deg: 90.0,
            }),
            ..Default::default()
        };
        let mut board = Board::new(4);
        board.add(BoardItem::Via(via(ViaKind::Through, machining)));
        let (holes, _) = collect(&board);

        // Once globally
        assert_eq!(holes.cutouts.get(&CutoutKind::FrontCounterbore).map(|c| c.len()), Some(1));
        assert_eq!(holes.cutout_list.len(), 1);
        // Once per layer it passes through: F.Cu and the front face layers,
        // not In1.Cu which is 0.53 mm deep
        assert!(holes.layer_hole_polygon(PcbLayer::FCu).is_some());
        assert!(holes.layer_hole_polygon(PcbLayer::FSilkS).is_some());
        assert!(holes.layer_hole_polygon(PcbLayer::InCu(1)).is_none());
        // The annulus lost everything the counterbore removed
        assert!(holes.via_annulus.polygon.is_empty());
    }

    #[test]
    fn test_backdrill_layers() {
        let machining = DrillMachining {
            backdrill: Some(Backdrill { diameter: 0.5e6, start: Side::Back, end_layer: PcbLayer::InCu(2) }),
            ..Default::default()
        };
        let mut board = Board::new(4);
        board.add(BoardItem::Via(via(ViaKind::Through, machining)));
        let (holes, _) = collect(&board);
        assert!(holes.layer_hole_polygon(PcbLayer::BCu).is_some());
        assert!(holes.layer_hole_polygon(PcbLayer::InCu(2)).is_some());
        assert!(holes.layer_hole_polygon(PcbLayer::InCu(1)).is_none());
        assert!(holes.cutouts.contains_key(&CutoutKind::Backdrill));
    }

    #[test]
    fn test_npth_pad_has_no_plating() {
        let mut board = Board::new(2);
        board.add(BoardItem::Pad(Pad {
            position: BoardPoint::new(0.0, 0.0),
            size: (1.0e6, 1.0e6),
            shape: PadShape::Circle,
            orientation_deg: 0.0,
            layers: vec![],
            drill: Some(PadDrill { size: (0.8e6, 0.8e6), shape: DrillShape::Circle, plated: false }),
            solder_mask_margin: 0.0,
            paste_margin: 0.0,
            paste_margin_ratio: 0.0,
            machining: DrillMachining::default(),
        }));
        let (holes, stats) = collect(&board);
        assert_eq!(stats.hole_count, 1);
        assert!((holes.th_od.polygon.area() - holes.th_id.polygon.area()).abs() < 1.0);
    }
}
