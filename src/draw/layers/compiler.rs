//! Layer compiler
//!
//! Every `reload` is a full rebuild: the previous products are dropped, the
//! board is walked once per enabled layer, zone fills are fanned out across a
//! worker pool, and a finalize pass applies the boolean composition and
//! builds every BVH. The `&mut self` receiver keeps reloads from
//! overlapping, and the new products are only swapped in once every worker
//! has joined.

use super::holes::HoleSet;
use super::output::{BoardGeometry, LayerGeometry};
use super::reporter::StatusReporter;
use super::settings::RenderSettings;
use super::stackup::Stackup;
use super::stats::{CompileStats, ObjectStats};
use super::workers::fan_out;
use crate::draw::board::{Board, BoardItem, PcbLayer, Side, StrokeFont, TECHNICAL_LAYERS};
use crate::draw::generation::{
    add_shapes_to_container, add_shapes_to_polyset, add_zone_blocks, add_zone_triangles, item_shapes, zone_fill,
    ShapeContext,
};
use crate::draw::geometry::{Container2D, ItemId};
use crate::draw::polygon::PolySet;
use crate::draw::tessellation::convert_polygon_to_triangles;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

#[derive(Debug, Default)]
pub struct LayerCompiler {
    generation: u64,
    geometry: BoardGeometry,
}

impl LayerCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reloads so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn take_geometry(&mut self) -> BoardGeometry {
        std::mem::take(&mut self.geometry)
    }

    /// Rebuild everything from `board`. A missing board yields empty
    /// geometry, not an error.
    pub fn reload(
        &mut self,
        board: Option<&Board>,
        settings: &RenderSettings,
        reporter: &dyn StatusReporter,
        font: &dyn StrokeFont,
    ) -> &BoardGeometry {
        self.geometry = BoardGeometry::default();
        self.generation += 1;

        self.geometry = match board {
            Some(board) => compile(board, settings, reporter, font, self.generation),
            None => {
                log::debug!("[Layers] reload {} without a board", self.generation);
                BoardGeometry::empty(self.generation, settings.biu_to_3d_units)
            }
        };
        &self.geometry
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn compile(
    board: &Board,
    settings: &RenderSettings,
    reporter: &dyn StatusReporter,
    font: &dyn StrokeFont,
    generation: u64,
) -> BoardGeometry {
    let start = Instant::now();
    let scale = settings.biu_to_3d_units;
    let stackup = Stackup::new(board, scale);
    let ctx = ShapeContext { max_error: board.max_error, copper_count: board.copper_layer_count, font };
    let mut stats = CompileStats { generation, ..Default::default() };

    reporter.report("Create tracks and vias");
    let buckets = classify_items(board, &mut stats);

    reporter.report("Create layers");
    let layers = enabled_layers(board, settings);
    let built: Vec<LayerGeometry> = layers
        .par_iter()
        .map(|&layer| build_layer(layer, board, &buckets, &ctx, &stackup, settings))
        .collect();
    let mut products: IndexMap<PcbLayer, LayerGeometry> = built.into_iter().map(|g| (g.layer, g)).collect();
    log::debug!("[Layers] {} layers built in {:?}", products.len(), start.elapsed());

    reporter.report("Create holes");
    let mut holes = HoleSet::collect(board, &stackup, scale, &mut stats);

    let mut plated = compose_booleans(&mut products, settings);

    if settings.show_zones {
        reporter.report("Create zones");
        let zones_start = Instant::now();
        let count = fill_zones(board, &mut products, settings, scale);
        log::debug!("[Layers] {} zone fills in {:?}", count, zones_start.elapsed());
    }

    reporter.report("Finalize layers");
    clip_and_drill(&mut products, &mut plated, &holes, board, settings);
    let mut board_body = build_board_body(board, &holes, &stackup, scale);

    let mut polygons: Vec<&mut PolySet> = products
        .values_mut()
        .chain(plated.values_mut())
        .filter_map(|g| g.polygon.as_mut())
        .collect();
    polygons.extend(holes.polygons_mut());
    let slots: Vec<Mutex<&mut PolySet>> = polygons.into_iter().map(Mutex::new).collect();
    fan_out(&slots, settings.worker_count(slots.len()), |_, slot| lock(slot).simplify());
    drop(slots);

    for g in plated.values_mut() {
        if let Some(polygon) = &g.polygon {
            convert_polygon_to_triangles(polygon, &mut g.container, scale, None);
        }
    }

    products.retain(|_, g| !g.is_empty());

    let mut containers: Vec<&mut Container2D> = Vec::new();
    for g in products.values_mut().chain(plated.values_mut()).chain(board_body.iter_mut()) {
        let LayerGeometry { container, query, .. } = g;
        containers.push(container);
        if let Some(q) = query.as_mut() {
            containers.push(q);
        }
    }
    containers.extend(holes.containers_mut());
    containers.into_par_iter().for_each(|c| c.build_bvh());

    let mut objects = ObjectStats::default();
    for g in products.values().chain(plated.values()) {
        objects.add_container(&g.container);
    }
    stats.objects = objects;
    stats.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    log::info!(
        "[Layers] reload {}: {} layers, {} primitives, {} tracks, {} vias, {} holes in {:?}",
        generation,
        products.len(),
        stats.objects.total(),
        stats.track_count,
        stats.via_count,
        stats.hole_count,
        start.elapsed()
    );

    BoardGeometry { generation, biu_to_3d: scale, layers: products, plated_copper: plated, board_body, holes, stats }
}

/// Item ids per layer, tracks counted on the way. Zones are left to the
/// fan-out.
fn classify_items(board: &Board, stats: &mut CompileStats) -> IndexMap<PcbLayer, Vec<ItemId>> {
    let mut buckets: IndexMap<PcbLayer, Vec<ItemId>> = IndexMap::new();
    for (id, item) in board.items_with_ids() {
        match item {
            BoardItem::Zone(_) => continue,
            BoardItem::Track(t) => stats.add_track(t.width),
            BoardItem::ArcTrack(a) => stats.add_track(a.width),
            _ => {}
        }
        let mut layers = item.layers(board.copper_layer_count);
        if let BoardItem::Via(_) = item {
            // Untented vias open the mask
            layers.extend([PcbLayer::FMask, PcbLayer::BMask]);
        }
        for layer in layers {
            buckets.entry(layer).or_default().push(id);
        }
    }
    buckets
}

fn enabled_layers(board: &Board, settings: &RenderSettings) -> Vec<PcbLayer> {
    board
        .copper_layers()
        .into_iter()
        .chain(TECHNICAL_LAYERS.iter().copied())
        .filter(|layer| settings.is_layer_enabled(*layer))
        .collect()
}

fn build_layer(
    layer: PcbLayer,
    board: &Board,
    buckets: &IndexMap<PcbLayer, Vec<ItemId>>,
    ctx: &ShapeContext,
    stackup: &Stackup,
    settings: &RenderSettings,
) -> LayerGeometry {
    let mut geometry = LayerGeometry::new(layer, stackup.layer_z_range(layer));
    let mut polygon = (settings.show_copper_thickness || !layer.is_copper()).then(PolySet::new);

    let ids = buckets.get(&layer).map(Vec::as_slice).unwrap_or(&[]);
    for &id in ids {
        let Some(item) = board.item(id) else { continue };
        let shapes = item_shapes(item, layer, ctx);
        add_shapes_to_container(&shapes, &mut geometry.container, settings.biu_to_3d_units, Some(id));
        if let Some(polygon) = polygon.as_mut() {
            add_shapes_to_polyset(&shapes, polygon, ctx.max_error);
        }
    }
    geometry.polygon = polygon;
    log::trace!("[Layers] {}: {} primitives", layer.name(), geometry.container.len());
    geometry
}

/// Mask from silk, then the plated copper split
fn compose_booleans(products: &mut IndexMap<PcbLayer, LayerGeometry>, settings: &RenderSettings) -> IndexMap<Side, LayerGeometry> {
    let mut plated = IndexMap::new();
    for side in [Side::Front, Side::Back] {
        let openings = products.get(&PcbLayer::mask_of(side)).and_then(|g| g.polygon.clone());
        let Some(openings) = openings else { continue };

        if settings.subtract_mask_from_silk {
            if let Some(silk) = products.get_mut(&PcbLayer::silk_of(side)).and_then(|g| g.polygon.as_mut()) {
                silk.boolean_subtract(&openings);
            }
        }

        if settings.differentiate_plated_copper {
            let Some(copper) = products.get_mut(&PcbLayer::copper_of(side)) else { continue };
            let z_range = (copper.z_bottom, copper.z_top);
            let Some(copper_polygon) = copper.polygon.as_mut() else { continue };
            let mut exposed = copper_polygon.clone();
            exposed.boolean_intersect(&openings);
            if exposed.is_empty() {
                continue;
            }
            copper_polygon.boolean_subtract(&exposed);
            let mut geometry = LayerGeometry::new(PcbLayer::copper_of(side), z_range);
            geometry.polygon = Some(exposed);
            plated.insert(side, geometry);
        }
    }
    plated
}

/// Per-layer locks for the zone fan-out: one for the container, one for
/// the polygon set
struct ZoneSlot {
    container: Mutex<Container2D>,
    query: Mutex<Option<Container2D>>,
    polygon: Mutex<Option<PolySet>>,
}

fn fill_zones(board: &Board, products: &mut IndexMap<PcbLayer, LayerGeometry>, settings: &RenderSettings, scale: f64) -> usize {
    let mut work: Vec<(ItemId, PcbLayer)> = Vec::new();
    for (id, item) in board.items_with_ids() {
        let BoardItem::Zone(zone) = item else { continue };
        for (layer, fill) in &zone.fills {
            if products.contains_key(layer) && !fill.is_empty() {
                work.push((id, *layer));
            }
        }
    }
    if work.is_empty() {
        return 0;
    }

    let slots: IndexMap<PcbLayer, ZoneSlot> = products
        .iter_mut()
        .map(|(layer, g)| {
            let slot = ZoneSlot {
                container: Mutex::new(std::mem::take(&mut g.container)),
                query: Mutex::new(g.query.take()),
                polygon: Mutex::new(g.polygon.take()),
            };
            (*layer, slot)
        })
        .collect();

    fan_out(&work, settings.worker_count(work.len()), |_, &(id, layer)| {
        let (Some(BoardItem::Zone(zone)), Some(slot)) = (board.item(id), slots.get(&layer)) else {
            return;
        };
        let Some(fill) = zone_fill(zone, layer) else { return };

        let mut triangles = Container2D::new();
        add_zone_triangles(fill, &mut triangles, scale, Some(id));
        lock(&slot.container).extend(triangles);

        if let Some(factor) = settings.zone_block_div_factor {
            let mut blocks = Container2D::new();
            add_zone_blocks(fill, &mut blocks, scale, factor, Some(id));
            lock(&slot.query).get_or_insert_with(Container2D::new).extend(blocks);
        }

        if let Some(polygon) = lock(&slot.polygon).as_mut() {
            polygon.append(fill);
        }
    });

    for (layer, slot) in slots {
        if let Some(g) = products.get_mut(&layer) {
            g.container = slot.container.into_inner().unwrap_or_else(PoisonError::into_inner);
            g.query = slot.query.into_inner().unwrap_or_else(PoisonError::into_inner);
            g.polygon = slot.polygon.into_inner().unwrap_or_else(PoisonError::into_inner);
        }
    }
    work.len()
}

/// Silkscreen clipping, drilling, and the mask render polygon
fn clip_and_drill(
    products: &mut IndexMap<PcbLayer, LayerGeometry>,
    plated: &mut IndexMap<Side, LayerGeometry>,
    holes: &HoleSet,
    board: &Board,
    settings: &RenderSettings,
) {
    let outline = &board.outline;
    for (layer, g) in products.iter_mut() {
        let Some(polygon) = g.polygon.as_mut() else { continue };
        if layer.is_silk() {
            if settings.clip_silk_on_via_annulus {
                polygon.boolean_subtract(&holes.via_annulus.polygon);
            } else {
                polygon.boolean_subtract(&holes.via_od.polygon);
            }
            polygon.boolean_subtract(&holes.th_od.polygon);
            if settings.clip_silk_on_board_outline && !outline.is_empty() {
                polygon.boolean_intersect(outline);
            }
        } else if layer.is_copper() {
            polygon.boolean_subtract(&holes.th_od.polygon);
        } else if layer.is_mask() {
            // Mask covers the board except where it is opened
            let mut mask = outline.clone();
            mask.boolean_subtract(polygon);
            *polygon = mask;
        }
        if let Some(layer_holes) = holes.layer_hole_polygon(*layer) {
            polygon.boolean_subtract(layer_holes);
        }
    }
    for g in plated.values_mut() {
        if let Some(polygon) = g.polygon.as_mut() {
            polygon.boolean_subtract(&holes.th_od.polygon);
            if let Some(layer_holes) = holes.layer_hole_polygon(g.layer) {
                polygon.boolean_subtract(layer_holes);
            }
        }
    }
}

fn build_board_body(board: &Board, holes: &HoleSet, stackup: &Stackup, scale: f64) -> Option<LayerGeometry> {
    if board.outline.is_empty() {
        return None;
    }
    let mut body = board.outline.clone();
    body.simplify();
    body.boolean_subtract(&holes.th_od.polygon);
    let mut geometry = LayerGeometry::new(PcbLayer::EdgeCuts, stackup.body_z_range());
    convert_polygon_to_triangles(&body, &mut geometry.container, scale, None);
    geometry.polygon = Some(body);
    Some(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::board::{DrillMachining, LaidOutText, Track, Via, ViaKind, Zone};
    use crate::draw::layers::NullReporter;
    use crate::draw::polygon::BoardPoint;

    const MM: f64 = 1.0e6;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> PolySet {
        let mut polys = PolySet::new();
        polys.add_outline(&[
            BoardPoint::new(x0, y0),
            BoardPoint::new(x1, y0),
            BoardPoint::new(x1, y1),
            BoardPoint::new(x0, y1),
        ]);
        polys
    }

    fn sample_board() -> (Board, ItemId, ItemId) {
        let mut board = Board::new(2);
        board.outline = rect(0.0, 0.0, 10.0 * MM, 10.0 * MM);
        let track = board.add(BoardItem::Track(Track {
            start: BoardPoint::new(1.0 * MM, 2.0 * MM),
            end: BoardPoint::new(9.0 * MM, 2.0 * MM),
            width: 0.25 * MM,
            layer: PcbLayer::FCu,
        }));
        let via = board.add(BoardItem::Via(Via {
            position: BoardPoint::new(5.0 * MM, 5.0 * MM),
            width: 0.6 * MM,
            drill: 0.3 * MM,
            kind: ViaKind::Through,
            top: PcbLayer::FCu,
            bottom: PcbLayer::BCu,
            tented_front: false,
            tented_back: false,
            machining: DrillMachining::default(),
        }));
        board.add(BoardItem::Zone(Zone { fills: vec![(PcbLayer::BCu, rect(6.0 * MM, 6.0 * MM, 9.0 * MM, 9.0 * MM))] }));
        (board, track, via)
    }

    fn reload(compiler: &mut LayerCompiler, board: Option<&Board>, settings: &RenderSettings) -> BoardGeometry {
        compiler.reload(board, settings, &NullReporter, &LaidOutText).clone()
    }

    #[test]
    fn test_no_board_is_empty() {
        let mut compiler = LayerCompiler::new();
        let settings = RenderSettings::default();
        let first = reload(&mut compiler, None, &settings);
        assert!(first.is_empty());
        assert_eq!(first.generation, 1);
        let second = reload(&mut compiler, None, &settings);
        assert_eq!(second.generation, 2);
        assert_eq!(compiler.generation(), 2);
    }

    #[test]
    fn test_sample_board_layers() {
        let (board, track, _) = sample_board();
        let mut compiler = LayerCompiler::new();
        let geometry = reload(&mut compiler, Some(&board), &RenderSettings::default());

        assert_eq!(geometry.stats.track_count, 1);
        assert_eq!(geometry.stats.via_count, 1);

        let front = geometry.layer(PcbLayer::FCu).expect("front copper");
        assert!(front.container.has_bvh());
        let copper = front.polygon.as_ref().expect("copper polygon");
        assert!(!copper.contains_point(BoardPoint::new(5.0 * MM, 5.0 * MM)));
        assert!(copper.contains_point(BoardPoint::new(5.0 * MM, 5.0 * MM + 0.2 * MM)));

        assert_eq!(geometry.hit_test(PcbLayer::FCu, BoardPoint::new(5.0 * MM, 2.0 * MM)), Some(track));
        assert_eq!(geometry.hit_test(PcbLayer::FCu, BoardPoint::new(5.0 * MM, 8.0 * MM)), None);

        let back = geometry.layer(PcbLayer::BCu).expect("back copper");
        let zone_point = BoardPoint::new(7.5 * MM, 7.5 * MM);
        assert!(back.polygon.as_ref().is_some_and(|p| p.contains_point(zone_point)));

        let mask = geometry.layer(PcbLayer::FMask).and_then(|g| g.polygon.as_ref()).expect("mask polygon");
        assert!(mask.area() < 100.0 * MM * MM);
        assert!(mask.area() > 99.0 * MM * MM);
        assert!(!mask.contains_point(BoardPoint::new(5.0 * MM, 5.0 * MM)));

        let body = geometry.board_body.as_ref().expect("board body");
        assert!(!body.container.is_empty());
        assert!(!geometry.holes.th_od.is_empty());
    }

    #[test]
    fn test_reload_is_repeatable() {
        let (board, _, _) = sample_board();
        let settings = RenderSettings::default();
        let mut compiler = LayerCompiler::new();
        let first = reload(&mut compiler, Some(&board), &settings);
        let second = reload(&mut compiler, Some(&board), &settings);
        assert_eq!(second.generation, first.generation + 1);
        assert_eq!(first.layers.len(), second.layers.len());
        for (layer, g) in &first.layers {
            let other = second.layer(*layer).expect("same layers");
            assert_eq!(g.container.len(), other.container.len());
        }
        assert_eq!(first.stats.objects.total(), second.stats.objects.total());
    }

    #[test]
    fn test_zone_query_blocks() {
        let (board, _, _) = sample_board();
        let settings = RenderSettings { zone_block_div_factor: Some(1.0), ..Default::default() };
        let mut compiler = LayerCompiler::new();
        let geometry = reload(&mut compiler, Some(&board), &settings);
        let back = geometry.layer(PcbLayer::BCu).expect("back copper");
        assert!(back.query.as_ref().is_some_and(|q| !q.is_empty()));
        assert!(geometry.layer(PcbLayer::FCu).is_some_and(|g| g.query.is_none()));

        let hidden = RenderSettings { show_zones: false, ..Default::default() };
        let geometry = reload(&mut compiler, Some(&board), &hidden);
        let back = geometry.layer(PcbLayer::BCu).expect("back copper");
        assert!(!back.polygon.as_ref().is_some_and(|p| p.contains_point(BoardPoint::new(7.5 * MM, 7.5 * MM))));
    }

    #[test]
    fn test_plated_copper_split() {
        let (board, _, _) = sample_board();
        let settings = RenderSettings { differentiate_plated_copper: true, ..Default::default() };
        let mut compiler = LayerCompiler::new();
        let geometry = reload(&mut compiler, Some(&board), &settings);
        let plated = geometry.plated_copper.get(&Side::Front).expect("exposed via pad");
        assert!(!plated.container.is_empty());
        let copper = geometry.layer(PcbLayer::FCu).and_then(|g| g.polygon.as_ref()).expect("copper");
        // The via pad moved to the plated layer
        assert!(!copper.contains_point(BoardPoint::new(5.0 * MM, 5.0 * MM + 0.2 * MM)));
    }
}
