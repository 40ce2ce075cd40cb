//! Display lists for a whole compiled board

use super::barrels::{barrel_segment_count, through_hole_barrels};
use super::extrude::{extrude_layer, ExtrusionContext};
use super::list::TriangleDisplayList;
use crate::draw::board::{Board, PcbLayer, Side};
use crate::draw::layers::{BoardGeometry, LayerGeometry, Stackup};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct BoardDisplayLists {
    pub layers: IndexMap<PcbLayer, TriangleDisplayList>,
    pub plated_copper: IndexMap<Side, TriangleDisplayList>,
    pub board_body: Option<TriangleDisplayList>,
    pub barrels: TriangleDisplayList,
}

impl BoardDisplayLists {
    /// Extrude every product of `geometry`. Its through-hole containers
    /// must already have their BVH, which `LayerCompiler::reload` ensures.
    pub fn build(geometry: &BoardGeometry, board: &Board) -> Self {
        let start = Instant::now();
        let scale = geometry.biu_to_3d;
        let ctx = ExtrusionContext::new(scale, board.max_error).with_through_holes(&geometry.holes.th_od.container);

        let products: Vec<&LayerGeometry> = geometry.layers.values().collect();
        let lists: Vec<TriangleDisplayList> = products.par_iter().map(|g| extrude_layer(g, &ctx)).collect();
        let layers: IndexMap<PcbLayer, TriangleDisplayList> = products.iter().map(|g| g.layer).zip(lists).collect();

        let plated_copper = geometry
            .plated_copper
            .iter()
            .map(|(side, g)| (*side, extrude_layer(g, &ctx)))
            .collect();
        let board_body = geometry.board_body.as_ref().map(|g| extrude_layer(g, &ctx));

        let stackup = Stackup::new(board, scale);
        let barrels = through_hole_barrels(
            &geometry.holes.th_id.container,
            stackup.body_z_range(),
            (board.hole_plating_thickness * scale) as f32,
            barrel_segment_count(&geometry.stats, board.max_error),
        );

        let lists = Self { layers, plated_copper, board_body, barrels };
        log::info!(
            "[DisplayList] {} layers, {} triangles in {:?}",
            lists.layers.len(),
            lists.triangle_count(),
            start.elapsed()
        );
        lists
    }

    pub fn triangle_count(&self) -> usize {
        self.layers.values().chain(self.plated_copper.values()).map(|l| l.triangle_count()).sum::<usize>()
            + self.board_body.as_ref().map_or(0, |l| l.triangle_count())
            + self.barrels.triangle_count()
    }
}
