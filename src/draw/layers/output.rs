//! Compiled geometry products

use super::holes::HoleSet;
use super::stats::CompileStats;
use crate::draw::board::{PcbLayer, Side};
use crate::draw::geometry::{Container2D, ItemId};
use crate::draw::polygon::{BoardPoint, PolySet};
use crate::draw::tessellation::board_to_render;
use indexmap::IndexMap;

/// One layer's products
#[derive(Debug, Clone)]
pub struct LayerGeometry {
    pub layer: PcbLayer,
    /// Item primitives in render units, with their source items
    pub container: Container2D,
    /// Merged outline in board units; caps and side walls come from here
    /// when present
    pub polygon: Option<PolySet>,
    /// Grid-block zone fills for fast point queries
    pub query: Option<Container2D>,
    pub z_bottom: f32,
    pub z_top: f32,
}

impl LayerGeometry {
    pub fn new(layer: PcbLayer, z_range: (f32, f32)) -> Self {
        Self { layer, container: Container2D::new(), polygon: None, query: None, z_bottom: z_range.0, z_top: z_range.1 }
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty() && self.polygon.as_ref().map_or(true, |p| p.is_empty())
    }
}

/// Everything one reload produces
#[derive(Debug, Clone, Default)]
pub struct BoardGeometry {
    pub generation: u64,
    pub biu_to_3d: f64,
    pub layers: IndexMap<PcbLayer, LayerGeometry>,
    /// Copper exposed by the mask, split off the copper layers
    pub plated_copper: IndexMap<Side, LayerGeometry>,
    /// Board outline minus holes, between the outer copper faces
    pub board_body: Option<LayerGeometry>,
    pub holes: HoleSet,
    pub stats: CompileStats,
}

impl BoardGeometry {
    pub fn empty(generation: u64, biu_to_3d: f64) -> Self {
        Self { generation, biu_to_3d, ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.board_body.is_none()
    }

    pub fn layer(&self, layer: PcbLayer) -> Option<&LayerGeometry> {
        self.layers.get(&layer)
    }

    /// Item owning the topmost primitive under `point` on `layer`
    pub fn hit_test(&self, layer: PcbLayer, point: BoardPoint) -> Option<ItemId> {
        let geometry = self.layers.get(&layer)?;
        let p = board_to_render(point, self.biu_to_3d);
        geometry
            .container
            .topmost_at(p)
            .and_then(|shape| shape.source())
            .or_else(|| {
                geometry
                    .query
                    .as_ref()
                    .and_then(|q| q.topmost_at(p))
                    .and_then(|shape| shape.source())
            })
    }
}
