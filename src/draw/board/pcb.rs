//! The board: stackup parameters, outline and items

use super::items::BoardItem;
use super::layers::PcbLayer;
use crate::draw::geometry::ItemId;
use crate::draw::polygon::PolySet;

/// Default arc approximation error, 5 µm
pub const DEFAULT_MAX_ERROR: f64 = 5_000.0;

#[derive(Debug, Clone)]
pub struct Board {
    pub copper_layer_count: usize,
    /// Maximum chord deviation for arcs and circles
    pub max_error: f64,
    pub board_thickness: f64,
    pub copper_thickness: f64,
    pub hole_plating_thickness: f64,
    pub mask_thickness: f64,
    /// Edge.Cuts outline with board cutouts as holes
    pub outline: PolySet,
    pub items: Vec<BoardItem>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            copper_layer_count: 2,
            max_error: DEFAULT_MAX_ERROR,
            board_thickness: 1_600_000.0,
            copper_thickness: 35_000.0,
            hole_plating_thickness: 20_000.0,
            mask_thickness: 20_000.0,
            outline: PolySet::new(),
            items: Vec::new(),
        }
    }
}

impl Board {
    pub fn new(copper_layer_count: usize) -> Self {
        Self { copper_layer_count: copper_layer_count.max(2), ..Default::default() }
    }

    pub fn add(&mut self, item: BoardItem) -> ItemId {
        self.items.push(item);
        ItemId((self.items.len() - 1) as u32)
    }

    pub fn item(&self, id: ItemId) -> Option<&BoardItem> {
        self.items.get(id.0 as usize)
    }

    pub fn items_with_ids(&self) -> impl Iterator<Item = (ItemId, &BoardItem)> {
        self.items.iter().enumerate().map(|(i, item)| (ItemId(i as u32), item))
    }

    pub fn copper_layers(&self) -> Vec<PcbLayer> {
        PcbLayer::copper_layers(self.copper_layer_count)
    }
}
