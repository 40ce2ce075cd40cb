//! Per-compile inputs shared by the item builders

use crate::draw::board::{BoardItem, PcbLayer, StrokeFont};

pub struct ShapeContext<'a> {
    pub max_error: f64,
    pub copper_count: usize,
    pub font: &'a dyn StrokeFont,
}

/// Margin applied to `item` on `layer`, per axis. Mask layers use the
/// mask expansion, paste layers the paste margin; everything else is drawn
/// at its nominal size.
pub fn layer_clearance(item: &BoardItem, layer: PcbLayer) -> (f64, f64) {
    match item {
        BoardItem::Pad(pad) if layer.is_mask() => pad.mask_clearance(),
        BoardItem::Pad(pad) if layer.is_paste() => pad.paste_clearance(),
        BoardItem::Graphic(g) if layer.is_mask() => (g.solder_mask_margin, g.solder_mask_margin),
        _ => (0.0, 0.0),
    }
}
