//! Item kind dispatch

use super::context::{layer_clearance, ShapeContext};
use super::graphics::{barcode_shapes, dimension_shapes, graphic_shapes, table_shapes, text_shapes, textbox_shapes};
use super::pads::pad_shapes;
use super::primitives::BoardShape;
use super::tracks::{arc_shapes, track_shapes, via_shapes};
use super::zones::zone_fill;
use crate::draw::board::{BoardItem, PcbLayer};

/// Shapes `item` contributes to `layer`, margins applied
pub fn item_shapes(item: &BoardItem, layer: PcbLayer, ctx: &ShapeContext) -> Vec<BoardShape> {
    if let BoardItem::Via(via) = item {
        return via_shapes(via, layer, ctx.copper_count);
    }
    if !item.is_on_layer(layer, ctx.copper_count) {
        return Vec::new();
    }
    let clearance = layer_clearance(item, layer);
    match item {
        BoardItem::Track(t) => track_shapes(t),
        BoardItem::ArcTrack(a) => arc_shapes(a, ctx.max_error),
        BoardItem::Pad(p) => pad_shapes(p, clearance, ctx.max_error),
        BoardItem::Zone(z) => zone_fill(z, layer)
            .map(|fill| vec![BoardShape::Polygon(fill.clone())])
            .unwrap_or_default(),
        BoardItem::Graphic(g) => graphic_shapes(g, clearance.0, ctx.max_error),
        BoardItem::Text(t) => text_shapes(t, ctx),
        BoardItem::TextBox(t) => textbox_shapes(t, ctx),
        BoardItem::Dimension(d) => dimension_shapes(d, ctx),
        BoardItem::Table(t) => table_shapes(t, ctx),
        BoardItem::Barcode(b) => barcode_shapes(b),
        BoardItem::Via(_) => Vec::new(),
    }
}
