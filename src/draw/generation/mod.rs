//! Per-item shape extraction
//!
//! Turns board items into board-unit primitives for one target layer. The
//! same primitive list feeds both the layer's spatial container and its
//! polygon set.
//!
//! # Submodules
//! - `context` - Shared inputs and per-layer margin resolution
//! - `primitives` - `BoardShape` and its container/polygon conversions
//! - `tracks` - Tracks, arcs and vias
//! - `pads` - Pad effective shapes, clearance handling and drills
//! - `zones` - Zone fills as triangles or query blocks
//! - `graphics` - Graphic shapes, text and the other drawing items
//! - `dispatch` - Item kind dispatch

mod context;
mod primitives;
mod tracks;
mod pads;
mod zones;
mod graphics;
mod dispatch;

pub use context::{
    ShapeContext,
    layer_clearance,
};

pub use primitives::{
    BoardShape,
    add_shapes_to_container,
    add_shapes_to_polyset,
    shapes_to_polyset,
};

pub use tracks::{
    track_shapes,
    arc_shapes,
    via_shapes,
};

pub use pads::{
    pad_effective_shapes,
    pad_shapes,
    drill_shape,
    rounded_rect_contour,
};

pub use zones::{
    zone_fill,
    add_zone_triangles,
    add_zone_blocks,
};

pub use graphics::{
    graphic_shapes,
    text_shapes,
    textbox_shapes,
    dimension_shapes,
    table_shapes,
    barcode_shapes,
    bezier_points,
};

pub use dispatch::item_shapes;
