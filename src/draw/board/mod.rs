//! Board data model
//!
//! The read-only view of a PCB the compiler consumes: layers, items with
//! their drill and margin attributes, and the stroke font collaborator.
//!
//! # Submodules
//! - `layers` - Layer identifiers and board faces
//! - `items` - Tracks, vias, pads, zones, graphics and text items
//! - `font` - Glyph callbacks for stroke text
//! - `pcb` - The `Board` itself

mod layers;
mod items;
mod font;
mod pcb;

pub use layers::{
    MAX_INNER_LAYERS,
    TECHNICAL_LAYERS,
    PcbLayer,
    Side,
};

pub use items::{
    Track,
    ArcTrack,
    ViaKind,
    Via,
    PostMachiningKind,
    PostMachining,
    Backdrill,
    DrillMachining,
    PadAnchor,
    PadShape,
    DrillShape,
    PadDrill,
    Pad,
    Zone,
    GraphicKind,
    GraphicShape,
    Text,
    TextBox,
    Dimension,
    Table,
    Barcode,
    BoardItem,
};

pub use font::{
    GlyphSink,
    StrokeFont,
    LaidOutText,
};

pub use pcb::{
    DEFAULT_MAX_ERROR,
    Board,
};
