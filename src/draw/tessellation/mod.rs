//! Tessellation module for the 3D board pipeline
//!
//! Converts polygon sets in board units into render-unit shapes, either as
//! flat triangles for rendering or as grid blocks for fast ray queries over
//! large fills.
//!
//! # Submodules
//! - `convert` - Board to render unit conversion with orientation fix-up
//! - `triangles` - Earcut triangulation into triangle shapes
//! - `blocks` - Grid subdivision into dummy and boundary blocks
//! - `dashes` - Dashed/dotted stroke cutting

mod convert;
mod triangles;
mod blocks;
mod dashes;

pub use convert::{
    board_to_render,
    render_contours,
};

pub use triangles::convert_polygon_to_triangles;

pub use blocks::{
    MAX_BLOCK_DIVISIONS,
    convert_polygon_to_blocks,
    grid_divisions,
};

pub use dashes::{
    DASH_LENGTH_RATIO,
    GAP_LENGTH_RATIO,
    DOT_LENGTH_RATIO,
    LineStyle,
    dash_pattern,
    stroke_polyline,
    stroke_segment,
};
