//! Polygon sets in board units
//!
//! # Submodules
//! - `polyset` - Polygon-with-holes set with boolean operations and earcut triangulation
//! - `circle` - Circle/arc chord counts and contour builders

mod polyset;
mod circle;

pub use polyset::{
    BoardPoint,
    PolySet,
    union_all,
};

pub use circle::{
    MIN_SEGMENTS_PER_CIRCLE,
    MAX_SEGMENTS_PER_CIRCLE,
    arc_segment_count,
    circle_segment_count,
    circle_contour,
    circle_polygon,
    segment_polygon,
    arc_points,
    contour_to_polygon,
};
