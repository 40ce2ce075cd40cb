//! Geometry module for the 3D board pipeline
//!
//! 2D primitives in render units and the spatial container used for ray
//! casting and hit testing.
//!
//! # Submodules
//! - `point` - 2D point/vector
//! - `bbox` - Axis-aligned bounding box with ULP widening
//! - `segment` - Ray segments and contour edge normals
//! - `shapes` - The closed `Shape2D` family
//! - `container` - Shape container with a bounding volume hierarchy

mod point;
mod bbox;
mod segment;
mod shapes;
mod container;

pub use point::Point;

pub use bbox::{
    BBox2D,
    next_float_up,
    next_float_down,
};

pub use segment::{
    NORMAL_SMOOTHING_DOT,
    RaySeg2D,
    ContourEdge,
    contour_edges,
    edge_normal,
    blend_normals,
    signed_area2,
};

pub use shapes::{
    ItemId,
    BBoxClass,
    Hit,
    ShapeKind,
    ShapeGeometry,
    Shape2D,
    FilledCircle,
    Ring,
    Triangle2D,
    Polygon4Pt,
    RoundSegment,
    PolygonBlock,
    OutlineWithHoles,
    point_in_contour,
};

pub use container::{
    BVH_LEAF_SIZE,
    Container2D,
};
