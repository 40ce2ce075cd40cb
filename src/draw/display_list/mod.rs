//! Triangle display lists
//!
//! Extrudes compiled layer products into the five vertex streams the
//! renderer draws: top and bottom caps, side walls, and textured round end
//! caps on both faces.
//!
//! # Submodules
//! - `list` - Triangle streams
//! - `texture` - The shared blurred circle texture
//! - `extrude` - Per-layer and per-primitive extrusion
//! - `barrels` - Plated through-hole walls
//! - `scene` - All display lists for a compiled board
//! - `export` - Binary and base64 JSON export

mod list;
mod texture;
mod extrude;
mod barrels;
mod scene;
mod export;

pub use list::{
    UP,
    DOWN,
    Vertex,
    TexCoord,
    TriangleList,
    TriangleDisplayList,
};

pub use texture::{
    CIRCLE_TEXTURE_SIZE,
    CIRCLE_TEXTURE_BORDER,
    CircleTexture,
    disc_uv_radius,
};

pub use extrude::{
    ExtrusionContext,
    extrude_layer,
    add_polygon,
    add_shape,
    add_contour_walls,
    circle_points,
    capsule_points,
};

pub use barrels::{
    barrel_segment_count,
    through_hole_barrels,
};

pub use scene::BoardDisplayLists;

pub use export::{
    DISPLAY_LIST_MAGIC,
    STREAM_NAMES,
    StreamJson,
    DisplayListJson,
    serialize_vertices_base64,
    serialize_normals_as_base64,
    serialize_uvs_as_base64,
};
