//! 3D board geometry pipeline
//!
//! Turns a board's tracks, pads, vias, zones and drawings into per-layer 2D
//! shape containers and polygon sets, then extrudes those into triangle
//! streams for a 3D viewer.
//!
//! # Module Structure
//! - `geometry` - 2D primitives and the BVH shape container
//! - `polygon` - Board-unit polygon sets and boolean operations
//! - `tessellation` - Polygon sets to triangles or grid blocks
//! - `board` - The board data model
//! - `generation` - Per-item shape extraction
//! - `layers` - The layer compiler
//! - `display_list` - Triangle display-list extrusion and export

pub mod geometry;
pub mod polygon;
pub mod tessellation;
pub mod board;
pub mod generation;
pub mod layers;
pub mod display_list;
