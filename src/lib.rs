//! Geometry pipeline for a 3D PCB viewer.
//!
//! ```ignore
//! let mut compiler = LayerCompiler::new();
//! let geometry = compiler.reload(Some(&board), &RenderSettings::default(), &LogReporter, &LaidOutText);
//! let lists = BoardDisplayLists::build(geometry, &board);
//! ```

pub mod draw;

pub use draw::board::{Board, BoardItem, LaidOutText, PcbLayer, Side};
pub use draw::display_list::{BoardDisplayLists, TriangleDisplayList};
pub use draw::layers::{BoardGeometry, LayerCompiler, LogReporter, NullReporter, RenderSettings};
