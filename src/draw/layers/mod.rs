//! Layer compilation
//!
//! Builds the per-layer 2D products the renderer consumes: spatial
//! containers of item primitives, merged polygon sets, hole accumulators
//! and the board body, all rebuilt from scratch on every reload.
//!
//! # Submodules
//! - `settings` - Render switches, loadable from JSON
//! - `stackup` - Z ranges per layer
//! - `holes` - Drill, via and post-machining accumulators
//! - `workers` - Scoped worker fan-out over a shared work list
//! - `stats` - Primitive counts and running averages
//! - `reporter` - Progress message sink
//! - `output` - Compiled products and hit testing
//! - `compiler` - The reload pipeline

mod settings;
mod stackup;
mod holes;
mod workers;
mod stats;
mod reporter;
mod output;
mod compiler;

pub use settings::RenderSettings;

pub use stackup::{
    TECH_LAYER_THICKNESS,
    Stackup,
};

pub use holes::{
    CutoutKind,
    HoleProduct,
    Cutout,
    HoleSet,
};

pub use workers::fan_out;

pub use stats::{
    ObjectStats,
    CompileStats,
};

pub use reporter::{
    StatusReporter,
    NullReporter,
    LogReporter,
};

pub use output::{
    LayerGeometry,
    BoardGeometry,
};

pub use compiler::LayerCompiler;
