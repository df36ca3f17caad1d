// this_file: crates/glyphmesh-render/src/lib.rs

//! Layout and batch mesh building for the glyphmesh text engine.

pub mod batch;
pub mod layout;
pub mod perf;

pub use batch::{BatchResult, BatchScheduler, RebuildCommand};
pub use layout::{
    layout_scale, pack, packed_corners, to_codepoints, LayoutEngine, LayoutResult, LayoutSummary,
};
pub use perf::{PerfMetrics, PerfScope, PerfStats};
