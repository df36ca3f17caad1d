// this_file: src/lib.rs

//! Glyph mesh engine: CPU text layout into quad meshes, pooled mesh slots and per-tick
//! change-driven rebuilds for real-time renderers.
//!
//! ```no_run
//! use glyphmesh::{FontAsset, SystemConfig, TextId, TextInput, TextRenderSystem};
//!
//! # fn main() -> glyphmesh::Result<()> {
//! let mut system = TextRenderSystem::new(SystemConfig::default())?;
//! let font = system.register_font(FontAsset::from_path("fonts/sans.json")?);
//! let report = system.update(&[(TextId(1), TextInput::new("Score: 0", font, 24.0))]);
//! assert!(report.is_clean());
//! # Ok(())
//! # }
//! ```

pub use glyphmesh_core::*;
pub use glyphmesh_render::{
    layout_scale, pack, packed_corners, to_codepoints, BatchResult, BatchScheduler, LayoutEngine,
    LayoutResult, LayoutSummary, PerfMetrics, PerfStats, RebuildCommand,
};
pub use glyphmesh_system::{
    ChangeTracker, MeshSink, RenderSlot, SlotPool, SystemConfig, TextId, TextInput,
    TextRenderSystem, TextState, TickReport, Transform,
};
