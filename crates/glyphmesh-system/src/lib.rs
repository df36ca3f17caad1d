// this_file: crates/glyphmesh-system/src/lib.rs

//! Slot pool, change tracking and the per-tick rebuild pipeline of the glyphmesh text
//! engine.

pub mod config;
pub mod pool;
pub mod system;
pub mod tracker;

pub use config::SystemConfig;
pub use pool::{RenderSlot, SlotPool};
pub use system::{MeshSink, TextRenderSystem, TickReport};
pub use tracker::{
    ChangeTracker, DiffOutcome, TextFailure, TextId, TextInput, TextState, Transform, IDENTITY,
};
