// this_file: crates/glyphmesh-core/src/lib.rs

//! Core types, font tables and the font cache for the glyphmesh text engine.

pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod font;
pub mod mesh;
pub mod types;

pub use cache::{CacheStats, FontCache};
pub use diagnostics::BuildDiagnostics;
pub use error::GlyphMeshError;
pub use font::{CharacterEntry, FontAsset, FontTable, GlyphEntry, KerningEntry};
pub use mesh::{MeshBounds, MeshBuffer, INDICES_PER_GLYPH, VERTICES_PER_GLYPH};
pub use types::{
    kerning_key, Alignment, AtlasRect, Color32, FontHandle, FontIndex, Glyph, GlyphMetrics,
    KerningPair, KerningRecord, MaterialHandle, MissingGlyphPolicy, SlotId, TextStyle,
};

/// Result type for glyphmesh operations
pub type Result<T> = std::result::Result<T, GlyphMeshError>;
