// this_file: crates/glyphmesh-core/src/error.rs

//! Error types for the glyphmesh engine.

use crate::types::FontHandle;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for glyphmesh operations.
#[derive(Error, Debug)]
pub enum GlyphMeshError {
    /// Malformed ingestion record. Fatal for that font until the asset is replaced.
    #[error("Invalid font asset '{asset}': {reason}")]
    InvalidFontAsset { asset: String, reason: String },

    /// Codepoint absent from the font's character table
    #[error("Codepoint U+{codepoint:04X} has no glyph in font '{font}'")]
    MissingGlyph { codepoint: u32, font: String },

    /// Slot pool reached its configured maximum
    #[error("Slot pool exhausted: all {capacity} slots are in use")]
    SlotExhaustion { capacity: usize },

    /// Requested text size is not a positive finite number
    #[error("Invalid text size {size}: must be positive and finite")]
    InvalidTextSize { size: f32 },

    /// Font handle was never registered with the cache
    #[error("Unknown font handle {handle:?}")]
    UnknownFont { handle: FontHandle },

    /// Font table index does not refer to a loaded table
    #[error("Unknown font table index {index}")]
    UnknownFontIndex { index: usize },

    /// Font cache was used after shutdown
    #[error("Font cache has been disposed")]
    CacheDisposed,

    /// Failed to read an ingestion record from disk
    #[error("Failed to read font asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid engine configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl GlyphMeshError {
    /// Malformed ingestion record.
    pub fn invalid_asset(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFontAsset {
            asset: asset.into(),
            reason: reason.into(),
        }
    }

    /// I/O failure while reading an ingestion record.
    pub fn asset_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Configuration rejected by validation.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether the failure only affects the glyph being laid out.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingGlyph { .. })
    }
}
