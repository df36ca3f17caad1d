// this_file: crates/glyphmesh-core/src/types.rs

//! Core types used throughout the glyphmesh engine.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::ops::{Add, AddAssign};

/// Opaque identity of a registered font asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontHandle(pub(crate) u64);

impl FontHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Index of a loaded [`FontTable`](crate::FontTable) inside the font cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontIndex(pub(crate) usize);

impl FontIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Opaque reference to the material that samples a font's atlas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialHandle(pub u64);

/// Index of a mesh slot. Slot 0 is the unassigned sentinel and cannot be represented,
/// so an unassigned text holds `Option<SlotId>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(NonZeroU32);

impl SlotId {
    /// Returns `None` for the sentinel index 0 or an index that does not fit in 32 bits.
    pub fn new(index: usize) -> Option<Self> {
        u32::try_from(index).ok().and_then(NonZeroU32::new).map(Self)
    }

    pub fn index(self) -> usize {
        self.0.get() as usize
    }
}

/// Horizontal alignment of a single line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// What layout does with a codepoint the font cannot map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingGlyphPolicy {
    /// Drop the codepoint and keep laying out the rest
    #[default]
    Skip,
    /// Fail the whole text
    Abort,
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color32 {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Per-glyph metrics in font units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphMetrics {
    pub width: f32,
    pub height: f32,
    pub bearing_x: f32,
    pub bearing_y: f32,
    pub advance: f32,
}

/// Region of the font atlas holding a glyph, in atlas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A renderable glyph: metrics plus atlas location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Glyph ID in the font
    pub id: u32,
    pub metrics: GlyphMetrics,
    pub rect: AtlasRect,
}

/// Positioning adjustment applied to one member of a kerning pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KerningRecord {
    pub x_placement: f32,
    pub y_placement: f32,
    pub x_advance: f32,
    pub y_advance: f32,
}

impl Add for KerningRecord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x_placement: self.x_placement + rhs.x_placement,
            y_placement: self.y_placement + rhs.y_placement,
            x_advance: self.x_advance + rhs.x_advance,
            y_advance: self.y_advance + rhs.y_advance,
        }
    }
}

impl AddAssign for KerningRecord {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Adjustments for the left (`first`) and right (`second`) glyph of a pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KerningPair {
    pub first: KerningRecord,
    pub second: KerningRecord,
}

/// Kerning map key for the ordered glyph pair `(left, right)`.
pub fn kerning_key(left: u32, right: u32) -> u64 {
    (u64::from(left) << 32) | u64::from(right)
}

/// Style inputs of a single text layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Requested point size
    pub size: f32,
    pub alignment: Alignment,
    pub color: Color32,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            alignment: Alignment::Left,
            color: Color32::WHITE,
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }
}
