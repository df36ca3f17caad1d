// this_file: crates/glyphmesh-core/src/font.rs

//! Font ingestion records and the immutable lookup tables built from them.
//!
//! A [`FontAsset`] is the flat, pre-resolved record produced offline from a font atlas
//! generator. [`FontTable::load`] turns it into hash maps that layout can query without
//! touching the original font file.

use crate::error::GlyphMeshError;
use crate::types::{kerning_key, AtlasRect, Glyph, GlyphMetrics, KerningPair, MaterialHandle};
use crate::Result;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Codepoint to glyph id mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub codepoint: u32,
    pub glyph: u32,
}

/// Metrics and atlas location of one glyph id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphEntry {
    pub glyph: u32,
    pub metrics: GlyphMetrics,
    pub atlas_rect: AtlasRect,
}

/// Kerning adjustments keyed by `left << 32 | right`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KerningEntry {
    pub key: u64,
    pub pair: KerningPair,
}

/// Flat font ingestion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontAsset {
    /// Display name used in logs and errors
    #[serde(default)]
    pub name: String,
    pub characters: Vec<CharacterEntry>,
    pub glyphs: Vec<GlyphEntry>,
    pub kerning: Vec<KerningEntry>,
    pub atlas_width: f32,
    pub atlas_height: f32,
    /// Point size the atlas was generated at
    pub point_size: f32,
    /// Reference scale reported by the atlas generator
    pub scale: f32,
    #[serde(default)]
    pub material: MaterialHandle,
}

impl FontAsset {
    /// Empty record for an atlas of the given size.
    pub fn new(
        name: impl Into<String>,
        atlas_width: f32,
        atlas_height: f32,
        point_size: f32,
    ) -> Self {
        Self {
            name: name.into(),
            characters: Vec::new(),
            glyphs: Vec::new(),
            kerning: Vec::new(),
            atlas_width,
            atlas_height,
            point_size,
            scale: 1.0,
            material: MaterialHandle::default(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_material(mut self, material: MaterialHandle) -> Self {
        self.material = material;
        self
    }

    /// Map `codepoint` to `glyph` and record the glyph's metrics.
    pub fn with_glyph(mut self, codepoint: u32, glyph: Glyph) -> Self {
        self.characters.push(CharacterEntry {
            codepoint,
            glyph: glyph.id,
        });
        self.glyphs.push(GlyphEntry {
            glyph: glyph.id,
            metrics: glyph.metrics,
            atlas_rect: glyph.rect,
        });
        self
    }

    /// Add a kerning pair between two glyph ids.
    pub fn with_kerning(mut self, left: u32, right: u32, pair: KerningPair) -> Self {
        self.kerning.push(KerningEntry {
            key: kerning_key(left, right),
            pair,
        });
        self
    }

    /// Parse a JSON ingestion record. `label` names the asset in errors when the record
    /// carries no name of its own.
    pub fn from_json(label: &str, bytes: &[u8]) -> Result<Self> {
        let mut asset: FontAsset = serde_json::from_slice(bytes)
            .map_err(|e| GlyphMeshError::invalid_asset(label, e.to_string()))?;
        if asset.name.is_empty() {
            asset.name = label.to_string();
        }
        Ok(asset)
    }

    /// Memory-map and parse a JSON ingestion record from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GlyphMeshError::asset_read(path, e))?;
        // SAFETY: the map is read-only and dropped before this function returns.
        let mmap = unsafe { Mmap::map(&file).map_err(|e| GlyphMeshError::asset_read(path, e))? };
        let label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_json(&label, &mmap)
    }
}

/// Immutable per-font lookup tables.
#[derive(Debug, Clone)]
pub struct FontTable {
    name: String,
    characters: HashMap<u32, u32>,
    glyphs: HashMap<u32, Glyph>,
    kerning: HashMap<u64, KerningPair>,
    atlas_width: f32,
    atlas_height: f32,
    point_size: f32,
    scale: f32,
    material: MaterialHandle,
}

fn positive(asset: &FontAsset, field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GlyphMeshError::invalid_asset(
            &asset.name,
            format!("{field} must be a positive finite number, got {value}"),
        ))
    }
}

impl FontTable {
    /// Build lookup tables from an ingestion record.
    pub fn load(asset: &FontAsset) -> Result<Self> {
        positive(asset, "atlas width", asset.atlas_width)?;
        positive(asset, "atlas height", asset.atlas_height)?;
        positive(asset, "point size", asset.point_size)?;

        let mut glyphs = HashMap::with_capacity(asset.glyphs.len());
        for entry in &asset.glyphs {
            let glyph = Glyph {
                id: entry.glyph,
                metrics: entry.metrics,
                rect: entry.atlas_rect,
            };
            if glyphs.insert(entry.glyph, glyph).is_some() {
                return Err(GlyphMeshError::invalid_asset(
                    &asset.name,
                    format!("duplicate glyph id {}", entry.glyph),
                ));
            }
        }

        let mut characters = HashMap::with_capacity(asset.characters.len());
        for entry in &asset.characters {
            if !glyphs.contains_key(&entry.glyph) {
                return Err(GlyphMeshError::invalid_asset(
                    &asset.name,
                    format!(
                        "codepoint U+{:04X} maps to glyph {} which has no metrics",
                        entry.codepoint, entry.glyph
                    ),
                ));
            }
            match characters.entry(entry.codepoint) {
                Entry::Occupied(_) => {
                    return Err(GlyphMeshError::invalid_asset(
                        &asset.name,
                        format!("duplicate codepoint U+{:04X}", entry.codepoint),
                    ))
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry.glyph);
                }
            }
        }

        let mut kerning = HashMap::with_capacity(asset.kerning.len());
        for entry in &asset.kerning {
            if kerning.insert(entry.key, entry.pair).is_some() {
                return Err(GlyphMeshError::invalid_asset(
                    &asset.name,
                    format!(
                        "duplicate kerning pair {}:{}",
                        entry.key >> 32,
                        entry.key & 0xFFFF_FFFF
                    ),
                ));
            }
        }

        log::info!(
            target: "glyphmesh::font",
            "Loaded font '{}': {} characters, {} glyphs, {} kerning pairs, atlas {}x{} at {}pt",
            asset.name,
            characters.len(),
            glyphs.len(),
            kerning.len(),
            asset.atlas_width,
            asset.atlas_height,
            asset.point_size,
        );

        Ok(Self {
            name: asset.name.clone(),
            characters,
            glyphs,
            kerning,
            atlas_width: asset.atlas_width,
            atlas_height: asset.atlas_height,
            point_size: asset.point_size,
            scale: asset.scale,
            material: asset.material,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Glyph id for a codepoint.
    pub fn glyph_id(&self, codepoint: u32) -> Option<u32> {
        self.characters.get(&codepoint).copied()
    }

    /// Metrics and atlas rect for a glyph id.
    pub fn glyph(&self, id: u32) -> Option<&Glyph> {
        self.glyphs.get(&id)
    }

    /// Kerning for the ordered pair `(left, right)`.
    pub fn kerning(&self, left: u32, right: u32) -> Option<&KerningPair> {
        self.kerning.get(&kerning_key(left, right))
    }

    pub fn atlas_width(&self) -> f32 {
        self.atlas_width
    }

    pub fn atlas_height(&self) -> f32 {
        self.atlas_height
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn kerning_pair_count(&self) -> usize {
        self.kerning.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KerningRecord;

    fn glyph(id: u32, advance: f32) -> Glyph {
        Glyph {
            id,
            metrics: GlyphMetrics {
                width: 8.0,
                height: 8.0,
                bearing_x: 1.0,
                bearing_y: 8.0,
                advance,
            },
            rect: AtlasRect {
                x: 0,
                y: 0,
                width: 8,
                height: 8,
            },
        }
    }

    fn two_glyph_asset() -> FontAsset {
        FontAsset::new("Test", 64.0, 64.0, 64.0)
            .with_material(MaterialHandle(7))
            .with_glyph('A' as u32, glyph(1, 10.0))
            .with_glyph('V' as u32, glyph(2, 9.0))
            .with_kerning(
                1,
                2,
                KerningPair {
                    first: KerningRecord {
                        x_advance: -1.0,
                        ..Default::default()
                    },
                    second: KerningRecord::default(),
                },
            )
    }

    #[test]
    fn test_load_builds_lookups() {
        let table = FontTable::load(&two_glyph_asset()).unwrap();
        assert_eq!(table.name(), "Test");
        assert_eq!(table.glyph_id('A' as u32), Some(1));
        assert_eq!(table.glyph_id('B' as u32), None);
        assert_eq!(table.glyph(2).map(|g| g.metrics.advance), Some(9.0));
        assert_eq!(table.kerning(1, 2).map(|k| k.first.x_advance), Some(-1.0));
        assert!(table.kerning(2, 1).is_none());
        assert_eq!(table.material(), MaterialHandle(7));
        assert_eq!(table.character_count(), 2);
        assert_eq!(table.kerning_pair_count(), 1);
    }

    #[test]
    fn test_load_rejects_bad_atlas() {
        let mut asset = two_glyph_asset();
        asset.atlas_width = 0.0;
        let err = FontTable::load(&asset).unwrap_err();
        assert!(matches!(err, GlyphMeshError::InvalidFontAsset { .. }));
        assert!(err.to_string().contains("atlas width"));

        let mut asset = two_glyph_asset();
        asset.point_size = f32::NAN;
        assert!(FontTable::load(&asset).is_err());
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let asset = two_glyph_asset().with_glyph('A' as u32, glyph(3, 1.0));
        let err = FontTable::load(&asset).unwrap_err();
        assert!(err.to_string().contains("duplicate codepoint U+0041"));

        let asset = two_glyph_asset().with_kerning(1, 2, KerningPair::default());
        assert!(FontTable::load(&asset)
            .unwrap_err()
            .to_string()
            .contains("duplicate kerning pair 1:2"));
    }

    #[test]
    fn test_load_rejects_dangling_character() {
        let mut asset = two_glyph_asset();
        asset.characters.push(CharacterEntry {
            codepoint: 'Z' as u32,
            glyph: 99,
        });
        let err = FontTable::load(&asset).unwrap_err();
        assert!(err.to_string().contains("glyph 99"));
    }

    #[test]
    fn test_from_json_round_trip_through_serde() {
        let json = serde_json::to_vec(&two_glyph_asset()).unwrap();
        let parsed = FontAsset::from_json("fallback", &json).unwrap();
        assert_eq!(parsed, two_glyph_asset());
    }

    #[test]
    fn test_from_json_missing_field_is_invalid_asset() {
        let json = br#"{"characters": [], "glyphs": [], "kerning": [], "atlasWidth": 64.0}"#;
        let err = FontAsset::from_json("Broken", json).unwrap_err();
        match err {
            GlyphMeshError::InvalidFontAsset { asset, reason } => {
                assert_eq!(asset, "Broken");
                assert!(reason.contains("atlasHeight"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_json_uses_label_when_unnamed() {
        let json = br#"{
            "characters": [{"codepoint": 65, "glyph": 1}],
            "glyphs": [{
                "glyph": 1,
                "metrics": {"width": 8, "height": 8, "bearingX": 1, "bearingY": 8, "advance": 10},
                "atlasRect": {"x": 0, "y": 0, "width": 8, "height": 8}
            }],
            "kerning": [],
            "atlasWidth": 64,
            "atlasHeight": 64,
            "pointSize": 64,
            "scale": 1
        }"#;
        let asset = FontAsset::from_json("Inline", json).unwrap();
        assert_eq!(asset.name, "Inline");
        let table = FontTable::load(&asset).unwrap();
        assert_eq!(table.glyph(1).map(|g| g.metrics.bearing_y), Some(8.0));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = FontAsset::from_path("/nonexistent/glyphmesh/font.json").unwrap_err();
        assert!(matches!(err, GlyphMeshError::Io { .. }));
    }
}
