// this_file: fuzz/fuzz_targets/font_asset_layout.rs

#![no_main]

use glyphmesh_core::{
    Alignment, FontAsset, FontTable, MissingGlyphPolicy, TextStyle, INDICES_PER_GLYPH,
    VERTICES_PER_GLYPH,
};
use glyphmesh_render::LayoutEngine;
use libfuzzer_sys::fuzz_target;

// Input: one policy/alignment byte, then a JSON font record. Every codepoint the record
// maps, plus a few it probably does not, is laid out.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, json)) = data.split_first() else {
        return;
    };
    let Ok(asset) = FontAsset::from_json("fuzz", json) else {
        return;
    };
    let Ok(table) = FontTable::load(&asset) else {
        return;
    };

    let policy = if selector & 1 == 0 {
        MissingGlyphPolicy::Skip
    } else {
        MissingGlyphPolicy::Abort
    };
    let alignment = match (selector >> 1) % 3 {
        0 => Alignment::Left,
        1 => Alignment::Center,
        _ => Alignment::Right,
    };
    let style = TextStyle::new(f32::from(selector >> 3) + 1.0).with_alignment(alignment);

    let mut codepoints: Vec<u32> = asset.characters.iter().map(|c| c.codepoint).collect();
    codepoints.extend_from_slice(&[0x20, 0x41, 0x10FFFF]);

    if let Ok(result) = LayoutEngine::new(policy).layout(&table, &style, &codepoints) {
        let glyphs = result.mesh.glyph_count();
        assert_eq!(result.mesh.vertex_count(), glyphs * VERTICES_PER_GLYPH);
        assert_eq!(result.mesh.indices.len(), glyphs * INDICES_PER_GLYPH);
        assert_eq!(result.mesh.colors.len(), result.mesh.vertex_count());
        assert_eq!(glyphs + result.skipped.len(), codepoints.len());
    }
});
