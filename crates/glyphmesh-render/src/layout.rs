// this_file: crates/glyphmesh-render/src/layout.rs

//! Single-line glyph layout into quad meshes.
//!
//! Each mapped codepoint becomes one quad: four vertices, six indices. Vertices are
//! emitted bottom-left, bottom-right, top-left, top-right and wound as
//! (BL, TL, BR) + (TL, TR, BR).
//!
//! The second UV channel carries a packed corner code in `x` and the layout scale in
//! `y`; outline shaders decode both, so [`pack`] must stay bit-exact.

use glyphmesh_core::{
    Alignment, FontTable, Glyph, GlyphMeshError, KerningRecord, MeshBuffer, MissingGlyphPolicy,
    Result, TextStyle,
};

/// Unit factor applied on top of `size / point_size`; existing atlases and outline
/// shaders assume it.
pub const SCALE_FACTOR: f32 = 0.1;

/// Per-axis quantisation of a packed corner coordinate.
pub const PACK_PRECISION: f32 = 511.0;

/// Multiplier separating the packed x and y fields.
pub const PACK_STRIDE: f64 = 4096.0;

/// Layout scale for a requested point size.
pub fn layout_scale(size: f32, point_size: f32) -> f32 {
    size / point_size * SCALE_FACTOR
}

/// Pack a unit-square corner into one float: `trunc(x * 511) * 4096 + trunc(y * 511)`.
pub fn pack(x: f32, y: f32) -> f32 {
    let x = (x * PACK_PRECISION) as i32;
    let y = (y * PACK_PRECISION) as i32;
    (f64::from(x) * PACK_STRIDE + f64::from(y)) as f32
}

/// Packed corner codes in vertex order (BL, BR, TL, TR).
pub fn packed_corners() -> [f32; 4] {
    [pack(0.0, 0.0), pack(1.0, 0.0), pack(0.0, 1.0), pack(1.0, 1.0)]
}

/// Codepoint buffer for a string.
pub fn to_codepoints(text: &str) -> Vec<u32> {
    text.chars().map(u32::from).collect()
}

/// Outcome of laying out into a caller-provided buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSummary {
    /// Final cursor position before alignment
    pub advance: f32,
    /// Codepoints dropped under [`MissingGlyphPolicy::Skip`]
    pub skipped: Vec<u32>,
}

/// A finished text mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub mesh: MeshBuffer,
    pub advance: f32,
    pub skipped: Vec<u32>,
}

/// Stateless layout engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine {
    policy: MissingGlyphPolicy,
}

impl LayoutEngine {
    pub fn new(policy: MissingGlyphPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MissingGlyphPolicy {
        self.policy
    }

    /// Lay out `codepoints` into a fresh mesh.
    pub fn layout(
        &self,
        font: &FontTable,
        style: &TextStyle,
        codepoints: &[u32],
    ) -> Result<LayoutResult> {
        let mut mesh = MeshBuffer::with_glyph_capacity(codepoints.len());
        let LayoutSummary { advance, skipped } =
            self.layout_into(font, style, codepoints, &mut mesh)?;
        Ok(LayoutResult {
            mesh,
            advance,
            skipped,
        })
    }

    /// Lay out `codepoints` into `mesh`, replacing its contents and reusing its
    /// allocations. On error the mesh is left empty.
    pub fn layout_into(
        &self,
        font: &FontTable,
        style: &TextStyle,
        codepoints: &[u32],
        mesh: &mut MeshBuffer,
    ) -> Result<LayoutSummary> {
        mesh.clear();

        let (glyphs, skipped) = self.resolve_glyphs(font, codepoints)?;
        if !skipped.is_empty() {
            log::warn!(
                target: "glyphmesh::layout",
                "Skipped {} codepoint(s) missing from font '{}': {:?}",
                skipped.len(),
                font.name(),
                skipped
            );
        }

        let kerning = accumulate_kerning(font, &glyphs);
        let scale = layout_scale(style.size, font.point_size());
        let mut builder = QuadBuilder {
            mesh: &mut *mesh,
            scale,
            atlas_width: font.atlas_width(),
            atlas_height: font.atlas_height(),
            corners: packed_corners(),
            cursor: 0.0,
        };
        builder.mesh.reserve_glyphs(glyphs.len());
        for (glyph, adjustment) in glyphs.iter().zip(&kerning) {
            builder.push(glyph, adjustment);
        }
        let advance = builder.cursor;

        match style.alignment {
            Alignment::Left => {}
            Alignment::Center => mesh.translate_x(-advance / 2.0),
            Alignment::Right => mesh.translate_x(-advance),
        }
        mesh.colors.resize(mesh.positions.len(), style.color);

        Ok(LayoutSummary { advance, skipped })
    }

    /// Map codepoints to glyphs, applying the missing-glyph policy.
    fn resolve_glyphs<'f>(
        &self,
        font: &'f FontTable,
        codepoints: &[u32],
    ) -> Result<(Vec<&'f Glyph>, Vec<u32>)> {
        let mut glyphs = Vec::with_capacity(codepoints.len());
        let mut skipped = Vec::new();
        for &codepoint in codepoints {
            match font.glyph_id(codepoint).and_then(|id| font.glyph(id)) {
                Some(glyph) => glyphs.push(glyph),
                None => match self.policy {
                    MissingGlyphPolicy::Skip => skipped.push(codepoint),
                    MissingGlyphPolicy::Abort => {
                        return Err(GlyphMeshError::MissingGlyph {
                            codepoint,
                            font: font.name().to_string(),
                        })
                    }
                },
            }
        }
        Ok((glyphs, skipped))
    }
}

/// Per-glyph kerning totals. A glyph in the middle of two kerned pairs receives the
/// `second` record of the left pair plus the `first` record of the right pair.
fn accumulate_kerning(font: &FontTable, glyphs: &[&Glyph]) -> Vec<KerningRecord> {
    let mut kerning = vec![KerningRecord::default(); glyphs.len()];
    for right in 1..glyphs.len() {
        let left = right - 1;
        if let Some(pair) = font.kerning(glyphs[left].id, glyphs[right].id) {
            kerning[left] += pair.first;
            kerning[right] += pair.second;
        }
    }
    kerning
}

struct QuadBuilder<'m> {
    mesh: &'m mut MeshBuffer,
    scale: f32,
    atlas_width: f32,
    atlas_height: f32,
    corners: [f32; 4],
    cursor: f32,
}

impl QuadBuilder<'_> {
    fn push(&mut self, glyph: &Glyph, kerning: &KerningRecord) {
        let metrics = &glyph.metrics;
        let scale = self.scale;
        let width = metrics.width * scale;
        let height = metrics.height * scale;
        let x = self.cursor + (metrics.bearing_x + kerning.x_placement) * scale;
        let top = (metrics.bearing_y + kerning.y_placement) * scale;
        let bottom = top - height;

        let base = self.mesh.positions.len() as u32;
        self.mesh.positions.extend_from_slice(&[
            [x, bottom, 0.0],
            [x + width, bottom, 0.0],
            [x, top, 0.0],
            [x + width, top, 0.0],
        ]);

        let rect = &glyph.rect;
        let u0 = rect.x as f32 / self.atlas_width;
        let v0 = rect.y as f32 / self.atlas_height;
        let u1 = u0 + rect.width as f32 / self.atlas_width;
        let v1 = v0 + rect.height as f32 / self.atlas_height;
        self.mesh
            .uv0
            .extend_from_slice(&[[u0, v0], [u1, v0], [u0, v1], [u1, v1]]);

        self.mesh
            .uv1
            .extend(self.corners.iter().map(|&corner| [corner, scale]));

        self.mesh.indices.extend_from_slice(&[
            base,
            base + 2,
            base + 1,
            base + 2,
            base + 3,
            base + 1,
        ]);

        self.cursor += (metrics.advance + kerning.x_advance) * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glyphmesh_core::{
        AtlasRect, Color32, FontAsset, GlyphMetrics, KerningPair, INDICES_PER_GLYPH,
        VERTICES_PER_GLYPH,
    };

    fn glyph(id: u32, advance: f32, rect_x: u32) -> Glyph {
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
                x: rect_x,
                y: 0,
                width: 8,
                height: 8,
            },
        }
    }

    fn x_kern(first_advance: f32, second_placement: f32) -> KerningPair {
        KerningPair {
            first: KerningRecord {
                x_advance: first_advance,
                ..Default::default()
            },
            second: KerningRecord {
                x_placement: second_placement,
                ..Default::default()
            },
        }
    }

    /// 'A'(1), 'V'(2), 'W'(3) in a 64x64 atlas at 64pt; kerning on A-V and V-W.
    fn font() -> FontTable {
        let asset = FontAsset::new("Test", 64.0, 64.0, 64.0)
            .with_glyph('A' as u32, glyph(1, 10.0, 0))
            .with_glyph('V' as u32, glyph(2, 10.0, 8))
            .with_glyph('W' as u32, glyph(3, 12.0, 16))
            .with_kerning(1, 2, x_kern(-2.0, 1.0))
            .with_kerning(2, 3, x_kern(-1.0, 0.5));
        FontTable::load(&asset).unwrap()
    }

    fn left(size: f32) -> TextStyle {
        TextStyle::new(size).with_color(Color32::rgba(10, 20, 30, 40))
    }

    #[test]
    fn test_pack_constants() {
        assert_eq!(pack(0.0, 0.0), 0.0);
        assert_eq!(pack(1.0, 1.0), (511 * 4096 + 511) as f32);
        assert_eq!(pack(0.0, 1.0), 511.0);
        assert_eq!(pack(1.0, 0.0), (511 * 4096) as f32);
        // Truncation, not rounding.
        assert_eq!(pack(0.999, 0.0), (510 * 4096) as f32);
        assert_eq!(pack(0.5, 0.5), (255 * 4096 + 255) as f32);
    }

    #[test]
    fn test_packed_corners_distinct() {
        let corners = packed_corners();
        for i in 0..corners.len() {
            for j in (i + 1)..corners.len() {
                assert_ne!(corners[i], corners[j]);
            }
        }
    }

    #[test]
    fn test_scale_only_in_second_uv1_component() {
        let engine = LayoutEngine::default();
        let small = engine.layout(&font(), &left(16.0), &[65]).unwrap();
        let large = engine.layout(&font(), &left(48.0), &[65]).unwrap();
        let xs = |r: &LayoutResult| r.mesh.uv1.iter().map(|uv| uv[0]).collect::<Vec<_>>();
        assert_eq!(xs(&small), xs(&large));
        assert!(small.mesh.uv1.iter().all(|uv| uv[1] == layout_scale(16.0, 64.0)));
        assert!(large.mesh.uv1.iter().all(|uv| uv[1] == layout_scale(48.0, 64.0)));
    }

    #[test]
    fn test_worked_example_single_glyph() {
        let result = LayoutEngine::default()
            .layout(&font(), &left(32.0), &to_codepoints("A"))
            .unwrap();
        let mesh = &result.mesh;
        let scale = layout_scale(32.0, 64.0);
        assert_abs_diff_eq!(scale, 0.05, epsilon = 1e-7);

        assert_eq!(mesh.vertex_count(), 4);
        assert_abs_diff_eq!(mesh.positions[0][0], 0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(mesh.positions[0][1], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(mesh.positions[3][0], 0.45, epsilon = 1e-6);
        assert_abs_diff_eq!(mesh.positions[3][1], 0.4, epsilon = 1e-6);

        assert_eq!(mesh.uv0[0], [0.0, 0.0]);
        assert_eq!(mesh.uv0[3], [0.125, 0.125]);
        assert_eq!(mesh.indices, vec![0, 2, 1, 2, 3, 1]);
        assert_eq!(mesh.uv1[0], [0.0, scale]);
        assert_eq!(mesh.uv1[3], [pack(1.0, 1.0), scale]);
        assert_abs_diff_eq!(result.advance, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_counts_and_flat_color() {
        let text = to_codepoints("AVWAV");
        let style = left(32.0);
        let result = LayoutEngine::default().layout(&font(), &style, &text).unwrap();
        let mesh = &result.mesh;
        assert_eq!(mesh.vertex_count(), text.len() * VERTICES_PER_GLYPH);
        assert_eq!(mesh.uv0.len(), text.len() * VERTICES_PER_GLYPH);
        assert_eq!(mesh.uv1.len(), text.len() * VERTICES_PER_GLYPH);
        assert_eq!(mesh.indices.len(), text.len() * INDICES_PER_GLYPH);
        assert!(mesh.colors.iter().all(|c| *c == style.color));
        assert_eq!(mesh.colors.len(), mesh.vertex_count());
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_empty_text_yields_empty_mesh() {
        let result = LayoutEngine::new(MissingGlyphPolicy::Abort)
            .layout(&font(), &left(32.0), &[])
            .unwrap();
        assert!(result.mesh.is_empty());
        assert!(result.mesh.indices.is_empty());
        assert_eq!(result.advance, 0.0);
    }

    #[test]
    fn test_triangle_winding_is_consistent() {
        let result = LayoutEngine::default()
            .layout(&font(), &left(32.0), &to_codepoints("AV"))
            .unwrap();
        let p = &result.mesh.positions;
        for tri in result.mesh.indices.chunks_exact(3) {
            let [a, b, c] = [p[tri[0] as usize], p[tri[1] as usize], p[tri[2] as usize]];
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross < 0.0, "triangle {tri:?} has the wrong winding");
        }
    }

    #[test]
    fn test_kerning_contributions_sum() {
        let scale = layout_scale(64.0, 64.0);
        let result = LayoutEngine::default()
            .layout(&font(), &left(64.0), &to_codepoints("AVW"))
            .unwrap();
        let p = &result.mesh.positions;

        // A: no placement, advance 10 - 2.
        assert_abs_diff_eq!(p[0][0], 1.0 * scale, epsilon = 1e-6);
        // V: placement +1 from A-V, advance 10 - 1 from V-W; both apply.
        let v_origin = 8.0 * scale;
        assert_abs_diff_eq!(p[4][0], v_origin + (1.0 + 1.0) * scale, epsilon = 1e-6);
        // W: placement +0.5 from V-W.
        let w_origin = v_origin + 9.0 * scale;
        assert_abs_diff_eq!(p[8][0], w_origin + (1.0 + 0.5) * scale, epsilon = 1e-6);
        assert_abs_diff_eq!(result.advance, w_origin + 12.0 * scale, epsilon = 1e-6);
    }

    #[test]
    fn test_kerning_records_are_summed_not_overwritten() {
        let font = font();
        let glyphs: Vec<&Glyph> = [1, 2, 3].iter().map(|id| font.glyph(*id).unwrap()).collect();
        let kerning = accumulate_kerning(&font, &glyphs);
        assert_eq!(kerning[0].x_advance, -2.0);
        assert_eq!(kerning[1].x_placement, 1.0);
        assert_eq!(kerning[1].x_advance, -1.0);
        assert_eq!(kerning[2].x_placement, 0.5);
    }

    #[test]
    fn test_alignment_is_uniform_translation() {
        let engine = LayoutEngine::default();
        let text = to_codepoints("AVWA");
        let left_result = engine.layout(&font(), &left(40.0), &text).unwrap();
        let advance = left_result.advance;

        let expected = [
            (Alignment::Center, -advance / 2.0),
            (Alignment::Right, -advance),
        ];
        for (alignment, shift) in expected {
            let style = left(40.0).with_alignment(alignment);
            let aligned = engine.layout(&font(), &style, &text).unwrap();
            assert_eq!(aligned.advance, advance);
            for (a, l) in aligned.mesh.positions.iter().zip(&left_result.mesh.positions) {
                assert_abs_diff_eq!(a[0], l[0] + shift, epsilon = 1e-5);
                assert_eq!(a[1], l[1]);
                assert_eq!(a[2], l[2]);
            }
            assert_eq!(aligned.mesh.uv0, left_result.mesh.uv0);
            assert_eq!(aligned.mesh.indices, left_result.mesh.indices);
        }
    }

    #[test]
    fn test_missing_glyph_skip_policy() {
        let result = LayoutEngine::new(MissingGlyphPolicy::Skip)
            .layout(&font(), &left(32.0), &to_codepoints("A?V"))
            .unwrap();
        assert_eq!(result.mesh.glyph_count(), 2);
        assert_eq!(result.skipped, vec!['?' as u32]);

        // Skipped codepoints leave A and V adjacent, so A-V kerning applies.
        let direct = LayoutEngine::default()
            .layout(&font(), &left(32.0), &to_codepoints("AV"))
            .unwrap();
        assert_eq!(result.mesh, direct.mesh);
    }

    #[test]
    fn test_missing_glyph_abort_policy_clears_mesh() {
        let engine = LayoutEngine::new(MissingGlyphPolicy::Abort);
        let mut mesh = engine
            .layout(&font(), &left(32.0), &to_codepoints("AV"))
            .unwrap()
            .mesh;
        let err = engine
            .layout_into(&font(), &left(32.0), &to_codepoints("A\u{20AC}"), &mut mesh)
            .unwrap_err();
        assert!(matches!(
            err,
            GlyphMeshError::MissingGlyph {
                codepoint: 0x20AC,
                ..
            }
        ));
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_layout_is_idempotent() {
        let engine = LayoutEngine::default();
        let style = left(27.5).with_alignment(Alignment::Center);
        let text = to_codepoints("WAVA");
        let first = engine.layout(&font(), &style, &text).unwrap();
        let second = engine.layout(&font(), &style, &text).unwrap();
        let bits = |r: &LayoutResult| {
            r.mesh
                .positions
                .iter()
                .flatten()
                .chain(r.mesh.uv0.iter().flatten())
                .chain(r.mesh.uv1.iter().flatten())
                .map(|f| f.to_bits())
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&first), bits(&second));
        assert_eq!(first.mesh.indices, second.mesh.indices);
        assert_eq!(first.mesh.colors, second.mesh.colors);
    }

    #[test]
    fn test_layout_into_replaces_previous_content() {
        let engine = LayoutEngine::default();
        let mut mesh = MeshBuffer::default();
        engine
            .layout_into(&font(), &left(32.0), &to_codepoints("AVWAVW"), &mut mesh)
            .unwrap();
        engine
            .layout_into(&font(), &left(32.0), &to_codepoints("W"), &mut mesh)
            .unwrap();
        let fresh = engine
            .layout(&font(), &left(32.0), &to_codepoints("W"))
            .unwrap();
        assert_eq!(mesh, fresh.mesh);
    }
}
