// this_file: crates/glyphmesh-core/src/mesh.rs

//! Mesh buffers produced by layout and owned by render slots.

use crate::types::Color32;

/// Vertices emitted per glyph quad.
pub const VERTICES_PER_GLYPH: usize = 4;
/// Indices emitted per glyph quad (two triangles).
pub const INDICES_PER_GLYPH: usize = 6;

/// Triangle mesh for one text object.
///
/// All per-vertex channels have the same length; `indices` holds six entries per quad.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    pub positions: Vec<[f32; 3]>,
    /// Atlas texture coordinates
    pub uv0: Vec<[f32; 2]>,
    /// Packed corner code in `x`, layout scale in `y`
    pub uv1: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub colors: Vec<Color32>,
}

/// Axis-aligned bounds of a mesh in local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl MeshBounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

impl MeshBuffer {
    /// Empty buffer with room for `glyphs` quads.
    pub fn with_glyph_capacity(glyphs: usize) -> Self {
        let vertices = glyphs * VERTICES_PER_GLYPH;
        Self {
            positions: Vec::with_capacity(vertices),
            uv0: Vec::with_capacity(vertices),
            uv1: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(glyphs * INDICES_PER_GLYPH),
            colors: Vec::with_capacity(vertices),
        }
    }

    /// Drop all geometry, keeping allocations for reuse.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.uv0.clear();
        self.uv1.clear();
        self.indices.clear();
        self.colors.clear();
    }

    /// Grow every channel so `glyphs` more quads fit without reallocating.
    pub fn reserve_glyphs(&mut self, glyphs: usize) {
        let vertices = glyphs * VERTICES_PER_GLYPH;
        self.positions.reserve(vertices);
        self.uv0.reserve(vertices);
        self.uv1.reserve(vertices);
        self.colors.reserve(vertices);
        self.indices.reserve(glyphs * INDICES_PER_GLYPH);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn glyph_count(&self) -> usize {
        self.positions.len() / VERTICES_PER_GLYPH
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Shift every vertex along X.
    pub fn translate_x(&mut self, dx: f32) {
        for position in &mut self.positions {
            position[0] += dx;
        }
    }

    /// Bounds of all positions, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<MeshBounds> {
        let (first, rest) = self.positions.split_first()?;
        let mut bounds = MeshBounds {
            min_x: first[0],
            min_y: first[1],
            max_x: first[0],
            max_y: first[1],
        };
        for position in rest {
            bounds.min_x = bounds.min_x.min(position[0]);
            bounds.min_y = bounds.min_y.min(position[1]);
            bounds.max_x = bounds.max_x.max(position[0]);
            bounds.max_y = bounds.max_y.max(position[1]);
        }
        Some(bounds)
    }
}
