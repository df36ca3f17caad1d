// this_file: crates/glyphmesh-system/src/tracker.rs

//! Per-text change detection.
//!
//! Each live text keeps the inputs its current mesh was requested with. Every tick the
//! host's inputs are compared against that record; only texts whose font, color,
//! alignment, size or string instance changed produce a [`RebuildCommand`]. Strings
//! compare by identity: a new `Arc<str>` with the same contents still counts as a change.

use crate::pool::SlotPool;
use glyphmesh_core::{
    Alignment, Color32, FontCache, FontHandle, FontIndex, GlyphMeshError, SlotId, TextStyle,
};
use glyphmesh_render::{to_codepoints, RebuildCommand};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Column-major 4x4 world transform.
pub type Transform = [[f32; 4]; 4];

pub const IDENTITY: Transform = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Host-assigned identity of a text object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextId(pub u64);

/// Inputs of one text object for the current tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TextInput {
    pub text: Option<Arc<str>>,
    pub font: Option<FontHandle>,
    pub size: f32,
    pub alignment: Alignment,
    pub color: Color32,
    pub transform: Transform,
}

impl TextInput {
    pub fn new(text: impl Into<Arc<str>>, font: FontHandle, size: f32) -> Self {
        Self {
            text: Some(text.into()),
            font: Some(font),
            size,
            alignment: Alignment::default(),
            color: Color32::default(),
            transform: IDENTITY,
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

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// What a live text's mesh was last requested with.
#[derive(Debug, Clone)]
pub struct TextState {
    pub slot: SlotId,
    pub font: FontHandle,
    pub font_index: FontIndex,
    pub size: f32,
    pub alignment: Alignment,
    pub color: Color32,
    pub text: Arc<str>,
    /// Latest transform; never triggers a rebuild
    pub transform: Transform,
}

impl TextState {
    fn matches(&self, font: FontHandle, text: &Arc<str>, input: &TextInput) -> bool {
        self.font == font
            && self.color == input.color
            && self.alignment == input.alignment
            && Arc::ptr_eq(&self.text, text)
            && self.size == input.size
    }

    fn style(&self) -> TextStyle {
        TextStyle::new(self.size)
            .with_alignment(self.alignment)
            .with_color(self.color)
    }
}

/// A text that could not be processed this tick.
#[derive(Debug)]
pub struct TextFailure {
    pub text: TextId,
    pub error: GlyphMeshError,
}

/// Result of one diff pass.
#[derive(Debug, Default)]
pub struct DiffOutcome {
    /// Rebuilds to run, each on a distinct slot
    pub rebuilds: Vec<(TextId, RebuildCommand)>,
    pub released: usize,
    /// Inputs without text or font
    pub skipped: usize,
    pub failures: Vec<TextFailure>,
}

/// Persistent per-text state, diffed against host inputs every tick.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    states: BTreeMap<TextId, TextState>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `inputs` against the tracked state.
    ///
    /// Texts tracked last tick but absent from `inputs` are destroyed first, so their
    /// slots are free for texts appearing in the same tick.
    pub fn diff(
        &mut self,
        inputs: &[(TextId, TextInput)],
        pool: &mut SlotPool,
        fonts: &FontCache,
    ) -> DiffOutcome {
        let mut outcome = DiffOutcome::default();

        let present: HashSet<TextId> = inputs.iter().map(|(id, _)| *id).collect();
        let before = self.states.len();
        self.states.retain(|id, state| {
            let live = present.contains(id);
            if !live {
                pool.release(state.slot);
            }
            live
        });
        outcome.released = before - self.states.len();

        let mut seen = HashSet::with_capacity(inputs.len());
        for (id, input) in inputs {
            if !seen.insert(*id) {
                log::warn!(target: "glyphmesh::system", "Duplicate input for {id:?} ignored");
                continue;
            }
            let (Some(text), Some(font)) = (&input.text, input.font) else {
                log::warn!(
                    target: "glyphmesh::system",
                    "{id:?} has no {}; skipped this tick",
                    if input.text.is_none() { "text" } else { "font" }
                );
                outcome.skipped += 1;
                continue;
            };
            if !(input.size.is_finite() && input.size > 0.0) {
                log::warn!(
                    target: "glyphmesh::system",
                    "{id:?} has size {}; kept previous mesh",
                    input.size
                );
                outcome.failures.push(TextFailure {
                    text: *id,
                    error: GlyphMeshError::InvalidTextSize { size: input.size },
                });
                continue;
            }
            let font_index = match fonts.get(font) {
                Ok(index) => index,
                Err(error) => {
                    outcome.failures.push(TextFailure { text: *id, error });
                    continue;
                }
            };

            let state = match self.states.entry(*id) {
                Entry::Occupied(entry) => {
                    let state = entry.into_mut();
                    state.transform = input.transform;
                    if state.matches(font, text, input) {
                        continue;
                    }
                    state.font = font;
                    state.font_index = font_index;
                    state.size = input.size;
                    state.alignment = input.alignment;
                    state.color = input.color;
                    state.text = Arc::clone(text);
                    state
                }
                Entry::Vacant(entry) => {
                    let slot = match pool.allocate() {
                        Ok(slot) => slot,
                        Err(error) => {
                            log::error!(target: "glyphmesh::system", "{id:?}: {error}");
                            outcome.failures.push(TextFailure { text: *id, error });
                            continue;
                        }
                    };
                    entry.insert(TextState {
                        slot,
                        font,
                        font_index,
                        size: input.size,
                        alignment: input.alignment,
                        color: input.color,
                        text: Arc::clone(text),
                        transform: input.transform,
                    })
                }
            };

            outcome.rebuilds.push((
                *id,
                RebuildCommand {
                    slot: state.slot,
                    font: state.font_index,
                    style: state.style(),
                    codepoints: to_codepoints(&state.text),
                },
            ));
        }
        outcome
    }

    pub fn get(&self, id: TextId) -> Option<&TextState> {
        self.states.get(&id)
    }

    /// Live texts in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TextId, &TextState)> {
        self.states.iter().map(|(id, state)| (*id, state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Forget every text, releasing its slot.
    pub fn clear(&mut self, pool: &mut SlotPool) {
        for state in self.states.values() {
            pool.release(state.slot);
        }
        self.states.clear();
    }
}
