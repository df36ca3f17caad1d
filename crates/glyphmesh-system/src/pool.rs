// this_file: crates/glyphmesh-system/src/pool.rs

//! Array-backed pool of reusable mesh slots.
//!
//! Index 0 is allocated at construction and never handed out, so every [`SlotId`] a
//! caller holds refers to a real slot. Released slots go onto a free list and are
//! reused before the backing array grows.

use glyphmesh_core::{FontIndex, GlyphMeshError, MeshBuffer, Result, SlotId};

/// One mesh buffer plus what it was last built from.
#[derive(Debug, Default)]
pub struct RenderSlot {
    mesh: MeshBuffer,
    /// Font the mesh was built with
    last_font: Option<FontIndex>,
    allocated: bool,
}

impl RenderSlot {
    pub fn mesh(&self) -> &MeshBuffer {
        &self.mesh
    }

    pub fn last_font(&self) -> Option<FontIndex> {
        self.last_font
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    fn reset(&mut self) {
        self.mesh.clear();
        self.last_font = None;
    }
}

/// Slot pool with O(1) allocate and release.
#[derive(Debug)]
pub struct SlotPool {
    slots: Vec<RenderSlot>,
    free: Vec<SlotId>,
    max_slots: Option<usize>,
}

impl SlotPool {
    pub fn new(max_slots: Option<usize>) -> Self {
        Self {
            // Sentinel
            slots: vec![RenderSlot::default()],
            free: Vec::new(),
            max_slots,
        }
    }

    /// Pool with room for `capacity` slots before the backing array reallocates.
    pub fn with_capacity(capacity: usize, max_slots: Option<usize>) -> Result<Self> {
        let mut pool = Self::new(max_slots);
        pool.slots.try_reserve(capacity).map_err(|err| {
            GlyphMeshError::invalid_config(format!("reserve {capacity} slots: {err}"))
        })?;
        Ok(pool)
    }

    /// Hand out a free slot, growing the pool by one when none is free.
    pub fn allocate(&mut self) -> Result<SlotId> {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let capacity = self.max_slots.unwrap_or(u32::MAX as usize);
                if self.capacity() >= capacity {
                    return Err(GlyphMeshError::SlotExhaustion { capacity });
                }
                let slot = SlotId::new(self.slots.len())
                    .ok_or(GlyphMeshError::SlotExhaustion { capacity })?;
                self.slots.push(RenderSlot::default());
                slot
            }
        };
        self.slots[slot.index()].allocated = true;
        Ok(slot)
    }

    /// Return `slot` to the free list, dropping its mesh contents but keeping the
    /// allocation. Releasing a slot that is not allocated is a no-op.
    pub fn release(&mut self, slot: SlotId) {
        match self.slots.get_mut(slot.index()) {
            Some(entry) if entry.allocated => {
                entry.reset();
                entry.allocated = false;
                self.free.push(slot);
            }
            _ => {
                log::warn!(
                    target: "glyphmesh::system",
                    "Ignoring release of unallocated slot {}",
                    slot.index()
                );
            }
        }
    }

    /// Replace the mesh of an allocated slot and record its font.
    pub fn commit(&mut self, slot: SlotId, mesh: MeshBuffer, font: FontIndex) {
        if let Some(entry) = self.slots.get_mut(slot.index()).filter(|e| e.allocated) {
            entry.mesh = mesh;
            entry.last_font = Some(font);
        }
    }

    /// Empty a slot's mesh after a failed build; the slot stays allocated.
    pub fn clear(&mut self, slot: SlotId) {
        if let Some(entry) = self.slots.get_mut(slot.index()).filter(|e| e.allocated) {
            entry.reset();
        }
    }

    pub fn get(&self, slot: SlotId) -> Option<&RenderSlot> {
        self.slots.get(slot.index()).filter(|e| e.allocated)
    }

    /// Slots created so far, excluding the sentinel.
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn in_use(&self) -> usize {
        self.capacity() - self.free.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn max_slots(&self) -> Option<usize> {
        self.max_slots
    }
}

impl Default for SlotPool {
    fn default() -> Self {
        Self::new(None)
    }
}
