// this_file: crates/glyphmesh-system/src/system.rs

//! Per-tick text pipeline: diff, build, commit, present.

use crate::config::SystemConfig;
use crate::pool::SlotPool;
use crate::tracker::{ChangeTracker, TextFailure, TextId, TextInput, Transform};
use glyphmesh_core::{
    CacheStats, FontAsset, FontCache, FontHandle, MaterialHandle, MeshBuffer, Result,
};
use glyphmesh_render::{BatchScheduler, LayoutEngine, PerfStats};
use log::{debug, log_enabled, Level};
use std::sync::Arc;

/// Receives finished meshes for drawing.
pub trait MeshSink {
    fn submit(
        &mut self,
        text: TextId,
        mesh: &MeshBuffer,
        material: MaterialHandle,
        transform: &Transform,
    );
}

/// Summary of one [`TextRenderSystem::update`].
#[derive(Debug, Default)]
pub struct TickReport {
    pub rebuilt: usize,
    pub released: usize,
    /// Inputs skipped for lacking text or font
    pub skipped: usize,
    pub failures: Vec<TextFailure>,
    pub slots_in_use: usize,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns the font cache, slot pool, change tracker and build scheduler of one session.
pub struct TextRenderSystem {
    // Declared before `fonts` so it drops first.
    scheduler: BatchScheduler,
    tracker: ChangeTracker,
    slots: SlotPool,
    fonts: Arc<FontCache>,
    config: SystemConfig,
}

impl TextRenderSystem {
    pub fn new(config: SystemConfig) -> Result<Self> {
        Self::with_fonts(config, Arc::new(FontCache::new()))
    }

    /// System sharing an existing font cache.
    pub fn with_fonts(config: SystemConfig, fonts: Arc<FontCache>) -> Result<Self> {
        config.validate()?;
        let engine = LayoutEngine::new(config.missing_glyph);
        let slots = SlotPool::with_capacity(config.initial_slot_capacity, config.max_slots)?;
        let scheduler = match config.worker_threads {
            Some(threads) => BatchScheduler::with_threads(engine, threads)?,
            None => BatchScheduler::new(engine)?,
        };
        log::info!(
            target: "glyphmesh::system",
            "Text render system ready (max_slots={:?}, workers={:?}, missing_glyph={:?})",
            config.max_slots,
            config.worker_threads,
            config.missing_glyph
        );
        Ok(Self {
            scheduler,
            tracker: ChangeTracker::new(),
            slots,
            fonts,
            config,
        })
    }

    /// Register a font asset with the session cache.
    pub fn register_font(&self, asset: FontAsset) -> FontHandle {
        self.fonts.register(asset)
    }

    /// Replace the asset behind `handle`, e.g. after a failed load.
    pub fn replace_font(&self, handle: FontHandle, asset: FontAsset) -> Result<()> {
        self.fonts.replace(handle, asset)
    }

    /// Run one tick: diff `inputs` against the tracked state, rebuild every dirty text
    /// and commit the meshes into their slots.
    pub fn update(&mut self, inputs: &[(TextId, TextInput)]) -> TickReport {
        let outcome = self.tracker.diff(inputs, &mut self.slots, &self.fonts);
        let mut failures = outcome.failures;

        let (owners, commands): (Vec<_>, Vec<_>) = outcome.rebuilds.into_iter().unzip();
        let results = self.scheduler.run(commands, &self.fonts);

        let mut rebuilt = 0;
        for (text, built) in owners.into_iter().zip(results) {
            let Some(state) = self.tracker.get(text) else {
                continue;
            };
            match built.result {
                Ok(layout) => {
                    self.slots.commit(built.slot, layout.mesh, state.font_index);
                    rebuilt += 1;
                }
                Err(error) => {
                    self.slots.clear(built.slot);
                    failures.push(TextFailure { text, error });
                }
            }
        }

        let report = TickReport {
            rebuilt,
            released: outcome.released,
            skipped: outcome.skipped,
            failures,
            slots_in_use: self.slots.in_use(),
        };
        if log_enabled!(target: "glyphmesh::system", Level::Debug) {
            debug!(
                target: "glyphmesh::system",
                "tick: rebuilt={} released={} skipped={} failed={} slots={}",
                report.rebuilt,
                report.released,
                report.skipped,
                report.failures.len(),
                report.slots_in_use
            );
        }
        report
    }

    /// Submit every live, non-empty mesh with its font material and latest transform.
    /// Returns the number of meshes submitted.
    pub fn present<S: MeshSink + ?Sized>(&self, sink: &mut S) -> usize {
        let mut submitted = 0;
        for (text, state) in self.tracker.iter() {
            let Some(slot) = self.slots.get(state.slot) else {
                continue;
            };
            let (Some(font), false) = (slot.last_font(), slot.mesh().is_empty()) else {
                continue;
            };
            let material = self.fonts.material(font).unwrap_or_default();
            sink.submit(text, slot.mesh(), material, &state.transform);
            submitted += 1;
        }
        submitted
    }

    /// Current mesh of a live text.
    pub fn mesh(&self, text: TextId) -> Option<&MeshBuffer> {
        let state = self.tracker.get(text)?;
        self.slots.get(state.slot).map(|slot| slot.mesh())
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn slots(&self) -> &SlotPool {
        &self.slots
    }

    pub fn fonts(&self) -> &Arc<FontCache> {
        &self.fonts
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn build_stats(&self) -> PerfStats {
        self.scheduler.stats()
    }

    pub fn font_stats(&self) -> CacheStats {
        self.fonts.stats()
    }

    /// Tear down the session: release every slot, stop the build workers, then dispose
    /// the font cache.
    pub fn shutdown(self) {
        let Self {
            scheduler,
            mut tracker,
            mut slots,
            fonts,
            ..
        } = self;
        let stats = scheduler.stats();
        tracker.clear(&mut slots);
        drop(scheduler);
        fonts.dispose();
        log::info!(
            target: "glyphmesh::system",
            "Text render system shut down after {} builds ({} failed, p99 {}us)",
            stats.builds,
            stats.failures,
            stats.p99_us
        );
    }
}
