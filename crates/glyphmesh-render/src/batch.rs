// this_file: crates/glyphmesh-render/src/batch.rs

//! Batch mesh rebuilds for parallel text processing.
//!
//! Every command targets a distinct slot and reads only immutable font tables, so the
//! builds of one tick run as independent rayon tasks. Font tables are resolved before
//! the parallel phase; no cache lock is held while laying out.

use crate::layout::{layout_scale, LayoutEngine, LayoutResult};
use crate::perf::{PerfMetrics, PerfScope, PerfStats};
use glyphmesh_core::{
    BuildDiagnostics, FontCache, FontIndex, FontTable, GlyphMeshError, Result, SlotId, TextStyle,
};
use rayon::prelude::*;
use std::sync::Arc;

/// One text rebuild queued for this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildCommand {
    /// Slot that receives the mesh
    pub slot: SlotId,
    pub font: FontIndex,
    pub style: TextStyle,
    pub codepoints: Vec<u32>,
}

/// Result from one rebuild.
#[derive(Debug)]
pub struct BatchResult {
    pub slot: SlotId,
    /// Layout or the error that stopped it
    pub result: Result<LayoutResult>,
}

/// Runs the rebuilds of a tick, in parallel by default.
pub struct BatchScheduler {
    engine: LayoutEngine,
    pool: Option<rayon::ThreadPool>,
    metrics: PerfMetrics,
}

impl BatchScheduler {
    /// Scheduler running on the global rayon pool.
    pub fn new(engine: LayoutEngine) -> Result<Self> {
        Ok(Self {
            engine,
            pool: None,
            metrics: PerfMetrics::new()?,
        })
    }

    /// Scheduler with a dedicated pool of `num_threads` workers.
    pub fn with_threads(engine: LayoutEngine, num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("glyphmesh-build-{index}"))
            .build()
            .map_err(|err| GlyphMeshError::invalid_config(format!("build thread pool: {err}")))?;
        Ok(Self {
            engine,
            pool: Some(pool),
            metrics: PerfMetrics::new()?,
        })
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Build every command in parallel. Results come back in command order; a failed
    /// command does not affect its siblings.
    pub fn run(&self, commands: Vec<RebuildCommand>, fonts: &FontCache) -> Vec<BatchResult> {
        if commands.is_empty() {
            return Vec::new();
        }
        let jobs = Self::resolve(commands, fonts);
        let build = move || {
            jobs.into_par_iter()
                .map(|(command, table)| self.build(command, table))
                .collect::<Vec<_>>()
        };
        match &self.pool {
            Some(pool) => pool.install(build),
            None => build(),
        }
    }

    /// Build every command on the calling thread.
    pub fn run_sequential(
        &self,
        commands: Vec<RebuildCommand>,
        fonts: &FontCache,
    ) -> Vec<BatchResult> {
        Self::resolve(commands, fonts)
            .into_iter()
            .map(|(command, table)| self.build(command, table))
            .collect()
    }

    /// Latency statistics over every build so far.
    pub fn stats(&self) -> PerfStats {
        self.metrics.snapshot()
    }

    fn resolve(
        commands: Vec<RebuildCommand>,
        fonts: &FontCache,
    ) -> Vec<(RebuildCommand, Result<Arc<FontTable>>)> {
        commands
            .into_iter()
            .map(|command| {
                let table = fonts.table(command.font);
                (command, table)
            })
            .collect()
    }

    fn build(&self, command: RebuildCommand, table: Result<Arc<FontTable>>) -> BatchResult {
        let scope = PerfScope::start(&self.metrics);
        let result = table.and_then(|table| {
            let scale = layout_scale(command.style.size, table.point_size());
            BuildDiagnostics::new(
                command.slot,
                &table,
                &command.style,
                scale,
                command.codepoints.len(),
            )
            .log();
            self.engine
                .layout(&table, &command.style, &command.codepoints)
        });
        scope.finish(result.is_ok());
        if let Err(err) = &result {
            let level = if err.is_recoverable() {
                log::Level::Warn
            } else {
                log::Level::Error
            };
            log::log!(
                target: "glyphmesh::batch",
                level,
                "Rebuild of slot {} failed: {err}",
                command.slot.index()
            );
        }
        BatchResult {
            slot: command.slot,
            result,
        }
    }
}
