// this_file: crates/glyphmesh-core/src/cache.rs

//! Font table cache keyed by explicit font handles.
//!
//! Assets are registered up front and receive an opaque [`FontHandle`]. The first
//! [`FontCache::get`] for a handle builds its [`FontTable`]; later calls are lock-free
//! lookups. Tables are never evicted and are handed out as `Arc`s, so a build holding a
//! table keeps it alive even across [`FontCache::dispose`].

use crate::error::GlyphMeshError;
use crate::font::{FontAsset, FontTable};
use crate::types::{FontHandle, FontIndex, MaterialHandle};
use crate::Result;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Remembered load failure, replayed until the asset is replaced.
#[derive(Debug, Clone)]
struct LoadFailure {
    asset: String,
    reason: String,
}

impl LoadFailure {
    fn to_error(&self) -> GlyphMeshError {
        GlyphMeshError::invalid_asset(&self.asset, &self.reason)
    }
}

/// Session-scoped font table cache.
pub struct FontCache {
    /// Registered ingestion records
    assets: DashMap<FontHandle, Arc<FontAsset>>,

    /// Handle to loaded table index
    lookup: DashMap<FontHandle, FontIndex>,

    /// Handles whose last load attempt failed
    failures: DashMap<FontHandle, LoadFailure>,

    /// Loaded tables, indexed by `FontIndex`
    tables: RwLock<Vec<Arc<FontTable>>>,

    /// Serialises cache misses so a table is built once per handle
    load_lock: Mutex<()>,

    next_handle: AtomicU64,
    disposed: AtomicBool,
}

impl FontCache {
    /// Create an empty font cache
    pub fn new() -> Self {
        Self {
            assets: DashMap::new(),
            lookup: DashMap::new(),
            failures: DashMap::new(),
            tables: RwLock::new(Vec::new()),
            load_lock: Mutex::new(()),
            next_handle: AtomicU64::new(1),
            disposed: AtomicBool::new(false),
        }
    }

    /// Register an ingestion record and return its identity. Loading is deferred to the
    /// first `get`.
    pub fn register(&self, asset: FontAsset) -> FontHandle {
        let handle = FontHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        log::debug!(
            target: "glyphmesh::font",
            "Registered font '{}' as {:?}",
            asset.name,
            handle
        );
        self.assets.insert(handle, Arc::new(asset));
        handle
    }

    /// Swap the record behind a handle, clearing any remembered failure.
    ///
    /// A table that already loaded is kept for the rest of the session.
    pub fn replace(&self, handle: FontHandle, asset: FontAsset) -> Result<()> {
        if !self.assets.contains_key(&handle) {
            return Err(GlyphMeshError::UnknownFont { handle });
        }
        if self.lookup.contains_key(&handle) {
            log::warn!(
                target: "glyphmesh::font",
                "Font {:?} is already loaded; replacement '{}' ignored for this session",
                handle,
                asset.name
            );
            return Ok(());
        }
        self.failures.remove(&handle);
        self.assets.insert(handle, Arc::new(asset));
        Ok(())
    }

    /// Index of the table for `handle`, loading it on first use.
    pub fn get(&self, handle: FontHandle) -> Result<FontIndex> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(GlyphMeshError::CacheDisposed);
        }
        if let Some(index) = self.lookup.get(&handle) {
            return Ok(*index);
        }
        if let Some(failure) = self.failures.get(&handle) {
            return Err(failure.to_error());
        }

        let _guard = self.load_lock.lock();
        // Another thread may have finished the load while we waited.
        if let Some(index) = self.lookup.get(&handle) {
            return Ok(*index);
        }
        if let Some(failure) = self.failures.get(&handle) {
            return Err(failure.to_error());
        }

        let asset = self
            .assets
            .get(&handle)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(GlyphMeshError::UnknownFont { handle })?;

        match FontTable::load(&asset) {
            Ok(table) => {
                let mut tables = self.tables.write();
                let index = FontIndex(tables.len());
                tables.push(Arc::new(table));
                self.lookup.insert(handle, index);
                Ok(index)
            }
            Err(err) => {
                log::error!(target: "glyphmesh::font", "{err}");
                let reason = match &err {
                    GlyphMeshError::InvalidFontAsset { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                self.failures.insert(
                    handle,
                    LoadFailure {
                        asset: asset.name.clone(),
                        reason,
                    },
                );
                Err(err)
            }
        }
    }

    /// Shared read-only table at `index`.
    pub fn table(&self, index: FontIndex) -> Result<Arc<FontTable>> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(GlyphMeshError::CacheDisposed);
        }
        self.tables
            .read()
            .get(index.0)
            .cloned()
            .ok_or(GlyphMeshError::UnknownFontIndex { index: index.0 })
    }

    /// Material of the table at `index`.
    pub fn material(&self, index: FontIndex) -> Option<MaterialHandle> {
        self.tables.read().get(index.0).map(|table| table.material())
    }

    /// Release every table and record. Subsequent `get`/`table` calls fail with
    /// [`GlyphMeshError::CacheDisposed`].
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _guard = self.load_lock.lock();
        let released = {
            let mut tables = self.tables.write();
            let count = tables.len();
            tables.clear();
            count
        };
        self.lookup.clear();
        self.failures.clear();
        self.assets.clear();
        log::info!(target: "glyphmesh::font", "Font cache disposed, released {released} tables");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            registered: self.assets.len(),
            loaded: self.tables.read().len(),
            failed: self.failures.len(),
        }
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub registered: usize,
    pub loaded: usize,
    pub failed: usize,
}
