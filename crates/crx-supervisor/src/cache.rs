//! Processed-file cache for incremental rebuilds.
//!
//! Keyed by asset id; an entry exists iff its asset is `Processed`. The
//! cache is owned exclusively by the supervisor and lives for the process
//! only - there is no persistence across restarts.
//!
//! Besides the processed bytes, each entry records the dependency paths the
//! runner observed while processing (an HTML page's referenced stylesheet,
//! the manifest's referenced icons). A reverse index over those paths is
//! what lets a watch event on a dependency invalidate the dependent asset.

use crate::asset::AssetId;
use crate::runner::ProcessedFile;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::path::{Path, PathBuf};

/// Result of processing one asset, plus derived bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Raw processed content.
    pub content: Vec<u8>,
    /// BLAKE3 hash of `content`, for cheap change comparison.
    pub content_hash: [u8; 32],
    /// Dependency paths observed during processing.
    pub deps: Vec<PathBuf>,
    /// Plugin-attached metadata (e.g. parsed manifest permissions).
    pub metadata: Option<serde_json::Value>,
}

/// In-memory cache of per-asset processing results.
#[derive(Debug, Default)]
pub struct ProcessedCache {
    entries: HashMap<AssetId, CacheEntry>,
    /// Reverse lookup: dependency path → assets that recorded it.
    dependents: HashMap<PathBuf, HashSet<AssetId>>,
}

impl ProcessedCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for an asset.
    ///
    /// Replacing re-indexes the dependency paths, so stale dependencies from
    /// an earlier run cannot keep invalidating the asset.
    pub fn insert(&mut self, file: &ProcessedFile) {
        if self.entries.contains_key(&file.id) {
            self.unindex_deps(&file.id);
        }

        for dep in &file.deps {
            self.dependents
                .entry(dep.clone())
                .or_default()
                .insert(file.id.clone());
        }

        let content_hash = *blake3::hash(&file.content).as_bytes();
        self.entries.insert(
            file.id.clone(),
            CacheEntry {
                content: file.content.clone(),
                content_hash,
                deps: file.deps.clone(),
                metadata: file.metadata.clone(),
            },
        );
    }

    /// Remove the entry for an asset, if present.
    pub fn remove(&mut self, id: &AssetId) -> Option<CacheEntry> {
        self.unindex_deps(id);
        self.entries.remove(id)
    }

    /// Look up the entry for an asset.
    pub fn get(&self, id: &AssetId) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    /// Whether the cache holds an entry for this asset.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.entries.contains_key(id)
    }

    /// Assets that recorded `path` as a dependency during their last
    /// successful processing.
    pub fn dependents_of(&self, path: &Path) -> Vec<AssetId> {
        self.dependents
            .get(path)
            .map(|ids| {
                let mut ids: Vec<AssetId> = ids.iter().cloned().collect();
                ids.sort();
                ids
            })
            .unwrap_or_default()
    }

    /// All cached asset ids.
    pub fn ids(&self) -> Vec<AssetId> {
        let mut ids: Vec<AssetId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn unindex_deps(&mut self, id: &AssetId) {
        if let Some(entry) = self.entries.get(id) {
            for dep in &entry.deps {
                if let Some(ids) = self.dependents.get_mut(dep) {
                    ids.remove(id);
                    if ids.is_empty() {
                        self.dependents.remove(dep);
                    }
                }
            }
        }
    }
}
