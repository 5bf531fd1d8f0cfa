//! Asset ledger: the authoritative in-memory record of every known asset.
//!
//! The ledger is owned exclusively by the supervisor task. Other components
//! only ever see an immutable [`AssetSnapshot`], so an in-flight pipeline
//! episode cannot observe mutations that happen after its snapshot was taken.

use crate::asset::{Asset, AssetId, AssetState};
use crate::error::{Result, SupervisorError};
use indexmap::IndexMap;

/// Immutable copy of the asset set handed to a pipeline episode.
///
/// Assets appear in arrival order and are all `Queued` when the snapshot is
/// taken for a run.
#[derive(Debug, Clone, Default)]
pub struct AssetSnapshot {
    assets: Vec<Asset>,
}

impl AssetSnapshot {
    /// Iterate over the snapshot's assets.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    /// Number of assets in the snapshot.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Look up one asset by id.
    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| &a.id == id)
    }
}

impl<'a> IntoIterator for &'a AssetSnapshot {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}

/// Arrival-ordered registry of all known assets.
///
/// Keys are unique: re-adding an id merges fields into the existing entry
/// instead of duplicating it.
#[derive(Debug, Default)]
pub struct AssetLedger {
    assets: IndexMap<AssetId, Asset>,
}

impl AssetLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new asset, or merge fields into an existing entry.
    ///
    /// Merging is last-write-wins for `origin`, `file_type` and `file_name`
    /// and never touches lifecycle state: a `Queued` asset belongs to the
    /// in-flight episode, a resolved asset stays resolved. State moves only
    /// through [`queue_all`](Self::queue_all), the `mark_*` transitions, and
    /// [`invalidate`](crate::invalidate::invalidate).
    pub fn add_or_update(&mut self, asset: Asset) {
        match self.assets.get_mut(&asset.id) {
            Some(existing) => {
                existing.origin = asset.origin;
                existing.file_type = asset.file_type;
                if asset.file_name.is_some() {
                    existing.file_name = asset.file_name;
                }
            }
            None => {
                self.assets.insert(asset.id.clone(), asset);
            }
        }
    }

    /// Take an immutable snapshot of all known assets, in arrival order.
    pub fn snapshot(&self) -> AssetSnapshot {
        AssetSnapshot {
            assets: self.assets.values().cloned().collect(),
        }
    }

    /// Move every asset into `Queued` for a new pipeline episode.
    pub fn queue_all(&mut self) {
        for asset in self.assets.values_mut() {
            asset.state = AssetState::Queued;
        }
    }

    /// Mark an asset as processed.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::UnknownAsset`] if the id is absent. Given
    /// the running state's exclusivity this should not occur; callers treat
    /// it as a logged inconsistency.
    pub fn mark_processed(&mut self, id: &AssetId) -> Result<()> {
        self.transition(id, AssetState::Processed)
    }

    /// Mark an asset as errored.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::UnknownAsset`] if the id is absent.
    pub fn mark_errored(&mut self, id: &AssetId) -> Result<()> {
        self.transition(id, AssetState::Errored)
    }

    /// Revert an asset to `Discovered`. Used only by invalidation.
    pub(crate) fn mark_discovered(&mut self, id: &AssetId) -> Result<()> {
        self.transition(id, AssetState::Discovered)
    }

    fn transition(&mut self, id: &AssetId, state: AssetState) -> Result<()> {
        let asset = self
            .assets
            .get_mut(id)
            .ok_or_else(|| SupervisorError::UnknownAsset(id.clone()))?;
        asset.state = state;
        Ok(())
    }

    /// Look up one asset by id.
    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Iterate over all assets in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Assets still `Queued` (owned by the in-flight episode).
    pub fn queued(&self) -> impl Iterator<Item = &Asset> {
        self.assets
            .values()
            .filter(|a| a.state == AssetState::Queued)
    }

    /// Number of known assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetOrigin, FileType};

    fn asset(id: &str, file_type: FileType) -> Asset {
        Asset::discovered(id, AssetOrigin::Input, file_type)
    }

    #[test]
    fn test_add_preserves_arrival_order() {
        let mut ledger = AssetLedger::new();
        ledger.add_or_update(asset("/src/manifest.json", FileType::Manifest));
        ledger.add_or_update(asset("/src/index.html", FileType::Html));
        ledger.add_or_update(asset("/src/options.html", FileType::Html));

        let ids: Vec<&str> = ledger.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["/src/manifest.json", "/src/index.html", "/src/options.html"]
        );
    }

    #[test]
    fn test_readd_updates_without_duplicating() {
        let mut ledger = AssetLedger::new();
        ledger.add_or_update(asset("/src/index.html", FileType::Html));
        ledger.add_or_update(
            asset("/src/index.html", FileType::Html).with_file_name("popup"),
        );

        assert_eq!(ledger.len(), 1);
        let entry = ledger.get(&AssetId::new("/src/index.html")).unwrap();
        assert_eq!(entry.file_name.as_deref(), Some("popup"));
    }

    #[test]
    fn test_update_cannot_regress_processed_state() {
        let mut ledger = AssetLedger::new();
        ledger.add_or_update(asset("/src/index.html", FileType::Html));
        ledger
            .mark_processed(&AssetId::new("/src/index.html"))
            .unwrap();

        // A late re-discovery must not undo the processed state.
        ledger.add_or_update(asset("/src/index.html", FileType::Html));
        let entry = ledger.get(&AssetId::new("/src/index.html")).unwrap();
        assert_eq!(entry.state, AssetState::Processed);
    }

    #[test]
    fn test_update_cannot_regress_queued_state() {
        let mut ledger = AssetLedger::new();
        ledger.add_or_update(asset("/src/index.html", FileType::Html));
        ledger.queue_all();

        // Re-discovery mid-episode must leave the asset queued; the running
        // episode owns it until a result or an invalidation arrives.
        ledger.add_or_update(asset("/src/index.html", FileType::Html));
        let entry = ledger.get(&AssetId::new("/src/index.html")).unwrap();
        assert_eq!(entry.state, AssetState::Queued);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let mut ledger = AssetLedger::new();
        ledger.add_or_update(asset("/src/manifest.json", FileType::Manifest));
        let snapshot = ledger.snapshot();

        ledger.add_or_update(asset("/src/late.html", FileType::Html));
        ledger
            .mark_errored(&AssetId::new("/src/manifest.json"))
            .unwrap();

        assert_eq!(snapshot.len(), 1);
        let asset = snapshot.get(&AssetId::new("/src/manifest.json")).unwrap();
        assert_eq!(asset.state, AssetState::Discovered);
    }

    #[test]
    fn test_queue_all() {
        let mut ledger = AssetLedger::new();
        ledger.add_or_update(asset("/src/manifest.json", FileType::Manifest));
        ledger.add_or_update(asset("/src/index.html", FileType::Html));
        ledger.queue_all();

        assert_eq!(ledger.queued().count(), 2);
    }

    #[test]
    fn test_mark_unknown_asset_fails() {
        let mut ledger = AssetLedger::new();
        let err = ledger
            .mark_processed(&AssetId::new("/nope.html"))
            .unwrap_err();
        assert!(matches!(err, SupervisorError::UnknownAsset(_)));
    }
}
