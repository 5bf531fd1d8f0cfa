//! Watch invalidation: translate a changed path into the minimal set of
//! ledger/cache evictions.
//!
//! A changed path either is a tracked asset itself, is a recorded dependency
//! of one or more processed assets, or is outside the known asset graph
//! entirely. Only the first two evict anything; the third is expected and
//! ignored.

use crate::asset::AssetId;
use crate::cache::ProcessedCache;
use crate::ledger::AssetLedger;
use std::path::Path;
use tracing::debug;

/// Invalidate whatever the changed path affects.
///
/// Returns the ids reverted to `Discovered`; an empty vec means the change
/// was outside the asset graph. Unrelated entries are never touched.
pub fn invalidate(
    ledger: &mut AssetLedger,
    cache: &mut ProcessedCache,
    changed_path: &Path,
) -> Vec<AssetId> {
    let direct = AssetId::from(changed_path);

    // Direct hit: the changed file is a tracked asset.
    if ledger.get(&direct).is_some() {
        evict(ledger, cache, &direct);
        debug!(asset = %direct, "invalidated changed asset");
        return vec![direct];
    }

    // Dependency hit: some processed asset recorded this path during its
    // last run.
    let dependents = cache.dependents_of(changed_path);
    if dependents.is_empty() {
        debug!(path = %changed_path.display(), "change outside asset graph, ignored");
        return Vec::new();
    }

    for id in &dependents {
        evict(ledger, cache, id);
        debug!(asset = %id, dep = %changed_path.display(), "invalidated dependent asset");
    }
    dependents
}

fn evict(ledger: &mut AssetLedger, cache: &mut ProcessedCache, id: &AssetId) {
    cache.remove(id);
    // The id came from the ledger or the cache's dep index; a miss here is a
    // bookkeeping inconsistency worth logging, not an error for the host.
    if let Err(err) = ledger.mark_discovered(id) {
        debug!(%err, "invalidation hit an id the ledger does not know");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, AssetOrigin, AssetState, FileType};
    use crate::runner::ProcessedFile;
    use std::path::PathBuf;

    fn world() -> (AssetLedger, ProcessedCache) {
        let mut ledger = AssetLedger::new();
        let mut cache = ProcessedCache::new();

        for (id, file_type, deps) in [
            ("/src/manifest.json", FileType::Manifest, vec![]),
            (
                "/src/index.html",
                FileType::Html,
                vec!["/src/content.css"],
            ),
        ] {
            ledger.add_or_update(Asset::discovered(id, AssetOrigin::Input, file_type));
            ledger.mark_processed(&AssetId::new(id)).unwrap();
            cache.insert(&ProcessedFile {
                id: AssetId::new(id),
                file_name: None,
                content: b"out".to_vec(),
                deps: deps.into_iter().map(PathBuf::from).collect(),
                metadata: None,
            });
        }

        (ledger, cache)
    }

    #[test]
    fn test_direct_match_evicts_exactly_one() {
        let (mut ledger, mut cache) = world();

        let hit = invalidate(&mut ledger, &mut cache, Path::new("/src/index.html"));
        assert_eq!(hit, vec![AssetId::new("/src/index.html")]);

        let index = ledger.get(&AssetId::new("/src/index.html")).unwrap();
        assert_eq!(index.state, AssetState::Discovered);
        assert!(!cache.contains(&AssetId::new("/src/index.html")));

        // Unrelated entry untouched.
        let manifest = ledger.get(&AssetId::new("/src/manifest.json")).unwrap();
        assert_eq!(manifest.state, AssetState::Processed);
        assert!(cache.contains(&AssetId::new("/src/manifest.json")));
    }

    #[test]
    fn test_dependency_match_evicts_dependent() {
        let (mut ledger, mut cache) = world();

        let hit = invalidate(&mut ledger, &mut cache, Path::new("/src/content.css"));
        assert_eq!(hit, vec![AssetId::new("/src/index.html")]);

        let index = ledger.get(&AssetId::new("/src/index.html")).unwrap();
        assert_eq!(index.state, AssetState::Discovered);
        // The dependency itself has no ledger entry and none was created.
        assert!(ledger.get(&AssetId::new("/src/content.css")).is_none());
    }

    #[test]
    fn test_unknown_path_is_noop() {
        let (mut ledger, mut cache) = world();

        let hit = invalidate(&mut ledger, &mut cache, Path::new("/elsewhere/readme.md"));
        assert!(hit.is_empty());
        assert_eq!(cache.len(), 2);
        assert!(ledger.iter().all(|a| a.state == AssetState::Processed));
    }
}
