//! Input classification and rewriting.
//!
//! The host hands its configured entry list to the `options` hook in one of
//! three shapes: a single path, a list of paths, or a name→path map. Entries
//! the asset pipeline should own (the manifest and HTML pages) are routed
//! out as discovered assets; whatever remains is handed back to the host,
//! falling back to the stub entry when nothing remains.

use crate::stub::STUB_ID;
use crx_supervisor::{Asset, AssetOrigin, FileType};
use indexmap::IndexMap;
use std::path::Path;

/// Host entry configuration, in any of the host's three shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleInput {
    /// A single entry path.
    Single(String),
    /// A list of entry paths.
    List(Vec<String>),
    /// Explicitly named entries (output name → path), in declaration order.
    Map(IndexMap<String, String>),
}

impl BundleInput {
    /// The stub-only input returned when every real entry was routed away.
    fn stub() -> Self {
        BundleInput::List(vec![STUB_ID.to_string()])
    }
}

/// Result of routing one input configuration.
#[derive(Debug)]
pub struct RoutedInput {
    /// Assets to report to the supervisor, in declaration order.
    pub assets: Vec<Asset>,
    /// The input to hand back to the host.
    pub remaining: BundleInput,
}

fn is_manifest_name(id: &str) -> bool {
    Path::new(id)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with("manifest"))
}

fn is_html(id: &str) -> bool {
    FileType::from_path(Path::new(id)) == FileType::Html
}

/// Split an input configuration into pipeline assets and host entries.
///
/// - A single path is the manifest - the whole bundle hangs off it.
/// - In a list, HTML entries and `manifest*`-named entries are routed; other
///   entries stay with the host.
/// - In a map, HTML values are routed carrying their explicit output name;
///   the entry named exactly `manifest` is routed as the manifest.
///
/// When routing consumed every entry, `remaining` is the stub-only input.
pub fn route_input(input: BundleInput) -> RoutedInput {
    let mut assets = Vec::new();

    let remaining = match input {
        BundleInput::Single(id) => {
            assets.push(Asset::discovered(
                id.as_str(),
                AssetOrigin::Input,
                FileType::Manifest,
            ));
            BundleInput::stub()
        }
        BundleInput::List(ids) => {
            let mut kept = Vec::new();
            for id in ids {
                if is_html(&id) {
                    assets.push(Asset::discovered(
                        id.as_str(),
                        AssetOrigin::Input,
                        FileType::Html,
                    ));
                } else if is_manifest_name(&id) {
                    assets.push(Asset::discovered(
                        id.as_str(),
                        AssetOrigin::Input,
                        FileType::Manifest,
                    ));
                } else {
                    kept.push(id);
                }
            }
            if kept.is_empty() {
                BundleInput::stub()
            } else {
                BundleInput::List(kept)
            }
        }
        BundleInput::Map(entries) => {
            let mut kept = IndexMap::new();
            for (file_name, id) in entries {
                if is_html(&id) {
                    assets.push(
                        Asset::discovered(id.as_str(), AssetOrigin::Input, FileType::Html)
                            .with_file_name(file_name),
                    );
                } else if file_name == "manifest" {
                    assets.push(Asset::discovered(
                        id.as_str(),
                        AssetOrigin::Input,
                        FileType::Manifest,
                    ));
                } else {
                    kept.insert(file_name, id);
                }
            }
            if kept.is_empty() {
                BundleInput::stub()
            } else {
                BundleInput::Map(kept)
            }
        }
    };

    RoutedInput { assets, remaining }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_input_is_the_manifest() {
        let routed = route_input(BundleInput::Single("/src/manifest.json".into()));

        assert_eq!(routed.assets.len(), 1);
        assert_eq!(routed.assets[0].file_type, FileType::Manifest);
        assert_eq!(routed.remaining, BundleInput::stub());
    }

    #[test]
    fn test_list_routes_html_and_manifest() {
        let routed = route_input(BundleInput::List(vec![
            "/src/manifest.json".into(),
            "/src/popup.html".into(),
            "/src/worker.ts".into(),
        ]));

        let types: Vec<FileType> = routed.assets.iter().map(|a| a.file_type).collect();
        assert_eq!(types, vec![FileType::Manifest, FileType::Html]);
        assert_eq!(
            routed.remaining,
            BundleInput::List(vec!["/src/worker.ts".to_string()])
        );
    }

    #[test]
    fn test_list_fully_routed_falls_back_to_stub() {
        let routed = route_input(BundleInput::List(vec![
            "/src/manifest.json".into(),
            "/src/popup.html".into(),
        ]));

        assert_eq!(routed.remaining, BundleInput::stub());
    }

    #[test]
    fn test_map_carries_explicit_file_names() {
        let mut entries = IndexMap::new();
        entries.insert("popup".to_string(), "/src/popup.html".to_string());
        entries.insert("manifest".to_string(), "/src/manifest.json".to_string());
        entries.insert("worker".to_string(), "/src/worker.ts".to_string());

        let routed = route_input(BundleInput::Map(entries));

        assert_eq!(routed.assets.len(), 2);
        assert_eq!(routed.assets[0].file_name.as_deref(), Some("popup"));
        assert_eq!(routed.assets[1].file_type, FileType::Manifest);
        // The manifest entry keeps no explicit output name.
        assert_eq!(routed.assets[1].file_name, None);

        match routed.remaining {
            BundleInput::Map(kept) => {
                assert_eq!(kept.len(), 1);
                assert_eq!(kept.get("worker").unwrap(), "/src/worker.ts");
            }
            other => panic!("expected map input, got {other:?}"),
        }
    }

    #[test]
    fn test_manifest_detection_is_name_based_in_lists() {
        // A manifest declared without the .json classification still routes
        // by name, matching the host-side convention.
        let routed = route_input(BundleInput::List(vec!["/src/manifest.config".into()]));
        assert_eq!(routed.assets.len(), 1);
        assert_eq!(routed.assets[0].file_type, FileType::Manifest);
    }
}
