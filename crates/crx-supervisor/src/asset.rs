//! Asset data model.
//!
//! An asset is a single file tracked by the build: an entry declared by the
//! host configuration (manifest, HTML page) or a file produced while
//! processing another asset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Unique asset key: a resolved absolute path, or a synthetic identifier
/// for files that never existed on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create an asset id from a path or synthetic identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id interpreted as a filesystem path.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for AssetId {
    fn from(p: &Path) -> Self {
        Self::new(p.to_string_lossy().into_owned())
    }
}

/// How an asset entered the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetOrigin {
    /// Declared by the host build configuration.
    Input,
    /// Produced by processing another asset.
    Derived,
}

/// File type tag from a closed set.
///
/// Drives which processing plugin handles the asset; the supervisor itself
/// never interprets file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Manifest,
    Html,
    Script,
    Css,
    Image,
    Json,
    Raw,
}

impl FileType {
    /// Classify a path by extension and name.
    ///
    /// A `.json` file whose name starts with `manifest` is the extension
    /// manifest; any other `.json` is plain JSON.
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext {
            "json" if file_name.starts_with("manifest") => FileType::Manifest,
            "json" => FileType::Json,
            "html" | "htm" => FileType::Html,
            "js" | "mjs" | "ts" | "jsx" | "tsx" => FileType::Script,
            "css" => FileType::Css,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" => FileType::Image,
            _ => FileType::Raw,
        }
    }

    /// MIME type for serving or emitting this file type.
    pub fn content_type(&self) -> &'static str {
        match self {
            FileType::Manifest | FileType::Json => "application/json",
            FileType::Html => "text/html",
            FileType::Script => "application/javascript",
            FileType::Css => "text/css",
            FileType::Image => "image/*",
            FileType::Raw => "application/octet-stream",
        }
    }
}

/// Lifecycle state of an asset.
///
/// Forward path: `Discovered` → `Queued` → `Processed` | `Errored`.
/// The only way back to `Discovered` is watch invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetState {
    /// Known to the ledger, not yet part of a pipeline run.
    Discovered,
    /// Included in the in-flight pipeline run; owned by that run until it
    /// resolves.
    Queued,
    /// The pipeline returned output for this asset.
    Processed,
    /// The pipeline failed while handling this asset.
    Errored,
}

impl AssetState {
    /// Whether a batch has resolved this asset one way or the other.
    pub fn is_resolved(&self) -> bool {
        matches!(self, AssetState::Processed | AssetState::Errored)
    }
}

/// One discovered or produced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Resolved absolute path or synthetic identifier (unique ledger key).
    pub id: AssetId,
    /// How the asset was discovered.
    pub origin: AssetOrigin,
    /// File type tag.
    pub file_type: FileType,
    /// Output-name override, set when the host configuration names an entry
    /// explicitly rather than by path.
    pub file_name: Option<String>,
    /// Lifecycle state.
    pub state: AssetState,
}

impl Asset {
    /// Create a freshly discovered asset.
    pub fn discovered(id: impl Into<AssetId>, origin: AssetOrigin, file_type: FileType) -> Self {
        Self {
            id: id.into(),
            origin,
            file_type,
            file_name: None,
            state: AssetState::Discovered,
        }
    }

    /// Attach an explicit output name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}
