#![cfg_attr(docsrs, feature(doc_cfg))]

//! # crx-supervisor
//!
//! Build supervisor for multi-entry extension bundles.
//!
//! A host bundler discovers input assets (a manifest, HTML entry points,
//! referenced files) through its own synchronous hook lifecycle; the actual
//! processing happens in asynchronous, potentially failing plugin pipelines.
//! This crate reconciles the two: a single supervisor task owns the asset
//! ledger and the processed-file cache, drives pipeline episodes to
//! completion, and translates filesystem change notifications into minimal
//! cache invalidations so a later rebuild only redoes affected work.
//!
//! ## Quick start
//!
//! ```no_run
//! use crx_supervisor::{
//!     Asset, AssetOrigin, ChangeKind, FileType, HostSink, PipelineRunner, spawn,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(runner: Arc<dyn PipelineRunner>, sink: Arc<dyn HostSink>) {
//! let supervisor = spawn(runner, sink);
//!
//! supervisor.root("/project").unwrap();
//! supervisor
//!     .add_file(Asset::discovered(
//!         "/project/src/manifest.json",
//!         AssetOrigin::Input,
//!         FileType::Manifest,
//!     ))
//!     .unwrap();
//! supervisor.start().unwrap();
//!
//! // The build is not complete until every asset resolved.
//! supervisor.wait_for_watch().await.unwrap();
//!
//! // Later, from the host watcher:
//! supervisor
//!     .change("/project/src/manifest.json", ChangeKind::Updated)
//!     .unwrap();
//! # }
//! ```
//!
//! Nothing is persisted across process restarts; ledger and cache live for
//! the host session only.

pub mod asset;
pub mod cache;
pub mod error;
pub mod events;
pub mod invalidate;
pub mod ledger;
pub mod runner;
pub mod supervisor;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod testing;

pub use asset::{Asset, AssetId, AssetOrigin, AssetState, FileType};
pub use cache::{CacheEntry, ProcessedCache};
pub use error::{PipelineError, Result, SupervisorError};
pub use events::{ChangeKind, SupervisorEvent};
pub use invalidate::invalidate;
pub use ledger::{AssetLedger, AssetSnapshot};
pub use runner::{EmittedFile, EpisodeHandle, HostSink, PipelineRunner, ProcessedFile};
pub use supervisor::{LedgerReport, SupervisorHandle, SupervisorState, spawn};
