//! File watcher and change-coalescing worker for meta-react.
//!
//! The watcher turns filesystem notifications into [`FileEvent`]s on a tokio
//! channel; the worker turns a stream of paths into at most one pending
//! validation per path, processed on a single background thread.
//!
//! # Architecture
//!
//! ```text
//! notify thread ──► FileFilter ──► mpsc ──► select! loop ──► CoalescingWorker
//!                                                              │
//!                                              settle, pop ◄───┘
//!                                                  │
//!                                                  ▼
//!                                            PathHandler (rewriter)
//! ```
//!
//! # Crate Dependencies
//!
//! ```text
//! mr-cli ──► mr-watcher ──► mr-core
//!        └─► mr-scanner ──► mr-codegen ──► mr-core
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use camino::Utf8Path;
//! use mr_core::{WatchConfig, WorkerConfig};
//! use mr_watcher::{CoalescingWorker, ExtensionFilter, FileWatcher};
//!
//! # async fn example() -> Result<(), mr_watcher::WatchError> {
//! let revalidate = |path: &Utf8Path| -> anyhow::Result<()> {
//!     println!("revalidate {path}");
//!     Ok(())
//! };
//! let worker = CoalescingWorker::spawn(&WorkerConfig::default(), revalidate)?;
//!
//! let mut watcher = FileWatcher::new(
//!     Utf8Path::new("./scenes"),
//!     &WatchConfig::default(),
//!     ExtensionFilter::new(&["cs"]),
//! ).await?;
//!
//! while let Some(event) = watcher.recv().await {
//!     worker.enqueue(event.path);
//! }
//!
//! watcher.shutdown().await?;
//! worker.shutdown()
//! # }
//! ```
//!
//! # Custom Filtering
//!
//! ```
//! use mr_watcher::{FileFilter, CompositeFilter, ExtensionFilter, ScratchFileFilter};
//! use camino::Utf8Path;
//!
//! struct NoBuildDirs;
//!
//! impl FileFilter for NoBuildDirs {
//!     fn should_process(&self, path: &Utf8Path) -> bool {
//!         !path.components().any(|c| c.as_str() == ".godot")
//!     }
//! }
//!
//! let filter = CompositeFilter::new()
//!     .and(ExtensionFilter::new(&["cs"]))
//!     .and(ScratchFileFilter)
//!     .and(NoBuildDirs);
//!
//! assert!(filter.should_process(Utf8Path::new("scenes/VBox.cs")));
//! assert!(!filter.should_process(Utf8Path::new(".godot/mono/VBox.cs")));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;
pub mod worker;

pub use error::WatchError;
pub use events::{FileEvent, is_content_modification};
pub use filter::{AcceptAllFilter, CompositeFilter, ExtensionFilter, FileFilter, ScratchFileFilter};
pub use watcher::FileWatcher;
pub use worker::{CoalescingWorker, PathHandler, WorkerHandle};
