//! File watcher with async event streaming.
//!
//! This module provides the [`FileWatcher`] type that bridges the synchronous
//! `notify` watcher to the async tokio runtime.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 notify backend thread                           │
//! │  RecommendedWatcher ─► content-modify check ─► FileFilter       │
//! └──────────────────────────────────────────────┬──────────────────┘
//!                                  blocking_send │
//!                                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Async Runtime (tokio)                           │
//! │  FileWatcher (shutdown ctrl) ─► mpsc::Receiver ─► worker.enqueue│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The watcher owns no debouncer: bursts of events are absorbed by the
//! change-coalescing worker instead.

use camino::{Utf8Path, Utf8PathBuf};
use mr_core::WatchConfig;
use notify::{RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::WatchError;
use crate::events::{FileEvent, is_content_modification};
use crate::filter::FileFilter;

/// Default channel capacity for file events.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A file watcher that streams content-modification events to async code.
///
/// # Lifecycle
///
/// 1. **Creation**: [`FileWatcher::new`] validates the path and spawns a
///    blocking task that owns the notify watcher.
/// 2. **Event Reception**: [`recv`](Self::recv) yields filtered events.
/// 3. **Shutdown**: [`shutdown`](Self::shutdown) stops the watcher and awaits
///    the task. Dropping the watcher only sends the stop signal.
///
/// # Examples
///
/// ```no_run
/// use mr_watcher::{ExtensionFilter, FileWatcher};
/// use mr_core::WatchConfig;
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), mr_watcher::WatchError> {
/// let mut watcher = FileWatcher::new(
///     Utf8Path::new("./scenes"),
///     &WatchConfig::default(),
///     ExtensionFilter::new(&["cs"]),
/// ).await?;
///
/// while let Some(event) = watcher.recv().await {
///     println!("Modified: {}", event.path);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    /// Shutdown signal sender. `None` once shutdown has started.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking task that owns the notify watcher.
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<FileEvent>,

    /// The canonical path being watched.
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Creates a new file watcher for the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path doesn't exist and
    /// [`WatchError::Io`] if it cannot be canonicalized. Failures of the
    /// notify backend itself surface from [`shutdown`](Self::shutdown).
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new<F: FileFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        Self::with_capacity(path, config, filter, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Creates a file watcher with a custom event channel capacity.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn with_capacity<F: FileFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }

        let watch_path = path.canonicalize_utf8()?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let recursive = config.recursive;

        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(task_path, recursive, event_tx, shutdown_rx, filter)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
        })
    }

    /// Receives the next file event.
    ///
    /// Returns `None` once the watcher has stopped.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.event_rx.recv().await
    }

    /// Returns the canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` if the watcher task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watcher and awaits its task.
    ///
    /// # Errors
    ///
    /// Returns the error the notify backend failed with, or
    /// [`WatchError::ChannelClosed`] if the task panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already have exited.
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Runs the notify watcher until the shutdown signal arrives.
#[allow(clippy::needless_pass_by_value)] // Owned values live for the whole blocking task
fn run_watcher_loop<F: FileFilter>(
    path: Utf8PathBuf,
    recursive: bool,
    event_tx: mpsc::Sender<FileEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let event = match res {
            Ok(event) => event,
            Err(error) => {
                tracing::warn!(error = %error, "Watcher backend error");
                return;
            }
        };

        if !is_content_modification(&event.kind) {
            tracing::trace!(kind = ?event.kind, "Ignoring non-modification event");
            return;
        }

        for raw_path in event.paths {
            let utf8_path = match Utf8PathBuf::try_from(raw_path) {
                Ok(p) => p,
                Err(e) => {
                    let err = WatchError::non_utf8_path(e.into_path_buf());
                    tracing::warn!(error = %err, "Skipping file event");
                    continue;
                }
            };

            if !filter.should_process(&utf8_path) {
                tracing::trace!(path = %utf8_path, "Filtered out file event");
                continue;
            }

            if event_tx.blocking_send(FileEvent::new(utf8_path)).is_err() {
                tracing::debug!("Event channel closed, dropping event");
                return;
            }
        }
    })?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(path.as_std_path(), mode)?;

    tracing::info!(path = %path, recursive = recursive, "File watcher started");

    // Block until shutdown; the watcher is dropped (and unregistered) after.
    let _ = shutdown_rx.blocking_recv();

    tracing::info!(path = %path, "File watcher stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AcceptAllFilter, ExtensionFilter};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_temp_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp directory")
    }

    #[tokio::test]
    async fn test_watcher_creation() {
        let temp_dir = create_temp_dir();
        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher = FileWatcher::new(path, &WatchConfig::default(), AcceptAllFilter)
            .await
            .expect("Watcher should be created");
        assert!(watcher.is_running());
        assert!(watcher.watch_path().is_absolute());
    }

    #[tokio::test]
    async fn test_watcher_path_not_found() {
        let path = Utf8Path::new("/nonexistent/path/that/does/not/exist");

        let result = FileWatcher::new(path, &WatchConfig::default(), AcceptAllFilter).await;

        match result {
            Err(WatchError::PathNotFound(_)) => {}
            other => panic!("Expected PathNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_watcher_shutdown() {
        let temp_dir = create_temp_dir();
        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher = FileWatcher::new(path, &WatchConfig::default(), AcceptAllFilter)
            .await
            .expect("Failed to create watcher");

        assert!(watcher.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_watcher_with_capacity() {
        let temp_dir = create_temp_dir();
        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher =
            FileWatcher::with_capacity(path, &WatchConfig::default(), AcceptAllFilter, 8)
                .await
                .expect("Failed to create watcher");

        assert!(watcher.is_running());
        watcher.shutdown().await.expect("Shutdown failed");
    }

    #[tokio::test]
    async fn test_watcher_reports_modification() {
        let temp_dir = create_temp_dir();
        let file_path = temp_dir.path().join("VBox.cs");
        fs::write(&file_path, "// before\n").expect("Failed to write file");

        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");
        let filter = ExtensionFilter::new(&["cs"]);
        let mut watcher = FileWatcher::new(path, &WatchConfig::default(), filter)
            .await
            .expect("Failed to create watcher");

        // Give the backend a moment to register the watch.
        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&file_path, "// after\n").expect("Failed to write file");
        fs::write(temp_dir.path().join("notes.txt"), "ignored").expect("Failed to write file");

        let event = tokio::time::timeout(Duration::from_secs(2), watcher.recv()).await;
        watcher.shutdown().await.expect("Shutdown failed");

        // Delivery is backend and timing dependent, so only check what arrived.
        if let Ok(Some(event)) = event {
            assert_eq!(event.file_name(), Some("VBox.cs"));
        }
    }
}
