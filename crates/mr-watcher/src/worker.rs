//! The change-coalescing worker.
//!
//! Producers call [`WorkerHandle::enqueue`] with every modified path. A single
//! background thread takes paths out of a deduplicated pending set, one per
//! signal, and hands each to a [`PathHandler`] after a short settle delay.
//!
//! ```text
//! enqueue(path) ─┐                       ┌─ sleep(settle) ─ pop ─ handler(path)
//! enqueue(path) ─┼─► pending set ─► signals ─┤
//! enqueue(path) ─┘   (dedup)       (counter) └─ stop? ─► exit
//! ```
//!
//! # Invariants
//!
//! - A path is in the pending set at most once; enqueueing it again before it
//!   is popped is a no-op.
//! - Every insertion adds exactly one signal and every signal pops exactly one
//!   path, so a signaled worker always finds work.
//! - The lock is held for set and counter updates only, never across the
//!   settle delay or the handler call.
//! - The signal bound starts at the configured capacity and doubles when a
//!   new path would exceed it. An enqueue never blocks and never drops a path.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use mr_core::{FxHashSet, WorkerConfig, fx_hash_set_with_capacity};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info};

use crate::error::WatchError;

/// Name of the background thread.
const THREAD_NAME: &str = "mr-worker";

/// Processes one path taken from the pending set.
///
/// Errors are logged by the worker with their full cause chain and never end
/// the loop. Any `FnMut(&Utf8Path) -> anyhow::Result<()>` closure is a
/// handler.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use mr_watcher::PathHandler;
///
/// struct Printer;
///
/// impl PathHandler for Printer {
///     fn handle(&mut self, path: &Utf8Path) -> anyhow::Result<()> {
///         anyhow::ensure!(path.is_file(), "{path} is gone");
///         Ok(())
///     }
/// }
/// ```
pub trait PathHandler: Send + 'static {
    /// Validates `path`.
    fn handle(&mut self, path: &Utf8Path) -> anyhow::Result<()>;
}

impl<F> PathHandler for F
where
    F: FnMut(&Utf8Path) -> anyhow::Result<()> + Send + 'static,
{
    fn handle(&mut self, path: &Utf8Path) -> anyhow::Result<()> {
        self(path)
    }
}

/// State guarded by the worker lock.
#[derive(Debug)]
struct Queue {
    pending: FxHashSet<Utf8PathBuf>,
    /// Signaled-but-unprocessed work units.
    signals: usize,
    /// Current bound on `signals`.
    capacity: usize,
    stop: bool,
}

#[derive(Debug)]
struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
}

/// Cloneable producer side of a [`CoalescingWorker`].
///
/// # Examples
///
/// ```
/// use mr_core::WorkerConfig;
/// use mr_watcher::CoalescingWorker;
///
/// let ignore = |_path: &camino::Utf8Path| -> anyhow::Result<()> { Ok(()) };
/// let worker = CoalescingWorker::spawn(&WorkerConfig::default(), ignore)?;
/// let handle = worker.handle();
/// assert!(handle.enqueue("scenes/VBox.cs"));
/// assert!(!handle.enqueue("scenes/VBox.cs"));
/// worker.shutdown()?;
/// # Ok::<(), mr_watcher::WatchError>(())
/// ```
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    shared: Arc<Shared>,
}

impl WorkerHandle {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    pending: fx_hash_set_with_capacity(capacity),
                    signals: 0,
                    capacity,
                    stop: false,
                }),
                available: Condvar::new(),
            }),
        }
    }

    /// Adds `path` to the pending set and signals one unit of work.
    ///
    /// Returns `false` if the path was already pending. Never blocks on the
    /// worker and never fails.
    pub fn enqueue(&self, path: impl Into<Utf8PathBuf>) -> bool {
        let path = path.into();
        let mut queue = self.shared.queue.lock();
        if queue.pending.contains(&path) {
            return false;
        }

        if queue.signals >= queue.capacity {
            queue.capacity = queue.capacity.saturating_mul(2);
            debug!(capacity = queue.capacity, "Worker queue bound raised");
        }
        queue.pending.insert(path);
        queue.signals += 1;
        drop(queue);

        self.shared.available.notify_one();
        true
    }

    /// Requests shutdown and wakes the worker if it is waiting.
    ///
    /// A pass already in progress runs to completion first. Paths still
    /// pending are abandoned.
    pub fn stop(&self) {
        self.shared.queue.lock().stop = true;
        self.shared.available.notify_all();
    }

    /// Number of paths waiting to be processed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().pending.len()
    }

    /// Current bound on signaled-but-unprocessed work.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.queue.lock().capacity
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.queue.lock().stop
    }

    /// Blocks until there is work or a stop request.
    ///
    /// Returns `false` on stop. On `true` one signal has been consumed.
    fn wait_for_work(&self) -> bool {
        let mut queue = self.shared.queue.lock();
        while queue.signals == 0 && !queue.stop {
            self.shared.available.wait(&mut queue);
        }
        if queue.stop {
            return false;
        }
        queue.signals -= 1;
        true
    }

    /// Removes an arbitrary pending path.
    fn pop(&self) -> Option<Utf8PathBuf> {
        let mut queue = self.shared.queue.lock();
        let path = queue.pending.iter().next().cloned()?;
        queue.pending.remove(&path);
        Some(path)
    }
}

/// A single background thread that serializes validation passes.
///
/// Dropping the worker requests a stop but does not wait for the thread;
/// use [`shutdown`](Self::shutdown) to join it.
#[derive(Debug)]
pub struct CoalescingWorker {
    handle: WorkerHandle,
    thread: Option<JoinHandle<()>>,
}

impl CoalescingWorker {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Io`] if the thread cannot be spawned.
    pub fn spawn<H: PathHandler>(config: &WorkerConfig, handler: H) -> Result<Self, WatchError> {
        let handle = WorkerHandle::new(config.queue_capacity);
        let settle = Duration::from_millis(config.settle_ms);

        let worker_handle = handle.clone();
        let thread = std::thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || run_worker_loop(&worker_handle, settle, handler))?;

        info!(
            settle_ms = config.settle_ms,
            capacity = config.queue_capacity,
            "Worker started"
        );

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    /// Returns a cloneable producer handle.
    #[must_use]
    pub fn handle(&self) -> WorkerHandle {
        self.handle.clone()
    }

    /// See [`WorkerHandle::enqueue`].
    pub fn enqueue(&self, path: impl Into<Utf8PathBuf>) -> bool {
        self.handle.enqueue(path)
    }

    /// See [`WorkerHandle::stop`].
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Waits for the worker thread to exit.
    ///
    /// Call [`stop`](Self::stop) first or this blocks until another handle
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::WorkerPanicked`] if the thread panicked outside
    /// a handler call.
    pub fn join(mut self) -> Result<(), WatchError> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| WatchError::WorkerPanicked),
            None => Ok(()),
        }
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// # Errors
    ///
    /// See [`join`](Self::join).
    pub fn shutdown(self) -> Result<(), WatchError> {
        self.stop();
        self.join()
    }
}

impl Drop for CoalescingWorker {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.handle.stop();
        }
    }
}

/// The worker thread body.
fn run_worker_loop<H: PathHandler>(handle: &WorkerHandle, settle: Duration, mut handler: H) {
    while handle.wait_for_work() {
        std::thread::sleep(settle);

        let Some(path) = handle.pop() else {
            continue;
        };

        debug!(path = %path, "Processing");
        match catch_unwind(AssertUnwindSafe(|| handler.handle(&path))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(path = %path, "Validation failed: {err:#}"),
            Err(_) => error!(path = %path, "Validation panicked"),
        }
    }

    info!("Worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn config(settle_ms: u64, queue_capacity: usize) -> WorkerConfig {
        WorkerConfig {
            settle_ms,
            queue_capacity,
        }
    }

    /// A handler that reports every processed path on a channel.
    fn recording() -> (
        impl FnMut(&Utf8Path) -> anyhow::Result<()> + Send + 'static,
        mpsc::Receiver<Utf8PathBuf>,
    ) {
        let (tx, rx) = mpsc::channel();
        let handler = move |path: &Utf8Path| -> anyhow::Result<()> {
            tx.send(path.to_owned())?;
            Ok(())
        };
        (handler, rx)
    }

    #[test]
    fn test_duplicate_enqueues_process_once() {
        let (handler, rx) = recording();
        let worker = CoalescingWorker::spawn(&config(50, 8), handler).unwrap();

        assert!(worker.enqueue("VBox.cs"));
        for _ in 0..4 {
            assert!(!worker.enqueue("VBox.cs"));
        }

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().as_str(), "VBox.cs");
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_path_can_be_requeued_after_processing() {
        let (handler, rx) = recording();
        let worker = CoalescingWorker::spawn(&config(1, 8), handler).unwrap();

        worker.enqueue("Butt.cs");
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().as_str(), "Butt.cs");
        assert!(worker.enqueue("Butt.cs"));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().as_str(), "Butt.cs");
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_burst_beyond_capacity_processes_every_path_once() {
        let (handler, rx) = recording();
        let worker = CoalescingWorker::spawn(&config(1, 2), handler).unwrap();

        let expected: Vec<Utf8PathBuf> = (0..50)
            .map(|i| Utf8PathBuf::from(format!("scene_{i:02}.cs")))
            .collect();
        for path in &expected {
            worker.enqueue(path.clone());
        }

        let mut seen: Vec<Utf8PathBuf> = (0..expected.len())
            .map(|_| rx.recv_timeout(TIMEOUT).unwrap())
            .collect();
        seen.sort();
        assert_eq!(seen, expected);
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_capacity_doubles_instead_of_blocking() {
        let handle = WorkerHandle::new(2);
        for i in 0..5 {
            assert!(handle.enqueue(format!("f{i}.cs")));
        }
        assert_eq!(handle.pending(), 5);
        assert_eq!(handle.capacity(), 8);
    }

    #[test]
    fn test_failing_handler_keeps_loop_running() {
        let (tx, rx) = mpsc::channel();
        let handler = move |path: &Utf8Path| -> anyhow::Result<()> {
            anyhow::ensure!(
                path.as_str() != "Broken.cs",
                "line 4: declaration must start with `private `"
            );
            tx.send(path.to_owned())?;
            Ok(())
        };
        let worker = CoalescingWorker::spawn(&config(1, 8), handler).unwrap();

        worker.enqueue("Broken.cs");
        std::thread::sleep(Duration::from_millis(50));
        worker.enqueue("Fine.cs");

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().as_str(), "Fine.cs");
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_panicking_handler_keeps_loop_running() {
        let (tx, rx) = mpsc::channel();
        let handler = move |path: &Utf8Path| -> anyhow::Result<()> {
            assert!(path.as_str() != "Boom.cs", "handler bug");
            tx.send(path.to_owned())?;
            Ok(())
        };
        let worker = CoalescingWorker::spawn(&config(1, 8), handler).unwrap();

        worker.enqueue("Boom.cs");
        std::thread::sleep(Duration::from_millis(50));
        worker.enqueue("Fine.cs");

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().as_str(), "Fine.cs");
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_stop_without_work_exits() {
        let (handler, _rx) = recording();
        let worker = CoalescingWorker::spawn(&config(100, 8), handler).unwrap();
        let handle = worker.handle();

        worker.shutdown().unwrap();
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_stop_from_another_handle() {
        let (handler, _rx) = recording();
        let worker = CoalescingWorker::spawn(&config(1, 8), handler).unwrap();

        let handle = worker.handle();
        std::thread::spawn(move || handle.stop());
        worker.join().unwrap();
    }
}
