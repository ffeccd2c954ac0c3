//! File filtering for watch events.
//!
//! Filters run on the notify thread, before an event is sent to the async
//! channel, so rejected paths never reach the worker.
//!
//! # Examples
//!
//! ```
//! use mr_watcher::{FileFilter, ExtensionFilter};
//! use camino::Utf8Path;
//!
//! let filter = ExtensionFilter::new(&["cs"]);
//! assert!(filter.should_process(Utf8Path::new("scenes/VBox.cs")));
//! assert!(!filter.should_process(Utf8Path::new("scenes/vbox.tscn")));
//! ```

use camino::Utf8Path;
use mr_core::{ProtocolConfig, is_editor_scratch};
use smallvec::SmallVec;

/// A filter for determining which file events to process.
///
/// Filters must be [`Send`] and [`Sync`] because they are moved into the
/// notify callback, which runs on a thread owned by the watcher backend.
///
/// # Examples
///
/// ```
/// use mr_watcher::FileFilter;
/// use camino::Utf8Path;
///
/// struct ScenesOnly;
///
/// impl FileFilter for ScenesOnly {
///     fn should_process(&self, path: &Utf8Path) -> bool {
///         path.components().any(|c| c.as_str() == "scenes")
///     }
/// }
/// ```
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if an event for `path` should be forwarded.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// A filter that accepts all files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// Accepts files whose extension matches one of a set, ignoring ASCII case.
///
/// # Examples
///
/// ```
/// use mr_watcher::{FileFilter, ExtensionFilter};
/// use mr_core::ProtocolConfig;
/// use camino::Utf8Path;
///
/// let filter = ExtensionFilter::for_protocol(&ProtocolConfig::default());
/// assert!(filter.should_process(Utf8Path::new("Butt.CS")));
/// assert!(!filter.should_process(Utf8Path::new("Butt.cs.swp")));
/// ```
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: SmallVec<[String; 4]>,
}

impl ExtensionFilter {
    /// Creates a new extension filter.
    ///
    /// Extensions are given without the leading dot.
    #[must_use]
    pub fn new(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|s| s.trim().to_owned()).collect(),
        }
    }

    /// Creates a filter for the extension configured in `protocol`.
    #[must_use]
    pub fn for_protocol(protocol: &ProtocolConfig) -> Self {
        Self::new(&[protocol.file_extension.as_str()])
    }
}

impl FileFilter for ExtensionFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        path.extension().is_some_and(|ext| {
            self.extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext.trim()))
        })
    }
}

/// Rejects editor lock and autosave files, see [`is_editor_scratch`].
///
/// The batch walker skips the same files, so both passes see one set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScratchFileFilter;

impl FileFilter for ScratchFileFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        !is_editor_scratch(path)
    }
}

/// Combines filters with AND logic.
///
/// # Examples
///
/// ```
/// use mr_watcher::{CompositeFilter, ExtensionFilter, FileFilter, ScratchFileFilter};
/// use camino::Utf8Path;
///
/// let filter = CompositeFilter::new()
///     .and(ExtensionFilter::new(&["cs"]))
///     .and(ScratchFileFilter);
///
/// assert!(filter.should_process(Utf8Path::new("VBox.cs")));
/// assert!(!filter.should_process(Utf8Path::new(".#VBox.cs")));
/// ```
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn FileFilter>>,
}

impl std::fmt::Debug for CompositeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl CompositeFilter {
    /// Creates an empty composite filter, which accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter that must also accept the path.
    #[must_use]
    pub fn and<F: FileFilter>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl FileFilter for CompositeFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.filters.iter().all(|f| f.should_process(path))
    }
}

impl<F: FileFilter + ?Sized> FileFilter for Box<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

impl<F: FileFilter + ?Sized> FileFilter for std::sync::Arc<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}
