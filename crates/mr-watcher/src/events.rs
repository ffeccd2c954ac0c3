//! Event types for file change notifications.
//!
//! Only content modifications become a [`FileEvent`]; creations, removals
//! and renames are dropped before they reach the channel.
//!
//! ```text
//! notify event (Modify / Data)
//!        │
//!        ▼
//!   FileFilter
//!        │
//!        ▼
//!   FileEvent ──► mpsc channel ──► worker.enqueue(path)
//! ```

use camino::Utf8PathBuf;
use notify::EventKind;
use notify::event::ModifyKind;

/// A content-modification event with a UTF-8 path guarantee.
///
/// # Examples
///
/// ```
/// use mr_watcher::FileEvent;
/// use camino::Utf8PathBuf;
///
/// let event = FileEvent::new(Utf8PathBuf::from("scenes/VBox.cs"));
/// assert_eq!(event.path.as_str(), "scenes/VBox.cs");
/// assert_eq!(event.extension(), Some("cs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the modified file.
    pub path: Utf8PathBuf,
}

impl FileEvent {
    /// Creates a new file event.
    #[inline]
    #[must_use]
    pub const fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    /// Returns the file extension, if any.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    /// Returns the file name component of the path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }

}

/// Returns `true` if `kind` reports a change to a file's contents.
///
/// Metadata-only changes and renames are not content changes. Backends that
/// cannot tell what changed report `Modify(Any)` or `Modify(Other)`, which
/// are treated as content changes.
///
/// # Examples
///
/// ```
/// use mr_watcher::is_content_modification;
/// use notify::EventKind;
/// use notify::event::{CreateKind, DataChange, ModifyKind};
///
/// assert!(is_content_modification(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
/// assert!(!is_content_modification(&EventKind::Create(CreateKind::File)));
/// ```
#[must_use]
pub const fn is_content_modification(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other)
    )
}
