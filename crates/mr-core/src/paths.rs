//! Path classification shared by the batch walker and the watcher.

use camino::Utf8Path;

/// Returns `true` for editor lock and autosave files.
///
/// Emacs creates `.#VBox.cs` (a lock) and `#VBox.cs#` (an autosave) next to a
/// file being edited; both would otherwise pass an extension check. Ordinary
/// dot-files are not scratch files.
///
/// # Examples
///
/// ```
/// use mr_core::is_editor_scratch;
/// use camino::Utf8Path;
///
/// assert!(is_editor_scratch(Utf8Path::new("scenes/.#VBox.cs")));
/// assert!(!is_editor_scratch(Utf8Path::new("scenes/.VBox.cs")));
/// ```
#[must_use]
pub fn is_editor_scratch(path: &Utf8Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.starts_with(".#") || name.starts_with('#'))
}
