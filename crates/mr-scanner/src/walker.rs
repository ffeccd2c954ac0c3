//! Directory enumeration for the batch pass.
//!
//! [`FileWalker`] lists the regular files directly inside a root directory
//! using the `ignore` crate. Subdirectories are not descended into and no
//! ignore files are consulted: every entry is handed to the rewriter, which
//! decides by extension and header whether the file is relevant.
//!
//! An entry that cannot be read, or whose name is not UTF-8, is logged and
//! skipped. It never hides the other files of the directory.

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use mr_core::is_editor_scratch;
use tracing::{debug, warn};

use crate::error::ScanError;

/// Enumerates the files directly inside one directory.
///
/// # Examples
///
/// ```no_run
/// use mr_scanner::FileWalker;
/// use camino::Utf8Path;
///
/// let walker = FileWalker::new(Utf8Path::new("./scenes"))?;
/// for path in walker.collect_paths() {
///     println!("Found: {path}");
/// }
/// # Ok::<(), mr_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileWalker {
    /// The directory to enumerate.
    root: Utf8PathBuf,
}

impl FileWalker {
    /// Creates a new walker for the given root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root path doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::config(format!(
                "root path does not exist: {root}"
            )));
        }
        if !root.is_dir() {
            return Err(ScanError::config(format!(
                "root path is not a directory: {root}"
            )));
        }

        Ok(Self {
            root: root.to_owned(),
        })
    }

    /// Collects the paths of all regular files in the root directory.
    ///
    /// Paths are sorted so batch passes are reproducible. Editor scratch
    /// files are left out.
    pub fn collect_paths(&self) -> Vec<Utf8PathBuf> {
        let mut paths = Vec::new();

        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %self.root, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            // The root itself is reported at depth 0.
            if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                warn!(path = %entry.path().display(), "Skipping file with a non-UTF-8 name");
                continue;
            };

            if is_editor_scratch(path) {
                debug!(path = %path, "Skipping editor scratch file");
                continue;
            }

            paths.push(path.to_owned());
        }

        paths.sort_unstable();
        paths
    }

    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            .max_depth(Some(1))
            // Hidden files and ignore files don't change which sources are annotated.
            .standard_filters(false)
            .build()
    }

    /// Returns the root directory being enumerated.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}
