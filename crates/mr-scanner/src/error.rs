//! Error types for the mr-scanner crate.
//!
//! [`RewriteError`] covers one file's validation pass: callers log it and
//! move on to the next file. [`ScanError`] is raised before a batch pass
//! starts.

use camino::{Utf8Path, Utf8PathBuf};
use mr_codegen::CodegenError;

/// Errors raised while validating a single file.
///
/// The file on disk is never modified when one of these is returned.
///
/// # Examples
///
/// ```
/// use mr_codegen::{CodegenError, Stage};
/// use mr_scanner::RewriteError;
///
/// let err = RewriteError::codegen(
///     "scenes/VBox.cs",
///     CodegenError::Truncated { stage: Stage::AtParams },
/// );
/// assert_eq!(err.path().as_str(), "scenes/VBox.cs");
/// assert!(err.to_string().contains("scenes/VBox.cs"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Failed to read the file (missing, unreadable, or not UTF-8).
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the regenerated file back.
    #[error("failed to write file {path}: {source}")]
    Write {
        /// The path of the file that couldn't be written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is annotated but does not follow the protocol.
    #[error("malformed annotated file {path}: {source}")]
    Codegen {
        /// The path of the malformed file.
        path: Utf8PathBuf,
        /// What was wrong with it.
        #[source]
        source: CodegenError,
    },
}

impl RewriteError {
    /// Creates a new [`RewriteError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`RewriteError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`RewriteError::Codegen`] error.
    #[inline]
    pub fn codegen(path: impl Into<Utf8PathBuf>, source: CodegenError) -> Self {
        Self::Codegen {
            path: path.into(),
            source,
        }
    }

    /// Returns the file this error is about.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } | Self::Codegen { path, .. } => {
                path
            }
        }
    }

    /// Returns the 1-indexed line of a malformed declaration, if known.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Codegen { source, .. } => source.line(),
            Self::Read { .. } | Self::Write { .. } => None,
        }
    }
}

/// Errors that prevent a batch pass from starting.
///
/// Once the pass runs, unreadable directory entries are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Invalid root directory or driver configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScanError {
    /// Creates a new [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
