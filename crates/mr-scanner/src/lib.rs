//! File rewriter and batch driver for meta-react annotated sources.
//!
//! # Overview
//!
//! - [`FileRewriter`]: one read / regenerate / write pass over one file
//! - [`FileWalker`]: non-recursive enumeration of a root directory
//! - [`BatchDriver`]: runs the rewriter over every entry of the root once,
//!   synchronously, before the watcher takes over
//! - [`ValidationStats`]: atomic counters shared by every pass
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use mr_core::ProtocolConfig;
//! use mr_scanner::{BatchDriver, FileRewriter};
//!
//! let rewriter = FileRewriter::new(ProtocolConfig::default());
//! let driver = BatchDriver::new(Utf8Path::new("./scenes"), rewriter)?;
//! let report = driver.run();
//! println!("{}", report.stats);
//! for err in &report.errors {
//!     eprintln!("{err}");
//! }
//! # Ok::<(), mr_scanner::ScanError>(())
//! ```
//!
//! # Error Tiers
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Wrong extension or missing header | [`RewriteOutcome::Skipped`], silent |
//! | Unreadable or non-UTF-8 directory entry | `warn!` event, entry skipped |
//! | Unrecognised Prop type | `warn!` event, regeneration proceeds |
//! | Malformed declaration or truncated file | [`RewriteError`], file untouched |

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod rewriter;
mod stats;
mod walker;

pub use error::{RewriteError, ScanError};
pub use rewriter::{FileRewriter, RewriteOutcome, SkipReason};
pub use stats::{StatsSnapshot, ValidationStats};
pub use walker::FileWalker;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{error, info};

/// Result of a batch pass.
///
/// Per-file failures don't stop the pass; they are collected here.
#[derive(Debug)]
pub struct BatchReport {
    /// Statistics snapshot taken when the pass finished.
    pub stats: StatsSnapshot,
    /// Files that failed validation.
    pub errors: Vec<RewriteError>,
    /// Files whose generated regions are stale (dry run only).
    pub stale: Vec<Utf8PathBuf>,
}

impl BatchReport {
    /// Returns `true` if no file failed and none is stale.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.stale.is_empty()
    }
}

/// Runs a [`FileRewriter`] over every file of a root directory.
#[derive(Debug, Clone)]
pub struct BatchDriver {
    walker: FileWalker,
    rewriter: FileRewriter,
}

impl BatchDriver {
    /// Creates a driver for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if `root` is not an existing directory.
    pub fn new(root: &Utf8Path, rewriter: FileRewriter) -> Result<Self, ScanError> {
        Ok(Self {
            walker: FileWalker::new(root)?,
            rewriter,
        })
    }

    /// Returns the root directory.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        self.walker.root()
    }

    /// Validates every file in the root directory, in path order.
    ///
    /// Individual file failures are logged and returned in the report; they
    /// never stop the pass.
    pub fn run(&self) -> BatchReport {
        info!(root = %self.root(), "Starting batch pass");

        let paths = self.walker.collect_paths();
        info!(count = paths.len(), "Collected files");

        let mut errors = Vec::new();
        let mut stale = Vec::new();

        for path in paths {
            match self.rewriter.validate(&path) {
                Ok(RewriteOutcome::Stale) => stale.push(path),
                Ok(_) => {}
                Err(e) => {
                    error!(path = %path, line = e.line(), error = %e, "Validation failed");
                    errors.push(e);
                }
            }
        }

        let stats = self.rewriter.stats().snapshot();
        info!(
            total = stats.total,
            rewritten = stats.rewritten,
            failed = stats.failed,
            "Batch pass complete"
        );

        BatchReport {
            stats,
            errors,
            stale,
        }
    }
}
