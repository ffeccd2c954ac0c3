//! Validation statistics with atomic counters.
//!
//! [`ValidationStats`] is shared (behind an `Arc`) by the batch pass and the
//! background worker; [`StatsSnapshot`] is the copyable view reported at the
//! end of a run.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. Statistics are informational and don't require strict ordering.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::rewriter::RewriteOutcome;

/// Atomic counters for validation passes.
///
/// # Examples
///
/// ```
/// use mr_scanner::{RewriteOutcome, ValidationStats};
///
/// let stats = ValidationStats::new();
/// stats.record(&RewriteOutcome::Rewritten);
/// stats.record(&RewriteOutcome::Unchanged);
///
/// let snap = stats.snapshot();
/// assert_eq!(snap.total, 2);
/// assert_eq!(snap.rewritten, 1);
/// ```
#[derive(Debug, Default)]
pub struct ValidationStats {
    /// Number of validation passes started.
    total: AtomicU64,
    /// Annotated files that were written back.
    rewritten: AtomicU64,
    /// Annotated files already up to date.
    unchanged: AtomicU64,
    /// Annotated files that differ but were not written (dry run).
    stale: AtomicU64,
    /// Files skipped for extension or missing header.
    skipped: AtomicU64,
    /// Passes that ended in an error.
    failed: AtomicU64,
    /// Advisories emitted for unrecognised Prop types.
    advisories: AtomicU64,
}

impl ValidationStats {
    /// Creates a new [`ValidationStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one finished pass by its outcome.
    pub fn record(&self, outcome: &RewriteOutcome) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            RewriteOutcome::Skipped(_) => &self.skipped,
            RewriteOutcome::Unchanged => &self.unchanged,
            RewriteOutcome::Rewritten => &self.rewritten,
            RewriteOutcome::Stale => &self.stale,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one failed pass.
    #[inline]
    pub fn record_failure(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds `count` advisories.
    #[inline]
    pub fn add_advisories(&self, count: usize) {
        self.advisories
            .fetch_add(u64::try_from(count).unwrap_or(u64::MAX), Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            rewritten: self.rewritten.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            advisories: self.advisories.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`ValidationStats`].
///
/// # Examples
///
/// ```
/// use mr_scanner::StatsSnapshot;
///
/// let snap = StatsSnapshot {
///     total: 10,
///     rewritten: 2,
///     unchanged: 3,
///     stale: 0,
///     skipped: 4,
///     failed: 1,
///     advisories: 0,
/// };
/// assert_eq!(snap.annotated(), 5);
/// assert!(!snap.is_clean());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Number of validation passes.
    pub total: u64,
    /// Annotated files that were written back.
    pub rewritten: u64,
    /// Annotated files already up to date.
    pub unchanged: u64,
    /// Annotated files left stale by a dry run.
    pub stale: u64,
    /// Files that are not annotated sources.
    pub skipped: u64,
    /// Passes that ended in an error.
    pub failed: u64,
    /// Advisories emitted.
    pub advisories: u64,
}

impl StatsSnapshot {
    /// Number of annotated files that were fully processed.
    #[must_use]
    pub const fn annotated(&self) -> u64 {
        self.rewritten + self.unchanged + self.stale
    }

    /// Returns `true` if nothing failed and nothing is left stale.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.stale == 0
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} rewritten, {} unchanged, {} stale, {} skipped, {} failed, {} advisories",
            self.total,
            self.rewritten,
            self.unchanged,
            self.stale,
            self.skipped,
            self.failed,
            self.advisories
        )
    }
}
