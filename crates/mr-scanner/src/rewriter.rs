//! One validation pass over one file.
//!
//! [`FileRewriter::validate`] reads the whole file, runs it through the line
//! state machine and writes the result back with a single `fs::write`, but
//! only when a generated region actually changed. Skipping no-op writes keeps
//! the watcher from re-triggering on its own output.

use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;
use mr_codegen::{Regeneration, regenerate};
use mr_core::ProtocolConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::RewriteError;
use crate::stats::ValidationStats;

/// Why a file was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The file does not carry the configured extension.
    Extension,
    /// The first line is not the header marker.
    NotAnnotated,
}

impl SkipReason {
    /// Returns a short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Extension => "extension",
            Self::NotAnnotated => "not annotated",
        }
    }
}

/// The result of a successful validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteOutcome {
    /// The file is not an annotated source.
    Skipped(SkipReason),
    /// Every generated region already matched.
    Unchanged,
    /// At least one region changed and the file was written.
    Rewritten,
    /// At least one region changed but the rewriter is in dry-run mode.
    Stale,
}

impl fmt::Display for RewriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped ({})", reason.label()),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Rewritten => f.write_str("rewritten"),
            Self::Stale => f.write_str("stale"),
        }
    }
}

/// Validates and regenerates annotated files.
///
/// Cloning is cheap and clones share the same [`ValidationStats`], so the
/// batch pass and the background worker can report combined totals.
///
/// # Examples
///
/// ```no_run
/// use mr_core::ProtocolConfig;
/// use mr_scanner::FileRewriter;
/// use camino::Utf8Path;
///
/// let rewriter = FileRewriter::new(ProtocolConfig::default());
/// let outcome = rewriter.validate(Utf8Path::new("scenes/VBox.cs"))?;
/// println!("VBox.cs: {outcome}");
/// # Ok::<(), mr_scanner::RewriteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileRewriter {
    protocol: ProtocolConfig,
    dry_run: bool,
    stats: Arc<ValidationStats>,
}

impl FileRewriter {
    /// Creates a rewriter with fresh statistics.
    #[must_use]
    pub fn new(protocol: ProtocolConfig) -> Self {
        Self {
            protocol,
            dry_run: false,
            stats: Arc::new(ValidationStats::new()),
        }
    }

    /// In dry-run mode stale files are reported as [`RewriteOutcome::Stale`]
    /// and left untouched.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Records into an existing statistics collector.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<ValidationStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Returns the shared statistics collector.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &Arc<ValidationStats> {
        &self.stats
    }

    /// Runs one validation pass over `path` and records it in the statistics.
    ///
    /// # Errors
    ///
    /// Returns a [`RewriteError`] if the file cannot be read or written, or if
    /// it is annotated but malformed. The file is left untouched on error.
    pub fn validate(&self, path: &Utf8Path) -> Result<RewriteOutcome, RewriteError> {
        let result = self.validate_inner(path);
        match &result {
            Ok(outcome) => self.stats.record(outcome),
            Err(_) => self.stats.record_failure(),
        }
        result
    }

    fn validate_inner(&self, path: &Utf8Path) -> Result<RewriteOutcome, RewriteError> {
        if !self.protocol.matches_extension(path) {
            return Ok(RewriteOutcome::Skipped(SkipReason::Extension));
        }

        debug!(path = %path, "Validating");
        let text = std::fs::read_to_string(path).map_err(|e| RewriteError::read(path, e))?;

        let regenerated = match regenerate(&text, &self.protocol) {
            Ok(Regeneration::Annotated(regenerated)) => regenerated,
            Ok(Regeneration::NotAnnotated) => {
                return Ok(RewriteOutcome::Skipped(SkipReason::NotAnnotated));
            }
            Err(e) => return Err(RewriteError::codegen(path, e)),
        };

        for advisory in &regenerated.advisories {
            warn!(path = %path, prop = %advisory.prop, "{advisory}");
        }
        self.stats.add_advisories(regenerated.advisories.len());

        if !regenerated.changed {
            debug!(path = %path, "Generated regions up to date");
            return Ok(RewriteOutcome::Unchanged);
        }

        if self.dry_run {
            info!(path = %path, "Generated regions are stale");
            return Ok(RewriteOutcome::Stale);
        }

        std::fs::write(path, &regenerated.text).map_err(|e| RewriteError::write(path, e))?;
        info!(
            path = %path,
            props = regenerated.props.len(),
            states = regenerated.states.len(),
            "Rewrote generated regions"
        );
        Ok(RewriteOutcome::Rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    const ANNOTATED: &str = "\
// META_PROGRAM: react.godot script. Do not remove this comment.
public partial class Butt : Button, IReactable
{
    [ReactProp]
    private int count;

    // Don't edit! Generated by meta programming.

    public void SetProps(
        // Don't edit! Generated by meta programming.

    )
    {
        // Don't edit! Generated by meta programming.

    }
}
";

    fn write_fixture(dir: &tempfile::TempDir, name: &str, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_skips_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Butt.gd", ANNOTATED);
        let rewriter = FileRewriter::new(ProtocolConfig::default());

        assert_eq!(
            rewriter.validate(&path).unwrap(),
            RewriteOutcome::Skipped(SkipReason::Extension)
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ANNOTATED);
    }

    #[test]
    fn test_skips_files_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Plain.cs", "using Godot;\n");
        let rewriter = FileRewriter::new(ProtocolConfig::default());

        assert_eq!(
            rewriter.validate(&path).unwrap(),
            RewriteOutcome::Skipped(SkipReason::NotAnnotated)
        );
    }

    #[test]
    fn test_rewrites_then_reports_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Butt.cs", ANNOTATED);
        let rewriter = FileRewriter::new(ProtocolConfig::default());

        assert_eq!(rewriter.validate(&path).unwrap(), RewriteOutcome::Rewritten);
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(first.contains("        int count_\n"));
        assert!(first.contains("if (count != count_) { count = count_; need_react = true; }"));

        assert_eq!(rewriter.validate(&path).unwrap(), RewriteOutcome::Unchanged);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

        let snap = rewriter.stats().snapshot();
        assert_eq!(snap.rewritten, 1);
        assert_eq!(snap.unchanged, 1);
    }

    #[test]
    fn test_dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Butt.cs", ANNOTATED);
        let rewriter = FileRewriter::new(ProtocolConfig::default()).with_dry_run(true);

        assert_eq!(rewriter.validate(&path).unwrap(), RewriteOutcome::Stale);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ANNOTATED);
    }

    #[test]
    fn test_malformed_file_is_not_modified() {
        let dir = tempfile::tempdir().unwrap();
        let broken = ANNOTATED.replace("private int count;", "private int;");
        let path = write_fixture(&dir, "Butt.cs", &broken);
        let rewriter = FileRewriter::new(ProtocolConfig::default());

        let err = rewriter.validate(&path).unwrap_err();
        assert!(matches!(err, RewriteError::Codegen { .. }));
        assert_eq!(err.path(), path.as_path());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);
        assert_eq!(rewriter.stats().snapshot().failed, 1);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("Gone.cs")).unwrap();
        let rewriter = FileRewriter::new(ProtocolConfig::default());

        assert!(matches!(
            rewriter.validate(&path),
            Err(RewriteError::Read { .. })
        ));
    }

    #[test]
    fn test_advisories_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let text = ANNOTATED.replace("private int count;", "private Node target;");
        let path = write_fixture(&dir, "Butt.cs", &text);
        let rewriter = FileRewriter::new(ProtocolConfig::default());

        assert_eq!(rewriter.validate(&path).unwrap(), RewriteOutcome::Rewritten);
        assert_eq!(rewriter.stats().snapshot().advisories, 1);
    }

    #[test]
    fn test_clones_share_stats() {
        let rewriter = FileRewriter::new(ProtocolConfig::default());
        let clone = rewriter.clone();
        assert!(Arc::ptr_eq(rewriter.stats(), clone.stats()));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(RewriteOutcome::Rewritten.to_string(), "rewritten");
        assert_eq!(
            RewriteOutcome::Skipped(SkipReason::NotAnnotated).to_string(),
            "skipped (not annotated)"
        );
    }
}
