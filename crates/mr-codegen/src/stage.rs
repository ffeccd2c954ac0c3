//! Stages of the line state machine.
//!
//! An annotated file is read top to bottom and the machine only ever moves
//! forward through these stages:
//!
//! ```text
//! FirstLine ─► WaitingForState ─► AtState ─► WaitingForParams ─► AtParams
//!                                                                   │
//!                        Tail ◄─ AtDiff ◄─ WaitingForDiff ◄─────────┘
//! ```
//!
//! `Waiting*` stages copy lines through and collect declarations until the
//! generated-code marker is seen. `At*` stages replace exactly one line with
//! a generated region.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in the forward-only line state machine.
///
/// # Examples
///
/// ```
/// use mr_codegen::Stage;
///
/// let stage = Stage::FirstLine;
/// assert_eq!(stage.next(), Stage::WaitingForState);
/// assert_eq!(Stage::Tail.next(), Stage::Tail);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Expecting the header marker on the first line.
    FirstLine,
    /// Collecting declarations before the state accessor region.
    WaitingForState,
    /// The current line is the state accessor region.
    AtState,
    /// Collecting declarations before the formal parameter region.
    WaitingForParams,
    /// The current line is the formal parameter region.
    AtParams,
    /// Collecting declarations before the prop diff region.
    WaitingForDiff,
    /// The current line is the prop diff region.
    AtDiff,
    /// Every remaining line passes through unmodified.
    Tail,
}

impl Stage {
    /// Returns the following stage. [`Tail`](Self::Tail) is terminal.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::FirstLine => Self::WaitingForState,
            Self::WaitingForState => Self::AtState,
            Self::AtState => Self::WaitingForParams,
            Self::WaitingForParams => Self::AtParams,
            Self::AtParams => Self::WaitingForDiff,
            Self::WaitingForDiff => Self::AtDiff,
            Self::AtDiff | Self::Tail => Self::Tail,
        }
    }

    /// Returns a short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstLine => "first line",
            Self::WaitingForState => "waiting for state region",
            Self::AtState => "state region",
            Self::WaitingForParams => "waiting for parameter region",
            Self::AtParams => "parameter region",
            Self::WaitingForDiff => "waiting for diff region",
            Self::AtDiff => "diff region",
            Self::Tail => "tail",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
