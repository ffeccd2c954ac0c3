//! Error types for the mr-codegen crate.
//!
//! This module provides the [`CodegenError`] type for annotated files that do
//! not conform to the protocol.

use crate::stage::Stage;

/// Errors raised while regenerating an annotated file.
///
/// Every error is scoped to the single file being processed. Callers log it
/// and move on; the file on disk is never touched when regeneration fails.
///
/// # Error Categories
///
/// - **Declaration errors** ([`MissingVisibility`](Self::MissingVisibility),
///   [`TokenCount`](Self::TokenCount), [`MalformedStateType`](Self::MalformedStateType)):
///   the line after an attribute marker is not a well-formed declaration
/// - **Structural errors** ([`Truncated`](Self::Truncated)): the file ended
///   before all three generated regions were seen
///
/// # Examples
///
/// ```
/// use mr_codegen::{CodegenError, Stage};
///
/// let err = CodegenError::Truncated { stage: Stage::WaitingForDiff };
/// assert_eq!(err.line(), None);
/// assert!(err.to_string().contains("waiting for diff region"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    /// A declaration does not start with the `private ` qualifier.
    #[error("line {line}: declaration must start with `private `: `{content}`")]
    MissingVisibility {
        /// 1-indexed line number.
        line: usize,
        /// The trimmed line content.
        content: String,
    },

    /// A declaration does not split into exactly a type and a name.
    #[error("line {line}: expected `<type> <name>` but found {found} token(s): `{content}`")]
    TokenCount {
        /// 1-indexed line number.
        line: usize,
        /// Number of whitespace-separated tokens found.
        found: usize,
        /// The trimmed line content.
        content: String,
    },

    /// A State declaration's type is not written as `State<T>`.
    #[error("line {line}: state type must be written as `State<T>`, found `{ty}`")]
    MalformedStateType {
        /// 1-indexed line number.
        line: usize,
        /// The declared type token.
        ty: String,
    },

    /// The file ended before reaching the tail stage.
    #[error("annotated file ended in stage '{stage}' before all generated regions were found")]
    Truncated {
        /// The stage the machine was in at end of input.
        stage: Stage,
    },
}

impl CodegenError {
    /// Returns the 1-indexed line number associated with this error, if any.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::MissingVisibility { line, .. }
            | Self::TokenCount { line, .. }
            | Self::MalformedStateType { line, .. } => Some(*line),
            Self::Truncated { .. } => None,
        }
    }
}
