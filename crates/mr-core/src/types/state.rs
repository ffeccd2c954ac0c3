//! State declarations.

use serde::{Deserialize, Serialize};

/// An internally owned field wrapped in a reactive cell (`State<T>`).
///
/// `ty` is the unwrapped inner type `T`.
///
/// # Examples
///
/// ```
/// use mr_core::State;
///
/// let state = State::new("bool", "is_active");
/// assert_eq!(state.accessor_name(), "P_is_active");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    /// Inner type of the reactive cell.
    pub ty: String,
    /// Field name.
    pub name: String,
}

impl State {
    /// Prefix of the generated accessor property.
    pub const ACCESSOR_PREFIX: &'static str = "P_";

    /// Creates a new State.
    #[must_use]
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// Name of the generated accessor property.
    #[must_use]
    pub fn accessor_name(&self) -> String {
        format!("{}{}", Self::ACCESSOR_PREFIX, self.name)
    }
}
