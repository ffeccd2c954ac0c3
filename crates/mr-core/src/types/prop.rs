//! Prop declarations.
//!
//! A Prop is a field whose value is supplied from outside the annotated type,
//! through the generated parameter list. Only immutable value types are safe
//! to compare and assign in the generated diff block, so every Prop type is
//! classified into a [`PropKind`]; unrecognised types produce an [`Advisory`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type names accepted as immutable primitives.
const PRIMITIVE_TYPES: &[&str] = &["int", "long", "float", "double", "bool", "string"];

/// Prefix and suffix of a state setter-function type (`State<T>.SetterType`).
const SETTER_PREFIX: &str = "State<";
const SETTER_SUFFIX: &str = ">.SetterType";

/// Prefix of a callback type.
const CALLBACK_PREFIX: &str = "CallbackType.";

/// Prefix of an action (delegate) type.
const ACTION_PREFIX: &str = "Action";

/// Naming convention that identifies enum types.
const ENUM_MARKER: &str = "Enum";

/// The recognised category of a Prop's declared type.
///
/// # Examples
///
/// ```
/// use mr_core::PropKind;
///
/// assert_eq!(PropKind::classify("int"), PropKind::Primitive);
/// assert_eq!(PropKind::classify("State<int>.SetterType"), PropKind::Setter);
/// assert_eq!(PropKind::classify("ColorEnum"), PropKind::Enum);
/// assert_eq!(PropKind::classify("Node"), PropKind::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    /// `int`, `long`, `float`, `double`, `bool` or `string`.
    Primitive,
    /// A state setter function, `State<T>.SetterType`.
    Setter,
    /// A callback, `CallbackType.*`.
    Callback,
    /// An action delegate, `Action*`.
    Action,
    /// An enum, recognised by an `Enum` prefix or suffix on the type name.
    Enum,
    /// None of the above.
    Unknown,
}

impl PropKind {
    /// Classifies a declared type name.
    #[must_use]
    pub fn classify(ty: &str) -> Self {
        if PRIMITIVE_TYPES.contains(&ty) {
            Self::Primitive
        } else if ty.starts_with(SETTER_PREFIX) && ty.ends_with(SETTER_SUFFIX) {
            Self::Setter
        } else if ty.starts_with(CALLBACK_PREFIX) {
            Self::Callback
        } else if ty.starts_with(ACTION_PREFIX) {
            Self::Action
        } else if ty.starts_with(ENUM_MARKER) || ty.ends_with(ENUM_MARKER) {
            Self::Enum
        } else {
            Self::Unknown
        }
    }

    /// Returns `true` for every kind except [`Unknown`](Self::Unknown).
    #[inline]
    #[must_use]
    pub const fn is_recognized(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// An externally supplied, constructor-style input field.
///
/// # Examples
///
/// ```
/// use mr_core::{Prop, PropKind};
///
/// let prop = Prop::new("int", "n_butt");
/// assert_eq!(prop.kind(), PropKind::Primitive);
/// assert_eq!(prop.formal_param(), "int n_butt_");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prop {
    /// Declared type, as written in the source.
    pub ty: String,
    /// Field name.
    pub name: String,
}

impl Prop {
    /// Creates a new Prop.
    #[must_use]
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// Returns the classification of this Prop's type.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PropKind {
        PropKind::classify(&self.ty)
    }

    /// Name of the generated parameter that carries the incoming value.
    ///
    /// The trailing underscore keeps the parameter from shadowing the field.
    #[must_use]
    pub fn param_name(&self) -> String {
        format!("{}_", self.name)
    }

    /// Renders this Prop as a typed formal parameter, e.g. `int x_`.
    #[must_use]
    pub fn formal_param(&self) -> String {
        format!("{} {}", self.ty, self.param_name())
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A non-fatal hint about a Prop whose type matches no recognised pattern.
///
/// Advisories never block regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// 1-indexed line of the offending declaration.
    pub line: usize,
    /// The Prop that triggered the advisory.
    pub prop: Prop,
}

impl Advisory {
    /// Returns an advisory for `prop` if its type is not recognised.
    #[must_use]
    pub fn check(line: usize, prop: &Prop) -> Option<Self> {
        (!prop.kind().is_recognized()).then(|| Self {
            line,
            prop: prop.clone(),
        })
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: not a known immutable type: {} (name your enum types with an \"Enum\" prefix or suffix)",
            self.line, self.prop.ty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_primitives() {
        for ty in ["int", "long", "float", "double", "bool", "string"] {
            assert_eq!(PropKind::classify(ty), PropKind::Primitive, "{ty}");
        }
        assert_eq!(PropKind::classify("String"), PropKind::Unknown);
    }

    #[test]
    fn test_classify_structural_patterns() {
        assert_eq!(
            PropKind::classify("State<bool>.SetterType"),
            PropKind::Setter
        );
        assert_eq!(PropKind::classify("State<bool>"), PropKind::Unknown);
        assert_eq!(
            PropKind::classify("CallbackType.OnClick"),
            PropKind::Callback
        );
        assert_eq!(PropKind::classify("Action<int>"), PropKind::Action);
        assert_eq!(PropKind::classify("Action"), PropKind::Action);
    }

    #[test]
    fn test_classify_enum_convention() {
        assert_eq!(PropKind::classify("EnumDirection"), PropKind::Enum);
        assert_eq!(PropKind::classify("DirectionEnum"), PropKind::Enum);
        assert_eq!(PropKind::classify("Direction"), PropKind::Unknown);
    }

    #[test]
    fn test_formal_param() {
        let prop = Prop::new("string", "label");
        assert_eq!(prop.param_name(), "label_");
        assert_eq!(prop.formal_param(), "string label_");
        assert_eq!(prop.to_string(), "label");
    }

    #[test]
    fn test_advisory_only_for_unknown_types() {
        assert!(Advisory::check(3, &Prop::new("int", "x")).is_none());

        let advisory = Advisory::check(7, &Prop::new("Vector2", "pos")).unwrap();
        assert_eq!(advisory.line, 7);
        let msg = advisory.to_string();
        assert!(msg.contains("Vector2"));
        assert!(msg.contains("\"Enum\""));
    }
}
