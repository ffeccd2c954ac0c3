//! Declaration scanner and region regenerator for meta-react.
//!
//! An annotated file starts with a header marker, declares fields under
//! `[ReactState]` and `[ReactProp]` attributes, and contains three generated
//! lines, each one directly below a "generated code" marker:
//!
//! | Region | Content |
//! |--------|---------|
//! | State accessors | `public T P_name { get => name.Get(police); set { name.Set(value); } }` per State |
//! | Formal parameters | `T name_` per Prop, comma separated |
//! | Prop diff | `if (name != name_) { name = name_; need_react = true; }` per Prop |
//!
//! [`regenerate`] rewrites those three lines and leaves every other byte of
//! the file untouched:
//!
//! ```
//! use mr_codegen::{Regeneration, regenerate};
//! use mr_core::ProtocolConfig;
//!
//! let source = "\
//! // META_PROGRAM: react.godot script.
//! [ReactProp]
//! private int n;
//! // Don't edit! Generated by meta programming.
//!
//! // Don't edit! Generated by meta programming.
//!
//! // Don't edit! Generated by meta programming.
//!
//! ";
//!
//! let Regeneration::Annotated(out) = regenerate(source, &ProtocolConfig::default())? else {
//!     unreachable!();
//! };
//! assert!(out.changed);
//! assert!(out.text.contains("        int n_\n"));
//! # Ok::<(), mr_codegen::CodegenError>(())
//! ```
//!
//! Files without the header are reported as [`Regeneration::NotAnnotated`].
//! Malformed declarations and truncated files are a [`CodegenError`].

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod declaration;
pub mod error;
pub mod machine;
pub mod render;
pub mod stage;

pub use declaration::{parse_prop, parse_state};
pub use error::CodegenError;
pub use machine::{Regenerated, Regeneration, regenerate};
pub use render::{PLACEHOLDER, render_formal_params, render_prop_diff, render_state_accessors};
pub use stage::Stage;
