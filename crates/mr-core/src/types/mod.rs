//! Domain types for the meta-react code generator.
//!
//! # Module Organization
//!
//! - [`prop`] - Externally supplied, constructor-style inputs and their type classification
//! - [`state`] - Internally owned reactive fields
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use mr_core::{Prop, PropKind, State};
//! ```

pub mod prop;
pub mod state;

pub use prop::{Advisory, Prop, PropKind};
pub use state::State;
