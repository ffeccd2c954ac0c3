//! Core types, configuration, and errors for the meta-react code generator.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Declaration types ([`Prop`], [`State`], [`PropKind`])
//! - Configuration structures ([`Config`], [`ProtocolConfig`], [`WorkerConfig`], [`WatchConfig`])
//! - [`ConfigError`] for configuration loading and validation
//! - Type alias for `FxHashSet` (faster than std)
//! - [`is_editor_scratch`] for editor lock files

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod paths;
pub mod types;

pub use config::{Config, ProtocolConfig, WatchConfig, WorkerConfig};
pub use error::ConfigError;
pub use hash::{FxHashSet, fx_hash_set_with_capacity};
pub use paths::is_editor_scratch;
pub use types::{Advisory, Prop, PropKind, State};
