//! Configuration structures for the meta-react code generator.
//!
//! This module provides configuration types for all components of the application:
//!
//! - [`ProtocolConfig`] - Markers and file extension recognised in annotated files
//! - [`WorkerConfig`] - Change-coalescing worker settings (settle delay, capacity)
//! - [`WatchConfig`] - File watcher settings (recursion)
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] with the values used by the
//! react.godot script protocol, so an empty JSON object is a valid config file.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Markers that make up the annotation protocol.
///
/// # Examples
///
/// ```
/// use mr_core::ProtocolConfig;
///
/// let protocol = ProtocolConfig::default();
/// assert_eq!(protocol.file_extension, "cs");
/// assert_eq!(protocol.prop_attribute, "[ReactProp]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Extension (without the leading dot, case-insensitive) of candidate files.
    pub file_extension: String,

    /// Prefix the first line of an annotated file must start with.
    pub header_marker: String,

    /// Prefix of the trimmed line that precedes each generated region.
    pub generated_marker: String,

    /// Trimmed line that precedes a State declaration.
    pub state_attribute: String,

    /// Trimmed line that precedes a Prop declaration.
    pub prop_attribute: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            file_extension: "cs".to_owned(),
            header_marker: "// META_PROGRAM: react.godot script.".to_owned(),
            generated_marker: "// Don't edit! Generated by meta programming.".to_owned(),
            state_attribute: "[ReactState]".to_owned(),
            prop_attribute: "[ReactProp]".to_owned(),
        }
    }
}

impl ProtocolConfig {
    /// Returns `true` if the path carries the configured file extension.
    ///
    /// The comparison ignores ASCII case and surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use mr_core::ProtocolConfig;
    /// use camino::Utf8Path;
    ///
    /// let protocol = ProtocolConfig::default();
    /// assert!(protocol.matches_extension(Utf8Path::new("Butt.cs")));
    /// assert!(protocol.matches_extension(Utf8Path::new("VBox.CS")));
    /// assert!(!protocol.matches_extension(Utf8Path::new("script.gd")));
    /// ```
    #[must_use]
    pub fn matches_extension(&self, path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.trim().eq_ignore_ascii_case(&self.file_extension))
    }
}

/// Configuration for the change-coalescing worker.
///
/// # Examples
///
/// ```
/// use mr_core::WorkerConfig;
///
/// let config = WorkerConfig::default();
/// assert_eq!(config.settle_ms, 100);
/// assert_eq!(config.queue_capacity, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Pause in milliseconds before a dequeued path is processed.
    ///
    /// Rapid repeated edits of the same file inside this window collapse
    /// into a single revalidation.
    pub settle_ms: u64,

    /// Initial bound on signaled-but-unprocessed work units.
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            settle_ms: 100,
            queue_capacity: 8,
        }
    }
}

/// Configuration for the file watcher.
///
/// # Examples
///
/// ```
/// use mr_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { recursive: true }
    }
}

/// Root configuration for meta-react.
///
/// Combines all component configurations into a single structure that can be
/// loaded from a JSON file or constructed programmatically.
///
/// # Examples
///
/// ```
/// use mr_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned by the batch pass and watched afterwards.
    pub root_path: Utf8PathBuf,

    /// Annotation protocol markers.
    pub protocol: ProtocolConfig,

    /// Change-coalescing worker configuration.
    pub worker: WorkerConfig,

    /// File watcher configuration.
    pub watch: WatchConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values. The loaded configuration is
    /// validated before it is returned.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker.queue_capacity == 0 {
            return Err(ConfigError::invalid_option(
                "worker.queue_capacity",
                "must be at least 1",
            ));
        }

        let markers = [
            ("protocol.file_extension", &self.protocol.file_extension),
            ("protocol.header_marker", &self.protocol.header_marker),
            ("protocol.generated_marker", &self.protocol.generated_marker),
            ("protocol.state_attribute", &self.protocol.state_attribute),
            ("protocol.prop_attribute", &self.protocol.prop_attribute),
        ];
        for (option, value) in markers {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid_option(option, "must not be empty"));
            }
        }

        if self.protocol.state_attribute == self.protocol.prop_attribute {
            return Err(ConfigError::invalid_option(
                "protocol.state_attribute",
                "must differ from protocol.prop_attribute",
            ));
        }

        Ok(())
    }

    /// Checks that [`root_path`](Self::root_path) names an existing directory.
    pub fn validate_root(&self) -> Result<(), ConfigError> {
        if !self.root_path.exists() {
            return Err(ConfigError::MissingDirectory(self.root_path.clone()));
        }
        if !self.root_path.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: self.root_path.clone(),
                reason: "not a directory".to_owned(),
            });
        }
        Ok(())
    }
}
