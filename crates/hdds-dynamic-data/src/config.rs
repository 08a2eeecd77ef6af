// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Access properties for dynamic samples.
//!
//! # Example YAML
//!
//! ```yaml
//! # dynamic_data.yaml
//! expand_collections: true
//! auto_grow_sequences: false
//! max_path_depth: 16
//! ```

use serde::Deserialize;
#[cfg(feature = "type-loaders")]
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a [`DataProperty`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "type-loaders")]
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Options controlling how a sample is read and written.
///
/// Every sample carries one; loans and nested copies inherit the
/// property of the sample they come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataProperty {
    /// Return collection members as `Value::List` instead of nested samples.
    pub expand_collections: bool,

    /// Setting sequence element `i >= len` grows the sequence up to `i`.
    pub auto_grow_sequences: bool,

    /// Maximum number of segments in a member path.
    pub max_path_depth: usize,

    /// Capacity reserved for sequences in freshly created samples.
    pub initial_sequence_capacity: usize,
}

impl Default for DataProperty {
    fn default() -> Self {
        Self {
            expand_collections: false,
            auto_grow_sequences: true,
            max_path_depth: 32,
            initial_sequence_capacity: 0,
        }
    }
}

impl DataProperty {
    /// Enable or disable collection expansion.
    pub fn expand_collections(mut self, enabled: bool) -> Self {
        self.expand_collections = enabled;
        self
    }

    /// Enable or disable sequence auto-growth.
    pub fn auto_grow_sequences(mut self, enabled: bool) -> Self {
        self.auto_grow_sequences = enabled;
        self
    }

    /// Set the maximum path depth.
    pub fn max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Parse a property from YAML. Missing keys keep their defaults.
    #[cfg(feature = "type-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a property from a YAML file.
    #[cfg(feature = "type-loaders")]
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("[config] loading data property from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
