// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Explicit type registry.
//!
//! Maps type names to descriptors. Entries are added when types are
//! registered (by hand or by the XML loader) and are only dropped by
//! [`TypeRegistry::clear`]. The registry is passed around by reference
//! instead of living in a process-wide global.

use crate::data::DynamicData;
use crate::error::{DynamicDataError, Result};
use crate::types::TypeDescriptor;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Name -> descriptor registry, shareable across threads.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own name.
    ///
    /// Returns the previously registered descriptor with that name, if any.
    pub fn register(&self, desc: Arc<TypeDescriptor>) -> Option<Arc<TypeDescriptor>> {
        let name = desc.name.clone();
        self.register_as(name, desc)
    }

    /// Register a descriptor under an explicit name.
    pub fn register_as(
        &self,
        name: impl Into<String>,
        desc: Arc<TypeDescriptor>,
    ) -> Option<Arc<TypeDescriptor>> {
        let name = name.into();
        log::debug!("[dynamic] registering type '{}'", name);
        let previous = self.types.write().insert(name, desc);
        if let Some(prev) = &previous {
            log::debug!("[dynamic] type '{}' replaced", prev.name);
        }
        previous
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(name).cloned()
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Create a zero-initialized sample of a registered type.
    pub fn create_data(&self, name: &str) -> Result<DynamicData> {
        let desc = self
            .get(name)
            .ok_or_else(|| DynamicDataError::UnknownType(name.to_string()))?;
        Ok(DynamicData::new(&desc))
    }

    /// Drop every entry (process or test teardown).
    pub fn clear(&self) {
        self.types.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrimitiveKind, TypeDescriptorBuilder};

    #[test]
    fn test_register_and_create() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());

        let point = Arc::new(
            TypeDescriptorBuilder::new("Point")
                .field("x", PrimitiveKind::I32)
                .build(),
        );
        assert!(registry.register(point.clone()).is_none());
        assert!(registry.contains("Point"));
        assert_eq!(registry.names(), vec!["Point".to_string()]);

        let data = registry.create_data("Point").expect("create");
        assert_eq!(data.type_name(), "Point");

        assert!(registry.register(point).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_type() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.create_data("Missing"),
            Err(DynamicDataError::UnknownType(_))
        ));
    }

    #[test]
    fn test_clear() {
        let registry = TypeRegistry::new();
        registry.register_as(
            "Alias",
            Arc::new(TypeDescriptorBuilder::new("Point").build()),
        );
        assert!(registry.get("Alias").is_some());
        registry.clear();
        assert!(registry.get("Alias").is_none());
    }
}
