use crate::error::PrimitivesError;
use crate::material::{Material, RegistryKey};
use crate::registry::TypeRegistry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Memoizes parsed registries by (chain name, spec name, spec version).
///
/// The cache is an ordinary value: callers own it and share it with `Arc`
/// (or a `&`) across builds. Population is atomic per key, so concurrent
/// requests for the same material always observe one instance.
#[derive(Debug, Default)]
pub struct RegistryCache {
    entries: DashMap<RegistryKey, Arc<TypeRegistry>>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(&self, material: &Material) -> Result<Arc<TypeRegistry>, PrimitivesError> {
        let key = material.registry_key();
        if let Some(entry) = self.entries.get(&key) {
            return Ok(entry.value().clone());
        }

        let entry = self.entries.entry(key).or_try_insert_with(|| {
            debug!(key = %material.registry_key(), "populating registry cache");
            TypeRegistry::from_material(material).map(Arc::new)
        })?;
        Ok(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
