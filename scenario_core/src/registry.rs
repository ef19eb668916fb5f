use std::collections::{btree_map, BTreeMap};

use scenario_schema::ComponentId;

use crate::error::ScenarioError;

/// Ordered set of identifiers of one namespace, each carrying a payload.
///
/// `assert_unique` and `assert_exists` back nearly every builder
/// precondition; the caller picks the error variant so each namespace reports
/// its own kind.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierRegistry<K, V = ()> {
    entries: BTreeMap<K, V>,
}

impl<K, V> Default for IdentifierRegistry<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V> IdentifierRegistry<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assert_unique<E>(&self, id: &K, duplicate: impl FnOnce(K) -> E) -> Result<(), E> {
        if self.entries.contains_key(id) {
            return Err(duplicate(id.clone()));
        }
        Ok(())
    }

    pub fn assert_exists<E>(&self, id: &K, unknown: impl FnOnce(K) -> E) -> Result<&V, E> {
        self.entries.get(id).ok_or_else(|| unknown(id.clone()))
    }

    /// Callers check uniqueness first; a duplicate insert is a programming error.
    pub fn insert(&mut self, id: K, payload: V) {
        let previous = self.entries.insert(id, payload);
        debug_assert!(previous.is_none(), "identifier registered twice");
    }

    pub fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &K) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Ord + Clone> IdentifierRegistry<K, ()> {
    pub fn register(&mut self, id: K) {
        self.insert(id, ());
    }
}

/// Shared namespace for global components, regions, compartments and
/// materials producers, keyed by raw token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentRegistry {
    tokens: BTreeMap<String, ComponentId>,
}

impl ComponentRegistry {
    pub fn assert_unique(&self, id: &ComponentId) -> Result<(), ScenarioError> {
        if self.tokens.contains_key(id.token()) {
            return Err(ScenarioError::DuplicateComponentId(id.clone()));
        }
        Ok(())
    }

    pub fn register(&mut self, id: ComponentId) {
        let previous = self.tokens.insert(id.token().to_string(), id);
        debug_assert!(previous.is_none(), "component token registered twice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_schema::{CompartmentId, MaterialId, RegionId};

    #[test]
    fn second_registration_is_reported_as_duplicate() {
        let mut materials = IdentifierRegistry::<MaterialId>::new();
        let id = MaterialId::new("steel");
        assert!(materials
            .assert_unique(&id, ScenarioError::DuplicateMaterialId)
            .is_ok());
        materials.register(id.clone());
        assert_eq!(
            materials.assert_unique(&id, ScenarioError::DuplicateMaterialId),
            Err(ScenarioError::DuplicateMaterialId(id))
        );
    }

    #[test]
    fn missing_ids_are_reported_as_unknown() {
        let materials = IdentifierRegistry::<MaterialId>::new();
        let id = MaterialId::new("glass");
        assert_eq!(
            materials
                .assert_exists(&id, ScenarioError::UnknownMaterialId)
                .unwrap_err(),
            ScenarioError::UnknownMaterialId(id)
        );
    }

    #[test]
    fn component_tokens_collide_across_kinds() {
        let mut components = ComponentRegistry::default();
        components.register(RegionId::new("A").into());
        let compartment: ComponentId = CompartmentId::new("A").into();
        assert_eq!(
            components.assert_unique(&compartment),
            Err(ScenarioError::DuplicateComponentId(compartment.clone()))
        );
        assert!(components
            .assert_unique(&RegionId::new("B").into())
            .is_ok());
    }
}
