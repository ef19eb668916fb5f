use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use scenario_schema::{
    BatchId, BatchPropertyId, CompartmentId, CompartmentPropertyId, ComponentId,
    GlobalComponentId, GlobalPropertyId, GroupId, GroupPropertyId, GroupTypeId, MapOption,
    MaterialId, MaterialsProducerId, MaterialsProducerPropertyId, PersonId, PersonPropertyId,
    PropertyDefinition, PropertyValue, RandomNumberGeneratorId, RegionId, RegionPropertyId,
    ReportId, ResourceId, ResourcePropertyId, StageId, TimeTrackingPolicy,
};

use crate::builder::scoped_definition;
use crate::component::{Component, ComponentSupplier};
use crate::data::{ScenarioData, ScopedDefinitions};
use crate::error::ScenarioError;
use crate::hashing::FnvHasher;

/// Immutable, validated initial state of a simulation run.
///
/// Cloning is cheap and the scenario can be read from any number of threads.
/// Property getters apply the resolution rule: the explicit value for the
/// (entity, property) pair, else the definition's default, else `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    data: Arc<ScenarioData>,
}

impl Scenario {
    pub(crate) fn from_data(data: ScenarioData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    pub(crate) fn data(&self) -> &ScenarioData {
        &self.data
    }

    pub fn person_region_arrival_tracking(&self) -> TimeTrackingPolicy {
        self.data.person_region_arrival_tracking.unwrap_or_default()
    }

    pub fn person_compartment_arrival_tracking(&self) -> TimeTrackingPolicy {
        self.data
            .person_compartment_arrival_tracking
            .unwrap_or_default()
    }

    pub fn region_map_option(&self) -> MapOption {
        self.data.region_map_option.unwrap_or_default()
    }

    pub fn compartment_map_option(&self) -> MapOption {
        self.data.compartment_map_option.unwrap_or_default()
    }

    pub fn suggested_population_size(&self) -> usize {
        self.data.suggested_population_size.unwrap_or_default()
    }

    pub fn resource_time_tracking(
        &self,
        resource: &ResourceId,
    ) -> Result<TimeTrackingPolicy, ScenarioError> {
        self.data
            .resources
            .assert_exists(resource, ScenarioError::UnknownResourceId)?;
        Ok(self
            .data
            .resource_time_tracking
            .get(resource)
            .copied()
            .unwrap_or_default())
    }

    pub fn global_component_ids(&self) -> impl Iterator<Item = &GlobalComponentId> {
        self.data.global_components.ids()
    }

    pub fn region_ids(&self) -> impl Iterator<Item = &RegionId> {
        self.data.regions.ids()
    }

    pub fn compartment_ids(&self) -> impl Iterator<Item = &CompartmentId> {
        self.data.compartments.ids()
    }

    pub fn materials_producer_ids(&self) -> impl Iterator<Item = &MaterialsProducerId> {
        self.data.materials_producers.ids()
    }

    pub fn material_ids(&self) -> impl Iterator<Item = &MaterialId> {
        self.data.materials.ids()
    }

    pub fn resource_ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.data.resources.ids()
    }

    pub fn group_type_ids(&self) -> impl Iterator<Item = &GroupTypeId> {
        self.data.group_types.ids()
    }

    pub fn random_number_generator_ids(&self) -> impl Iterator<Item = &RandomNumberGeneratorId> {
        self.data.random_number_generators.ids()
    }

    pub fn report_ids(&self) -> impl Iterator<Item = &ReportId> {
        self.data.reports.ids()
    }

    pub fn component_supplier(&self, id: &ComponentId) -> Result<&ComponentSupplier, ScenarioError> {
        match id {
            ComponentId::Global(id) => self
                .data
                .global_components
                .assert_exists(id, ScenarioError::UnknownGlobalComponentId),
            ComponentId::Region(id) => self
                .data
                .regions
                .assert_exists(id, ScenarioError::UnknownRegionId),
            ComponentId::Compartment(id) => self
                .data
                .compartments
                .assert_exists(id, ScenarioError::UnknownCompartmentId),
            ComponentId::MaterialsProducer(id) => self
                .data
                .materials_producers
                .assert_exists(id, ScenarioError::UnknownMaterialsProducerId),
        }
    }

    /// Creates and initializes a fresh behavior instance for a component.
    pub fn instantiate_component(&self, id: &ComponentId) -> Result<Box<dyn Component>, ScenarioError> {
        let mut component = self.component_supplier(id)?.instantiate();
        component.init(id);
        Ok(component)
    }

    pub fn person_ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.data.people.ids().copied()
    }

    pub fn person_count(&self) -> usize {
        self.data.people.len()
    }

    pub fn person_region(&self, person: PersonId) -> Result<&RegionId, ScenarioError> {
        self.data
            .people
            .assert_exists(&person, ScenarioError::UnknownPersonId)
            .map(|record| &record.region)
    }

    pub fn person_compartment(&self, person: PersonId) -> Result<&CompartmentId, ScenarioError> {
        self.data
            .people
            .assert_exists(&person, ScenarioError::UnknownPersonId)
            .map(|record| &record.compartment)
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &GroupId> {
        self.data.groups.ids()
    }

    pub fn group_type(&self, group: &GroupId) -> Result<&GroupTypeId, ScenarioError> {
        self.data
            .groups
            .assert_exists(group, ScenarioError::UnknownGroupId)
    }

    pub fn group_members(&self, group: &GroupId) -> Result<Vec<PersonId>, ScenarioError> {
        self.group_type(group)?;
        Ok(self
            .data
            .group_members
            .get(group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }

    pub fn groups_for_person(&self, person: PersonId) -> Result<Vec<GroupId>, ScenarioError> {
        self.data
            .people
            .assert_exists(&person, ScenarioError::UnknownPersonId)?;
        Ok(self
            .data
            .group_members
            .iter()
            .filter(|(_, members)| members.contains(&person))
            .map(|(group, _)| group.clone())
            .collect())
    }

    pub fn batch_ids(&self) -> impl Iterator<Item = &BatchId> {
        self.data.batches.ids()
    }

    pub fn batch_material(&self, batch: &BatchId) -> Result<&MaterialId, ScenarioError> {
        self.data
            .batches
            .assert_exists(batch, ScenarioError::UnknownBatchId)
            .map(|record| &record.material)
    }

    pub fn batch_amount(&self, batch: &BatchId) -> Result<f64, ScenarioError> {
        self.data
            .batches
            .assert_exists(batch, ScenarioError::UnknownBatchId)
            .map(|record| record.amount)
    }

    pub fn batch_materials_producer(
        &self,
        batch: &BatchId,
    ) -> Result<&MaterialsProducerId, ScenarioError> {
        self.data
            .batches
            .assert_exists(batch, ScenarioError::UnknownBatchId)
            .map(|record| &record.producer)
    }

    pub fn batch_stage(&self, batch: &BatchId) -> Result<Option<&StageId>, ScenarioError> {
        self.data
            .batches
            .assert_exists(batch, ScenarioError::UnknownBatchId)?;
        Ok(self.data.staged_batches.get(batch))
    }

    pub fn stage_ids(&self) -> impl Iterator<Item = &StageId> {
        self.data.stages.ids()
    }

    pub fn stage_is_offered(&self, stage: &StageId) -> Result<bool, ScenarioError> {
        self.data
            .stages
            .assert_exists(stage, ScenarioError::UnknownStageId)
            .map(|record| record.offered)
    }

    pub fn stage_materials_producer(
        &self,
        stage: &StageId,
    ) -> Result<&MaterialsProducerId, ScenarioError> {
        self.data
            .stages
            .assert_exists(stage, ScenarioError::UnknownStageId)
            .map(|record| &record.producer)
    }

    pub fn stage_batches(&self, stage: &StageId) -> Result<Vec<BatchId>, ScenarioError> {
        self.data
            .stages
            .assert_exists(stage, ScenarioError::UnknownStageId)?;
        Ok(self
            .data
            .staged_batches
            .iter()
            .filter(|(_, owner)| *owner == stage)
            .map(|(batch, _)| batch.clone())
            .collect())
    }

    pub fn global_property_ids(&self) -> impl Iterator<Item = &GlobalPropertyId> {
        self.data.global_property_definitions.keys()
    }

    pub fn global_property_definition(
        &self,
        property: &GlobalPropertyId,
    ) -> Result<&PropertyDefinition, ScenarioError> {
        self.data
            .global_property_definitions
            .get(property)
            .ok_or_else(|| ScenarioError::UnknownPropertyId(format!("global property {property}")))
    }

    pub fn global_property_value(
        &self,
        property: &GlobalPropertyId,
    ) -> Result<Option<&PropertyValue>, ScenarioError> {
        let definition = self.global_property_definition(property)?;
        Ok(resolve(
            self.data.global_property_values.get(property),
            definition,
        ))
    }

    pub fn region_property_ids(&self) -> impl Iterator<Item = &RegionPropertyId> {
        self.data.region_property_definitions.keys()
    }

    pub fn region_property_definition(
        &self,
        property: &RegionPropertyId,
    ) -> Result<&PropertyDefinition, ScenarioError> {
        self.data
            .region_property_definitions
            .get(property)
            .ok_or_else(|| ScenarioError::UnknownPropertyId(format!("region property {property}")))
    }

    pub fn region_property_value(
        &self,
        region: &RegionId,
        property: &RegionPropertyId,
    ) -> Result<Option<&PropertyValue>, ScenarioError> {
        self.data
            .regions
            .assert_exists(region, ScenarioError::UnknownRegionId)?;
        let definition = self.region_property_definition(property)?;
        Ok(resolve(
            self.data
                .region_property_values
                .get(&(region.clone(), property.clone())),
            definition,
        ))
    }

    pub fn compartment_property_ids(
        &self,
        compartment: &CompartmentId,
    ) -> Result<impl Iterator<Item = &CompartmentPropertyId> + '_, ScenarioError> {
        self.data
            .compartments
            .assert_exists(compartment, ScenarioError::UnknownCompartmentId)?;
        Ok(scoped_ids(
            &self.data.compartment_property_definitions,
            compartment,
        ))
    }

    pub fn compartment_property_definition(
        &self,
        compartment: &CompartmentId,
        property: &CompartmentPropertyId,
    ) -> Result<&PropertyDefinition, ScenarioError> {
        self.data
            .compartments
            .assert_exists(compartment, ScenarioError::UnknownCompartmentId)?;
        scoped_definition(
            &self.data.compartment_property_definitions,
            compartment,
            property,
        )
        .ok_or_else(|| {
            ScenarioError::UnknownPropertyId(format!(
                "compartment property {property} of compartment {compartment}"
            ))
        })
    }

    pub fn compartment_property_value(
        &self,
        compartment: &CompartmentId,
        property: &CompartmentPropertyId,
    ) -> Result<Option<&PropertyValue>, ScenarioError> {
        let definition = self.compartment_property_definition(compartment, property)?;
        Ok(resolve(
            self.data
                .compartment_property_values
                .get(&(compartment.clone(), property.clone())),
            definition,
        ))
    }

    pub fn materials_producer_property_ids(
        &self,
    ) -> impl Iterator<Item = &MaterialsProducerPropertyId> {
        self.data.materials_producer_property_definitions.keys()
    }

    pub fn materials_producer_property_definition(
        &self,
        property: &MaterialsProducerPropertyId,
    ) -> Result<&PropertyDefinition, ScenarioError> {
        self.data
            .materials_producer_property_definitions
            .get(property)
            .ok_or_else(|| {
                ScenarioError::UnknownPropertyId(format!("materials producer property {property}"))
            })
    }

    pub fn materials_producer_property_value(
        &self,
        producer: &MaterialsProducerId,
        property: &MaterialsProducerPropertyId,
    ) -> Result<Option<&PropertyValue>, ScenarioError> {
        self.data
            .materials_producers
            .assert_exists(producer, ScenarioError::UnknownMaterialsProducerId)?;
        let definition = self.materials_producer_property_definition(property)?;
        Ok(resolve(
            self.data
                .materials_producer_property_values
                .get(&(producer.clone(), property.clone())),
            definition,
        ))
    }

    pub fn resource_property_ids(
        &self,
        resource: &ResourceId,
    ) -> Result<impl Iterator<Item = &ResourcePropertyId> + '_, ScenarioError> {
        self.data
            .resources
            .assert_exists(resource, ScenarioError::UnknownResourceId)?;
        Ok(scoped_ids(&self.data.resource_property_definitions, resource))
    }

    pub fn resource_property_definition(
        &self,
        resource: &ResourceId,
        property: &ResourcePropertyId,
    ) -> Result<&PropertyDefinition, ScenarioError> {
        self.data
            .resources
            .assert_exists(resource, ScenarioError::UnknownResourceId)?;
        scoped_definition(&self.data.resource_property_definitions, resource, property)
            .ok_or_else(|| {
                ScenarioError::UnknownPropertyId(format!(
                    "resource property {property} of resource {resource}"
                ))
            })
    }

    pub fn resource_property_value(
        &self,
        resource: &ResourceId,
        property: &ResourcePropertyId,
    ) -> Result<Option<&PropertyValue>, ScenarioError> {
        let definition = self.resource_property_definition(resource, property)?;
        Ok(resolve(
            self.data
                .resource_property_values
                .get(&(resource.clone(), property.clone())),
            definition,
        ))
    }

    pub fn person_property_ids(&self) -> impl Iterator<Item = &PersonPropertyId> {
        self.data.person_property_definitions.keys()
    }

    pub fn person_property_definition(
        &self,
        property: &PersonPropertyId,
    ) -> Result<&PropertyDefinition, ScenarioError> {
        self.data
            .person_property_definitions
            .get(property)
            .ok_or_else(|| ScenarioError::UnknownPropertyId(format!("person property {property}")))
    }

    pub fn person_property_value(
        &self,
        person: PersonId,
        property: &PersonPropertyId,
    ) -> Result<Option<&PropertyValue>, ScenarioError> {
        self.data
            .people
            .assert_exists(&person, ScenarioError::UnknownPersonId)?;
        let definition = self.person_property_definition(property)?;
        Ok(resolve(
            self.data
                .person_property_values
                .get(&(person, property.clone())),
            definition,
        ))
    }

    pub fn group_property_ids(
        &self,
        group_type: &GroupTypeId,
    ) -> Result<impl Iterator<Item = &GroupPropertyId> + '_, ScenarioError> {
        self.data
            .group_types
            .assert_exists(group_type, ScenarioError::UnknownGroupTypeId)?;
        Ok(scoped_ids(&self.data.group_property_definitions, group_type))
    }

    pub fn group_property_definition(
        &self,
        group_type: &GroupTypeId,
        property: &GroupPropertyId,
    ) -> Result<&PropertyDefinition, ScenarioError> {
        self.data
            .group_types
            .assert_exists(group_type, ScenarioError::UnknownGroupTypeId)?;
        scoped_definition(&self.data.group_property_definitions, group_type, property)
            .ok_or_else(|| {
                ScenarioError::UnknownPropertyId(format!(
                    "group property {property} of group type {group_type}"
                ))
            })
    }

    pub fn group_property_value(
        &self,
        group: &GroupId,
        property: &GroupPropertyId,
    ) -> Result<Option<&PropertyValue>, ScenarioError> {
        let group_type = self.group_type(group)?;
        let definition = self.group_property_definition(group_type, property)?;
        Ok(resolve(
            self.data
                .group_property_values
                .get(&(group.clone(), property.clone())),
            definition,
        ))
    }

    pub fn batch_property_ids(
        &self,
        material: &MaterialId,
    ) -> Result<impl Iterator<Item = &BatchPropertyId> + '_, ScenarioError> {
        self.data
            .materials
            .assert_exists(material, ScenarioError::UnknownMaterialId)?;
        Ok(scoped_ids(&self.data.batch_property_definitions, material))
    }

    pub fn batch_property_definition(
        &self,
        material: &MaterialId,
        property: &BatchPropertyId,
    ) -> Result<&PropertyDefinition, ScenarioError> {
        self.data
            .materials
            .assert_exists(material, ScenarioError::UnknownMaterialId)?;
        scoped_definition(&self.data.batch_property_definitions, material, property)
            .ok_or_else(|| {
                ScenarioError::UnknownPropertyId(format!(
                    "batch property {property} of material {material}"
                ))
            })
    }

    pub fn batch_property_value(
        &self,
        batch: &BatchId,
        property: &BatchPropertyId,
    ) -> Result<Option<&PropertyValue>, ScenarioError> {
        let material = self.batch_material(batch)?;
        let definition = self.batch_property_definition(material, property)?;
        Ok(resolve(
            self.data
                .batch_property_values
                .get(&(batch.clone(), property.clone())),
            definition,
        ))
    }

    pub fn region_resource_level(
        &self,
        region: &RegionId,
        resource: &ResourceId,
    ) -> Result<i64, ScenarioError> {
        self.data
            .regions
            .assert_exists(region, ScenarioError::UnknownRegionId)?;
        self.data
            .resources
            .assert_exists(resource, ScenarioError::UnknownResourceId)?;
        Ok(self
            .data
            .region_resource_levels
            .get(&(region.clone(), resource.clone()))
            .copied()
            .unwrap_or(0))
    }

    pub fn person_resource_level(
        &self,
        person: PersonId,
        resource: &ResourceId,
    ) -> Result<i64, ScenarioError> {
        self.data
            .people
            .assert_exists(&person, ScenarioError::UnknownPersonId)?;
        self.data
            .resources
            .assert_exists(resource, ScenarioError::UnknownResourceId)?;
        Ok(self
            .data
            .person_resource_levels
            .get(&(person, resource.clone()))
            .copied()
            .unwrap_or(0))
    }

    pub fn materials_producer_resource_level(
        &self,
        producer: &MaterialsProducerId,
        resource: &ResourceId,
    ) -> Result<i64, ScenarioError> {
        self.data
            .materials_producers
            .assert_exists(producer, ScenarioError::UnknownMaterialsProducerId)?;
        self.data
            .resources
            .assert_exists(resource, ScenarioError::UnknownResourceId)?;
        Ok(self
            .data
            .materials_producer_resource_levels
            .get(&(producer.clone(), resource.clone()))
            .copied()
            .unwrap_or(0))
    }

    /// Deterministic structural hash of the scenario.
    ///
    /// Component suppliers are opaque and only contribute their ids.
    pub fn fingerprint(&self) -> u64 {
        let data = &*self.data;
        let mut hasher = FnvHasher::new();

        data.person_region_arrival_tracking.hash(&mut hasher);
        data.person_compartment_arrival_tracking.hash(&mut hasher);
        data.region_map_option.hash(&mut hasher);
        data.compartment_map_option.hash(&mut hasher);
        data.suggested_population_size.hash(&mut hasher);

        hash_ids(&mut hasher, data.global_components.ids());
        hash_ids(&mut hasher, data.regions.ids());
        hash_ids(&mut hasher, data.compartments.ids());
        hash_ids(&mut hasher, data.materials_producers.ids());
        hash_ids(&mut hasher, data.materials.ids());
        hash_ids(&mut hasher, data.random_number_generators.ids());
        hash_ids(&mut hasher, data.reports.ids());
        hash_ids(&mut hasher, data.group_types.ids());
        hash_ids(&mut hasher, data.resources.ids());

        hash_scoped_definitions(&mut hasher, &data.batch_property_definitions);
        hash_scoped_definitions(&mut hasher, &data.compartment_property_definitions);
        hash_definitions(&mut hasher, &data.region_property_definitions);
        hash_scoped_definitions(&mut hasher, &data.resource_property_definitions);
        hash_definitions(&mut hasher, &data.global_property_definitions);
        hash_definitions(&mut hasher, &data.person_property_definitions);
        hash_definitions(&mut hasher, &data.materials_producer_property_definitions);
        hash_scoped_definitions(&mut hasher, &data.group_property_definitions);

        hash_values(&mut hasher, &data.compartment_property_values);
        hash_values(&mut hasher, &data.region_property_values);
        hash_values(&mut hasher, &data.resource_property_values);
        hash_values(&mut hasher, &data.global_property_values);
        hash_values(&mut hasher, &data.materials_producer_property_values);
        hash_values(&mut hasher, &data.person_property_values);
        hash_values(&mut hasher, &data.group_property_values);
        hash_values(&mut hasher, &data.batch_property_values);

        data.resource_time_tracking.hash(&mut hasher);
        data.region_resource_levels.hash(&mut hasher);
        data.materials_producer_resource_levels.hash(&mut hasher);
        data.person_resource_levels.hash(&mut hasher);

        for (person, record) in data.people.iter() {
            person.hash(&mut hasher);
            record.region.hash(&mut hasher);
            record.compartment.hash(&mut hasher);
        }
        for (group, group_type) in data.groups.iter() {
            group.hash(&mut hasher);
            group_type.hash(&mut hasher);
        }
        data.group_members.hash(&mut hasher);
        for (batch, record) in data.batches.iter() {
            batch.hash(&mut hasher);
            record.material.hash(&mut hasher);
            hasher.write_u64(record.amount.to_bits());
            record.producer.hash(&mut hasher);
        }
        for (stage, record) in data.stages.iter() {
            stage.hash(&mut hasher);
            record.offered.hash(&mut hasher);
            record.producer.hash(&mut hasher);
        }
        data.staged_batches.hash(&mut hasher);

        hasher.finish()
    }
}

fn resolve<'a>(
    explicit: Option<&'a PropertyValue>,
    definition: &'a PropertyDefinition,
) -> Option<&'a PropertyValue> {
    explicit.or_else(|| definition.default_value())
}

fn scoped_ids<'a, S: Ord, P: Ord>(
    definitions: &'a ScopedDefinitions<S, P>,
    scope: &S,
) -> impl Iterator<Item = &'a P> + 'a {
    definitions
        .get(scope)
        .into_iter()
        .flat_map(|properties| properties.keys())
}

fn hash_ids<'a, T: Hash + 'a>(hasher: &mut FnvHasher, ids: impl Iterator<Item = &'a T>) {
    let mut count = 0usize;
    for id in ids {
        id.hash(hasher);
        count += 1;
    }
    hasher.write_usize(count);
}

fn hash_value(hasher: &mut FnvHasher, value: &PropertyValue) {
    value.value_type().hash(hasher);
    match value {
        PropertyValue::Boolean(value) => value.hash(hasher),
        PropertyValue::Integer(value) => value.hash(hasher),
        PropertyValue::Float(value) => hasher.write_u64(value.to_bits()),
        PropertyValue::Text(value) => value.hash(hasher),
    }
}

fn hash_definition(hasher: &mut FnvHasher, definition: &PropertyDefinition) {
    definition.value_type().hash(hasher);
    definition.is_mutable().hash(hasher);
    match definition.default_value() {
        Some(value) => {
            hasher.write_u8(1);
            hash_value(hasher, value);
        }
        None => hasher.write_u8(0),
    }
}

fn hash_definitions<P: Hash>(hasher: &mut FnvHasher, definitions: &BTreeMap<P, PropertyDefinition>) {
    hasher.write_usize(definitions.len());
    for (property, definition) in definitions {
        property.hash(hasher);
        hash_definition(hasher, definition);
    }
}

fn hash_scoped_definitions<S: Hash, P: Hash>(
    hasher: &mut FnvHasher,
    definitions: &ScopedDefinitions<S, P>,
) {
    hasher.write_usize(definitions.len());
    for (scope, properties) in definitions {
        scope.hash(hasher);
        hash_definitions(hasher, properties);
    }
}

fn hash_values<K: Hash>(hasher: &mut FnvHasher, values: &BTreeMap<K, PropertyValue>) {
    hasher.write_usize(values.len());
    for (key, value) in values {
        key.hash(hasher);
        hash_value(hasher, value);
    }
}
