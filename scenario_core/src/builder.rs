//! Order-sensitive, single-use scenario builder.
//!
//! Every mutator validates its arguments against the facts accumulated so
//! far and either applies the new fact or returns an error without touching
//! the aggregate. Facts must therefore arrive in dependency order (a region
//! before a person living in it); see [`crate::UnstructuredScenarioBuilder`]
//! for an order-independent front end.

use std::collections::BTreeMap;
use std::fmt::Display;

use scenario_schema::{
    BatchId, BatchPropertyId, CompartmentId, CompartmentPropertyId, ComponentId,
    GlobalComponentId, GlobalPropertyId, GroupId, GroupPropertyId, GroupTypeId, MapOption,
    MaterialId, MaterialsProducerId, MaterialsProducerPropertyId, PersonId, PersonPropertyId,
    PropertyDefinition, PropertyValue, RandomNumberGeneratorId, RegionId, RegionPropertyId,
    ReportId, ResourceId, ResourcePropertyId, StageId, TimeTrackingPolicy,
};
use tracing::{info, warn};

use crate::component::ComponentSupplier;
use crate::data::{BatchRecord, PersonRecord, ScenarioData, ScopedDefinitions, StageRecord};
use crate::error::ScenarioError;
use crate::scenario::Scenario;

const LOG_TARGET: &str = "scenario::builder";

/// Eager, validating builder of a [`Scenario`].
///
/// Mutators borrow the builder exclusively and [`ScenarioBuilder::build`]
/// consumes it, so a builder can neither be re-entered nor reused after a
/// build attempt.
#[derive(Debug, Default)]
pub struct ScenarioBuilder {
    data: ScenarioData,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_person_region_arrival_tracking(
        &mut self,
        policy: TimeTrackingPolicy,
    ) -> Result<(), ScenarioError> {
        assign_once(
            &mut self.data.person_region_arrival_tracking,
            policy,
            "person region arrival tracking",
        )
    }

    pub fn set_person_compartment_arrival_tracking(
        &mut self,
        policy: TimeTrackingPolicy,
    ) -> Result<(), ScenarioError> {
        assign_once(
            &mut self.data.person_compartment_arrival_tracking,
            policy,
            "person compartment arrival tracking",
        )
    }

    pub fn set_region_map_option(&mut self, option: MapOption) -> Result<(), ScenarioError> {
        assign_once(&mut self.data.region_map_option, option, "region map option")
    }

    pub fn set_compartment_map_option(&mut self, option: MapOption) -> Result<(), ScenarioError> {
        assign_once(
            &mut self.data.compartment_map_option,
            option,
            "compartment map option",
        )
    }

    pub fn set_suggested_population_size(&mut self, size: usize) -> Result<(), ScenarioError> {
        assign_once(
            &mut self.data.suggested_population_size,
            size,
            "suggested population size",
        )
    }

    pub fn add_global_component_id(
        &mut self,
        id: GlobalComponentId,
        supplier: ComponentSupplier,
    ) -> Result<(), ScenarioError> {
        self.register_component(ComponentId::Global(id.clone()))?;
        self.data.global_components.insert(id, supplier);
        Ok(())
    }

    pub fn add_region_id(
        &mut self,
        id: RegionId,
        supplier: ComponentSupplier,
    ) -> Result<(), ScenarioError> {
        self.register_component(ComponentId::Region(id.clone()))?;
        self.data.regions.insert(id, supplier);
        Ok(())
    }

    pub fn add_compartment_id(
        &mut self,
        id: CompartmentId,
        supplier: ComponentSupplier,
    ) -> Result<(), ScenarioError> {
        self.register_component(ComponentId::Compartment(id.clone()))?;
        self.data.compartments.insert(id, supplier);
        Ok(())
    }

    pub fn add_materials_producer_id(
        &mut self,
        id: MaterialsProducerId,
        supplier: ComponentSupplier,
    ) -> Result<(), ScenarioError> {
        self.register_component(ComponentId::MaterialsProducer(id.clone()))?;
        self.data.materials_producers.insert(id, supplier);
        Ok(())
    }

    fn register_component(&mut self, id: ComponentId) -> Result<(), ScenarioError> {
        self.data.components.assert_unique(&id)?;
        self.data.components.register(id);
        Ok(())
    }

    pub fn add_material(&mut self, id: MaterialId) -> Result<(), ScenarioError> {
        self.data
            .materials
            .assert_unique(&id, ScenarioError::DuplicateMaterialId)?;
        self.data.materials.register(id);
        Ok(())
    }

    pub fn add_random_number_generator_id(
        &mut self,
        id: RandomNumberGeneratorId,
    ) -> Result<(), ScenarioError> {
        self.data
            .random_number_generators
            .assert_unique(&id, ScenarioError::DuplicateRandomNumberGeneratorId)?;
        self.data.random_number_generators.register(id);
        Ok(())
    }

    pub fn add_report_id(&mut self, id: ReportId) -> Result<(), ScenarioError> {
        self.data
            .reports
            .assert_unique(&id, ScenarioError::DuplicateReportId)?;
        self.data.reports.register(id);
        Ok(())
    }

    pub fn add_group_type_id(&mut self, id: GroupTypeId) -> Result<(), ScenarioError> {
        self.data
            .group_types
            .assert_unique(&id, ScenarioError::DuplicateGroupTypeId)?;
        self.data.group_types.register(id);
        Ok(())
    }

    pub fn add_resource(&mut self, id: ResourceId) -> Result<(), ScenarioError> {
        self.data
            .resources
            .assert_unique(&id, ScenarioError::DuplicateResourceId)?;
        self.data.resources.register(id);
        Ok(())
    }

    pub fn define_batch_property(
        &mut self,
        material: MaterialId,
        property: BatchPropertyId,
        definition: PropertyDefinition,
    ) -> Result<(), ScenarioError> {
        self.data
            .materials
            .assert_exists(&material, ScenarioError::UnknownMaterialId)?;
        define_scoped(
            &mut self.data.batch_property_definitions,
            material,
            property,
            definition,
            |material, property| format!("batch property {property} of material {material}"),
        )
    }

    pub fn define_compartment_property(
        &mut self,
        compartment: CompartmentId,
        property: CompartmentPropertyId,
        definition: PropertyDefinition,
    ) -> Result<(), ScenarioError> {
        self.data
            .compartments
            .assert_exists(&compartment, ScenarioError::UnknownCompartmentId)?;
        define_scoped(
            &mut self.data.compartment_property_definitions,
            compartment,
            property,
            definition,
            |compartment, property| {
                format!("compartment property {property} of compartment {compartment}")
            },
        )
    }

    pub fn define_region_property(
        &mut self,
        property: RegionPropertyId,
        definition: PropertyDefinition,
    ) -> Result<(), ScenarioError> {
        define_flat(
            &mut self.data.region_property_definitions,
            property,
            definition,
            "region property",
        )
    }

    pub fn define_resource_property(
        &mut self,
        resource: ResourceId,
        property: ResourcePropertyId,
        definition: PropertyDefinition,
    ) -> Result<(), ScenarioError> {
        self.data
            .resources
            .assert_exists(&resource, ScenarioError::UnknownResourceId)?;
        define_scoped(
            &mut self.data.resource_property_definitions,
            resource,
            property,
            definition,
            |resource, property| format!("resource property {property} of resource {resource}"),
        )
    }

    pub fn define_global_property(
        &mut self,
        property: GlobalPropertyId,
        definition: PropertyDefinition,
    ) -> Result<(), ScenarioError> {
        define_flat(
            &mut self.data.global_property_definitions,
            property,
            definition,
            "global property",
        )
    }

    pub fn define_person_property(
        &mut self,
        property: PersonPropertyId,
        definition: PropertyDefinition,
    ) -> Result<(), ScenarioError> {
        define_flat(
            &mut self.data.person_property_definitions,
            property,
            definition,
            "person property",
        )
    }

    pub fn define_materials_producer_property(
        &mut self,
        property: MaterialsProducerPropertyId,
        definition: PropertyDefinition,
    ) -> Result<(), ScenarioError> {
        define_flat(
            &mut self.data.materials_producer_property_definitions,
            property,
            definition,
            "materials producer property",
        )
    }

    pub fn define_group_property(
        &mut self,
        group_type: GroupTypeId,
        property: GroupPropertyId,
        definition: PropertyDefinition,
    ) -> Result<(), ScenarioError> {
        self.data
            .group_types
            .assert_exists(&group_type, ScenarioError::UnknownGroupTypeId)?;
        define_scoped(
            &mut self.data.group_property_definitions,
            group_type,
            property,
            definition,
            |group_type, property| format!("group property {property} of group type {group_type}"),
        )
    }

    pub fn set_compartment_property_value(
        &mut self,
        compartment: CompartmentId,
        property: CompartmentPropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ScenarioError> {
        self.data
            .compartments
            .assert_exists(&compartment, ScenarioError::UnknownCompartmentId)?;
        let definition =
            scoped_definition(&self.data.compartment_property_definitions, &compartment, &property)
                .ok_or_else(|| {
                    ScenarioError::UnknownPropertyId(format!(
                        "compartment property {property} of compartment {compartment}"
                    ))
                })?;
        let label = || format!("compartment property {property} of compartment {compartment}");
        assign_value(
            &self.data.compartment_property_values,
            (compartment.clone(), property.clone()),
            definition,
            &value.into(),
            label,
        )
        .map(|(key, value)| {
            self.data.compartment_property_values.insert(key, value);
        })
    }

    pub fn set_region_property_value(
        &mut self,
        region: RegionId,
        property: RegionPropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ScenarioError> {
        self.data
            .regions
            .assert_exists(&region, ScenarioError::UnknownRegionId)?;
        let definition = self
            .data
            .region_property_definitions
            .get(&property)
            .ok_or_else(|| ScenarioError::UnknownPropertyId(format!("region property {property}")))?;
        let label = || format!("region property {property} of region {region}");
        assign_value(
            &self.data.region_property_values,
            (region.clone(), property.clone()),
            definition,
            &value.into(),
            label,
        )
        .map(|(key, value)| {
            self.data.region_property_values.insert(key, value);
        })
    }

    pub fn set_resource_property_value(
        &mut self,
        resource: ResourceId,
        property: ResourcePropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ScenarioError> {
        self.data
            .resources
            .assert_exists(&resource, ScenarioError::UnknownResourceId)?;
        let definition =
            scoped_definition(&self.data.resource_property_definitions, &resource, &property)
                .ok_or_else(|| {
                    ScenarioError::UnknownPropertyId(format!(
                        "resource property {property} of resource {resource}"
                    ))
                })?;
        let label = || format!("resource property {property} of resource {resource}");
        assign_value(
            &self.data.resource_property_values,
            (resource.clone(), property.clone()),
            definition,
            &value.into(),
            label,
        )
        .map(|(key, value)| {
            self.data.resource_property_values.insert(key, value);
        })
    }

    pub fn set_global_property_value(
        &mut self,
        property: GlobalPropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ScenarioError> {
        let definition = self
            .data
            .global_property_definitions
            .get(&property)
            .ok_or_else(|| ScenarioError::UnknownPropertyId(format!("global property {property}")))?;
        let label = || format!("global property {property}");
        assign_value(
            &self.data.global_property_values,
            property.clone(),
            definition,
            &value.into(),
            label,
        )
        .map(|(key, value)| {
            self.data.global_property_values.insert(key, value);
        })
    }

    pub fn set_materials_producer_property_value(
        &mut self,
        producer: MaterialsProducerId,
        property: MaterialsProducerPropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ScenarioError> {
        self.data
            .materials_producers
            .assert_exists(&producer, ScenarioError::UnknownMaterialsProducerId)?;
        let definition = self
            .data
            .materials_producer_property_definitions
            .get(&property)
            .ok_or_else(|| {
                ScenarioError::UnknownPropertyId(format!("materials producer property {property}"))
            })?;
        let label = || format!("materials producer property {property} of producer {producer}");
        assign_value(
            &self.data.materials_producer_property_values,
            (producer.clone(), property.clone()),
            definition,
            &value.into(),
            label,
        )
        .map(|(key, value)| {
            self.data.materials_producer_property_values.insert(key, value);
        })
    }

    pub fn set_resource_time_tracking(
        &mut self,
        resource: ResourceId,
        policy: TimeTrackingPolicy,
    ) -> Result<(), ScenarioError> {
        self.data
            .resources
            .assert_exists(&resource, ScenarioError::UnknownResourceId)?;
        if self.data.resource_time_tracking.contains_key(&resource) {
            return Err(ScenarioError::PreviouslyAssignedValue(format!(
                "time tracking of resource {resource}"
            )));
        }
        self.data.resource_time_tracking.insert(resource, policy);
        Ok(())
    }

    pub fn set_region_resource_level(
        &mut self,
        region: RegionId,
        resource: ResourceId,
        amount: i64,
    ) -> Result<(), ScenarioError> {
        self.data
            .regions
            .assert_exists(&region, ScenarioError::UnknownRegionId)?;
        self.data
            .resources
            .assert_exists(&resource, ScenarioError::UnknownResourceId)?;
        let label = || format!("level of resource {resource} in region {region}");
        assign_level(
            &mut self.data.region_resource_levels,
            (region.clone(), resource.clone()),
            amount,
            label,
        )
    }

    pub fn set_materials_producer_resource_level(
        &mut self,
        producer: MaterialsProducerId,
        resource: ResourceId,
        amount: i64,
    ) -> Result<(), ScenarioError> {
        self.data
            .materials_producers
            .assert_exists(&producer, ScenarioError::UnknownMaterialsProducerId)?;
        self.data
            .resources
            .assert_exists(&resource, ScenarioError::UnknownResourceId)?;
        let label = || format!("level of resource {resource} in materials producer {producer}");
        assign_level(
            &mut self.data.materials_producer_resource_levels,
            (producer.clone(), resource.clone()),
            amount,
            label,
        )
    }

    pub fn add_person(
        &mut self,
        person: PersonId,
        region: RegionId,
        compartment: CompartmentId,
    ) -> Result<(), ScenarioError> {
        self.data
            .regions
            .assert_exists(&region, ScenarioError::UnknownRegionId)?;
        self.data
            .compartments
            .assert_exists(&compartment, ScenarioError::UnknownCompartmentId)?;
        self.data
            .people
            .assert_unique(&person, ScenarioError::DuplicatePersonId)?;
        self.data
            .people
            .insert(person, PersonRecord { region, compartment });
        Ok(())
    }

    pub fn set_person_property_value(
        &mut self,
        person: PersonId,
        property: PersonPropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ScenarioError> {
        self.data
            .people
            .assert_exists(&person, ScenarioError::UnknownPersonId)?;
        let definition = self
            .data
            .person_property_definitions
            .get(&property)
            .ok_or_else(|| ScenarioError::UnknownPropertyId(format!("person property {property}")))?;
        let label = || format!("person property {property} of person {person}");
        assign_value(
            &self.data.person_property_values,
            (person, property.clone()),
            definition,
            &value.into(),
            label,
        )
        .map(|(key, value)| {
            self.data.person_property_values.insert(key, value);
        })
    }

    pub fn set_person_resource_level(
        &mut self,
        person: PersonId,
        resource: ResourceId,
        amount: i64,
    ) -> Result<(), ScenarioError> {
        self.data
            .people
            .assert_exists(&person, ScenarioError::UnknownPersonId)?;
        self.data
            .resources
            .assert_exists(&resource, ScenarioError::UnknownResourceId)?;
        let label = || format!("level of resource {resource} held by person {person}");
        assign_level(
            &mut self.data.person_resource_levels,
            (person, resource.clone()),
            amount,
            label,
        )
    }

    pub fn add_group(&mut self, group: GroupId, group_type: GroupTypeId) -> Result<(), ScenarioError> {
        self.data
            .group_types
            .assert_exists(&group_type, ScenarioError::UnknownGroupTypeId)?;
        self.data
            .groups
            .assert_unique(&group, ScenarioError::DuplicateGroupId)?;
        self.data.groups.insert(group, group_type);
        Ok(())
    }

    pub fn set_group_property_value(
        &mut self,
        group: GroupId,
        property: GroupPropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ScenarioError> {
        let group_type = self
            .data
            .groups
            .assert_exists(&group, ScenarioError::UnknownGroupId)?;
        let definition =
            scoped_definition(&self.data.group_property_definitions, group_type, &property)
                .ok_or_else(|| {
                    ScenarioError::UnknownPropertyId(format!(
                        "group property {property} of group type {group_type}"
                    ))
                })?;
        let label = || format!("group property {property} of group {group}");
        assign_value(
            &self.data.group_property_values,
            (group.clone(), property.clone()),
            definition,
            &value.into(),
            label,
        )
        .map(|(key, value)| {
            self.data.group_property_values.insert(key, value);
        })
    }

    pub fn add_person_to_group(&mut self, group: GroupId, person: PersonId) -> Result<(), ScenarioError> {
        self.data
            .groups
            .assert_exists(&group, ScenarioError::UnknownGroupId)?;
        self.data
            .people
            .assert_exists(&person, ScenarioError::UnknownPersonId)?;
        let already_member = self
            .data
            .group_members
            .get(&group)
            .is_some_and(|members| members.contains(&person));
        if already_member {
            return Err(ScenarioError::DuplicateGroupMembership { group, person });
        }
        self.data
            .group_members
            .entry(group)
            .or_default()
            .insert(person);
        Ok(())
    }

    pub fn add_batch(
        &mut self,
        batch: BatchId,
        material: MaterialId,
        amount: f64,
        producer: MaterialsProducerId,
    ) -> Result<(), ScenarioError> {
        self.data
            .materials
            .assert_exists(&material, ScenarioError::UnknownMaterialId)?;
        self.data
            .materials_producers
            .assert_exists(&producer, ScenarioError::UnknownMaterialsProducerId)?;
        self.data
            .batches
            .assert_unique(&batch, ScenarioError::DuplicateBatchId)?;
        if !amount.is_finite() {
            return Err(ScenarioError::NonFiniteMaterialAmount(amount));
        }
        if amount < 0.0 {
            return Err(ScenarioError::NegativeMaterialAmount(amount));
        }
        self.data.batches.insert(
            batch,
            BatchRecord {
                material,
                amount,
                producer,
            },
        );
        Ok(())
    }

    pub fn set_batch_property_value(
        &mut self,
        batch: BatchId,
        property: BatchPropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ScenarioError> {
        let record = self
            .data
            .batches
            .assert_exists(&batch, ScenarioError::UnknownBatchId)?;
        let material = &record.material;
        let definition =
            scoped_definition(&self.data.batch_property_definitions, material, &property)
                .ok_or_else(|| {
                    ScenarioError::UnknownPropertyId(format!(
                        "batch property {property} of material {material}"
                    ))
                })?;
        let label = || format!("batch property {property} of batch {batch}");
        assign_value(
            &self.data.batch_property_values,
            (batch.clone(), property.clone()),
            definition,
            &value.into(),
            label,
        )
        .map(|(key, value)| {
            self.data.batch_property_values.insert(key, value);
        })
    }

    pub fn add_stage(
        &mut self,
        stage: StageId,
        offered: bool,
        producer: MaterialsProducerId,
    ) -> Result<(), ScenarioError> {
        self.data
            .materials_producers
            .assert_exists(&producer, ScenarioError::UnknownMaterialsProducerId)?;
        self.data
            .stages
            .assert_unique(&stage, ScenarioError::DuplicateStageId)?;
        self.data
            .stages
            .insert(stage, StageRecord { offered, producer });
        Ok(())
    }

    pub fn add_batch_to_stage(&mut self, stage: StageId, batch: BatchId) -> Result<(), ScenarioError> {
        let stage_record = self
            .data
            .stages
            .assert_exists(&stage, ScenarioError::UnknownStageId)?;
        let batch_record = self
            .data
            .batches
            .assert_exists(&batch, ScenarioError::UnknownBatchId)?;
        if self.data.staged_batches.contains_key(&batch) {
            return Err(ScenarioError::BatchAlreadyStaged(batch));
        }
        if stage_record.producer != batch_record.producer {
            return Err(ScenarioError::BatchStageOwnerMismatch { batch, stage });
        }
        self.data.staged_batches.insert(batch, stage);
        Ok(())
    }

    /// Checks completeness, backfills defaulted policies and freezes the
    /// aggregate. The builder is consumed whether or not this succeeds.
    pub fn build(self) -> Result<Scenario, ScenarioError> {
        let mut data = self.data;
        if let Err(err) = validate_completeness(&data) {
            warn!(target: LOG_TARGET, error = %err, "scenario.build_failed");
            return Err(err);
        }
        data.backfill_policies();
        info!(
            target: LOG_TARGET,
            regions = data.regions.len(),
            compartments = data.compartments.len(),
            resources = data.resources.len(),
            people = data.people.len(),
            groups = data.groups.len(),
            batches = data.batches.len(),
            "scenario.built"
        );
        Ok(Scenario::from_data(data))
    }
}

fn assign_once<T>(slot: &mut Option<T>, value: T, label: &str) -> Result<(), ScenarioError> {
    if slot.is_some() {
        return Err(ScenarioError::PreviouslyAssignedValue(label.to_string()));
    }
    *slot = Some(value);
    Ok(())
}

fn define_flat<P: Ord + Display>(
    definitions: &mut BTreeMap<P, PropertyDefinition>,
    property: P,
    definition: PropertyDefinition,
    kind: &str,
) -> Result<(), ScenarioError> {
    if definitions.contains_key(&property) {
        return Err(ScenarioError::DuplicatePropertyDefinition(format!(
            "{kind} {property}"
        )));
    }
    definitions.insert(property, definition);
    Ok(())
}

fn define_scoped<S: Ord, P: Ord>(
    definitions: &mut ScopedDefinitions<S, P>,
    scope: S,
    property: P,
    definition: PropertyDefinition,
    label: impl FnOnce(&S, &P) -> String,
) -> Result<(), ScenarioError> {
    if scoped_definition(definitions, &scope, &property).is_some() {
        return Err(ScenarioError::DuplicatePropertyDefinition(label(
            &scope, &property,
        )));
    }
    definitions
        .entry(scope)
        .or_default()
        .insert(property, definition);
    Ok(())
}

pub(crate) fn scoped_definition<'a, S: Ord, P: Ord>(
    definitions: &'a ScopedDefinitions<S, P>,
    scope: &S,
    property: &P,
) -> Option<&'a PropertyDefinition> {
    definitions
        .get(scope)
        .and_then(|properties| properties.get(property))
}

/// Validates an assignment without applying it; the caller inserts the
/// returned entry once every check has passed.
fn assign_value<K: Ord>(
    values: &BTreeMap<K, PropertyValue>,
    key: K,
    definition: &PropertyDefinition,
    value: &PropertyValue,
    label: impl Fn() -> String,
) -> Result<(K, PropertyValue), ScenarioError> {
    if values.contains_key(&key) {
        return Err(ScenarioError::PreviouslyAssignedValue(label()));
    }
    if let PropertyValue::Float(float) = value {
        if !float.is_finite() {
            return Err(ScenarioError::NonFinitePropertyValue {
                property: label(),
                value: *float,
            });
        }
    }
    if !definition.accepts(value) {
        return Err(ScenarioError::IncompatibleValue {
            property: label(),
            expected: definition.value_type(),
            actual: value.value_type(),
        });
    }
    Ok((key, value.clone()))
}

fn assign_level<K: Ord>(
    levels: &mut BTreeMap<K, i64>,
    key: K,
    amount: i64,
    label: impl Fn() -> String,
) -> Result<(), ScenarioError> {
    if amount < 0 {
        return Err(ScenarioError::NegativeResourceLevel(amount));
    }
    if levels.contains_key(&key) {
        return Err(ScenarioError::PreviouslyAssignedValue(label()));
    }
    levels.insert(key, amount);
    Ok(())
}

fn validate_completeness(data: &ScenarioData) -> Result<(), ScenarioError> {
    for (property, definition) in &data.global_property_definitions {
        if !definition.has_default() && !data.global_property_values.contains_key(property) {
            return Err(ScenarioError::MissingPropertyValue {
                entity: "the global scope".to_string(),
                property: property.to_string(),
            });
        }
    }

    for (property, definition) in &data.region_property_definitions {
        if definition.has_default() {
            continue;
        }
        for region in data.regions.ids() {
            if !data
                .region_property_values
                .contains_key(&(region.clone(), property.clone()))
            {
                return Err(ScenarioError::MissingPropertyValue {
                    entity: format!("region {region}"),
                    property: property.to_string(),
                });
            }
        }
    }

    for (compartment, definitions) in &data.compartment_property_definitions {
        for (property, definition) in definitions {
            if !definition.has_default()
                && !data
                    .compartment_property_values
                    .contains_key(&(compartment.clone(), property.clone()))
            {
                return Err(ScenarioError::MissingPropertyValue {
                    entity: format!("compartment {compartment}"),
                    property: property.to_string(),
                });
            }
        }
    }

    for (property, definition) in &data.materials_producer_property_definitions {
        if definition.has_default() {
            continue;
        }
        for producer in data.materials_producers.ids() {
            if !data
                .materials_producer_property_values
                .contains_key(&(producer.clone(), property.clone()))
            {
                return Err(ScenarioError::MissingPropertyValue {
                    entity: format!("materials producer {producer}"),
                    property: property.to_string(),
                });
            }
        }
    }

    for (resource, definitions) in &data.resource_property_definitions {
        for (property, definition) in definitions {
            if !definition.has_default()
                && !data
                    .resource_property_values
                    .contains_key(&(resource.clone(), property.clone()))
            {
                return Err(ScenarioError::MissingPropertyValue {
                    entity: format!("resource {resource}"),
                    property: property.to_string(),
                });
            }
        }
    }

    // People, groups and batches are also created during the run, so their
    // properties cannot rely on explicit values.
    for (property, definition) in &data.person_property_definitions {
        if !definition.has_default() {
            return Err(ScenarioError::PropertyDefinitionRequiresDefault(format!(
                "person property {property}"
            )));
        }
    }
    for (group_type, definitions) in &data.group_property_definitions {
        for (property, definition) in definitions {
            if !definition.has_default() {
                return Err(ScenarioError::PropertyDefinitionRequiresDefault(format!(
                    "group property {property} of group type {group_type}"
                )));
            }
        }
    }
    for (material, definitions) in &data.batch_property_definitions {
        for (property, definition) in definitions {
            if !definition.has_default() {
                return Err(ScenarioError::PropertyDefinitionRequiresDefault(format!(
                    "batch property {property} of material {material}"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_schema::ValueType;

    fn region(token: &str) -> RegionId {
        RegionId::new(token)
    }

    #[test]
    fn failed_mutation_leaves_aggregate_untouched() {
        let mut builder = ScenarioBuilder::new();
        builder
            .add_region_id(region("north"), ComponentSupplier::inert())
            .unwrap();
        builder
            .define_region_property(
                RegionPropertyId::new("size"),
                PropertyDefinition::new(ValueType::Integer),
            )
            .unwrap();
        let before = builder.data.clone();

        let err = builder
            .set_region_property_value(region("north"), RegionPropertyId::new("size"), "large")
            .unwrap_err();
        assert!(matches!(err, ScenarioError::IncompatibleValue { .. }));
        assert_eq!(builder.data, before);

        let err = builder
            .set_region_resource_level(region("north"), ResourceId::new("water"), 5)
            .unwrap_err();
        assert_eq!(err, ScenarioError::UnknownResourceId(ResourceId::new("water")));
        assert_eq!(builder.data, before);
    }

    #[test]
    fn policies_can_only_be_assigned_once() {
        let mut builder = ScenarioBuilder::new();
        builder
            .set_region_map_option(MapOption::Array)
            .unwrap();
        assert_eq!(
            builder.set_region_map_option(MapOption::Hash),
            Err(ScenarioError::PreviouslyAssignedValue(
                "region map option".to_string()
            ))
        );
        assert_eq!(builder.data.region_map_option, Some(MapOption::Array));
    }

    #[test]
    fn scoped_definition_failure_does_not_create_empty_scope() {
        let mut builder = ScenarioBuilder::new();
        let err = builder
            .define_group_property(
                GroupTypeId::new("household"),
                GroupPropertyId::new("size"),
                PropertyDefinition::new(ValueType::Integer),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioError::UnknownGroupTypeId(GroupTypeId::new("household"))
        );
        assert!(builder.data.group_property_definitions.is_empty());
    }
}
