use std::collections::{BTreeMap, BTreeSet};

use scenario_schema::{
    BatchId, BatchPropertyId, CompartmentId, CompartmentPropertyId, GlobalComponentId,
    GlobalPropertyId, GroupId, GroupPropertyId, GroupTypeId, MapOption, MaterialId,
    MaterialsProducerId, MaterialsProducerPropertyId, PersonId, PersonPropertyId,
    PropertyDefinition, PropertyValue, RandomNumberGeneratorId, RegionId, RegionPropertyId,
    ReportId, ResourceId, ResourcePropertyId, StageId, TimeTrackingPolicy,
};

use crate::component::ComponentSupplier;
use crate::registry::{ComponentRegistry, IdentifierRegistry};

pub(crate) type ScopedDefinitions<S, P> = BTreeMap<S, BTreeMap<P, PropertyDefinition>>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PersonRecord {
    pub region: RegionId,
    pub compartment: CompartmentId,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BatchRecord {
    pub material: MaterialId,
    pub amount: f64,
    pub producer: MaterialsProducerId,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StageRecord {
    pub offered: bool,
    pub producer: MaterialsProducerId,
}

/// Working aggregate of a builder, frozen as-is inside a `Scenario`.
///
/// Ordered maps keep iteration deterministic so equality and fingerprints
/// do not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ScenarioData {
    pub person_region_arrival_tracking: Option<TimeTrackingPolicy>,
    pub person_compartment_arrival_tracking: Option<TimeTrackingPolicy>,
    pub region_map_option: Option<MapOption>,
    pub compartment_map_option: Option<MapOption>,
    pub suggested_population_size: Option<usize>,

    pub components: ComponentRegistry,
    pub global_components: IdentifierRegistry<GlobalComponentId, ComponentSupplier>,
    pub regions: IdentifierRegistry<RegionId, ComponentSupplier>,
    pub compartments: IdentifierRegistry<CompartmentId, ComponentSupplier>,
    pub materials_producers: IdentifierRegistry<MaterialsProducerId, ComponentSupplier>,
    pub materials: IdentifierRegistry<MaterialId>,
    pub random_number_generators: IdentifierRegistry<RandomNumberGeneratorId>,
    pub reports: IdentifierRegistry<ReportId>,
    pub group_types: IdentifierRegistry<GroupTypeId>,
    pub resources: IdentifierRegistry<ResourceId>,

    pub batch_property_definitions: ScopedDefinitions<MaterialId, BatchPropertyId>,
    pub compartment_property_definitions: ScopedDefinitions<CompartmentId, CompartmentPropertyId>,
    pub region_property_definitions: BTreeMap<RegionPropertyId, PropertyDefinition>,
    pub resource_property_definitions: ScopedDefinitions<ResourceId, ResourcePropertyId>,
    pub global_property_definitions: BTreeMap<GlobalPropertyId, PropertyDefinition>,
    pub person_property_definitions: BTreeMap<PersonPropertyId, PropertyDefinition>,
    pub materials_producer_property_definitions:
        BTreeMap<MaterialsProducerPropertyId, PropertyDefinition>,
    pub group_property_definitions: ScopedDefinitions<GroupTypeId, GroupPropertyId>,

    pub compartment_property_values: BTreeMap<(CompartmentId, CompartmentPropertyId), PropertyValue>,
    pub region_property_values: BTreeMap<(RegionId, RegionPropertyId), PropertyValue>,
    pub resource_property_values: BTreeMap<(ResourceId, ResourcePropertyId), PropertyValue>,
    pub global_property_values: BTreeMap<GlobalPropertyId, PropertyValue>,
    pub materials_producer_property_values:
        BTreeMap<(MaterialsProducerId, MaterialsProducerPropertyId), PropertyValue>,
    pub person_property_values: BTreeMap<(PersonId, PersonPropertyId), PropertyValue>,
    pub group_property_values: BTreeMap<(GroupId, GroupPropertyId), PropertyValue>,
    pub batch_property_values: BTreeMap<(BatchId, BatchPropertyId), PropertyValue>,

    pub resource_time_tracking: BTreeMap<ResourceId, TimeTrackingPolicy>,
    pub region_resource_levels: BTreeMap<(RegionId, ResourceId), i64>,
    pub materials_producer_resource_levels: BTreeMap<(MaterialsProducerId, ResourceId), i64>,
    pub person_resource_levels: BTreeMap<(PersonId, ResourceId), i64>,

    pub people: IdentifierRegistry<PersonId, PersonRecord>,
    pub groups: IdentifierRegistry<GroupId, GroupTypeId>,
    pub group_members: BTreeMap<GroupId, BTreeSet<PersonId>>,
    pub batches: IdentifierRegistry<BatchId, BatchRecord>,
    pub stages: IdentifierRegistry<StageId, StageRecord>,
    pub staged_batches: BTreeMap<BatchId, StageId>,
}

impl ScenarioData {
    /// Fills every optional policy left unset with its default.
    pub fn backfill_policies(&mut self) {
        self.person_region_arrival_tracking
            .get_or_insert_with(TimeTrackingPolicy::default);
        self.person_compartment_arrival_tracking
            .get_or_insert_with(TimeTrackingPolicy::default);
        self.region_map_option.get_or_insert_with(MapOption::default);
        self.compartment_map_option
            .get_or_insert_with(MapOption::default);
        self.suggested_population_size.get_or_insert(0);
        for resource in self.resources.ids() {
            self.resource_time_tracking
                .entry(resource.clone())
                .or_default();
        }
    }
}
