//! Order-independent front end to [`ScenarioBuilder`].
//!
//! Calls are recorded verbatim without validation. [`UnstructuredScenarioBuilder::build`]
//! replays them kind by kind following [`REPLAY_ORDER`], a fixed topological
//! order of the entity model, so every fact reaches the structured builder
//! after the facts it references.

use std::collections::BTreeMap;

use scenario_schema::{
    BatchId, BatchPropertyId, CompartmentId, CompartmentPropertyId, GlobalComponentId,
    GlobalPropertyId, GroupId, GroupPropertyId, GroupTypeId, MapOption, MaterialId,
    MaterialsProducerId, MaterialsProducerPropertyId, PersonId, PersonPropertyId,
    PropertyDefinition, PropertyValue, RandomNumberGeneratorId, RegionId, RegionPropertyId,
    ReportId, ResourceId, ResourcePropertyId, StageId, TimeTrackingPolicy,
};
use tracing::debug;

use crate::builder::ScenarioBuilder;
use crate::component::ComponentSupplier;
use crate::error::ScenarioError;
use crate::scenario::Scenario;

/// Kind of a recorded call; one per structured builder mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    PersonRegionArrivalTracking,
    PersonCompartmentArrivalTracking,
    RegionMapOption,
    CompartmentMapOption,
    SuggestedPopulationSize,
    GlobalComponent,
    Region,
    Compartment,
    MaterialsProducer,
    Material,
    RandomNumberGenerator,
    Report,
    GroupType,
    Resource,
    BatchPropertyDefinition,
    CompartmentPropertyDefinition,
    RegionPropertyDefinition,
    ResourcePropertyDefinition,
    GlobalPropertyDefinition,
    PersonPropertyDefinition,
    MaterialsProducerPropertyDefinition,
    GroupPropertyDefinition,
    CompartmentPropertyValue,
    RegionPropertyValue,
    ResourcePropertyValue,
    GlobalPropertyValue,
    MaterialsProducerPropertyValue,
    ResourceTimeTracking,
    RegionResourceLevel,
    MaterialsProducerResourceLevel,
    Person,
    PersonPropertyValue,
    PersonResourceLevel,
    Group,
    GroupPropertyValue,
    GroupMembership,
    Batch,
    BatchPropertyValue,
    Stage,
    StageMembership,
}

/// Replay precedence of recorded calls.
pub const REPLAY_ORDER: [ActionKind; 40] = [
    // policies
    ActionKind::PersonRegionArrivalTracking,
    ActionKind::PersonCompartmentArrivalTracking,
    ActionKind::RegionMapOption,
    ActionKind::CompartmentMapOption,
    ActionKind::SuggestedPopulationSize,
    // components
    ActionKind::GlobalComponent,
    ActionKind::Region,
    ActionKind::Compartment,
    ActionKind::MaterialsProducer,
    // independent namespaces
    ActionKind::Material,
    ActionKind::RandomNumberGenerator,
    ActionKind::Report,
    ActionKind::GroupType,
    ActionKind::Resource,
    // definitions
    ActionKind::BatchPropertyDefinition,
    ActionKind::CompartmentPropertyDefinition,
    ActionKind::RegionPropertyDefinition,
    ActionKind::ResourcePropertyDefinition,
    ActionKind::GlobalPropertyDefinition,
    ActionKind::PersonPropertyDefinition,
    ActionKind::MaterialsProducerPropertyDefinition,
    ActionKind::GroupPropertyDefinition,
    // values on fixed-cardinality kinds
    ActionKind::CompartmentPropertyValue,
    ActionKind::RegionPropertyValue,
    ActionKind::ResourcePropertyValue,
    ActionKind::GlobalPropertyValue,
    ActionKind::MaterialsProducerPropertyValue,
    // resources
    ActionKind::ResourceTimeTracking,
    ActionKind::RegionResourceLevel,
    ActionKind::MaterialsProducerResourceLevel,
    // people
    ActionKind::Person,
    ActionKind::PersonPropertyValue,
    ActionKind::PersonResourceLevel,
    // groups
    ActionKind::Group,
    ActionKind::GroupPropertyValue,
    ActionKind::GroupMembership,
    // production
    ActionKind::Batch,
    ActionKind::BatchPropertyValue,
    ActionKind::Stage,
    ActionKind::StageMembership,
];

/// One recorded builder call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedAction {
    PersonRegionArrivalTracking(TimeTrackingPolicy),
    PersonCompartmentArrivalTracking(TimeTrackingPolicy),
    RegionMapOption(MapOption),
    CompartmentMapOption(MapOption),
    SuggestedPopulationSize(usize),
    GlobalComponent {
        id: GlobalComponentId,
        supplier: ComponentSupplier,
    },
    Region {
        id: RegionId,
        supplier: ComponentSupplier,
    },
    Compartment {
        id: CompartmentId,
        supplier: ComponentSupplier,
    },
    MaterialsProducer {
        id: MaterialsProducerId,
        supplier: ComponentSupplier,
    },
    Material(MaterialId),
    RandomNumberGenerator(RandomNumberGeneratorId),
    Report(ReportId),
    GroupType(GroupTypeId),
    Resource(ResourceId),
    BatchPropertyDefinition {
        material: MaterialId,
        property: BatchPropertyId,
        definition: PropertyDefinition,
    },
    CompartmentPropertyDefinition {
        compartment: CompartmentId,
        property: CompartmentPropertyId,
        definition: PropertyDefinition,
    },
    RegionPropertyDefinition {
        property: RegionPropertyId,
        definition: PropertyDefinition,
    },
    ResourcePropertyDefinition {
        resource: ResourceId,
        property: ResourcePropertyId,
        definition: PropertyDefinition,
    },
    GlobalPropertyDefinition {
        property: GlobalPropertyId,
        definition: PropertyDefinition,
    },
    PersonPropertyDefinition {
        property: PersonPropertyId,
        definition: PropertyDefinition,
    },
    MaterialsProducerPropertyDefinition {
        property: MaterialsProducerPropertyId,
        definition: PropertyDefinition,
    },
    GroupPropertyDefinition {
        group_type: GroupTypeId,
        property: GroupPropertyId,
        definition: PropertyDefinition,
    },
    CompartmentPropertyValue {
        compartment: CompartmentId,
        property: CompartmentPropertyId,
        value: PropertyValue,
    },
    RegionPropertyValue {
        region: RegionId,
        property: RegionPropertyId,
        value: PropertyValue,
    },
    ResourcePropertyValue {
        resource: ResourceId,
        property: ResourcePropertyId,
        value: PropertyValue,
    },
    GlobalPropertyValue {
        property: GlobalPropertyId,
        value: PropertyValue,
    },
    MaterialsProducerPropertyValue {
        producer: MaterialsProducerId,
        property: MaterialsProducerPropertyId,
        value: PropertyValue,
    },
    ResourceTimeTracking {
        resource: ResourceId,
        policy: TimeTrackingPolicy,
    },
    RegionResourceLevel {
        region: RegionId,
        resource: ResourceId,
        amount: i64,
    },
    MaterialsProducerResourceLevel {
        producer: MaterialsProducerId,
        resource: ResourceId,
        amount: i64,
    },
    Person {
        person: PersonId,
        region: RegionId,
        compartment: CompartmentId,
    },
    PersonPropertyValue {
        person: PersonId,
        property: PersonPropertyId,
        value: PropertyValue,
    },
    PersonResourceLevel {
        person: PersonId,
        resource: ResourceId,
        amount: i64,
    },
    Group {
        group: GroupId,
        group_type: GroupTypeId,
    },
    GroupPropertyValue {
        group: GroupId,
        property: GroupPropertyId,
        value: PropertyValue,
    },
    GroupMembership {
        group: GroupId,
        person: PersonId,
    },
    Batch {
        batch: BatchId,
        material: MaterialId,
        amount: f64,
        producer: MaterialsProducerId,
    },
    BatchPropertyValue {
        batch: BatchId,
        property: BatchPropertyId,
        value: PropertyValue,
    },
    Stage {
        stage: StageId,
        offered: bool,
        producer: MaterialsProducerId,
    },
    StageMembership {
        stage: StageId,
        batch: BatchId,
    },
}

impl RecordedAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::PersonRegionArrivalTracking(_) => ActionKind::PersonRegionArrivalTracking,
            Self::PersonCompartmentArrivalTracking(_) => {
                ActionKind::PersonCompartmentArrivalTracking
            }
            Self::RegionMapOption(_) => ActionKind::RegionMapOption,
            Self::CompartmentMapOption(_) => ActionKind::CompartmentMapOption,
            Self::SuggestedPopulationSize(_) => ActionKind::SuggestedPopulationSize,
            Self::GlobalComponent { .. } => ActionKind::GlobalComponent,
            Self::Region { .. } => ActionKind::Region,
            Self::Compartment { .. } => ActionKind::Compartment,
            Self::MaterialsProducer { .. } => ActionKind::MaterialsProducer,
            Self::Material(_) => ActionKind::Material,
            Self::RandomNumberGenerator(_) => ActionKind::RandomNumberGenerator,
            Self::Report(_) => ActionKind::Report,
            Self::GroupType(_) => ActionKind::GroupType,
            Self::Resource(_) => ActionKind::Resource,
            Self::BatchPropertyDefinition { .. } => ActionKind::BatchPropertyDefinition,
            Self::CompartmentPropertyDefinition { .. } => ActionKind::CompartmentPropertyDefinition,
            Self::RegionPropertyDefinition { .. } => ActionKind::RegionPropertyDefinition,
            Self::ResourcePropertyDefinition { .. } => ActionKind::ResourcePropertyDefinition,
            Self::GlobalPropertyDefinition { .. } => ActionKind::GlobalPropertyDefinition,
            Self::PersonPropertyDefinition { .. } => ActionKind::PersonPropertyDefinition,
            Self::MaterialsProducerPropertyDefinition { .. } => {
                ActionKind::MaterialsProducerPropertyDefinition
            }
            Self::GroupPropertyDefinition { .. } => ActionKind::GroupPropertyDefinition,
            Self::CompartmentPropertyValue { .. } => ActionKind::CompartmentPropertyValue,
            Self::RegionPropertyValue { .. } => ActionKind::RegionPropertyValue,
            Self::ResourcePropertyValue { .. } => ActionKind::ResourcePropertyValue,
            Self::GlobalPropertyValue { .. } => ActionKind::GlobalPropertyValue,
            Self::MaterialsProducerPropertyValue { .. } => {
                ActionKind::MaterialsProducerPropertyValue
            }
            Self::ResourceTimeTracking { .. } => ActionKind::ResourceTimeTracking,
            Self::RegionResourceLevel { .. } => ActionKind::RegionResourceLevel,
            Self::MaterialsProducerResourceLevel { .. } => {
                ActionKind::MaterialsProducerResourceLevel
            }
            Self::Person { .. } => ActionKind::Person,
            Self::PersonPropertyValue { .. } => ActionKind::PersonPropertyValue,
            Self::PersonResourceLevel { .. } => ActionKind::PersonResourceLevel,
            Self::Group { .. } => ActionKind::Group,
            Self::GroupPropertyValue { .. } => ActionKind::GroupPropertyValue,
            Self::GroupMembership { .. } => ActionKind::GroupMembership,
            Self::Batch { .. } => ActionKind::Batch,
            Self::BatchPropertyValue { .. } => ActionKind::BatchPropertyValue,
            Self::Stage { .. } => ActionKind::Stage,
            Self::StageMembership { .. } => ActionKind::StageMembership,
        }
    }

    fn apply(self, builder: &mut ScenarioBuilder) -> Result<(), ScenarioError> {
        match self {
            Self::PersonRegionArrivalTracking(policy) => {
                builder.set_person_region_arrival_tracking(policy)
            }
            Self::PersonCompartmentArrivalTracking(policy) => {
                builder.set_person_compartment_arrival_tracking(policy)
            }
            Self::RegionMapOption(option) => builder.set_region_map_option(option),
            Self::CompartmentMapOption(option) => builder.set_compartment_map_option(option),
            Self::SuggestedPopulationSize(size) => builder.set_suggested_population_size(size),
            Self::GlobalComponent { id, supplier } => builder.add_global_component_id(id, supplier),
            Self::Region { id, supplier } => builder.add_region_id(id, supplier),
            Self::Compartment { id, supplier } => builder.add_compartment_id(id, supplier),
            Self::MaterialsProducer { id, supplier } => {
                builder.add_materials_producer_id(id, supplier)
            }
            Self::Material(id) => builder.add_material(id),
            Self::RandomNumberGenerator(id) => builder.add_random_number_generator_id(id),
            Self::Report(id) => builder.add_report_id(id),
            Self::GroupType(id) => builder.add_group_type_id(id),
            Self::Resource(id) => builder.add_resource(id),
            Self::BatchPropertyDefinition {
                material,
                property,
                definition,
            } => builder.define_batch_property(material, property, definition),
            Self::CompartmentPropertyDefinition {
                compartment,
                property,
                definition,
            } => builder.define_compartment_property(compartment, property, definition),
            Self::RegionPropertyDefinition {
                property,
                definition,
            } => builder.define_region_property(property, definition),
            Self::ResourcePropertyDefinition {
                resource,
                property,
                definition,
            } => builder.define_resource_property(resource, property, definition),
            Self::GlobalPropertyDefinition {
                property,
                definition,
            } => builder.define_global_property(property, definition),
            Self::PersonPropertyDefinition {
                property,
                definition,
            } => builder.define_person_property(property, definition),
            Self::MaterialsProducerPropertyDefinition {
                property,
                definition,
            } => builder.define_materials_producer_property(property, definition),
            Self::GroupPropertyDefinition {
                group_type,
                property,
                definition,
            } => builder.define_group_property(group_type, property, definition),
            Self::CompartmentPropertyValue {
                compartment,
                property,
                value,
            } => builder.set_compartment_property_value(compartment, property, value),
            Self::RegionPropertyValue {
                region,
                property,
                value,
            } => builder.set_region_property_value(region, property, value),
            Self::ResourcePropertyValue {
                resource,
                property,
                value,
            } => builder.set_resource_property_value(resource, property, value),
            Self::GlobalPropertyValue { property, value } => {
                builder.set_global_property_value(property, value)
            }
            Self::MaterialsProducerPropertyValue {
                producer,
                property,
                value,
            } => builder.set_materials_producer_property_value(producer, property, value),
            Self::ResourceTimeTracking { resource, policy } => {
                builder.set_resource_time_tracking(resource, policy)
            }
            Self::RegionResourceLevel {
                region,
                resource,
                amount,
            } => builder.set_region_resource_level(region, resource, amount),
            Self::MaterialsProducerResourceLevel {
                producer,
                resource,
                amount,
            } => builder.set_materials_producer_resource_level(producer, resource, amount),
            Self::Person {
                person,
                region,
                compartment,
            } => builder.add_person(person, region, compartment),
            Self::PersonPropertyValue {
                person,
                property,
                value,
            } => builder.set_person_property_value(person, property, value),
            Self::PersonResourceLevel {
                person,
                resource,
                amount,
            } => builder.set_person_resource_level(person, resource, amount),
            Self::Group { group, group_type } => builder.add_group(group, group_type),
            Self::GroupPropertyValue {
                group,
                property,
                value,
            } => builder.set_group_property_value(group, property, value),
            Self::GroupMembership { group, person } => builder.add_person_to_group(group, person),
            Self::Batch {
                batch,
                material,
                amount,
                producer,
            } => builder.add_batch(batch, material, amount, producer),
            Self::BatchPropertyValue {
                batch,
                property,
                value,
            } => builder.set_batch_property_value(batch, property, value),
            Self::Stage {
                stage,
                offered,
                producer,
            } => builder.add_stage(stage, offered, producer),
            Self::StageMembership { stage, batch } => builder.add_batch_to_stage(stage, batch),
        }
    }
}

/// Records scenario facts in any order and validates them on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct UnstructuredScenarioBuilder {
    actions: BTreeMap<ActionKind, Vec<RecordedAction>>,
}

impl UnstructuredScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: RecordedAction) -> &mut Self {
        self.actions.entry(action.kind()).or_default().push(action);
        self
    }

    pub fn recorded_len(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }

    pub fn set_person_region_arrival_tracking(&mut self, policy: TimeTrackingPolicy) -> &mut Self {
        self.record(RecordedAction::PersonRegionArrivalTracking(policy))
    }

    pub fn set_person_compartment_arrival_tracking(
        &mut self,
        policy: TimeTrackingPolicy,
    ) -> &mut Self {
        self.record(RecordedAction::PersonCompartmentArrivalTracking(policy))
    }

    pub fn set_region_map_option(&mut self, option: MapOption) -> &mut Self {
        self.record(RecordedAction::RegionMapOption(option))
    }

    pub fn set_compartment_map_option(&mut self, option: MapOption) -> &mut Self {
        self.record(RecordedAction::CompartmentMapOption(option))
    }

    pub fn set_suggested_population_size(&mut self, size: usize) -> &mut Self {
        self.record(RecordedAction::SuggestedPopulationSize(size))
    }

    pub fn add_global_component_id(
        &mut self,
        id: GlobalComponentId,
        supplier: ComponentSupplier,
    ) -> &mut Self {
        self.record(RecordedAction::GlobalComponent { id, supplier })
    }

    pub fn add_region_id(&mut self, id: RegionId, supplier: ComponentSupplier) -> &mut Self {
        self.record(RecordedAction::Region { id, supplier })
    }

    pub fn add_compartment_id(&mut self, id: CompartmentId, supplier: ComponentSupplier) -> &mut Self {
        self.record(RecordedAction::Compartment { id, supplier })
    }

    pub fn add_materials_producer_id(
        &mut self,
        id: MaterialsProducerId,
        supplier: ComponentSupplier,
    ) -> &mut Self {
        self.record(RecordedAction::MaterialsProducer { id, supplier })
    }

    pub fn add_material(&mut self, id: MaterialId) -> &mut Self {
        self.record(RecordedAction::Material(id))
    }

    pub fn add_random_number_generator_id(&mut self, id: RandomNumberGeneratorId) -> &mut Self {
        self.record(RecordedAction::RandomNumberGenerator(id))
    }

    pub fn add_report_id(&mut self, id: ReportId) -> &mut Self {
        self.record(RecordedAction::Report(id))
    }

    pub fn add_group_type_id(&mut self, id: GroupTypeId) -> &mut Self {
        self.record(RecordedAction::GroupType(id))
    }

    pub fn add_resource(&mut self, id: ResourceId) -> &mut Self {
        self.record(RecordedAction::Resource(id))
    }

    pub fn define_batch_property(
        &mut self,
        material: MaterialId,
        property: BatchPropertyId,
        definition: PropertyDefinition,
    ) -> &mut Self {
        self.record(RecordedAction::BatchPropertyDefinition {
            material,
            property,
            definition,
        })
    }

    pub fn define_compartment_property(
        &mut self,
        compartment: CompartmentId,
        property: CompartmentPropertyId,
        definition: PropertyDefinition,
    ) -> &mut Self {
        self.record(RecordedAction::CompartmentPropertyDefinition {
            compartment,
            property,
            definition,
        })
    }

    pub fn define_region_property(
        &mut self,
        property: RegionPropertyId,
        definition: PropertyDefinition,
    ) -> &mut Self {
        self.record(RecordedAction::RegionPropertyDefinition {
            property,
            definition,
        })
    }

    pub fn define_resource_property(
        &mut self,
        resource: ResourceId,
        property: ResourcePropertyId,
        definition: PropertyDefinition,
    ) -> &mut Self {
        self.record(RecordedAction::ResourcePropertyDefinition {
            resource,
            property,
            definition,
        })
    }

    pub fn define_global_property(
        &mut self,
        property: GlobalPropertyId,
        definition: PropertyDefinition,
    ) -> &mut Self {
        self.record(RecordedAction::GlobalPropertyDefinition {
            property,
            definition,
        })
    }

    pub fn define_person_property(
        &mut self,
        property: PersonPropertyId,
        definition: PropertyDefinition,
    ) -> &mut Self {
        self.record(RecordedAction::PersonPropertyDefinition {
            property,
            definition,
        })
    }

    pub fn define_materials_producer_property(
        &mut self,
        property: MaterialsProducerPropertyId,
        definition: PropertyDefinition,
    ) -> &mut Self {
        self.record(RecordedAction::MaterialsProducerPropertyDefinition {
            property,
            definition,
        })
    }

    pub fn define_group_property(
        &mut self,
        group_type: GroupTypeId,
        property: GroupPropertyId,
        definition: PropertyDefinition,
    ) -> &mut Self {
        self.record(RecordedAction::GroupPropertyDefinition {
            group_type,
            property,
            definition,
        })
    }

    pub fn set_compartment_property_value(
        &mut self,
        compartment: CompartmentId,
        property: CompartmentPropertyId,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.record(RecordedAction::CompartmentPropertyValue {
            compartment,
            property,
            value: value.into(),
        })
    }

    pub fn set_region_property_value(
        &mut self,
        region: RegionId,
        property: RegionPropertyId,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.record(RecordedAction::RegionPropertyValue {
            region,
            property,
            value: value.into(),
        })
    }

    pub fn set_resource_property_value(
        &mut self,
        resource: ResourceId,
        property: ResourcePropertyId,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.record(RecordedAction::ResourcePropertyValue {
            resource,
            property,
            value: value.into(),
        })
    }

    pub fn set_global_property_value(
        &mut self,
        property: GlobalPropertyId,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.record(RecordedAction::GlobalPropertyValue {
            property,
            value: value.into(),
        })
    }

    pub fn set_materials_producer_property_value(
        &mut self,
        producer: MaterialsProducerId,
        property: MaterialsProducerPropertyId,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.record(RecordedAction::MaterialsProducerPropertyValue {
            producer,
            property,
            value: value.into(),
        })
    }

    pub fn set_resource_time_tracking(
        &mut self,
        resource: ResourceId,
        policy: TimeTrackingPolicy,
    ) -> &mut Self {
        self.record(RecordedAction::ResourceTimeTracking { resource, policy })
    }

    pub fn set_region_resource_level(
        &mut self,
        region: RegionId,
        resource: ResourceId,
        amount: i64,
    ) -> &mut Self {
        self.record(RecordedAction::RegionResourceLevel {
            region,
            resource,
            amount,
        })
    }

    pub fn set_materials_producer_resource_level(
        &mut self,
        producer: MaterialsProducerId,
        resource: ResourceId,
        amount: i64,
    ) -> &mut Self {
        self.record(RecordedAction::MaterialsProducerResourceLevel {
            producer,
            resource,
            amount,
        })
    }

    pub fn add_person(
        &mut self,
        person: PersonId,
        region: RegionId,
        compartment: CompartmentId,
    ) -> &mut Self {
        self.record(RecordedAction::Person {
            person,
            region,
            compartment,
        })
    }

    pub fn set_person_property_value(
        &mut self,
        person: PersonId,
        property: PersonPropertyId,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.record(RecordedAction::PersonPropertyValue {
            person,
            property,
            value: value.into(),
        })
    }

    pub fn set_person_resource_level(
        &mut self,
        person: PersonId,
        resource: ResourceId,
        amount: i64,
    ) -> &mut Self {
        self.record(RecordedAction::PersonResourceLevel {
            person,
            resource,
            amount,
        })
    }

    pub fn add_group(&mut self, group: GroupId, group_type: GroupTypeId) -> &mut Self {
        self.record(RecordedAction::Group { group, group_type })
    }

    pub fn set_group_property_value(
        &mut self,
        group: GroupId,
        property: GroupPropertyId,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.record(RecordedAction::GroupPropertyValue {
            group,
            property,
            value: value.into(),
        })
    }

    pub fn add_person_to_group(&mut self, group: GroupId, person: PersonId) -> &mut Self {
        self.record(RecordedAction::GroupMembership { group, person })
    }

    pub fn add_batch(
        &mut self,
        batch: BatchId,
        material: MaterialId,
        amount: f64,
        producer: MaterialsProducerId,
    ) -> &mut Self {
        self.record(RecordedAction::Batch {
            batch,
            material,
            amount,
            producer,
        })
    }

    pub fn set_batch_property_value(
        &mut self,
        batch: BatchId,
        property: BatchPropertyId,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.record(RecordedAction::BatchPropertyValue {
            batch,
            property,
            value: value.into(),
        })
    }

    pub fn add_stage(&mut self, stage: StageId, offered: bool, producer: MaterialsProducerId) -> &mut Self {
        self.record(RecordedAction::Stage {
            stage,
            offered,
            producer,
        })
    }

    pub fn add_batch_to_stage(&mut self, stage: StageId, batch: BatchId) -> &mut Self {
        self.record(RecordedAction::StageMembership { stage, batch })
    }

    /// Replays every recorded call into a fresh [`ScenarioBuilder`] and
    /// freezes the result. The first failing call is returned.
    pub fn build(mut self) -> Result<Scenario, ScenarioError> {
        debug!(
            target: "scenario::builder",
            actions = self.recorded_len(),
            "scenario.replay_started"
        );
        let mut builder = ScenarioBuilder::new();
        for kind in REPLAY_ORDER {
            for action in self.actions.remove(&kind).unwrap_or_default() {
                action.apply(&mut builder)?;
            }
        }
        debug_assert!(self.actions.is_empty(), "action kind missing from replay order");
        builder.build()
    }
}
