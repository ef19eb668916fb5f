use scenario_schema::{
    BatchId, CompartmentId, ComponentId, GlobalComponentId, GroupId, GroupTypeId, MaterialId,
    MaterialsProducerId, PersonId, RandomNumberGeneratorId, RegionId, ReportId, ResourceId,
    ResourcePropertyId, StageId, ValueType,
};
use thiserror::Error;

/// Validation failure raised while building or querying a scenario.
///
/// Every variant is recoverable: the builder or scenario that returned it is
/// left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("component id {0} is already in use")]
    DuplicateComponentId(ComponentId),
    #[error("material {0} is already defined")]
    DuplicateMaterialId(MaterialId),
    #[error("resource {0} is already defined")]
    DuplicateResourceId(ResourceId),
    #[error("group type {0} is already defined")]
    DuplicateGroupTypeId(GroupTypeId),
    #[error("random number generator {0} is already defined")]
    DuplicateRandomNumberGeneratorId(RandomNumberGeneratorId),
    #[error("report {0} is already defined")]
    DuplicateReportId(ReportId),
    #[error("person {0} already exists")]
    DuplicatePersonId(PersonId),
    #[error("group {0} already exists")]
    DuplicateGroupId(GroupId),
    #[error("batch {0} already exists")]
    DuplicateBatchId(BatchId),
    #[error("stage {0} already exists")]
    DuplicateStageId(StageId),
    #[error("property {0} is already defined")]
    DuplicatePropertyDefinition(String),
    #[error("person {person} is already a member of group {group}")]
    DuplicateGroupMembership { group: GroupId, person: PersonId },

    #[error("unknown global component {0}")]
    UnknownGlobalComponentId(GlobalComponentId),
    #[error("unknown region {0}")]
    UnknownRegionId(RegionId),
    #[error("unknown compartment {0}")]
    UnknownCompartmentId(CompartmentId),
    #[error("unknown materials producer {0}")]
    UnknownMaterialsProducerId(MaterialsProducerId),
    #[error("unknown material {0}")]
    UnknownMaterialId(MaterialId),
    #[error("unknown resource {0}")]
    UnknownResourceId(ResourceId),
    #[error("unknown group type {0}")]
    UnknownGroupTypeId(GroupTypeId),
    #[error("unknown group {0}")]
    UnknownGroupId(GroupId),
    #[error("unknown person {0}")]
    UnknownPersonId(PersonId),
    #[error("unknown batch {0}")]
    UnknownBatchId(BatchId),
    #[error("unknown stage {0}")]
    UnknownStageId(StageId),
    #[error("unknown random number generator {0}")]
    UnknownRandomNumberGeneratorId(RandomNumberGeneratorId),
    #[error("unknown property {0}")]
    UnknownPropertyId(String),

    #[error("a value was previously assigned to {0}")]
    PreviouslyAssignedValue(String),
    #[error("value of type {actual} is not assignable to property {property} of type {expected}")]
    IncompatibleValue {
        property: String,
        expected: ValueType,
        actual: ValueType,
    },
    #[error("value {value} of property {property} is not finite")]
    NonFinitePropertyValue { property: String, value: f64 },
    #[error("resource level {0} is negative")]
    NegativeResourceLevel(i64),
    #[error("material amount {0} is negative")]
    NegativeMaterialAmount(f64),
    #[error("material amount {0} is not finite")]
    NonFiniteMaterialAmount(f64),
    #[error("batch {0} is already staged")]
    BatchAlreadyStaged(BatchId),
    #[error("batch {batch} and stage {stage} belong to different materials producers")]
    BatchStageOwnerMismatch { batch: BatchId, stage: StageId },

    #[error("property {property} has no default and no value for {entity}")]
    MissingPropertyValue { entity: String, property: String },
    #[error("property {0} belongs to entities created during the run and needs a default value")]
    PropertyDefinitionRequiresDefault(String),
}

/// Rejected ledger operation. The ledger is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("unknown resource {0}")]
    UnknownResourceId(ResourceId),
    #[error("unknown region {0}")]
    UnknownRegionId(RegionId),
    #[error("unknown materials producer {0}")]
    UnknownMaterialsProducerId(MaterialsProducerId),
    #[error("unknown person {0}")]
    UnknownPersonId(PersonId),
    #[error("unknown property {property} of resource {resource}")]
    UnknownResourcePropertyId {
        resource: ResourceId,
        property: ResourcePropertyId,
    },
    #[error("person {0} already exists")]
    DuplicatePersonId(PersonId),
    #[error("person {person} exceeds the largest supported id {limit}")]
    PersonIdOutOfRange { person: PersonId, limit: u32 },

    #[error("resource amount {0} is negative")]
    NegativeResourceAmount(i64),
    #[error("insufficient resources: {requested} requested, {available} available")]
    InsufficientResourcesAvailable { available: i64, requested: i64 },
    #[error("adding {amount} to level {current} overflows")]
    ArithmeticOverflow { current: i64, amount: i64 },
    #[error("region {0} cannot transfer resources to itself")]
    ReflexiveResourceTransfer(RegionId),

    #[error("property {property} of resource {resource} is immutable")]
    ImmutablePropertyValue {
        resource: ResourceId,
        property: ResourcePropertyId,
    },
    #[error("value of type {actual} is not assignable to property {property} of type {expected}")]
    IncompatibleValue {
        property: ResourcePropertyId,
        expected: ValueType,
        actual: ValueType,
    },
    #[error("value {value} of property {property} of resource {resource} is not finite")]
    NonFinitePropertyValue {
        resource: ResourceId,
        property: ResourcePropertyId,
        value: f64,
    },
    #[error("time tracking is off for resource {0}")]
    ResourceTimeTrackingOff(ResourceId),
    #[error("time {requested} is invalid; the ledger is at {current}")]
    InvalidTime { current: f64, requested: f64 },
}
