//! Shared data contracts for scenario construction and resource accounting.
//!
//! Everything here is a plain value type: identifiers, property values and
//! schemas, and the policy enums carried by a scenario. Behavior lives in
//! `scenario_core`.

mod ids;
mod policy;
mod property;

pub use ids::{
    BatchId, BatchPropertyId, CompartmentId, CompartmentPropertyId, ComponentId, ComponentKind,
    GlobalComponentId, GlobalPropertyId, GroupId, GroupPropertyId, GroupTypeId, MaterialId,
    MaterialsProducerId, MaterialsProducerPropertyId, PersonId, PersonPropertyId,
    RandomNumberGeneratorId, RegionId, RegionPropertyId, ReportId, ResourceId,
    ResourcePropertyId, StageId,
};
pub use policy::{MapOption, TimeTrackingPolicy};
pub use property::{PropertyDefinition, PropertyDefinitionError, PropertyValue, ValueType};
