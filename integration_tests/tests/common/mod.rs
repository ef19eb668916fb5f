#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use scenario_core::{ComponentSupplier, RecordedAction, Scenario, ScenarioBuilder, ScenarioError};
use scenario_schema::{
    BatchId, BatchPropertyId, CompartmentId, CompartmentPropertyId, GlobalComponentId,
    GlobalPropertyId, GroupId, GroupPropertyId, GroupTypeId, MapOption, MaterialId,
    MaterialsProducerId, MaterialsProducerPropertyId, PersonId, PersonPropertyId,
    PropertyDefinition, PropertyValue, RandomNumberGeneratorId, RegionId, RegionPropertyId,
    ReportId, ResourceId, ResourcePropertyId, StageId, TimeTrackingPolicy, ValueType,
};

static INIT: Once = Once::new();

/// Points `LEDGER_CONFIG_PATH` at the test ledger config once per test binary.
pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_ledger_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test ledger config at {}",
            config_path.display()
        );

        std::env::set_var(scenario_core::LEDGER_CONFIG_ENV, &config_path);
    });
}

/// Component suppliers shared by every build of the town fixture, so that
/// scenarios built from it compare equal.
#[derive(Clone, Debug)]
pub struct Town {
    pub clock: ComponentSupplier,
    pub north: ComponentSupplier,
    pub south: ComponentSupplier,
    pub home: ComponentSupplier,
    pub mill: ComponentSupplier,
}

impl Town {
    pub fn new() -> Self {
        Self {
            clock: ComponentSupplier::inert(),
            north: ComponentSupplier::inert(),
            south: ComponentSupplier::inert(),
            home: ComponentSupplier::inert(),
            mill: ComponentSupplier::inert(),
        }
    }

    /// Every fact of the town, one recorded call each, in dependency order.
    pub fn facts(&self) -> Vec<RecordedAction> {
        use RecordedAction as A;
        vec![
            A::PersonRegionArrivalTracking(TimeTrackingPolicy::TrackTime),
            A::RegionMapOption(MapOption::Hash),
            A::SuggestedPopulationSize(3),
            A::GlobalComponent {
                id: GlobalComponentId::new("clock"),
                supplier: self.clock.clone(),
            },
            A::Region {
                id: north(),
                supplier: self.north.clone(),
            },
            A::Region {
                id: south(),
                supplier: self.south.clone(),
            },
            A::Compartment {
                id: home(),
                supplier: self.home.clone(),
            },
            A::MaterialsProducer {
                id: mill(),
                supplier: self.mill.clone(),
            },
            A::Material(steel()),
            A::RandomNumberGenerator(RandomNumberGeneratorId::new("births")),
            A::Report(ReportId::new("census")),
            A::GroupType(household()),
            A::Resource(water()),
            A::Resource(food()),
            A::BatchPropertyDefinition {
                material: steel(),
                property: BatchPropertyId::new("grade"),
                definition: defaulted(ValueType::Integer, 1),
            },
            A::CompartmentPropertyDefinition {
                compartment: home(),
                property: CompartmentPropertyId::new("capacity"),
                definition: PropertyDefinition::new(ValueType::Integer),
            },
            A::RegionPropertyDefinition {
                property: RegionPropertyId::new("rainfall"),
                definition: defaulted(ValueType::Float, 1.0),
            },
            A::ResourcePropertyDefinition {
                resource: water(),
                property: ResourcePropertyId::new("potable"),
                definition: defaulted(ValueType::Boolean, true),
            },
            A::GlobalPropertyDefinition {
                property: GlobalPropertyId::new("season"),
                definition: PropertyDefinition::new(ValueType::Text),
            },
            A::PersonPropertyDefinition {
                property: PersonPropertyId::new("age"),
                definition: defaulted(ValueType::Integer, 0),
            },
            A::MaterialsProducerPropertyDefinition {
                property: MaterialsProducerPropertyId::new("output"),
                definition: defaulted(ValueType::Float, 0.0),
            },
            A::GroupPropertyDefinition {
                group_type: household(),
                property: GroupPropertyId::new("size"),
                definition: defaulted(ValueType::Integer, 0),
            },
            A::CompartmentPropertyValue {
                compartment: home(),
                property: CompartmentPropertyId::new("capacity"),
                value: PropertyValue::Integer(50),
            },
            A::RegionPropertyValue {
                region: south(),
                property: RegionPropertyId::new("rainfall"),
                value: PropertyValue::Float(2.5),
            },
            A::ResourcePropertyValue {
                resource: water(),
                property: ResourcePropertyId::new("potable"),
                value: PropertyValue::Boolean(false),
            },
            A::GlobalPropertyValue {
                property: GlobalPropertyId::new("season"),
                value: PropertyValue::from("spring"),
            },
            A::MaterialsProducerPropertyValue {
                producer: mill(),
                property: MaterialsProducerPropertyId::new("output"),
                value: PropertyValue::Float(3.0),
            },
            A::ResourceTimeTracking {
                resource: food(),
                policy: TimeTrackingPolicy::TrackTime,
            },
            A::RegionResourceLevel {
                region: north(),
                resource: water(),
                amount: 100,
            },
            A::MaterialsProducerResourceLevel {
                producer: mill(),
                resource: food(),
                amount: 20,
            },
            A::Person {
                person: PersonId(0),
                region: north(),
                compartment: home(),
            },
            A::Person {
                person: PersonId(1),
                region: south(),
                compartment: home(),
            },
            A::Person {
                person: PersonId(2),
                region: north(),
                compartment: home(),
            },
            A::PersonPropertyValue {
                person: PersonId(1),
                property: PersonPropertyId::new("age"),
                value: PropertyValue::Integer(40),
            },
            A::PersonResourceLevel {
                person: PersonId(2),
                resource: water(),
                amount: 5,
            },
            A::Group {
                group: smiths(),
                group_type: household(),
            },
            A::GroupPropertyValue {
                group: smiths(),
                property: GroupPropertyId::new("size"),
                value: PropertyValue::Integer(2),
            },
            A::GroupMembership {
                group: smiths(),
                person: PersonId(0),
            },
            A::GroupMembership {
                group: smiths(),
                person: PersonId(1),
            },
            A::Batch {
                batch: BatchId::new("b1"),
                material: steel(),
                amount: 2.5,
                producer: mill(),
            },
            A::BatchPropertyValue {
                batch: BatchId::new("b1"),
                property: BatchPropertyId::new("grade"),
                value: PropertyValue::Integer(3),
            },
            A::Stage {
                stage: StageId::new("s1"),
                offered: true,
                producer: mill(),
            },
            A::StageMembership {
                stage: StageId::new("s1"),
                batch: BatchId::new("b1"),
            },
        ]
    }

    /// The same facts issued directly against the structured builder.
    pub fn build_structured(&self) -> Result<Scenario, ScenarioError> {
        let mut b = ScenarioBuilder::new();
        b.set_person_region_arrival_tracking(TimeTrackingPolicy::TrackTime)?;
        b.set_region_map_option(MapOption::Hash)?;
        b.set_suggested_population_size(3)?;
        b.add_global_component_id(GlobalComponentId::new("clock"), self.clock.clone())?;
        b.add_region_id(north(), self.north.clone())?;
        b.add_region_id(south(), self.south.clone())?;
        b.add_compartment_id(home(), self.home.clone())?;
        b.add_materials_producer_id(mill(), self.mill.clone())?;
        b.add_material(steel())?;
        b.add_random_number_generator_id(RandomNumberGeneratorId::new("births"))?;
        b.add_report_id(ReportId::new("census"))?;
        b.add_group_type_id(household())?;
        b.add_resource(water())?;
        b.add_resource(food())?;
        b.define_batch_property(
            steel(),
            BatchPropertyId::new("grade"),
            defaulted(ValueType::Integer, 1),
        )?;
        b.define_compartment_property(
            home(),
            CompartmentPropertyId::new("capacity"),
            PropertyDefinition::new(ValueType::Integer),
        )?;
        b.define_region_property(
            RegionPropertyId::new("rainfall"),
            defaulted(ValueType::Float, 1.0),
        )?;
        b.define_resource_property(
            water(),
            ResourcePropertyId::new("potable"),
            defaulted(ValueType::Boolean, true),
        )?;
        b.define_global_property(
            GlobalPropertyId::new("season"),
            PropertyDefinition::new(ValueType::Text),
        )?;
        b.define_person_property(PersonPropertyId::new("age"), defaulted(ValueType::Integer, 0))?;
        b.define_materials_producer_property(
            MaterialsProducerPropertyId::new("output"),
            defaulted(ValueType::Float, 0.0),
        )?;
        b.define_group_property(
            household(),
            GroupPropertyId::new("size"),
            defaulted(ValueType::Integer, 0),
        )?;
        b.set_compartment_property_value(home(), CompartmentPropertyId::new("capacity"), 50)?;
        b.set_region_property_value(south(), RegionPropertyId::new("rainfall"), 2.5)?;
        b.set_resource_property_value(water(), ResourcePropertyId::new("potable"), false)?;
        b.set_global_property_value(GlobalPropertyId::new("season"), "spring")?;
        b.set_materials_producer_property_value(
            mill(),
            MaterialsProducerPropertyId::new("output"),
            3.0,
        )?;
        b.set_resource_time_tracking(food(), TimeTrackingPolicy::TrackTime)?;
        b.set_region_resource_level(north(), water(), 100)?;
        b.set_materials_producer_resource_level(mill(), food(), 20)?;
        b.add_person(PersonId(0), north(), home())?;
        b.add_person(PersonId(1), south(), home())?;
        b.add_person(PersonId(2), north(), home())?;
        b.set_person_property_value(PersonId(1), PersonPropertyId::new("age"), 40)?;
        b.set_person_resource_level(PersonId(2), water(), 5)?;
        b.add_group(smiths(), household())?;
        b.set_group_property_value(smiths(), GroupPropertyId::new("size"), 2)?;
        b.add_person_to_group(smiths(), PersonId(0))?;
        b.add_person_to_group(smiths(), PersonId(1))?;
        b.add_batch(BatchId::new("b1"), steel(), 2.5, mill())?;
        b.set_batch_property_value(BatchId::new("b1"), BatchPropertyId::new("grade"), 3)?;
        b.add_stage(StageId::new("s1"), true, mill())?;
        b.add_batch_to_stage(StageId::new("s1"), BatchId::new("b1"))?;
        b.build()
    }
}

fn defaulted(value_type: ValueType, default: impl Into<PropertyValue>) -> PropertyDefinition {
    PropertyDefinition::with_default(value_type, default).expect("default matches its type")
}

pub fn north() -> RegionId {
    RegionId::new("north")
}

pub fn south() -> RegionId {
    RegionId::new("south")
}

pub fn home() -> CompartmentId {
    CompartmentId::new("home")
}

pub fn mill() -> MaterialsProducerId {
    MaterialsProducerId::new("mill")
}

pub fn steel() -> MaterialId {
    MaterialId::new("steel")
}

pub fn household() -> GroupTypeId {
    GroupTypeId::new("household")
}

pub fn smiths() -> GroupId {
    GroupId::new("smiths")
}

pub fn water() -> ResourceId {
    ResourceId::new("water")
}

pub fn food() -> ResourceId {
    ResourceId::new("food")
}
