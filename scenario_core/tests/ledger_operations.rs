use scenario_core::schema::{
    CompartmentId, MaterialsProducerId, PersonId, PropertyDefinition, PropertyValue, RegionId,
    ResourceId, ResourcePropertyId, TimeTrackingPolicy, ValueType,
};
use scenario_core::{
    ComponentSupplier, LedgerConfig, LedgerError, LedgerEvent, ResourceLedger, ScenarioBuilder,
};

fn region(token: &str) -> RegionId {
    RegionId::new(token)
}

fn water() -> ResourceId {
    ResourceId::new("R1")
}

fn tracked() -> ResourceId {
    ResourceId::new("R2")
}

fn mill() -> MaterialsProducerId {
    MaterialsProducerId::new("MILL")
}

/// Two regions, a producer, two people and two resources, the second one
/// time tracked. REG1 holds 100 of R1, person 0 holds 10 and MILL holds 40.
fn ledger() -> ResourceLedger {
    let mut builder = ScenarioBuilder::new();
    builder.add_region_id(region("REG1"), ComponentSupplier::inert()).unwrap();
    builder.add_region_id(region("REG2"), ComponentSupplier::inert()).unwrap();
    builder
        .add_compartment_id(CompartmentId::new("COMP1"), ComponentSupplier::inert())
        .unwrap();
    builder
        .add_materials_producer_id(mill(), ComponentSupplier::inert())
        .unwrap();
    builder.add_resource(water()).unwrap();
    builder.add_resource(tracked()).unwrap();
    builder
        .set_resource_time_tracking(tracked(), TimeTrackingPolicy::TrackTime)
        .unwrap();
    builder
        .define_resource_property(
            water(),
            ResourcePropertyId::new("unit"),
            PropertyDefinition::with_default(ValueType::Text, "litre").unwrap(),
        )
        .unwrap();
    builder
        .define_resource_property(
            water(),
            ResourcePropertyId::new("origin"),
            PropertyDefinition::with_default(ValueType::Text, "river")
                .unwrap()
                .immutable(),
        )
        .unwrap();
    builder
        .define_resource_property(
            tracked(),
            ResourcePropertyId::new("price"),
            PropertyDefinition::with_default(ValueType::Float, 1.0).unwrap(),
        )
        .unwrap();
    builder.set_region_resource_level(region("REG1"), water(), 100).unwrap();
    builder
        .set_materials_producer_resource_level(mill(), water(), 40)
        .unwrap();
    builder
        .add_person(PersonId(0), region("REG1"), CompartmentId::new("COMP1"))
        .unwrap();
    builder
        .add_person(PersonId(1), region("REG2"), CompartmentId::new("COMP1"))
        .unwrap();
    builder.set_person_resource_level(PersonId(0), water(), 10).unwrap();
    let scenario = builder.build().unwrap();
    ResourceLedger::from_scenario(&scenario, &LedgerConfig::default().with_start_time(1.0))
}

#[test]
fn seeding_copies_initial_levels() {
    let ledger = ledger();
    assert_eq!(ledger.region_resource_level(&region("REG1"), &water()), Ok(100));
    assert_eq!(ledger.region_resource_level(&region("REG2"), &water()), Ok(0));
    assert_eq!(ledger.person_resource_level(PersonId(0), &water()), Ok(10));
    assert_eq!(ledger.materials_producer_resource_level(&mill(), &water()), Ok(40));
    assert_eq!(ledger.total_resource_level(&water()), Ok(150));
    assert_eq!(ledger.time(), 1.0);
    assert_eq!(ledger.resource_ids().collect::<Vec<_>>(), vec![&water(), &tracked()]);
}

#[test]
fn removing_more_than_available_fails_and_keeps_level() {
    let mut ledger = ledger();
    let err = ledger
        .remove_resource_from_region(&water(), &region("REG1"), 150)
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientResourcesAvailable {
            available: 100,
            requested: 150
        }
    );
    insta::assert_snapshot!(err.to_string(), @"insufficient resources: 150 requested, 100 available");
    assert_eq!(ledger.region_resource_level(&region("REG1"), &water()), Ok(100));
    assert_eq!(ledger.recent_events().len(), 0);
}

#[test]
fn reflexive_transfers_fail_regardless_of_balance() {
    let mut ledger = ledger();
    for amount in [5, 500] {
        assert_eq!(
            ledger.transfer_resource_between_regions(&water(), &region("REG1"), &region("REG1"), amount),
            Err(LedgerError::ReflexiveResourceTransfer(region("REG1")))
        );
    }
    assert_eq!(ledger.region_resource_level(&region("REG1"), &water()), Ok(100));
}

#[test]
fn overflowing_additions_are_rejected() {
    let mut ledger = ledger();
    let err = ledger
        .add_resource_to_region(&water(), &region("REG1"), i64::MAX)
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::ArithmeticOverflow {
            current: 100,
            amount: i64::MAX
        }
    );
    insta::assert_snapshot!(err.to_string(), @"adding 9223372036854775807 to level 100 overflows");
    assert_eq!(ledger.region_resource_level(&region("REG1"), &water()), Ok(100));

    ledger
        .add_resource_to_region(&water(), &region("REG2"), i64::MAX)
        .unwrap();
    assert_eq!(
        ledger.transfer_resource_between_regions(&water(), &region("REG1"), &region("REG2"), 1),
        Err(LedgerError::ArithmeticOverflow {
            current: i64::MAX,
            amount: 1
        })
    );
    assert_eq!(ledger.region_resource_level(&region("REG1"), &water()), Ok(100));
}

#[test]
fn negative_amounts_and_unknown_ids_are_rejected() {
    let mut ledger = ledger();
    assert_eq!(
        ledger.add_resource_to_region(&water(), &region("REG1"), -1),
        Err(LedgerError::NegativeResourceAmount(-1))
    );
    assert_eq!(
        ledger.add_resource_to_region(&ResourceId::new("gold"), &region("REG1"), 1),
        Err(LedgerError::UnknownResourceId(ResourceId::new("gold")))
    );
    assert_eq!(
        ledger.add_resource_to_region(&water(), &region("REG9"), 1),
        Err(LedgerError::UnknownRegionId(region("REG9")))
    );
    assert_eq!(
        ledger.remove_resource_from_person(&water(), PersonId(42), 1),
        Err(LedgerError::UnknownPersonId(PersonId(42)))
    );
}

#[test]
fn transfers_between_regions_conserve_totals() {
    let mut ledger = ledger();
    ledger
        .transfer_resource_between_regions(&water(), &region("REG1"), &region("REG2"), 60)
        .unwrap();
    assert_eq!(ledger.region_resource_level(&region("REG1"), &water()), Ok(40));
    assert_eq!(ledger.region_resource_level(&region("REG2"), &water()), Ok(60));
    assert_eq!(ledger.total_resource_level(&water()), Ok(150));
    assert_eq!(ledger.recent_events().len(), 2);
}

#[test]
fn person_transfers_use_the_current_region() {
    let mut ledger = ledger();
    ledger
        .transfer_resource_to_person_from_region(&water(), PersonId(0), 30)
        .unwrap();
    assert_eq!(ledger.person_resource_level(PersonId(0), &water()), Ok(40));
    assert_eq!(ledger.region_resource_level(&region("REG1"), &water()), Ok(70));

    ledger.set_person_region(PersonId(0), &region("REG2")).unwrap();
    ledger
        .transfer_resource_from_person_to_region(&water(), PersonId(0), 25)
        .unwrap();
    assert_eq!(ledger.region_resource_level(&region("REG2"), &water()), Ok(25));
    assert_eq!(ledger.person_resource_level(PersonId(0), &water()), Ok(15));

    assert_eq!(
        ledger.transfer_resource_to_person_from_region(&water(), PersonId(1), 26),
        Err(LedgerError::InsufficientResourcesAvailable {
            available: 25,
            requested: 26
        })
    );
    assert_eq!(ledger.total_resource_level(&water()), Ok(150));
}

#[test]
fn removing_from_a_person_lowers_the_total() {
    let mut ledger = ledger();
    ledger
        .remove_resource_from_person(&water(), PersonId(0), 4)
        .unwrap();
    assert_eq!(ledger.person_resource_level(PersonId(0), &water()), Ok(6));
    assert_eq!(ledger.total_resource_level(&water()), Ok(146));
}

#[test]
fn produced_resources_move_into_regions() {
    let mut ledger = ledger();
    ledger
        .transfer_produced_resource_to_region(&mill(), &water(), &region("REG2"), 40)
        .unwrap();
    assert_eq!(ledger.materials_producer_resource_level(&mill(), &water()), Ok(0));
    assert_eq!(ledger.region_resource_level(&region("REG2"), &water()), Ok(40));
    assert_eq!(
        ledger.transfer_produced_resource_to_region(&mill(), &water(), &region("REG2"), 1),
        Err(LedgerError::InsufficientResourcesAvailable {
            available: 0,
            requested: 1
        })
    );
}

#[test]
fn subscribers_receive_events_in_mutation_order() {
    let mut ledger = ledger();
    let (sender, receiver) = crossbeam_channel::unbounded();
    ledger.subscribe(sender);

    ledger
        .transfer_resource_to_person_from_region(&water(), PersonId(0), 5)
        .unwrap();
    let events: Vec<LedgerEvent> = receiver.try_iter().collect();
    assert_eq!(
        events,
        vec![
            LedgerEvent::PersonResourceChanged {
                person: PersonId(0),
                resource: water(),
                previous: 10,
                current: 15,
                time: 1.0,
            },
            LedgerEvent::RegionResourceChanged {
                region: region("REG1"),
                resource: water(),
                previous: 100,
                current: 95,
                time: 1.0,
            },
        ]
    );
    let net: i128 = events.iter().filter_map(LedgerEvent::level_delta).sum();
    assert_eq!(net, 0);
}

#[test]
fn tracked_resources_record_change_times() {
    let mut ledger = ledger();
    assert_eq!(ledger.region_resource_time(&region("REG1"), &tracked()), Ok(1.0));
    ledger.set_time(5.0).unwrap();
    ledger
        .add_resource_to_region(&tracked(), &region("REG1"), 3)
        .unwrap();
    assert_eq!(ledger.region_resource_time(&region("REG1"), &tracked()), Ok(5.0));
    assert_eq!(ledger.region_resource_time(&region("REG2"), &tracked()), Ok(1.0));

    assert_eq!(
        ledger.region_resource_time(&region("REG1"), &water()),
        Err(LedgerError::ResourceTimeTrackingOff(water()))
    );
    assert_eq!(
        ledger.person_resource_time(PersonId(0), &water()),
        Err(LedgerError::ResourceTimeTrackingOff(water()))
    );
}

#[test]
fn time_only_moves_forward() {
    let mut ledger = ledger();
    ledger.set_time(2.0).unwrap();
    assert_eq!(
        ledger.set_time(1.5),
        Err(LedgerError::InvalidTime {
            current: 2.0,
            requested: 1.5
        })
    );
    assert!(ledger.set_time(f64::NAN).is_err());
    ledger.set_time(2.0).unwrap();
    assert_eq!(ledger.time(), 2.0);
}

#[test]
fn removed_people_are_unknown_and_never_reused() {
    let mut ledger = ledger();
    ledger.remove_person(PersonId(0)).unwrap();
    assert_eq!(
        ledger.person_resource_level(PersonId(0), &water()),
        Err(LedgerError::UnknownPersonId(PersonId(0)))
    );
    assert_eq!(ledger.total_resource_level(&water()), Ok(140));
    assert_eq!(ledger.person_count(), 1);
    assert_eq!(
        ledger.add_person(PersonId(0), &region("REG1")),
        Err(LedgerError::DuplicatePersonId(PersonId(0)))
    );
    assert_eq!(
        ledger.remove_person(PersonId(0)),
        Err(LedgerError::UnknownPersonId(PersonId(0)))
    );
}

#[test]
fn people_added_during_the_run_start_empty() {
    let mut ledger = ledger();
    ledger.set_time(3.0).unwrap();
    ledger.add_person(PersonId(7), &region("REG2")).unwrap();
    assert_eq!(ledger.person_resource_level(PersonId(7), &water()), Ok(0));
    assert_eq!(ledger.person_resource_time(PersonId(7), &tracked()), Ok(3.0));
    assert_eq!(ledger.person_region(PersonId(7)), Ok(&region("REG2")));
    assert_eq!(
        ledger.person_ids().collect::<Vec<_>>(),
        vec![PersonId(0), PersonId(1), PersonId(7)]
    );
    assert_eq!(
        ledger.person_resource_level(PersonId(5), &water()),
        Err(LedgerError::UnknownPersonId(PersonId(5)))
    );
}

#[test]
fn mutable_resource_properties_publish_before_and_after() {
    let mut ledger = ledger();
    let unit = ResourcePropertyId::new("unit");
    ledger.set_resource_property_value(&water(), &unit, "gallon").unwrap();
    assert_eq!(
        ledger.resource_property_value(&water(), &unit),
        Ok(Some(&PropertyValue::Text("gallon".to_string())))
    );
    let last = ledger.recent_events().last().cloned();
    assert_eq!(
        last,
        Some(LedgerEvent::ResourcePropertyChanged {
            resource: water(),
            property: unit.clone(),
            previous: Some(PropertyValue::Text("litre".to_string())),
            current: PropertyValue::Text("gallon".to_string()),
            time: 1.0,
        })
    );
    assert_eq!(
        ledger.resource_property_time(&water(), &unit),
        Err(LedgerError::ResourceTimeTrackingOff(water()))
    );
}

#[test]
fn resource_property_writes_are_validated() {
    let mut ledger = ledger();
    let err = ledger
        .set_resource_property_value(&water(), &ResourcePropertyId::new("origin"), "sea")
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"property origin of resource R1 is immutable");

    assert_eq!(
        ledger.set_resource_property_value(&water(), &ResourcePropertyId::new("unit"), 3.5),
        Err(LedgerError::IncompatibleValue {
            property: ResourcePropertyId::new("unit"),
            expected: ValueType::Text,
            actual: ValueType::Float,
        })
    );
    assert_eq!(
        ledger.set_resource_property_value(&water(), &ResourcePropertyId::new("colour"), "blue"),
        Err(LedgerError::UnknownResourcePropertyId {
            resource: water(),
            property: ResourcePropertyId::new("colour"),
        })
    );
    assert_eq!(ledger.recent_events().len(), 0);
}

#[test]
fn tracked_resource_properties_record_times() {
    let mut ledger = ledger();
    let price = ResourcePropertyId::new("price");
    assert_eq!(ledger.resource_property_time(&tracked(), &price), Ok(1.0));
    ledger.set_time(8.0).unwrap();
    ledger.set_resource_property_value(&tracked(), &price, 2.5).unwrap();
    assert_eq!(ledger.resource_property_time(&tracked(), &price), Ok(8.0));
}

#[test]
fn event_journal_is_bounded() {
    let mut builder = ScenarioBuilder::new();
    builder.add_region_id(region("REG1"), ComponentSupplier::inert()).unwrap();
    builder.add_resource(water()).unwrap();
    let scenario = builder.build().unwrap();
    let config = LedgerConfig::default().with_event_journal_capacity(3);
    let mut ledger = ResourceLedger::from_scenario(&scenario, &config);
    for _ in 0..5 {
        ledger.add_resource_to_region(&water(), &region("REG1"), 1).unwrap();
    }
    let currents: Vec<i64> = ledger
        .recent_events()
        .map(|event| match event {
            LedgerEvent::RegionResourceChanged { current, .. } => *current,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(currents, vec![3, 4, 5]);
}

#[test]
fn non_finite_property_values_are_rejected() {
    let mut ledger = ledger();
    let price = ResourcePropertyId::new("price");
    let err = ledger
        .set_resource_property_value(&tracked(), &price, f64::NAN)
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"value NaN of property price of resource R2 is not finite");

    // Finiteness is reported ahead of the type mismatch.
    assert!(matches!(
        ledger.set_resource_property_value(
            &water(),
            &ResourcePropertyId::new("unit"),
            f64::NEG_INFINITY
        ),
        Err(LedgerError::NonFinitePropertyValue { .. })
    ));
    assert_eq!(
        ledger.resource_property_value(&tracked(), &price),
        Ok(Some(&PropertyValue::Float(1.0)))
    );
    assert_eq!(ledger.recent_events().len(), 0);
}

#[test]
fn person_ids_above_the_configured_limit_are_rejected() {
    let mut builder = ScenarioBuilder::new();
    builder.add_region_id(region("REG1"), ComponentSupplier::inert()).unwrap();
    builder.add_resource(water()).unwrap();
    let scenario = builder.build().unwrap();
    let config = LedgerConfig::default().with_max_person_id(10);
    let mut ledger = ResourceLedger::from_scenario(&scenario, &config);

    assert_eq!(
        ledger.add_person(PersonId(u32::MAX), &region("REG1")),
        Err(LedgerError::PersonIdOutOfRange {
            person: PersonId(u32::MAX),
            limit: 10,
        })
    );
    assert_eq!(ledger.person_count(), 0);
    ledger.add_person(PersonId(10), &region("REG1")).unwrap();
    assert_eq!(ledger.person_resource_level(PersonId(10), &water()), Ok(0));
    assert_eq!(
        ledger.add_person(PersonId(11), &region("REG1")),
        Err(LedgerError::PersonIdOutOfRange {
            person: PersonId(11),
            limit: 10,
        })
    );
}
