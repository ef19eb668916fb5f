//! Runtime store of conserved resource quantities.
//!
//! The ledger is seeded from a [`Scenario`] and then mutated only through
//! its own operations. Each operation runs every check before touching any
//! level, so a rejected call leaves the ledger exactly as it was. Levels
//! never go negative and additions use checked arithmetic.

use std::collections::BTreeMap;
use std::fmt;

use ahash::AHashMap;
use rayon::prelude::*;
use scenario_schema::{
    MaterialsProducerId, PersonId, PropertyDefinition, PropertyValue, RegionId, ResourceId,
    ResourcePropertyId, TimeTrackingPolicy,
};
use tracing::{debug, trace, warn};

use crate::error::LedgerError;
use crate::events::{CallbackPublisher, EventJournal, EventPublisher, LedgerEvent};
use crate::ledger_config::LedgerConfig;
use crate::scenario::Scenario;

const LOG_TARGET: &str = "scenario::ledger";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PersonSlot {
    Vacant,
    Active { region: usize },
    Removed,
}

#[derive(Debug, Clone)]
struct PropertySlot {
    definition: PropertyDefinition,
    value: Option<PropertyValue>,
    time: f64,
}

impl PropertySlot {
    fn resolved(&self) -> Option<&PropertyValue> {
        self.value
            .as_ref()
            .or_else(|| self.definition.default_value())
    }
}

/// Levels of one resource across every holder, indexed like the ledger's
/// region, producer and person tables. Time columns are empty unless the
/// resource tracks time.
#[derive(Debug, Clone)]
struct ResourceColumn {
    id: ResourceId,
    policy: TimeTrackingPolicy,
    region_levels: Vec<i64>,
    region_times: Vec<f64>,
    producer_levels: Vec<i64>,
    producer_times: Vec<f64>,
    person_levels: Vec<i64>,
    person_times: Vec<f64>,
    properties: BTreeMap<ResourcePropertyId, PropertySlot>,
}

impl ResourceColumn {
    fn new(
        id: ResourceId,
        policy: TimeTrackingPolicy,
        regions: usize,
        producers: usize,
        people: usize,
        time: f64,
    ) -> Self {
        let times = |len: usize| {
            if policy.is_tracking() {
                vec![time; len]
            } else {
                Vec::new()
            }
        };
        Self {
            id,
            policy,
            region_levels: vec![0; regions],
            region_times: times(regions),
            producer_levels: vec![0; producers],
            producer_times: times(producers),
            person_levels: vec![0; people],
            person_times: times(people),
            properties: BTreeMap::new(),
        }
    }

    fn tracking(&self) -> bool {
        self.policy.is_tracking()
    }

    fn ensure_person(&mut self, index: usize, time: f64) {
        if self.person_levels.len() <= index {
            self.person_levels.resize(index + 1, 0);
        }
        if self.tracking() {
            if self.person_times.len() <= index {
                self.person_times.resize(index + 1, time);
            }
            self.person_times[index] = time;
        }
    }

    fn total(&self, parallel_threshold: usize) -> i128 {
        let widen = |level: &i64| i128::from(*level);
        let regions: i128 = self.region_levels.iter().map(widen).sum();
        let producers: i128 = self.producer_levels.iter().map(widen).sum();
        let people: i128 = if self.person_levels.len() >= parallel_threshold {
            self.person_levels.par_iter().map(widen).sum()
        } else {
            self.person_levels.iter().map(widen).sum()
        };
        regions + producers + people
    }
}

/// Conservation-preserving accounting of resources held by regions,
/// materials producers and people during a run.
pub struct ResourceLedger {
    time: f64,
    regions: Vec<RegionId>,
    region_index: AHashMap<RegionId, usize>,
    producers: Vec<MaterialsProducerId>,
    producer_index: AHashMap<MaterialsProducerId, usize>,
    columns: Vec<ResourceColumn>,
    column_index: AHashMap<ResourceId, usize>,
    people: Vec<PersonSlot>,
    active_people: usize,
    parallel_sum_threshold: usize,
    max_person_id: u32,
    journal: EventJournal,
    publishers: Vec<Box<dyn EventPublisher>>,
}

impl ResourceLedger {
    /// Seeds a ledger with the regions, producers, people, resources and
    /// initial levels of `scenario`.
    ///
    /// Person slots are allocated up to the largest id in the scenario, so
    /// sparse ids cost memory in every resource column.
    pub fn from_scenario(scenario: &Scenario, config: &LedgerConfig) -> Self {
        let data = scenario.data();
        let time = if config.start_time().is_finite() {
            config.start_time()
        } else {
            warn!(
                target: LOG_TARGET,
                start_time = config.start_time(),
                "ledger.start_time_invalid"
            );
            0.0
        };

        let regions: Vec<RegionId> = data.regions.ids().cloned().collect();
        let region_index = index_of(&regions);
        let producers: Vec<MaterialsProducerId> = data.materials_producers.ids().cloned().collect();
        let producer_index = index_of(&producers);

        let population = data
            .people
            .iter()
            .next_back()
            .map_or(0, |(person, _)| person.index() + 1);
        let mut people = Vec::with_capacity(config.initial_person_capacity().max(population));
        people.resize(population, PersonSlot::Vacant);
        for (person, record) in data.people.iter() {
            people[person.index()] = PersonSlot::Active {
                region: region_index[&record.region],
            };
        }

        let resource_ids: Vec<ResourceId> = data.resources.ids().cloned().collect();
        let column_index = index_of(&resource_ids);
        let mut columns: Vec<ResourceColumn> = resource_ids
            .into_iter()
            .map(|resource| {
                let policy = data
                    .resource_time_tracking
                    .get(&resource)
                    .copied()
                    .unwrap_or_default();
                let mut column = ResourceColumn::new(
                    resource,
                    policy,
                    regions.len(),
                    producers.len(),
                    population,
                    time,
                );
                if let Some(definitions) = data.resource_property_definitions.get(&column.id) {
                    for (property, definition) in definitions {
                        let value = data
                            .resource_property_values
                            .get(&(column.id.clone(), property.clone()))
                            .cloned();
                        column.properties.insert(
                            property.clone(),
                            PropertySlot {
                                definition: definition.clone(),
                                value,
                                time,
                            },
                        );
                    }
                }
                column
            })
            .collect();

        for ((region, resource), level) in &data.region_resource_levels {
            columns[column_index[resource]].region_levels[region_index[region]] = *level;
        }
        for ((producer, resource), level) in &data.materials_producer_resource_levels {
            columns[column_index[resource]].producer_levels[producer_index[producer]] = *level;
        }
        for ((person, resource), level) in &data.person_resource_levels {
            columns[column_index[resource]].person_levels[person.index()] = *level;
        }

        debug!(
            target: LOG_TARGET,
            regions = regions.len(),
            producers = producers.len(),
            resources = columns.len(),
            people = data.people.len(),
            start_time = time,
            "ledger.seeded"
        );

        Self {
            time,
            regions,
            region_index,
            producers,
            producer_index,
            columns,
            column_index,
            people,
            active_people: data.people.len(),
            parallel_sum_threshold: config.parallel_sum_threshold(),
            max_person_id: config.max_person_id(),
            journal: EventJournal::with_capacity(config.event_journal_capacity()),
            publishers: Vec::new(),
        }
    }

    pub fn subscribe<P>(&mut self, publisher: P)
    where
        P: EventPublisher + 'static,
    {
        self.publishers.push(Box::new(publisher));
    }

    pub fn subscribe_fn<F>(&mut self, callback: F)
    where
        F: FnMut(&LedgerEvent) + Send + 'static,
    {
        self.subscribe(CallbackPublisher(callback));
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advances simulation time. Time is finite and never moves backwards.
    pub fn set_time(&mut self, time: f64) -> Result<(), LedgerError> {
        if !time.is_finite() || time < self.time {
            return Err(LedgerError::InvalidTime {
                current: self.time,
                requested: time,
            });
        }
        self.time = time;
        Ok(())
    }

    /// Most recent change events, oldest first.
    pub fn recent_events(&self) -> impl DoubleEndedIterator<Item = &LedgerEvent> + ExactSizeIterator {
        self.journal.iter()
    }

    pub fn resource_ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.columns.iter().map(|column| &column.id)
    }

    pub fn region_ids(&self) -> impl Iterator<Item = &RegionId> {
        self.regions.iter()
    }

    pub fn materials_producer_ids(&self) -> impl Iterator<Item = &MaterialsProducerId> {
        self.producers.iter()
    }

    /// Ids of people currently in the simulation, ascending.
    pub fn person_ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.people
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, PersonSlot::Active { .. }))
            .map(|(index, _)| person_at(index))
    }

    pub fn person_count(&self) -> usize {
        self.active_people
    }

    pub fn time_tracking_policy(&self, resource: &ResourceId) -> Result<TimeTrackingPolicy, LedgerError> {
        Ok(self.columns[self.column_of(resource)?].policy)
    }

    pub fn person_region(&self, person: PersonId) -> Result<&RegionId, LedgerError> {
        let (_, region) = self.active_person(person)?;
        Ok(&self.regions[region])
    }

    pub fn region_resource_level(&self, region: &RegionId, resource: &ResourceId) -> Result<i64, LedgerError> {
        let column = self.column_of(resource)?;
        let region = self.region_of(region)?;
        Ok(self.columns[column].region_levels[region])
    }

    pub fn materials_producer_resource_level(
        &self,
        producer: &MaterialsProducerId,
        resource: &ResourceId,
    ) -> Result<i64, LedgerError> {
        let column = self.column_of(resource)?;
        let producer = self.producer_of(producer)?;
        Ok(self.columns[column].producer_levels[producer])
    }

    /// Fails with `UnknownPersonId` for people that never existed and for
    /// people removed from the simulation alike.
    pub fn person_resource_level(&self, person: PersonId, resource: &ResourceId) -> Result<i64, LedgerError> {
        let (slot, _) = self.active_person(person)?;
        let column = self.column_of(resource)?;
        Ok(self.columns[column].person_levels[slot])
    }

    pub fn region_resource_time(&self, region: &RegionId, resource: &ResourceId) -> Result<f64, LedgerError> {
        let column = self.tracked_column(resource)?;
        let region = self.region_of(region)?;
        Ok(column.region_times[region])
    }

    pub fn materials_producer_resource_time(
        &self,
        producer: &MaterialsProducerId,
        resource: &ResourceId,
    ) -> Result<f64, LedgerError> {
        let column = self.tracked_column(resource)?;
        let producer = self.producer_of(producer)?;
        Ok(column.producer_times[producer])
    }

    pub fn person_resource_time(&self, person: PersonId, resource: &ResourceId) -> Result<f64, LedgerError> {
        let (slot, _) = self.active_person(person)?;
        let column = self.tracked_column(resource)?;
        Ok(column.person_times[slot])
    }

    /// Sum of `resource` over every holder. Widened so it cannot overflow.
    pub fn total_resource_level(&self, resource: &ResourceId) -> Result<i128, LedgerError> {
        let column = &self.columns[self.column_of(resource)?];
        Ok(column.total(self.parallel_sum_threshold))
    }

    pub fn resource_property_ids(
        &self,
        resource: &ResourceId,
    ) -> Result<impl Iterator<Item = &ResourcePropertyId>, LedgerError> {
        Ok(self.columns[self.column_of(resource)?].properties.keys())
    }

    pub fn resource_property_definition(
        &self,
        resource: &ResourceId,
        property: &ResourcePropertyId,
    ) -> Result<&PropertyDefinition, LedgerError> {
        Ok(&self.property_slot(resource, property)?.definition)
    }

    pub fn resource_property_value(
        &self,
        resource: &ResourceId,
        property: &ResourcePropertyId,
    ) -> Result<Option<&PropertyValue>, LedgerError> {
        Ok(self.property_slot(resource, property)?.resolved())
    }

    /// Time the property last changed; only kept for time-tracked resources.
    pub fn resource_property_time(
        &self,
        resource: &ResourceId,
        property: &ResourcePropertyId,
    ) -> Result<f64, LedgerError> {
        let slot = self.property_slot(resource, property)?;
        if !self.columns[self.column_index[resource]].tracking() {
            return Err(LedgerError::ResourceTimeTrackingOff(resource.clone()));
        }
        Ok(slot.time)
    }

    pub fn add_resource_to_region(
        &mut self,
        resource: &ResourceId,
        region: &RegionId,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let column = self.column_of(resource)?;
        let region = self.region_of(region)?;
        check_amount(amount)?;
        let level = credit(self.columns[column].region_levels[region], amount)?;

        let event = self.write_region_level(column, region, level);
        trace!(target: LOG_TARGET, resource = %resource, amount, level, "ledger.region_credited");
        self.emit(event);
        Ok(())
    }

    pub fn remove_resource_from_region(
        &mut self,
        resource: &ResourceId,
        region: &RegionId,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let column = self.column_of(resource)?;
        let region = self.region_of(region)?;
        check_amount(amount)?;
        let level = debit(self.columns[column].region_levels[region], amount)?;

        let event = self.write_region_level(column, region, level);
        trace!(target: LOG_TARGET, resource = %resource, amount, level, "ledger.region_debited");
        self.emit(event);
        Ok(())
    }

    pub fn transfer_resource_between_regions(
        &mut self,
        resource: &ResourceId,
        source: &RegionId,
        destination: &RegionId,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let column = self.column_of(resource)?;
        if source == destination {
            return Err(LedgerError::ReflexiveResourceTransfer(source.clone()));
        }
        let source = self.region_of(source)?;
        let destination = self.region_of(destination)?;
        check_amount(amount)?;
        let levels = &self.columns[column].region_levels;
        let source_level = debit(levels[source], amount)?;
        let destination_level = credit(levels[destination], amount)?;

        let debited = self.write_region_level(column, source, source_level);
        let credited = self.write_region_level(column, destination, destination_level);
        trace!(target: LOG_TARGET, resource = %resource, amount, "ledger.region_transfer");
        self.emit(debited);
        self.emit(credited);
        Ok(())
    }

    /// Moves `amount` from the person's current region to the person.
    pub fn transfer_resource_to_person_from_region(
        &mut self,
        resource: &ResourceId,
        person: PersonId,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let (slot, region) = self.active_person(person)?;
        let column = self.column_of(resource)?;
        check_amount(amount)?;
        let region_level = debit(self.columns[column].region_levels[region], amount)?;
        let person_level = credit(self.columns[column].person_levels[slot], amount)?;

        let credited = self.write_person_level(column, slot, person_level);
        let debited = self.write_region_level(column, region, region_level);
        trace!(target: LOG_TARGET, resource = %resource, %person, amount, "ledger.person_received");
        self.emit(credited);
        self.emit(debited);
        Ok(())
    }

    /// Moves `amount` from the person to the person's current region.
    pub fn transfer_resource_from_person_to_region(
        &mut self,
        resource: &ResourceId,
        person: PersonId,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let (slot, region) = self.active_person(person)?;
        let column = self.column_of(resource)?;
        check_amount(amount)?;
        let person_level = debit(self.columns[column].person_levels[slot], amount)?;
        let region_level = credit(self.columns[column].region_levels[region], amount)?;

        let debited = self.write_person_level(column, slot, person_level);
        let credited = self.write_region_level(column, region, region_level);
        trace!(target: LOG_TARGET, resource = %resource, %person, amount, "ledger.person_returned");
        self.emit(debited);
        self.emit(credited);
        Ok(())
    }

    pub fn remove_resource_from_person(
        &mut self,
        resource: &ResourceId,
        person: PersonId,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let (slot, _) = self.active_person(person)?;
        let column = self.column_of(resource)?;
        check_amount(amount)?;
        let level = debit(self.columns[column].person_levels[slot], amount)?;

        let event = self.write_person_level(column, slot, level);
        trace!(target: LOG_TARGET, resource = %resource, %person, amount, "ledger.person_debited");
        self.emit(event);
        Ok(())
    }

    /// Moves produced resource from a materials producer into a region.
    pub fn transfer_produced_resource_to_region(
        &mut self,
        producer: &MaterialsProducerId,
        resource: &ResourceId,
        region: &RegionId,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let column = self.column_of(resource)?;
        let producer = self.producer_of(producer)?;
        let region = self.region_of(region)?;
        check_amount(amount)?;
        let producer_level = debit(self.columns[column].producer_levels[producer], amount)?;
        let region_level = credit(self.columns[column].region_levels[region], amount)?;

        let debited = self.write_producer_level(column, producer, producer_level);
        let credited = self.write_region_level(column, region, region_level);
        trace!(target: LOG_TARGET, resource = %resource, amount, "ledger.production_delivered");
        self.emit(debited);
        self.emit(credited);
        Ok(())
    }

    pub fn set_resource_property_value(
        &mut self,
        resource: &ResourceId,
        property: &ResourcePropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), LedgerError> {
        let value = value.into();
        let slot = self.property_slot(resource, property)?;
        if let PropertyValue::Float(float) = &value {
            if !float.is_finite() {
                return Err(LedgerError::NonFinitePropertyValue {
                    resource: resource.clone(),
                    property: property.clone(),
                    value: *float,
                });
            }
        }
        if !slot.definition.accepts(&value) {
            return Err(LedgerError::IncompatibleValue {
                property: property.clone(),
                expected: slot.definition.value_type(),
                actual: value.value_type(),
            });
        }
        if !slot.definition.is_mutable() {
            return Err(LedgerError::ImmutablePropertyValue {
                resource: resource.clone(),
                property: property.clone(),
            });
        }

        let time = self.time;
        let column = &mut self.columns[self.column_index[resource]];
        let tracking = column.tracking();
        let Some(slot) = column.properties.get_mut(property) else {
            unreachable!("property slot checked above");
        };
        let previous = slot.resolved().cloned();
        slot.value = Some(value.clone());
        if tracking {
            slot.time = time;
        }
        trace!(target: LOG_TARGET, resource = %resource, property = %property, "ledger.property_set");
        self.emit(LedgerEvent::ResourcePropertyChanged {
            resource: resource.clone(),
            property: property.clone(),
            previous,
            current: value,
            time,
        });
        Ok(())
    }

    /// Registers a person created during the run. Identifiers of removed
    /// people are never reused.
    ///
    /// Person ids index dense per-resource columns, so hosts should hand them
    /// out sequentially. Ids above [`LedgerConfig::max_person_id`] are rejected.
    pub fn add_person(&mut self, person: PersonId, region: &RegionId) -> Result<(), LedgerError> {
        let region = self.region_of(region)?;
        let index = person.index();
        if matches!(
            self.people.get(index),
            Some(PersonSlot::Active { .. } | PersonSlot::Removed)
        ) {
            return Err(LedgerError::DuplicatePersonId(person));
        }
        if person.0 > self.max_person_id {
            return Err(LedgerError::PersonIdOutOfRange {
                person,
                limit: self.max_person_id,
            });
        }

        if self.people.len() <= index {
            self.people.resize(index + 1, PersonSlot::Vacant);
        }
        self.people[index] = PersonSlot::Active { region };
        self.active_people += 1;
        let time = self.time;
        for column in &mut self.columns {
            column.ensure_person(index, time);
        }
        debug!(target: LOG_TARGET, %person, region = %self.regions[region], "ledger.person_added");
        Ok(())
    }

    pub fn set_person_region(&mut self, person: PersonId, region: &RegionId) -> Result<(), LedgerError> {
        let (slot, _) = self.active_person(person)?;
        let region = self.region_of(region)?;
        self.people[slot] = PersonSlot::Active { region };
        debug!(target: LOG_TARGET, %person, region = %self.regions[region], "ledger.person_moved");
        Ok(())
    }

    /// Removes a person from the simulation. Whatever the person held leaves
    /// the ledger with them.
    pub fn remove_person(&mut self, person: PersonId) -> Result<(), LedgerError> {
        let (slot, _) = self.active_person(person)?;
        let mut events = Vec::new();
        for column in 0..self.columns.len() {
            if self.columns[column].person_levels[slot] != 0 {
                events.push(self.write_person_level(column, slot, 0));
            }
        }
        self.people[slot] = PersonSlot::Removed;
        self.active_people -= 1;
        debug!(target: LOG_TARGET, %person, "ledger.person_removed");
        for event in events {
            self.emit(event);
        }
        Ok(())
    }

    fn column_of(&self, resource: &ResourceId) -> Result<usize, LedgerError> {
        self.column_index
            .get(resource)
            .copied()
            .ok_or_else(|| LedgerError::UnknownResourceId(resource.clone()))
    }

    fn tracked_column(&self, resource: &ResourceId) -> Result<&ResourceColumn, LedgerError> {
        let column = &self.columns[self.column_of(resource)?];
        if !column.tracking() {
            return Err(LedgerError::ResourceTimeTrackingOff(resource.clone()));
        }
        Ok(column)
    }

    fn region_of(&self, region: &RegionId) -> Result<usize, LedgerError> {
        self.region_index
            .get(region)
            .copied()
            .ok_or_else(|| LedgerError::UnknownRegionId(region.clone()))
    }

    fn producer_of(&self, producer: &MaterialsProducerId) -> Result<usize, LedgerError> {
        self.producer_index
            .get(producer)
            .copied()
            .ok_or_else(|| LedgerError::UnknownMaterialsProducerId(producer.clone()))
    }

    /// Slot index and current region of a person still in the simulation.
    fn active_person(&self, person: PersonId) -> Result<(usize, usize), LedgerError> {
        match self.people.get(person.index()) {
            Some(PersonSlot::Active { region }) => Ok((person.index(), *region)),
            _ => Err(LedgerError::UnknownPersonId(person)),
        }
    }

    fn property_slot(
        &self,
        resource: &ResourceId,
        property: &ResourcePropertyId,
    ) -> Result<&PropertySlot, LedgerError> {
        self.columns[self.column_of(resource)?]
            .properties
            .get(property)
            .ok_or_else(|| LedgerError::UnknownResourcePropertyId {
                resource: resource.clone(),
                property: property.clone(),
            })
    }

    fn write_region_level(&mut self, column: usize, region: usize, level: i64) -> LedgerEvent {
        let time = self.time;
        let column = &mut self.columns[column];
        let previous = std::mem::replace(&mut column.region_levels[region], level);
        if column.policy.is_tracking() {
            column.region_times[region] = time;
        }
        LedgerEvent::RegionResourceChanged {
            region: self.regions[region].clone(),
            resource: column.id.clone(),
            previous,
            current: level,
            time,
        }
    }

    fn write_producer_level(&mut self, column: usize, producer: usize, level: i64) -> LedgerEvent {
        let time = self.time;
        let column = &mut self.columns[column];
        let previous = std::mem::replace(&mut column.producer_levels[producer], level);
        if column.policy.is_tracking() {
            column.producer_times[producer] = time;
        }
        LedgerEvent::MaterialsProducerResourceChanged {
            producer: self.producers[producer].clone(),
            resource: column.id.clone(),
            previous,
            current: level,
            time,
        }
    }

    fn write_person_level(&mut self, column: usize, slot: usize, level: i64) -> LedgerEvent {
        let time = self.time;
        let column = &mut self.columns[column];
        let previous = std::mem::replace(&mut column.person_levels[slot], level);
        if column.policy.is_tracking() {
            column.person_times[slot] = time;
        }
        LedgerEvent::PersonResourceChanged {
            person: person_at(slot),
            resource: column.id.clone(),
            previous,
            current: level,
            time,
        }
    }

    fn emit(&mut self, event: LedgerEvent) {
        for publisher in &mut self.publishers {
            publisher.publish(&event);
        }
        self.journal.push(event);
    }
}

impl fmt::Debug for ResourceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLedger")
            .field("time", &self.time)
            .field("regions", &self.regions.len())
            .field("producers", &self.producers.len())
            .field("resources", &self.columns.len())
            .field("people", &self.active_people)
            .field("publishers", &self.publishers.len())
            .finish()
    }
}

fn index_of<K: Clone + Eq + std::hash::Hash>(ids: &[K]) -> AHashMap<K, usize> {
    ids.iter()
        .cloned()
        .enumerate()
        .map(|(index, id)| (id, index))
        .collect()
}

fn person_at(slot: usize) -> PersonId {
    PersonId(slot as u32)
}

fn check_amount(amount: i64) -> Result<(), LedgerError> {
    if amount < 0 {
        return Err(LedgerError::NegativeResourceAmount(amount));
    }
    Ok(())
}

fn credit(current: i64, amount: i64) -> Result<i64, LedgerError> {
    current
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow { current, amount })
}

fn debit(available: i64, requested: i64) -> Result<i64, LedgerError> {
    if available < requested {
        return Err(LedgerError::InsufficientResourcesAvailable {
            available,
            requested,
        });
    }
    Ok(available - requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_rejects_overflow_instead_of_wrapping() {
        assert_eq!(credit(i64::MAX - 1, 1), Ok(i64::MAX));
        assert_eq!(
            credit(i64::MAX, 1),
            Err(LedgerError::ArithmeticOverflow {
                current: i64::MAX,
                amount: 1
            })
        );
    }

    #[test]
    fn debit_requires_full_balance() {
        assert_eq!(debit(10, 10), Ok(0));
        assert_eq!(
            debit(3, 4),
            Err(LedgerError::InsufficientResourcesAvailable {
                available: 3,
                requested: 4
            })
        );
    }

    #[test]
    fn person_columns_grow_on_demand() {
        let mut column = ResourceColumn::new(
            ResourceId::new("water"),
            TimeTrackingPolicy::TrackTime,
            0,
            0,
            0,
            0.0,
        );
        column.ensure_person(4, 2.5);
        assert_eq!(column.person_levels.len(), 5);
        assert_eq!(column.person_times[4], 2.5);
    }

    #[test]
    fn parallel_and_serial_totals_agree() {
        let mut column = ResourceColumn::new(
            ResourceId::new("water"),
            TimeTrackingPolicy::DoNotTrackTime,
            1,
            1,
            0,
            0.0,
        );
        column.region_levels[0] = i64::MAX;
        column.producer_levels[0] = i64::MAX;
        column.person_levels = (0..1000).collect();
        let expected = 2 * i128::from(i64::MAX) + 499_500;
        assert_eq!(column.total(usize::MAX), expected);
        assert_eq!(column.total(0), expected);
    }
}
