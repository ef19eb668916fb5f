use std::collections::VecDeque;

use crossbeam_channel::Sender;
use scenario_schema::{
    MaterialsProducerId, PersonId, PropertyValue, RegionId, ResourceId, ResourcePropertyId,
};

/// Change published by a [`crate::ResourceLedger`] after a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    RegionResourceChanged {
        region: RegionId,
        resource: ResourceId,
        previous: i64,
        current: i64,
        time: f64,
    },
    PersonResourceChanged {
        person: PersonId,
        resource: ResourceId,
        previous: i64,
        current: i64,
        time: f64,
    },
    MaterialsProducerResourceChanged {
        producer: MaterialsProducerId,
        resource: ResourceId,
        previous: i64,
        current: i64,
        time: f64,
    },
    ResourcePropertyChanged {
        resource: ResourceId,
        property: ResourcePropertyId,
        previous: Option<PropertyValue>,
        current: PropertyValue,
        time: f64,
    },
}

impl LedgerEvent {
    pub fn resource(&self) -> &ResourceId {
        match self {
            Self::RegionResourceChanged { resource, .. }
            | Self::PersonResourceChanged { resource, .. }
            | Self::MaterialsProducerResourceChanged { resource, .. }
            | Self::ResourcePropertyChanged { resource, .. } => resource,
        }
    }

    pub fn time(&self) -> f64 {
        match self {
            Self::RegionResourceChanged { time, .. }
            | Self::PersonResourceChanged { time, .. }
            | Self::MaterialsProducerResourceChanged { time, .. }
            | Self::ResourcePropertyChanged { time, .. } => *time,
        }
    }

    /// Signed level change, `None` for property changes.
    pub fn level_delta(&self) -> Option<i128> {
        match self {
            Self::RegionResourceChanged {
                previous, current, ..
            }
            | Self::PersonResourceChanged {
                previous, current, ..
            }
            | Self::MaterialsProducerResourceChanged {
                previous, current, ..
            } => Some(i128::from(*current) - i128::from(*previous)),
            Self::ResourcePropertyChanged { .. } => None,
        }
    }
}

/// Sink for ledger change events, supplied by the host's observer layer.
pub trait EventPublisher: Send {
    fn publish(&mut self, event: &LedgerEvent);
}

/// Forwards events over a channel. A disconnected receiver drops them.
impl EventPublisher for Sender<LedgerEvent> {
    fn publish(&mut self, event: &LedgerEvent) {
        if self.send(event.clone()).is_err() {
            tracing::trace!(target: "scenario::ledger", "ledger.event_dropped");
        }
    }
}

/// Adapts a closure into an [`EventPublisher`].
pub struct CallbackPublisher<F>(pub F);

impl<F> EventPublisher for CallbackPublisher<F>
where
    F: FnMut(&LedgerEvent) + Send,
{
    fn publish(&mut self, event: &LedgerEvent) {
        (self.0)(event)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventJournal {
    events: VecDeque<LedgerEvent>,
    capacity: usize,
}

impl EventJournal {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, event: LedgerEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LedgerEvent> + ExactSizeIterator {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_event(current: i64) -> LedgerEvent {
        LedgerEvent::RegionResourceChanged {
            region: RegionId::new("north"),
            resource: ResourceId::new("water"),
            previous: 0,
            current,
            time: 1.0,
        }
    }

    #[test]
    fn journal_keeps_most_recent_events() {
        let mut journal = EventJournal::with_capacity(2);
        for level in 1..=3 {
            journal.push(region_event(level));
        }
        let kept: Vec<_> = journal.iter().map(|e| e.level_delta()).collect();
        assert_eq!(kept, vec![Some(2), Some(3)]);
    }

    #[test]
    fn zero_capacity_disables_journal() {
        let mut journal = EventJournal::with_capacity(0);
        journal.push(region_event(5));
        assert_eq!(journal.iter().len(), 0);
    }

    #[test]
    fn channel_publisher_survives_disconnect() {
        let (mut sender, receiver) = crossbeam_channel::unbounded();
        sender.publish(&region_event(4));
        assert_eq!(receiver.try_recv().unwrap(), region_event(4));
        drop(receiver);
        sender.publish(&region_event(5));
    }

    #[test]
    fn callback_publisher_invokes_closure() {
        let mut seen = Vec::new();
        {
            let mut publisher = CallbackPublisher(|event: &LedgerEvent| seen.push(event.clone()));
            publisher.publish(&region_event(9));
        }
        assert_eq!(seen, vec![region_event(9)]);
    }
}
