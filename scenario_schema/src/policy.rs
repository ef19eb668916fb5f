use serde::{Deserialize, Serialize};

/// Whether the simulation records the time of the last change of a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeTrackingPolicy {
    TrackTime,
    #[default]
    DoNotTrackTime,
}

impl TimeTrackingPolicy {
    pub fn is_tracking(self) -> bool {
        matches!(self, TimeTrackingPolicy::TrackTime)
    }
}

/// Indexing hint for the host's people-by-location maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapOption {
    #[default]
    None,
    Array,
    Hash,
}
