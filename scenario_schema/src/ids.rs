use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a caller-defined string token identifier.
macro_rules! token_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(token: &str) -> Self {
                Self::new(token)
            }
        }

        impl From<String> for $name {
            fn from(token: String) -> Self {
                Self(token)
            }
        }
    };
}

token_id!(
    /// Identifier of a region; shares the component namespace.
    RegionId
);
token_id!(
    /// Identifier of a compartment; shares the component namespace.
    CompartmentId
);
token_id!(
    /// Identifier of a global component; shares the component namespace.
    GlobalComponentId
);
token_id!(
    /// Identifier of a materials producer; shares the component namespace.
    MaterialsProducerId
);
token_id!(MaterialId);
token_id!(BatchId);
token_id!(StageId);
token_id!(GroupId);
token_id!(GroupTypeId);
token_id!(ResourceId);
token_id!(RandomNumberGeneratorId);
token_id!(ReportId);

token_id!(GlobalPropertyId);
token_id!(RegionPropertyId);
token_id!(CompartmentPropertyId);
token_id!(MaterialsProducerPropertyId);
token_id!(ResourcePropertyId);
token_id!(PersonPropertyId);
token_id!(GroupPropertyId);
token_id!(BatchPropertyId);

/// Dense identifier of a person. Simulations hold millions of people, so the
/// id doubles as a vector index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u32);

impl PersonId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of entity that live in the shared component namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Global,
    Region,
    Compartment,
    MaterialsProducer,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentKind::Global => "global component",
            ComponentKind::Region => "region",
            ComponentKind::Compartment => "compartment",
            ComponentKind::MaterialsProducer => "materials producer",
        };
        f.write_str(label)
    }
}

/// Any identifier from the shared component namespace.
///
/// Two components collide when their tokens are equal, whatever their kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentId {
    Global(GlobalComponentId),
    Region(RegionId),
    Compartment(CompartmentId),
    MaterialsProducer(MaterialsProducerId),
}

impl ComponentId {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentId::Global(_) => ComponentKind::Global,
            ComponentId::Region(_) => ComponentKind::Region,
            ComponentId::Compartment(_) => ComponentKind::Compartment,
            ComponentId::MaterialsProducer(_) => ComponentKind::MaterialsProducer,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            ComponentId::Global(id) => id.as_str(),
            ComponentId::Region(id) => id.as_str(),
            ComponentId::Compartment(id) => id.as_str(),
            ComponentId::MaterialsProducer(id) => id.as_str(),
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.token())
    }
}

impl From<GlobalComponentId> for ComponentId {
    fn from(id: GlobalComponentId) -> Self {
        ComponentId::Global(id)
    }
}

impl From<RegionId> for ComponentId {
    fn from(id: RegionId) -> Self {
        ComponentId::Region(id)
    }
}

impl From<CompartmentId> for ComponentId {
    fn from(id: CompartmentId) -> Self {
        ComponentId::Compartment(id)
    }
}

impl From<MaterialsProducerId> for ComponentId {
    fn from(id: MaterialsProducerId) -> Self {
        ComponentId::MaterialsProducer(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ids_serialize_transparently() {
        let region = RegionId::new("north");
        let json = serde_json::to_string(&region).unwrap();
        assert_eq!(json, "\"north\"");
        let back: RegionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn component_ids_share_tokens_across_kinds() {
        let region = ComponentId::from(RegionId::new("A"));
        let compartment = ComponentId::from(CompartmentId::new("A"));
        assert_ne!(region, compartment);
        assert_eq!(region.token(), compartment.token());
        assert_eq!(region.to_string(), "region A");
        assert_eq!(compartment.kind(), ComponentKind::Compartment);
    }

    #[test]
    fn person_id_is_a_dense_index() {
        assert_eq!(PersonId(42).index(), 42);
        assert_eq!(PersonId(7).to_string(), "7");
    }
}
