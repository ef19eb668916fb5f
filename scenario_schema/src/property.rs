use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared type of a property slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Boolean,
    Integer,
    Float,
    Text,
    /// Accepts a value of any type.
    Any,
}

impl ValueType {
    pub fn accepts(self, value: &PropertyValue) -> bool {
        self == ValueType::Any || self == value.value_type()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Text => "text",
            ValueType::Any => "any",
        };
        f.write_str(label)
    }
}

/// A concrete property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::Boolean(_) => ValueType::Boolean,
            PropertyValue::Integer(_) => ValueType::Integer,
            PropertyValue::Float(_) => ValueType::Float,
            PropertyValue::Text(_) => ValueType::Text,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(value) => write!(f, "{value}"),
            PropertyValue::Integer(value) => write!(f, "{value}"),
            PropertyValue::Float(value) => write!(f, "{value}"),
            PropertyValue::Text(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(value as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyDefinitionError {
    #[error("default value of type {actual} is not assignable to {expected}")]
    IncompatibleDefault {
        expected: ValueType,
        actual: ValueType,
    },
    #[error("default value {0} is not finite")]
    NonFiniteDefault(f64),
}

/// Typed schema slot that every assignment to a property must conform to.
///
/// Definitions start out mutable; call [`PropertyDefinition::immutable`] for
/// values that may only be set while building a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPropertyDefinition")]
pub struct PropertyDefinition {
    value_type: ValueType,
    default_value: Option<PropertyValue>,
    mutable: bool,
}

/// Unchecked wire form of [`PropertyDefinition`].
#[derive(Deserialize)]
struct RawPropertyDefinition {
    value_type: ValueType,
    #[serde(default)]
    default_value: Option<PropertyValue>,
    #[serde(default = "mutable_by_default")]
    mutable: bool,
}

fn mutable_by_default() -> bool {
    true
}

impl TryFrom<RawPropertyDefinition> for PropertyDefinition {
    type Error = PropertyDefinitionError;

    fn try_from(raw: RawPropertyDefinition) -> Result<Self, Self::Error> {
        let mut definition = match raw.default_value {
            Some(default_value) => PropertyDefinition::with_default(raw.value_type, default_value)?,
            None => PropertyDefinition::new(raw.value_type),
        };
        definition.mutable = raw.mutable;
        Ok(definition)
    }
}

impl PropertyDefinition {
    /// A mutable definition with no default value.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            default_value: None,
            mutable: true,
        }
    }

    pub fn with_default(
        value_type: ValueType,
        default_value: impl Into<PropertyValue>,
    ) -> Result<Self, PropertyDefinitionError> {
        let default_value = default_value.into();
        if let PropertyValue::Float(value) = &default_value {
            if !value.is_finite() {
                return Err(PropertyDefinitionError::NonFiniteDefault(*value));
            }
        }
        if !value_type.accepts(&default_value) {
            return Err(PropertyDefinitionError::IncompatibleDefault {
                expected: value_type,
                actual: default_value.value_type(),
            });
        }
        Ok(Self {
            value_type,
            default_value: Some(default_value),
            mutable: true,
        })
    }

    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn default_value(&self) -> Option<&PropertyValue> {
        self.default_value.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn accepts(&self, value: &PropertyValue) -> bool {
        self.value_type.accepts(value)
    }
}
