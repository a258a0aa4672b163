//! JSON-Cadence interchange values.
//!
//! Script arguments, script results and event payloads all travel as
//! JSON-Cadence documents of the form `{"type": "...", "value": ...}`.
//! Numbers are always encoded as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sdk::types::{FlowAddress, UFix64};

/// Errors produced while encoding or inspecting Cadence values.
#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("invalid JSON-Cadence: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected Cadence {expected}, found {actual}")]
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("composite has no field named '{0}'")]
    MissingField(String),

    #[error("invalid Cadence value: {0}")]
    Invalid(String),
}

/// A JSON-Cadence value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CadenceValue {
    Void,
    Optional(Option<Box<CadenceValue>>),
    Bool(bool),
    String(String),
    Character(String),
    Address(String),
    Int(String),
    Int8(String),
    Int16(String),
    Int32(String),
    Int64(String),
    Int128(String),
    Int256(String),
    UInt(String),
    UInt8(String),
    UInt16(String),
    UInt32(String),
    UInt64(String),
    UInt128(String),
    UInt256(String),
    Word8(String),
    Word16(String),
    Word32(String),
    Word64(String),
    Fix64(String),
    UFix64(String),
    Array(Vec<CadenceValue>),
    Dictionary(Vec<DictionaryEntry>),
    Struct(Composite),
    Resource(Composite),
    Event(Composite),
    Contract(Composite),
    Enum(Composite),
    Path(PathValue),
    Type(TypeValue),
    Capability(serde_json::Value),
}

/// Key/value pair of a Cadence dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub key: CadenceValue,
    pub value: CadenceValue,
}

/// Struct, resource, event, contract and enum payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    pub id: String,
    pub fields: Vec<CompositeField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeField {
    pub name: String,
    pub value: CadenceValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValue {
    pub domain: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeValue {
    #[serde(rename = "staticType")]
    pub static_type: serde_json::Value,
}

impl Composite {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&CadenceValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

impl CadenceValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn uint8(value: u8) -> Self {
        Self::UInt8(value.to_string())
    }

    pub fn int(value: i64) -> Self {
        Self::Int(value.to_string())
    }

    pub fn ufix64(value: UFix64) -> Self {
        Self::UFix64(value.to_string())
    }

    pub fn address(value: FlowAddress) -> Self {
        Self::Address(value.to_string())
    }

    pub fn bool(value: bool) -> Self {
        Self::Bool(value)
    }

    pub fn array(values: impl IntoIterator<Item = CadenceValue>) -> Self {
        Self::Array(values.into_iter().collect())
    }

    /// Encode to JSON-Cadence bytes.
    pub fn encode(&self) -> Result<Vec<u8>, CadenceError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode JSON-Cadence bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CadenceError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Name of the Cadence type carried by this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Optional(_) => "Optional",
            Self::Bool(_) => "Bool",
            Self::String(_) => "String",
            Self::Character(_) => "Character",
            Self::Address(_) => "Address",
            Self::Int(_) => "Int",
            Self::Int8(_) => "Int8",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Int128(_) => "Int128",
            Self::Int256(_) => "Int256",
            Self::UInt(_) => "UInt",
            Self::UInt8(_) => "UInt8",
            Self::UInt16(_) => "UInt16",
            Self::UInt32(_) => "UInt32",
            Self::UInt64(_) => "UInt64",
            Self::UInt128(_) => "UInt128",
            Self::UInt256(_) => "UInt256",
            Self::Word8(_) => "Word8",
            Self::Word16(_) => "Word16",
            Self::Word32(_) => "Word32",
            Self::Word64(_) => "Word64",
            Self::Fix64(_) => "Fix64",
            Self::UFix64(_) => "UFix64",
            Self::Array(_) => "Array",
            Self::Dictionary(_) => "Dictionary",
            Self::Struct(_) => "Struct",
            Self::Resource(_) => "Resource",
            Self::Event(_) => "Event",
            Self::Contract(_) => "Contract",
            Self::Enum(_) => "Enum",
            Self::Path(_) => "Path",
            Self::Type(_) => "Type",
            Self::Capability(_) => "Capability",
        }
    }

    /// Composite payload of struct-like values.
    pub fn composite(&self) -> Option<&Composite> {
        match self {
            Self::Struct(c) | Self::Resource(c) | Self::Event(c) | Self::Contract(c) | Self::Enum(c) => {
                Some(c)
            }
            _ => None,
        }
    }

    /// Field of a composite value, failing when absent or not a composite.
    pub fn field(&self, name: &str) -> Result<&CadenceValue, CadenceError> {
        let composite = self.composite().ok_or(CadenceError::UnexpectedType {
            expected: "composite",
            actual: self.type_name(),
        })?;
        composite
            .field(name)
            .ok_or_else(|| CadenceError::MissingField(name.to_string()))
    }

    /// Strip any number of `Optional` wrappers.
    pub fn unwrap_optional(&self) -> Option<&CadenceValue> {
        match self {
            Self::Optional(Some(inner)) => inner.unwrap_optional(),
            Self::Optional(None) => None,
            other => Some(other),
        }
    }

    pub fn as_str(&self) -> Result<&str, CadenceError> {
        match self {
            Self::String(s) | Self::Character(s) => Ok(s),
            other => Err(CadenceError::UnexpectedType {
                expected: "String",
                actual: other.type_name(),
            }),
        }
    }

    pub fn as_bool(&self) -> Result<bool, CadenceError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(CadenceError::UnexpectedType {
                expected: "Bool",
                actual: other.type_name(),
            }),
        }
    }

    pub fn as_address(&self) -> Result<FlowAddress, CadenceError> {
        match self {
            Self::Address(s) => s
                .parse()
                .map_err(|e| CadenceError::Invalid(format!("address '{}': {}", s, e))),
            other => Err(CadenceError::UnexpectedType {
                expected: "Address",
                actual: other.type_name(),
            }),
        }
    }

    pub fn as_ufix64(&self) -> Result<UFix64, CadenceError> {
        match self {
            Self::UFix64(s) => s
                .parse()
                .map_err(|e| CadenceError::Invalid(format!("UFix64 '{}': {}", s, e))),
            other => Err(CadenceError::UnexpectedType {
                expected: "UFix64",
                actual: other.type_name(),
            }),
        }
    }

    pub fn as_array(&self) -> Result<&[CadenceValue], CadenceError> {
        match self {
            Self::Array(values) => Ok(values),
            other => Err(CadenceError::UnexpectedType {
                expected: "Array",
                actual: other.type_name(),
            }),
        }
    }
}
