//! Core shared types and identifiers

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::{SharedError, SharedResult};

/// Default field used to correlate input tokens with ranking records
pub const DEFAULT_IDENTIFIER_FIELD: &str = "tokenID";

/// Caller-designated token identifier
///
/// Equality is by value with an exact type match, so `Int(1)` and `Text("1")`
/// identify different tokens. Integers take the narrowest variant that holds
/// them exactly; anything wider than `u64` (on-chain `uint256` ids) keeps its
/// decimal digits in `Big`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenId {
    Int(i64),
    UInt(u64),
    Big(String),
    Text(String),
}

impl TokenId {
    /// Convert a JSON value into an identifier
    pub fn from_value(value: &Value) -> SharedResult<Self> {
        match value {
            Value::Number(number) => Self::from_number(number),
            Value::String(text) => Ok(TokenId::Text(text.clone())),
            other => Err(SharedError::InvalidTokenId { value: other.to_string() }),
        }
    }

    fn from_number(number: &Number) -> SharedResult<Self> {
        if let Some(id) = number.as_i64() {
            return Ok(TokenId::Int(id));
        }
        if let Some(id) = number.as_u64() {
            return Ok(TokenId::UInt(id));
        }

        let digits = number.to_string();
        let magnitude = digits.strip_prefix('-').unwrap_or(&digits);
        if !magnitude.is_empty() && magnitude.bytes().all(|b| b.is_ascii_digit()) {
            Ok(TokenId::Big(digits))
        } else {
            Err(SharedError::InvalidTokenId { value: digits })
        }
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TokenId::Int(id) => serializer.serialize_i64(*id),
            TokenId::UInt(id) => serializer.serialize_u64(*id),
            TokenId::Big(digits) => Number::from_str(digits)
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
            TokenId::Text(id) => serializer.serialize_str(id),
        }
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        TokenId::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Int(id) => write!(f, "{id}"),
            TokenId::UInt(id) => write!(f, "{id}"),
            TokenId::Big(digits) => f.write_str(digits),
            TokenId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for TokenId {
    fn from(id: i64) -> Self {
        TokenId::Int(id)
    }
}

impl From<u64> for TokenId {
    fn from(id: u64) -> Self {
        i64::try_from(id).map_or(TokenId::UInt(id), TokenId::Int)
    }
}

impl From<&str> for TokenId {
    fn from(id: &str) -> Self {
        TokenId::Text(id.to_string())
    }
}

impl From<String> for TokenId {
    fn from(id: String) -> Self {
        TokenId::Text(id)
    }
}

/// A single (trait name, trait value) pair from token metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenAttribute {
    pub trait_type: String,
    pub value: Value,
}

impl TokenAttribute {
    pub fn new(trait_type: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

/// Token metadata as supplied by the caller
///
/// Everything except `attributes` is kept verbatim in `fields`, including the
/// identifier field, whose name the caller chooses per request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub attributes: Vec<TokenAttribute>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TokenMetadata {
    /// Build metadata with a single identifier field
    pub fn new(identifier_field: &str, id: impl Into<Value>, attributes: Vec<TokenAttribute>) -> Self {
        let mut fields = Map::new();
        fields.insert(identifier_field.to_string(), id.into());
        Self { attributes, fields }
    }

    /// Parse one token document
    pub fn from_json_str(text: &str) -> SharedResult<Self> {
        serde_json::from_str(text).map_err(|e| SharedError::Deserialization { message: e.to_string() })
    }

    /// Identifier stored under `field`, if present and usable
    pub fn identifier(&self, field: &str) -> Option<TokenId> {
        self.fields.get(field).and_then(|value| TokenId::from_value(value).ok())
    }

    /// Attributes collected into a mapping; a repeated trait name keeps its last value
    pub fn trait_map(&self) -> BTreeMap<String, Value> {
        self.attributes
            .iter()
            .map(|attribute| (attribute.trait_type.clone(), attribute.value.clone()))
            .collect()
    }
}

/// One entry of a computed ranking (rank 1 = rarest)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    #[serde(rename = "tokenID")]
    pub token_id: TokenId,
    pub rank: u32,
    pub score: f64,
}

/// Lifecycle of the embedded ranking runtime
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeStatus {
    #[default]
    #[serde(rename = "INIT")]
    Uninitialized,
    Loading,
    Ready,
    Error,
}

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuntimeStatus::Uninitialized => "INIT",
            RuntimeStatus::Loading => "LOADING",
            RuntimeStatus::Ready => "READY",
            RuntimeStatus::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Service component emitting a log event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    Checker,
    Gateway,
    Runtime,
    Installer,
    Metadata,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Checker => "checker",
            Component::Gateway => "gateway",
            Component::Runtime => "runtime",
            Component::Installer => "installer",
            Component::Metadata => "metadata",
        };
        f.write_str(name)
    }
}
