// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-Cadence encoding for script arguments and results.
//!
//! Arguments are sent to the access node as JSON-Cadence values
//! (`{"type":"String","value":"..."}`). Results come back in the same
//! format and are flattened into plain JSON so callers can deserialize them
//! into their own types with serde.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::types::Address;
use crate::error::ClientError;

/// Typed argument of a script or transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CadenceArg {
    Address(Address),
    String(String),
}

impl CadenceArg {
    pub fn to_cadence(&self) -> CadenceValue {
        match self {
            CadenceArg::Address(addr) => CadenceValue::Address(addr.to_string()),
            CadenceArg::String(s) => CadenceValue::String(s.clone()),
        }
    }

    /// Serialized JSON-Cadence bytes for the access node.
    pub fn encode(&self) -> Result<Vec<u8>, ClientError> {
        serde_json::to_vec(&self.to_cadence()).map_err(|e| ClientError::Decode(e.to_string()))
    }
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
}

/// Key/value pair of a Cadence dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub key: CadenceValue,
    pub value: CadenceValue,
}

/// Struct, resource, event, contract or enum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    /// Fully qualified type id, e.g. `A.ba1132bc08f82fe2.Profile.ReadOnly`
    pub id: String,
    pub fields: Vec<CompositeField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeField {
    pub name: String,
    pub value: CadenceValue,
}

impl CadenceValue {
    /// Parse a JSON-Cadence document.
    pub fn decode(bytes: &[u8]) -> Result<Self, ClientError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ClientError::Decode(format!("invalid JSON-Cadence value: {e}")))
    }

    /// Flatten into plain JSON.
    ///
    /// `Void` and empty optionals become `null`, composites become objects
    /// keyed by field name, integers up to 64 bits become JSON numbers and
    /// everything wider (and fixed-point values) stays a string.
    pub fn to_json(&self) -> Value {
        match self {
            CadenceValue::Void | CadenceValue::Optional(None) => Value::Null,
            CadenceValue::Optional(Some(inner)) => inner.to_json(),
            CadenceValue::Bool(b) => Value::Bool(*b),
            CadenceValue::String(s)
            | CadenceValue::Character(s)
            | CadenceValue::Address(s)
            | CadenceValue::Fix64(s)
            | CadenceValue::UFix64(s)
            | CadenceValue::Int(s)
            | CadenceValue::UInt(s)
            | CadenceValue::Int128(s)
            | CadenceValue::Int256(s)
            | CadenceValue::UInt128(s)
            | CadenceValue::UInt256(s) => Value::String(s.clone()),
            CadenceValue::Int8(s)
            | CadenceValue::Int16(s)
            | CadenceValue::Int32(s)
            | CadenceValue::Int64(s) => s
                .parse::<i64>()
                .map(|n| Value::Number(Number::from(n)))
                .unwrap_or_else(|_| Value::String(s.clone())),
            CadenceValue::UInt8(s)
            | CadenceValue::UInt16(s)
            | CadenceValue::UInt32(s)
            | CadenceValue::UInt64(s)
            | CadenceValue::Word8(s)
            | CadenceValue::Word16(s)
            | CadenceValue::Word32(s)
            | CadenceValue::Word64(s) => s
                .parse::<u64>()
                .map(|n| Value::Number(Number::from(n)))
                .unwrap_or_else(|_| Value::String(s.clone())),
            CadenceValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            CadenceValue::Dictionary(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|entry| (entry.key.key_string(), entry.value.to_json()))
                    .collect();
                Value::Object(map)
            }
            CadenceValue::Struct(composite)
            | CadenceValue::Resource(composite)
            | CadenceValue::Event(composite)
            | CadenceValue::Contract(composite)
            | CadenceValue::Enum(composite) => {
                let map: Map<String, Value> = composite
                    .fields
                    .iter()
                    .map(|field| (field.name.clone(), field.value.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }

    fn key_string(&self) -> String {
        match self.to_json() {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_arguments_as_json_cadence() {
        let addr = CadenceArg::Address(Address::from("0x01"));
        let encoded: Value = serde_json::from_slice(&addr.encode().unwrap()).unwrap();
        assert_eq!(encoded, json!({"type": "Address", "value": "0x0000000000000001"}));

        let name = CadenceArg::String("Ada".to_string());
        let encoded: Value = serde_json::from_slice(&name.encode().unwrap()).unwrap();
        assert_eq!(encoded, json!({"type": "String", "value": "Ada"}));
    }

    #[test]
    fn decodes_optional_profile_struct() {
        let raw = json!({
            "type": "Optional",
            "value": {
                "type": "Struct",
                "value": {
                    "id": "A.f8d6e0586b0a20c7.Profile.ReadOnly",
                    "fields": [
                        {"name": "address", "value": {"type": "Address", "value": "0xf8d6e0586b0a20c7"}},
                        {"name": "name", "value": {"type": "String", "value": "a"}},
                        {"name": "color", "value": {"type": "String", "value": "b"}},
                        {"name": "info", "value": {"type": "String", "value": "c"}}
                    ]
                }
            }
        });
        let value = CadenceValue::decode(raw.to_string().as_bytes()).unwrap();
        assert_eq!(
            value.to_json(),
            json!({"address": "0xf8d6e0586b0a20c7", "name": "a", "color": "b", "info": "c"})
        );
    }

    #[test]
    fn empty_optional_and_void_are_null() {
        let none = CadenceValue::decode(br#"{"type":"Optional","value":null}"#).unwrap();
        assert_eq!(none, CadenceValue::Optional(None));
        assert_eq!(none.to_json(), Value::Null);

        let void = CadenceValue::decode(br#"{"type":"Void"}"#).unwrap();
        assert_eq!(void.to_json(), Value::Null);
    }

    #[test]
    fn numbers_and_collections() {
        let raw = json!({
            "type": "Dictionary",
            "value": [
                {"key": {"type": "String", "value": "count"}, "value": {"type": "UInt64", "value": "7"}},
                {"key": {"type": "Int8", "value": "-1"}, "value": {"type": "Array", "value": [
                    {"type": "Bool", "value": true},
                    {"type": "UFix64", "value": "1.50000000"},
                    {"type": "UInt256", "value": "115792089237316195423570985008687907853269984665640564039457584007913129639935"}
                ]}}
            ]
        });
        let value = CadenceValue::decode(raw.to_string().as_bytes()).unwrap();
        assert_eq!(
            value.to_json(),
            json!({
                "count": 7,
                "-1": [true, "1.50000000", "115792089237316195423570985008687907853269984665640564039457584007913129639935"]
            })
        );
    }

    #[test]
    fn rejects_unknown_types() {
        let err = CadenceValue::decode(br#"{"type":"Capability","value":{}}"#).unwrap_err();
        assert_eq!(err.error_code(), "decode_error");
    }
}
