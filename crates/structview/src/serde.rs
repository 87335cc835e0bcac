//! JSON shapes for project files and decoded output.
//!
//! Project files are written by the structure editor as
//! `{ "mainStructure": [...], "substructures": [...], "version": "..." }`.
//! These types mirror that layout and are converted into the core types
//! ([crate::project::Project], [crate::field::FieldDescriptor], ...). Nothing
//! beyond deserialization is checked.

use serde::{Deserialize, Serialize};

use crate::{decoded::DecodedField, value::Value};

/// Whole project file.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDef {
    /// Top-level structure, either a bare field list or `{ "fields": [...] }`.
    #[serde(default)]
    pub main_structure: StructureDef,
    #[serde(default)]
    pub substructures: Vec<SubstructureDef>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum StructureDef {
    Fields(Vec<FieldDef>),
    Wrapped { fields: Vec<FieldDef> },
}

impl Default for StructureDef {
    fn default() -> Self {
        StructureDef::Fields(Vec::new())
    }
}

impl StructureDef {
    pub fn into_fields(self) -> Vec<FieldDef> {
        match self {
            StructureDef::Fields(fields) | StructureDef::Wrapped { fields } => fields,
        }
    }
}

/// A reusable template.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubstructureDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// One field descriptor as stored in the project file.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: KindDef,
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub length_ref: Option<String>,
    #[serde(default)]
    pub endianness: EndiannessDef,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub repeats: Option<u64>,
    #[serde(default)]
    pub repeat_ref: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<FieldDef>>,
    #[serde(default)]
    pub substructure_ref: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub value_map: Vec<ValueMapDef>,
    #[serde(default)]
    pub bit_descriptions: Vec<BitDescriptionDef>,
}

/// Field type name.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum KindDef {
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Bytes,
    Struct,
    Script,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum EndiannessDef {
    #[default]
    Big,
    Little,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ValueMapDef {
    pub value: serde_json::Value,
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BitDescriptionDef {
    pub bit_index: u32,
    #[serde(default)]
    pub set_description: Option<String>,
    #[serde(default)]
    pub unset_description: Option<String>,
}

/// Converts a JSON value into a [Value]. Integers that fit `i64` become
/// plain numbers; objects are kept as their JSON text.
pub fn value_from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(v), _) => Value::Int(v),
            (None, Some(v)) => Value::BigUint(v),
            _ => n.as_f64().map_or(Value::Null, Value::Float),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(values) => {
            Value::Array(values.into_iter().map(value_from_json).collect())
        }
        object @ serde_json::Value::Object(_) => Value::String(object.to_string()),
    }
}

/// Converts a [Value] into JSON. Raw bytes become a hex dump; non-finite
/// floats become `null`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(v) | Value::BigInt(v) => serde_json::Value::from(*v),
        Value::BigUint(v) => serde_json::Value::from(*v),
        Value::Float(v) => serde_json::Number::from_f64(*v)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(_) => serde_json::Value::String(value.to_string()),
        Value::Array(values) => serde_json::Value::Array(values.iter().map(value_to_json).collect()),
    }
}

/// Serializable view of a decoded field.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecodedFieldOut {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub offset: u64,
    pub length: u64,
    pub value: serde_json::Value,
    /// Raw bytes as a hex dump.
    pub raw_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DecodedFieldOut>>,
}

impl From<&DecodedField> for DecodedFieldOut {
    fn from(field: &DecodedField) -> Self {
        DecodedFieldOut {
            id: field.definition.id.clone(),
            name: field.definition.name.clone(),
            kind: field.definition.kind.name(),
            offset: field.offset,
            length: field.length,
            value: value_to_json(&field.value),
            raw_value: crate::value::hex_dump(&field.raw),
            children: field
                .children
                .as_ref()
                .map(|children| children.iter().map(DecodedFieldOut::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_json() {
        assert_eq!(value_from_json(serde_json::json!(5)), Value::Int(5));
        assert_eq!(value_from_json(serde_json::json!(u64::MAX)), Value::BigUint(u64::MAX));
        assert_eq!(value_from_json(serde_json::json!(1.5)), Value::Float(1.5));
        assert_eq!(value_from_json(serde_json::json!("PK")), Value::String("PK".into()));
        assert_eq!(value_from_json(serde_json::json!(null)), Value::Null);
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(value_to_json(&Value::Int(-3)), serde_json::json!(-3));
        assert_eq!(value_to_json(&Value::Bytes(vec![0xab, 0x01])), serde_json::json!("ab 01"));
        assert_eq!(value_to_json(&Value::Float(f64::NAN)), serde_json::Value::Null);
        assert_eq!(
            value_to_json(&Value::Array(vec![Value::Null, Value::Bool(true)])),
            serde_json::json!([null, true])
        );
    }

    #[test]
    fn test_structure_shapes() {
        let bare: ProjectDef =
            serde_json::from_str(r#"{"mainStructure": [{"id": "a", "type": "uint8"}]}"#).unwrap();
        let wrapped: ProjectDef = serde_json::from_str(
            r#"{"mainStructure": {"fields": [{"id": "a", "type": "uint8"}]}, "version": "2"}"#,
        )
        .unwrap();

        assert_eq!(bare.main_structure.into_fields().len(), 1);
        assert_eq!(wrapped.main_structure.into_fields().len(), 1);
        assert_eq!(wrapped.version.as_deref(), Some("2"));
    }
}
