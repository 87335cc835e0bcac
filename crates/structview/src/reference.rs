//! Flat index of already-decoded sibling fields.
//!
//! One index is built per field-list scope: the top-level structure, each
//! substructure expansion, and each inline-nested field list. Fields inside
//! one scope cannot see fields of another.

use std::collections::HashMap;

use crate::decoded::DecodedField;

/// Decoded fields by id, filled in decode order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceIndex {
    fields: HashMap<String, DecodedField>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a decoded field under its id. A later field with the
    /// same id replaces the earlier one.
    pub fn insert(&mut self, field: DecodedField) {
        self.fields.insert(field.definition.id.clone(), field);
    }

    pub fn get(&self, id: &str) -> Option<&DecodedField> {
        self.fields.get(id)
    }

    /// Resolves a reference to a non-negative integer.
    ///
    /// Missing ids and non-numeric values resolve to `None`, which callers
    /// treat as "no override".
    pub fn resolve_count(&self, id: Option<&str>) -> Option<u64> {
        self.get(id?)?.value.as_count()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::FieldDescriptor, kind::FieldKind, value::Value};

    fn decoded(id: &str, value: Value) -> DecodedField {
        DecodedField {
            value,
            ..DecodedField::empty(FieldDescriptor::new(id, FieldKind::Uint8), 0)
        }
    }

    #[test]
    fn test_resolve_count() {
        let mut index = ReferenceIndex::new();
        index.insert(decoded("len", Value::Int(5)));
        index.insert(decoded("name", Value::String("x".into())));
        index.insert(decoded("neg", Value::Int(-2)));

        assert_eq!(index.resolve_count(Some("len")), Some(5));
        assert_eq!(index.resolve_count(Some("name")), None);
        assert_eq!(index.resolve_count(Some("neg")), None);
        assert_eq!(index.resolve_count(Some("missing")), None);
        assert_eq!(index.resolve_count(None), None);
        assert_eq!(index.len(), 3);
    }
}
