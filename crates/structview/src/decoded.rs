//! Decoded output tree.

use crate::{field::FieldDescriptor, reference::ReferenceIndex, value::Value};

/// The result of applying one [FieldDescriptor] to the source at a resolved offset.
///
/// `offset` and `length` always describe the intended span, even when the
/// value is null: for a field cut short by the end of the data, `length` is
/// the requested length and `raw` holds only the bytes that were available.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub definition: FieldDescriptor,
    pub value: Value,
    /// Bytes actually read for this field.
    pub raw: Vec<u8>,
    /// Absolute start in the source.
    pub offset: u64,
    pub length: u64,
    /// Present for substructure, repeated, and inline-nested results.
    pub children: Option<Vec<DecodedField>>,
}

impl DecodedField {
    /// A null-valued field with no bytes.
    pub fn empty(definition: FieldDescriptor, offset: u64) -> Self {
        Self {
            definition,
            value: Value::Null,
            raw: Vec::new(),
            offset,
            length: 0,
            children: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// First offset after this field.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.offset && offset < self.end()
    }

    /// The deepest field in this subtree whose span covers `offset`.
    pub fn field_at(&self, offset: u64) -> Option<&DecodedField> {
        if !self.contains(offset) {
            return None;
        }
        self.children
            .iter()
            .flatten()
            .find_map(|child| child.field_at(offset))
            .or(Some(self))
    }
}

/// Output of a top-level decode pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedStructure {
    /// One entry per top-level descriptor, fewer if the data ended early.
    pub fields: Vec<DecodedField>,
    /// Top-level fields by id.
    pub index: ReferenceIndex,
}

impl DecodedStructure {
    /// The deepest decoded field covering `offset`, for mapping a hex-view
    /// position back onto the structure tree.
    pub fn field_at(&self, offset: u64) -> Option<&DecodedField> {
        self.fields.iter().rev().find_map(|f| f.field_at(offset))
    }

    pub fn get(&self, id: &str) -> Option<&DecodedField> {
        self.index.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::FieldKind;

    fn leaf(id: &str, offset: u64, length: u64) -> DecodedField {
        DecodedField {
            length,
            ..DecodedField::empty(FieldDescriptor::new(id, FieldKind::Uint8), offset)
        }
    }

    #[test]
    fn test_field_at_prefers_deepest() {
        let mut parent = leaf("parent", 2, 4);
        parent.children = Some(vec![leaf("a", 2, 2), leaf("b", 4, 2)]);

        assert_eq!(parent.field_at(3).map(DecodedField::id), Some("a"));
        assert_eq!(parent.field_at(5).map(DecodedField::id), Some("b"));
        assert!(parent.field_at(6).is_none());
        assert!(parent.field_at(1).is_none());
    }

    #[test]
    fn test_zero_length_contains_nothing() {
        let field = leaf("eof", 10, 0);
        assert_eq!(field.end(), 10);
        assert!(!field.contains(10));
    }
}
