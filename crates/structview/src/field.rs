//! Field descriptors, substructure templates, and the substructure catalog.

use std::collections::HashMap;

use crate::{
    kind::{Endianness, FieldKind},
    value::Value,
};

/// A single user-authored field in a structure definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDescriptor {
    /// Unique id; the key other fields use to reference this one.
    pub id: String,
    /// Display label.
    pub name: String,
    pub kind: FieldKind,
    /// Fixed byte length.
    pub length: Option<u64>,
    /// Id of an earlier sibling whose numeric value supplies the length.
    pub length_ref: Option<String>,
    pub endianness: Endianness,
    /// Absolute offset overriding sequential positioning.
    pub offset: Option<u64>,
    /// Static repeat count.
    pub repeats: Option<u64>,
    /// Id of an earlier sibling whose numeric value supplies the repeat count.
    pub repeat_ref: Option<String>,
    /// Inline nested fields (legacy nesting, only for `struct`).
    pub children: Option<Vec<FieldDescriptor>>,
    /// Id of a template in the [SubstructureCatalog] (only for `struct`).
    pub substructure_ref: Option<String>,
    /// Script strategy name (only for `script`).
    pub script: Option<String>,
    pub value_map: Vec<ValueMapEntry>,
    pub bit_descriptions: Vec<BitDescription>,
}

impl FieldDescriptor {
    /// Creates a descriptor with the given id and kind; the name defaults to the id.
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            ..Default::default()
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_length(&mut self, length: u64) -> &mut Self {
        self.length = Some(length);
        self
    }

    pub fn set_length_ref(&mut self, id: impl Into<String>) -> &mut Self {
        self.length_ref = Some(id.into());
        self
    }

    pub fn set_endianness(&mut self, endianness: Endianness) -> &mut Self {
        self.endianness = endianness;
        self
    }

    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn set_repeats(&mut self, repeats: u64) -> &mut Self {
        self.repeats = Some(repeats);
        self
    }

    pub fn set_repeat_ref(&mut self, id: impl Into<String>) -> &mut Self {
        self.repeat_ref = Some(id.into());
        self
    }

    pub fn set_children(&mut self, children: Vec<FieldDescriptor>) -> &mut Self {
        self.children = Some(children);
        self
    }

    pub fn set_substructure_ref(&mut self, id: impl Into<String>) -> &mut Self {
        self.substructure_ref = Some(id.into());
        self
    }

    pub fn set_script(&mut self, script: impl Into<String>) -> &mut Self {
        self.script = Some(script.into());
        self
    }

    pub fn add_value_mapping(&mut self, value: Value, description: impl Into<String>) -> &mut Self {
        self.value_map.push(ValueMapEntry {
            value,
            description: description.into(),
        });
        self
    }

    pub fn add_bit_description(&mut self, description: BitDescription) -> &mut Self {
        self.bit_descriptions.push(description);
        self
    }

    /// Copy used for one element of a repeated field: repeat settings and
    /// the explicit offset cleared (the parent already resolved where the
    /// run starts) and the id suffixed with the element index.
    pub(crate) fn repeat_instance(&self, index: u64) -> Self {
        Self {
            id: format!("{}[{}]", self.id, index),
            offset: None,
            repeats: None,
            repeat_ref: None,
            ..self.clone()
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::FieldDef> for FieldDescriptor {
    fn from(value: crate::serde::FieldDef) -> Self {
        // The editor stores cleared references as empty strings.
        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

        FieldDescriptor {
            name: if value.name.is_empty() {
                value.id.clone()
            } else {
                value.name
            },
            id: value.id,
            kind: value.kind.into(),
            length: value.length,
            length_ref: non_empty(value.length_ref),
            endianness: value.endianness.into(),
            offset: value.offset,
            repeats: value.repeats,
            repeat_ref: non_empty(value.repeat_ref),
            children: value
                .children
                .map(|children| children.into_iter().map(Into::into).collect()),
            substructure_ref: non_empty(value.substructure_ref),
            script: value.script,
            value_map: value.value_map.into_iter().map(Into::into).collect(),
            bit_descriptions: value.bit_descriptions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Maps an exact raw value to a description.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMapEntry {
    pub value: Value,
    pub description: String,
}

/// Labels shown when a given bit of a numeric value is set or unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitDescription {
    pub bit_index: u32,
    pub set_description: Option<String>,
    pub unset_description: Option<String>,
}

impl BitDescription {
    pub fn new(bit_index: u32) -> Self {
        Self {
            bit_index,
            ..Default::default()
        }
    }

    pub fn set(mut self, label: impl Into<String>) -> Self {
        self.set_description = Some(label.into());
        self
    }

    pub fn unset(mut self, label: impl Into<String>) -> Self {
        self.unset_description = Some(label.into());
        self
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::ValueMapDef> for ValueMapEntry {
    fn from(value: crate::serde::ValueMapDef) -> Self {
        ValueMapEntry {
            value: crate::serde::value_from_json(value.value),
            description: value.description,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::BitDescriptionDef> for BitDescription {
    fn from(value: crate::serde::BitDescriptionDef) -> Self {
        BitDescription {
            bit_index: value.bit_index,
            set_description: value.set_description,
            unset_description: value.unset_description,
        }
    }
}

/// A named, reusable field list referenced by id from `struct` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstructureTemplate {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl SubstructureTemplate {
    pub fn new(id: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            fields,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::SubstructureDef> for SubstructureTemplate {
    fn from(value: crate::serde::SubstructureDef) -> Self {
        SubstructureTemplate {
            name: if value.name.is_empty() {
                value.id.clone()
            } else {
                value.name
            },
            id: value.id,
            fields: value.fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Substructure templates indexed by id.
#[derive(Debug, Clone, Default)]
pub struct SubstructureCatalog {
    templates: HashMap<String, SubstructureTemplate>,
}

impl SubstructureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, replacing any existing one with the same id.
    pub fn insert(&mut self, template: SubstructureTemplate) -> &mut Self {
        self.templates.insert(template.id.clone(), template);
        self
    }

    pub fn get(&self, id: &str) -> Option<&SubstructureTemplate> {
        self.templates.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl FromIterator<SubstructureTemplate> for SubstructureCatalog {
    fn from_iter<T: IntoIterator<Item = SubstructureTemplate>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for template in iter {
            catalog.insert(template);
        }
        catalog
    }
}
