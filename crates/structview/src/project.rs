//! A structure definition together with its substructure catalog.

use crate::field::{FieldDescriptor, SubstructureCatalog};

/// Everything needed to decode a file: the top-level field list and the
/// templates it references.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub main_structure: Vec<FieldDescriptor>,
    pub substructures: SubstructureCatalog,
    /// Format version as written by the editor; carried through unchecked.
    pub version: Option<String>,
}

impl Project {
    pub fn new(main_structure: Vec<FieldDescriptor>, substructures: SubstructureCatalog) -> Self {
        Self {
            main_structure,
            substructures,
            version: None,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::ProjectDef> for Project {
    fn from(value: crate::serde::ProjectDef) -> Self {
        Project {
            main_structure: value
                .main_structure
                .into_fields()
                .into_iter()
                .map(Into::into)
                .collect(),
            substructures: value.substructures.into_iter().map(Into::into).collect(),
            version: value.version,
        }
    }
}

#[cfg(feature = "serde")]
impl Project {
    /// Parses a project from its JSON text.
    ///
    /// # Errors
    /// Returns [crate::errors::ProjectError::Json] if the text is not a
    /// project file.
    pub fn from_json(json: &str) -> Result<Self, crate::errors::ProjectError> {
        let def: crate::serde::ProjectDef = serde_json::from_str(json)?;
        Ok(def.into())
    }

    /// Reads and parses a project file.
    ///
    /// Blocks the calling thread; inside a runtime use [Project::open].
    ///
    /// # Errors
    /// Returns an I/O or JSON error.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, crate::errors::ProjectError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reads and parses a project file through tokio's file API.
    ///
    /// # Errors
    /// Returns an I/O or JSON error.
    #[cfg(feature = "fs")]
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self, crate::errors::ProjectError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::{
        kind::{Endianness, FieldKind},
        value::Value,
    };

    const PROJECT: &str = r#"{
        "version": "1.2",
        "mainStructure": [
            { "id": "magic", "name": "Magic", "type": "uint16", "endianness": "little",
              "valueMap": [{ "value": 23117, "description": "MZ" }] },
            { "id": "count", "type": "uint8", "lengthRef": "" },
            { "id": "entries", "type": "struct", "substructureRef": "entry", "repeatRef": "count" },
            { "id": "flags", "type": "uint8",
              "bitDescriptions": [{ "bitIndex": 0, "setDescription": "on", "unsetDescription": "off" }] }
        ],
        "substructures": [
            { "id": "entry", "name": "Entry", "fields": [{ "id": "tag", "type": "uint8" }] }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let project = Project::from_json(PROJECT).unwrap();

        assert_eq!(project.version.as_deref(), Some("1.2"));
        assert_eq!(project.main_structure.len(), 4);

        let magic = &project.main_structure[0];
        assert_eq!(magic.name, "Magic");
        assert_eq!(magic.kind, FieldKind::Uint16);
        assert_eq!(magic.endianness, Endianness::Little);
        assert_eq!(magic.value_map[0].value, Value::Int(23117));

        let count = &project.main_structure[1];
        assert_eq!(count.name, "count");
        assert_eq!(count.length_ref, None);

        let entries = &project.main_structure[2];
        assert_eq!(entries.substructure_ref.as_deref(), Some("entry"));
        assert_eq!(entries.repeat_ref.as_deref(), Some("count"));

        assert_eq!(project.main_structure[3].bit_descriptions[0].set_description.as_deref(), Some("on"));
        assert_eq!(project.substructures.get("entry").map(|t| t.name.as_str()), Some("Entry"));
    }

    #[cfg(feature = "fs")]
    #[tokio::test]
    async fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        tokio::fs::write(&path, PROJECT).await.unwrap();

        let project = Project::open(&path).await.unwrap();
        assert_eq!(project.main_structure.len(), 4);
        assert_eq!(project.version.as_deref(), Some("1.2"));

        let missing = Project::open(dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(crate::errors::ProjectError::Io(_))));
    }

    #[test]
    fn test_from_json_rejects_unknown_type() {
        let result = Project::from_json(r#"{ "mainStructure": [{ "id": "x", "type": "uint128" }] }"#);
        assert!(matches!(result, Err(crate::errors::ProjectError::Json(_))));
    }
}
