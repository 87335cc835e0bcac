//! WASM bindings for the `structview` decoder.
//!
//! A project (JSON with `mainStructure`, `substructures` and `version`) is
//! parsed once into a [`WasmDecoder`], which can then decode any number of
//! byte buffers handed over from JavaScript:
//!
//! ```text
//! // const decoder = new WasmDecoder(projectJson);
//! // const fields = decoder.decode(new Uint8Array(buffer));
//! // fields[0] -> { id, name, type, offset, length, value, rawValue, children? }
//! ```
//!
//! Errors surface as `JsValue` strings.

mod convert;

use structview::{
    decoded::DecodedStructure,
    decoder::StructureDecoder,
    entropy::block_entropy,
    project::Project,
    script::ScriptRegistry,
    serde::DecodedFieldOut,
    source::MemorySource,
};
use wasm_bindgen::prelude::*;

/// A parsed project ready to decode byte buffers.
#[wasm_bindgen]
pub struct WasmDecoder {
    project: Project,
    scripts: ScriptRegistry,
}

impl WasmDecoder {
    fn decode_fields(&self, data: &[u8]) -> Result<DecodedStructure, JsValue> {
        let source = MemorySource::new(data);
        let decoder = StructureDecoder::new(&source, &self.project.substructures, &self.scripts);

        // Byte sources never block, so a single-threaded runtime is enough.
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(convert::error_to_js)?;
        Ok(rt.block_on(decoder.decode_structure(&self.project.main_structure)))
    }
}

#[wasm_bindgen]
impl WasmDecoder {
    /// Parses a project definition.
    ///
    /// Returns an error string if `project_json` is not a valid project.
    #[wasm_bindgen(constructor)]
    pub fn new(project_json: &str) -> Result<WasmDecoder, JsValue> {
        let project = Project::from_json(project_json).map_err(convert::error_to_js)?;
        Ok(WasmDecoder {
            project,
            scripts: ScriptRegistry::with_builtins(),
        })
    }

    /// Format version recorded in the project, if any.
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> Option<String> {
        self.project.version.clone()
    }

    /// Decodes `data` and returns the field tree as an array of plain objects.
    pub fn decode(&self, data: &[u8]) -> Result<JsValue, JsValue> {
        let decoded = self.decode_fields(data)?;
        let out: Vec<DecodedFieldOut> = decoded.fields.iter().map(DecodedFieldOut::from).collect();
        convert::to_js(&out)
    }

    /// Decodes `data` and returns the innermost field covering `offset`,
    /// or `undefined` if none does.
    #[wasm_bindgen(js_name = fieldAt)]
    pub fn field_at(&self, data: &[u8], offset: u64) -> Result<JsValue, JsValue> {
        let decoded = self.decode_fields(data)?;
        match decoded.field_at(offset) {
            Some(field) => convert::to_js(&DecodedFieldOut::from(field)),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

/// Shannon entropy (bits per byte) of each `block_size`-byte block of `data`.
#[wasm_bindgen]
pub fn entropy(data: &[u8], block_size: usize) -> Vec<f64> {
    block_entropy(data, block_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use structview::value::Value;

    const PROJECT: &str = r#"{
        "version": "2",
        "mainStructure": [
            { "id": "len", "type": "uint8" },
            { "id": "name", "type": "string", "lengthRef": "len" }
        ],
        "substructures": []
    }"#;

    #[test]
    fn test_decode_fields() {
        let decoder = WasmDecoder::new(PROJECT).unwrap();
        assert_eq!(decoder.version().as_deref(), Some("2"));

        let decoded = decoder.decode_fields(b"\x03abcz").unwrap();
        assert_eq!(decoded.fields.len(), 2);
        assert_eq!(decoded.fields[1].value, Value::String("abc".into()));
        assert_eq!(decoded.field_at(2).map(|f| f.id()), Some("name"));
    }

    #[test]
    fn test_entropy_blocks() {
        let blocks = entropy(&[0u8; 8], 4);
        assert_eq!(blocks, vec![0.0, 0.0]);
    }
}
