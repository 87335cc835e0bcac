//! Structure-driven decoding.
//!
//! [StructureDecoder] walks a field list depth-first, one field at a time,
//! threading a running offset and a [ReferenceIndex] of the fields decoded so
//! far. No field-level failure escapes: end of data, short reads, unresolved
//! references, and script failures all end up as data in the returned tree.
//!
//! Substructures, repeated fields, and inline children share one expansion
//! routine that decodes a list of descriptors from a start offset and
//! aggregates the results into a parent field.

use std::{
    borrow::Cow,
    future::Future,
    pin::Pin,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::{debug, warn};

use crate::{
    config::DecoderConfig,
    decoded::{DecodedField, DecodedStructure},
    errors::DecodeError,
    field::{FieldDescriptor, SubstructureCatalog},
    kind::FieldKind,
    postprocess,
    reference::ReferenceIndex,
    script::{ScriptContext, ScriptRegistry},
    source::ByteSource,
    value::Value,
};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Descriptors decoded by one expansion.
#[derive(Clone, Copy)]
enum FieldList<'a> {
    /// A template's or a struct's own field list.
    Fields(&'a [FieldDescriptor]),
    /// `count` single instances of one descriptor.
    Repeat { field: &'a FieldDescriptor, count: u64 },
}

impl<'a> FieldList<'a> {
    fn len(self) -> u64 {
        match self {
            FieldList::Fields(fields) => fields.len() as u64,
            FieldList::Repeat { count, .. } => count,
        }
    }

    fn get(self, i: u64) -> Cow<'a, FieldDescriptor> {
        match self {
            FieldList::Fields(fields) => Cow::Borrowed(&fields[i as usize]),
            FieldList::Repeat { field, .. } => Cow::Owned(field.repeat_instance(i)),
        }
    }

    fn is_repeat(self) -> bool {
        matches!(self, FieldList::Repeat { .. })
    }
}

/// Which reference index the fields of an expansion resolve against.
#[derive(Clone, Copy)]
enum Scope<'a> {
    /// A new, empty index filled by the expansion's own fields.
    Fresh,
    /// The enclosing index, read-only. Used by repeat instances.
    Enclosing(&'a ReferenceIndex),
}

/// Per-pass state threaded through the recursion.
#[derive(Clone, Copy)]
struct Pass<'a> {
    cancel: Option<&'a AtomicBool>,
    depth: usize,
}

impl Pass<'_> {
    fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    fn check(self) -> Result<(), DecodeError> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(DecodeError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Decoded fields of one expansion plus where it stopped.
struct Expansion {
    fields: Vec<DecodedField>,
    end: u64,
    index: ReferenceIndex,
}

/// Decodes structure definitions against a byte source.
pub struct StructureDecoder<'a> {
    source: &'a dyn ByteSource,
    catalog: &'a SubstructureCatalog,
    scripts: &'a ScriptRegistry,
    config: DecoderConfig,
}

impl<'a> StructureDecoder<'a> {
    pub fn new(
        source: &'a dyn ByteSource,
        catalog: &'a SubstructureCatalog,
        scripts: &'a ScriptRegistry,
    ) -> Self {
        Self {
            source,
            catalog,
            scripts,
            config: DecoderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes `fields` sequentially from offset 0.
    ///
    /// Stops early, without error, once the running offset reaches the end
    /// of the source. Each call builds a fresh reference index.
    pub async fn decode_structure(&self, fields: &[FieldDescriptor]) -> DecodedStructure {
        // Without a cancellation flag the pass cannot fail.
        self.decode_pass(fields, None).await.unwrap_or_default()
    }

    /// Like [decode_structure](Self::decode_structure), but checks `cancel`
    /// before every field at every nesting level.
    ///
    /// # Errors
    /// Returns [DecodeError::Cancelled] once the flag is observed set.
    pub async fn decode_cancellable(
        &self,
        fields: &[FieldDescriptor],
        cancel: &AtomicBool,
    ) -> Result<DecodedStructure, DecodeError> {
        self.decode_pass(fields, Some(cancel)).await
    }

    /// Decodes a single descriptor at `offset`, resolving references
    /// against `index`.
    pub async fn decode_field(
        &self,
        field: &FieldDescriptor,
        offset: u64,
        index: &ReferenceIndex,
    ) -> DecodedField {
        let pass = Pass {
            cancel: None,
            depth: 0,
        };
        match self.decode_at(field, offset, index, None, pass).await {
            Ok(decoded) => decoded,
            Err(_) => DecodedField::empty(field.clone(), offset),
        }
    }

    async fn decode_pass(
        &self,
        fields: &[FieldDescriptor],
        cancel: Option<&AtomicBool>,
    ) -> Result<DecodedStructure, DecodeError> {
        debug!(fields = fields.len(), size = self.source.size(), "decode pass started");

        let pass = Pass { cancel, depth: 0 };
        let expansion = self
            .decode_list(FieldList::Fields(fields), 0, Scope::Fresh, pass)
            .await?;

        debug!(
            decoded = expansion.fields.len(),
            end = expansion.end,
            "decode pass finished"
        );
        Ok(DecodedStructure {
            fields: expansion.fields,
            index: expansion.index,
        })
    }

    /// Decodes each descriptor of `list` in turn from `start`.
    fn decode_list<'f>(
        &'f self,
        list: FieldList<'f>,
        start: u64,
        scope: Scope<'f>,
        pass: Pass<'f>,
    ) -> BoxFuture<'f, Result<Expansion, DecodeError>> {
        Box::pin(async move {
            let size = self.source.size();
            let mut local = ReferenceIndex::new();
            let mut fields = Vec::new();
            let mut offset = start;
            let repeat_override = list.is_repeat().then_some(1);

            for i in 0..list.len() {
                pass.check()?;

                let field = list.get(i);
                let index = match scope {
                    Scope::Fresh => &local,
                    Scope::Enclosing(index) => index,
                };
                let decoded = self
                    .decode_at(&field, offset, index, repeat_override, pass)
                    .await?;

                // A null, empty instance ends a repeated field.
                if list.is_repeat() && decoded.value.is_null() && decoded.length == 0 {
                    break;
                }

                offset = decoded.end();
                if let Scope::Fresh = scope {
                    local.insert(decoded.clone());
                }
                fields.push(decoded);

                if offset >= size {
                    break;
                }
            }

            Ok(Expansion {
                fields,
                end: offset,
                index: local,
            })
        })
    }

    /// Decodes one descriptor. `repeat_override` replaces the descriptor's
    /// own repeat settings.
    fn decode_at<'f>(
        &'f self,
        field: &'f FieldDescriptor,
        offset: u64,
        index: &'f ReferenceIndex,
        repeat_override: Option<u64>,
        pass: Pass<'f>,
    ) -> BoxFuture<'f, Result<DecodedField, DecodeError>> {
        Box::pin(async move {
            let offset = field.offset.unwrap_or(offset);
            let size = self.source.size();

            if offset >= size {
                return Ok(DecodedField::empty(field.clone(), offset));
            }
            if pass.depth > self.config.max_depth {
                warn!(id = %field.id, depth = pass.depth, "nesting too deep, field skipped");
                return Ok(DecodedField::empty(field.clone(), offset));
            }

            match (field.kind, &field.substructure_ref) {
                (FieldKind::Script, _) => return Ok(self.decode_script(field, offset, index).await),
                (FieldKind::Struct, Some(template)) => {
                    return self.decode_substructure(field, template, offset, pass).await;
                }
                _ => {}
            }

            let requested = index
                .resolve_count(field.length_ref.as_deref())
                .or(field.length)
                .or(field.kind.size_of())
                .unwrap_or(1);
            let available = requested.min(size - offset);

            if field.kind.size_of().is_some_and(|fixed| available < fixed) {
                let raw = self.read_or_empty(field, offset, offset + available).await;
                debug!(id = %field.id, offset, requested, available, "insufficient data");
                return Ok(DecodedField {
                    definition: field.clone(),
                    value: Value::Null,
                    raw,
                    offset,
                    length: requested,
                    children: None,
                });
            }

            let count = repeat_override
                .or_else(|| index.resolve_count(field.repeat_ref.as_deref()))
                .or(field.repeats)
                .unwrap_or(1);
            let count = self.config.cap_repeat(count);
            if count > 1 {
                let list = FieldList::Repeat { field, count };
                let expansion = self
                    .decode_list(list, offset, Scope::Enclosing(index), pass.nested())
                    .await?;
                return Ok(self.aggregate(field, offset, expansion).await);
            }

            let raw = self.read_or_empty(field, offset, offset + available).await;
            let value = field
                .kind
                .decode(field.endianness, &raw)
                .map(|v| postprocess::interpret(v, &field.value_map, &field.bit_descriptions))
                .unwrap_or(Value::Null);

            if field.kind == FieldKind::Struct && !value.is_null() {
                if let Some(children) = field.children.as_deref().filter(|c| !c.is_empty()) {
                    let expansion = self
                        .decode_list(FieldList::Fields(children), offset, Scope::Fresh, pass.nested())
                        .await?;
                    return Ok(self.aggregate(field, offset, expansion).await);
                }
            }

            debug!(id = %field.id, offset, length = requested, "decoded field");
            Ok(DecodedField {
                definition: field.clone(),
                value,
                raw,
                offset,
                length: requested,
                children: None,
            })
        })
    }

    async fn decode_substructure(
        &self,
        field: &FieldDescriptor,
        template: &str,
        offset: u64,
        pass: Pass<'_>,
    ) -> Result<DecodedField, DecodeError> {
        let Some(template) = self.catalog.get(template) else {
            warn!(id = %field.id, template, "substructure not found");
            return Ok(DecodedField::empty(field.clone(), offset));
        };

        let list = FieldList::Fields(&template.fields);
        let expansion = self
            .decode_list(list, offset, Scope::Fresh, pass.nested())
            .await?;
        Ok(self.aggregate(field, offset, expansion).await)
    }

    async fn decode_script(
        &self,
        field: &FieldDescriptor,
        offset: u64,
        index: &ReferenceIndex,
    ) -> DecodedField {
        let size = self.source.size();
        let ctx = ScriptContext {
            source: self.source,
            size,
            offset,
            fields: index,
            scan_limit: self.config.script_scan_limit,
        };

        match self.scripts.run(field.script.as_deref(), &ctx).await {
            Ok(output) => {
                let length = output.length as u64;
                let end = offset + length.min(size - offset);
                let raw = self.read_or_empty(field, offset, end).await;
                debug!(id = %field.id, offset, length, "script field evaluated");
                DecodedField {
                    definition: field.clone(),
                    value: output.value,
                    raw,
                    offset,
                    length,
                    children: None,
                }
            }
            Err(err) => {
                warn!(id = %field.id, offset, error = %err, "script field failed");
                DecodedField {
                    value: Value::String(err.to_string()),
                    ..DecodedField::empty(field.clone(), offset)
                }
            }
        }
    }

    /// Builds the parent field of an expansion. The span runs from `offset`
    /// to where the expansion stopped, clamped to the end of the source.
    async fn aggregate(
        &self,
        field: &FieldDescriptor,
        offset: u64,
        expansion: Expansion,
    ) -> DecodedField {
        let remaining = self.source.size().saturating_sub(offset);
        let length = expansion.end.saturating_sub(offset).min(remaining);
        let raw = self.read_or_empty(field, offset, offset + length).await;
        let value = Value::Array(expansion.fields.iter().map(|f| f.value.clone()).collect());

        debug!(
            id = %field.id,
            offset,
            length,
            children = expansion.fields.len(),
            "expanded field"
        );
        DecodedField {
            definition: field.clone(),
            value,
            raw,
            offset,
            length,
            children: Some(expansion.fields),
        }
    }

    async fn read_or_empty(&self, field: &FieldDescriptor, start: u64, end: u64) -> Vec<u8> {
        match self.source.read_range(start, end).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(id = %field.id, start, end, error = %err, "read failed");
                Vec::new()
            }
        }
    }
}

/// Decodes `fields` with the default configuration and the built-in scripts.
pub async fn decode_structure(
    fields: &[FieldDescriptor],
    catalog: &SubstructureCatalog,
    source: &dyn ByteSource,
) -> DecodedStructure {
    let scripts = ScriptRegistry::with_builtins();
    StructureDecoder::new(source, catalog, &scripts)
        .decode_structure(fields)
        .await
}
