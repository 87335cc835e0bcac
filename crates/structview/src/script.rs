//! Script fields: values computed by registered strategies.
//!
//! A descriptor with `type = script` names a strategy through its `script`
//! text. The strategy receives a [ScriptContext] and returns the value and the
//! number of bytes it consumed. Strategies are plain Rust code registered in a
//! [ScriptRegistry]; there is no general-purpose evaluator.

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;

use crate::{
    decoded::DecodedField,
    errors::{ScriptError, SourceError},
    reference::ReferenceIndex,
    source::ByteSource,
    value::{Value, hex_dump},
};

/// Everything a strategy may look at.
pub struct ScriptContext<'a> {
    pub source: &'a dyn ByteSource,
    /// Total size of the source.
    pub size: u64,
    /// Offset of the script field.
    pub offset: u64,
    /// Sibling fields decoded so far in the current scope.
    pub fields: &'a ReferenceIndex,
    /// Upper bound on how far scanning strategies read ahead.
    pub scan_limit: u64,
}

impl ScriptContext<'_> {
    /// Reads `start..end` from the source, clamped to its bounds.
    pub async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, SourceError> {
        self.source.read_range(start, end).await
    }

    pub fn field(&self, id: &str) -> Option<&DecodedField> {
        self.fields.get(id)
    }

    /// Bytes left from the script field's offset to the end of the source.
    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.offset)
    }
}

/// Value and consumed length returned by a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOutput {
    pub value: Value,
    /// Bytes consumed; must not be negative.
    pub length: i64,
}

impl ScriptOutput {
    pub fn new(value: Value, length: i64) -> Self {
        Self { value, length }
    }
}

/// A named decode strategy for script fields.
#[async_trait]
pub trait ScriptStrategy: Send + Sync {
    /// Computes the field's value and consumed length.
    ///
    /// # Errors
    /// Any error is shown as the field's value; decoding of the remaining
    /// fields continues.
    async fn evaluate(&self, ctx: &ScriptContext<'_>) -> Result<ScriptOutput, ScriptError>;
}

/// Strategies by name.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    strategies: HashMap<String, Arc<dyn ScriptStrategy>>,
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ScriptRegistry").field("strategies", &names).finish()
    }
}

impl ScriptRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `cstring` and `remaining` strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("cstring", CString)
            .register("remaining", Remaining);
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        strategy: impl ScriptStrategy + 'static,
    ) -> &mut Self {
        self.strategies.insert(name.into(), Arc::new(strategy));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ScriptStrategy>> {
        self.strategies.get(name)
    }

    /// Looks up the strategy named by `script` and runs it, checking the
    /// returned length.
    pub async fn run(
        &self,
        script: Option<&str>,
        ctx: &ScriptContext<'_>,
    ) -> Result<ScriptOutput, ScriptError> {
        let name = script
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ScriptError::MissingScript)?;
        let strategy = self
            .get(name)
            .ok_or_else(|| ScriptError::UnknownScript(name.to_string()))?;

        let output = strategy.evaluate(ctx).await?;
        if output.length < 0 {
            return Err(ScriptError::InvalidLength(output.length));
        }
        Ok(output)
    }
}

/// NUL-terminated UTF-8 string. The terminator counts toward the length;
/// without one, the string runs to the end of the scanned window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CString;

#[async_trait]
impl ScriptStrategy for CString {
    async fn evaluate(&self, ctx: &ScriptContext<'_>) -> Result<ScriptOutput, ScriptError> {
        let window = ctx.remaining().min(ctx.scan_limit);
        let bytes = ctx.read_range(ctx.offset, ctx.offset + window).await?;

        let (text, length) = match bytes.iter().position(|b| *b == 0) {
            Some(nul) => (&bytes[..nul], nul + 1),
            None => (&bytes[..], bytes.len()),
        };

        Ok(ScriptOutput::new(
            Value::String(String::from_utf8_lossy(text).into_owned()),
            length as i64,
        ))
    }
}

/// Every byte up to the end of the source, as a hex dump.
#[derive(Debug, Clone, Copy, Default)]
pub struct Remaining;

#[async_trait]
impl ScriptStrategy for Remaining {
    async fn evaluate(&self, ctx: &ScriptContext<'_>) -> Result<ScriptOutput, ScriptError> {
        let remaining = ctx.remaining();
        let length = i64::try_from(remaining)
            .map_err(|_| ScriptError::Failed(format!("{remaining} bytes remaining is too large")))?;
        let bytes = ctx.read_range(ctx.offset, ctx.size).await?;
        Ok(ScriptOutput::new(Value::String(hex_dump(&bytes)), length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn context<'a>(source: &'a MemorySource, fields: &'a ReferenceIndex, offset: u64) -> ScriptContext<'a> {
        ScriptContext {
            source,
            size: source.size(),
            offset,
            fields,
            scan_limit: 4096,
        }
    }

    struct Negative;

    #[async_trait]
    impl ScriptStrategy for Negative {
        async fn evaluate(&self, _ctx: &ScriptContext<'_>) -> Result<ScriptOutput, ScriptError> {
            Ok(ScriptOutput::new(Value::Null, -1))
        }
    }

    #[tokio::test]
    async fn test_cstring() {
        let source = MemorySource::new(b"\x01abc\0def".to_vec());
        let fields = ReferenceIndex::new();
        let registry = ScriptRegistry::with_builtins();

        let out = registry.run(Some("cstring"), &context(&source, &fields, 1)).await.unwrap();
        assert_eq!(out, ScriptOutput::new(Value::String("abc".into()), 4));

        let out = registry.run(Some(" cstring\n"), &context(&source, &fields, 5)).await.unwrap();
        assert_eq!(out, ScriptOutput::new(Value::String("def".into()), 3));
    }

    #[tokio::test]
    async fn test_remaining() {
        let source = MemorySource::new(vec![0x00, 0x01, 0xfe, 0xff]);
        let fields = ReferenceIndex::new();
        let registry = ScriptRegistry::with_builtins();

        let out = registry.run(Some("remaining"), &context(&source, &fields, 2)).await.unwrap();
        assert_eq!(out, ScriptOutput::new(Value::String("fe ff".into()), 2));
    }

    #[tokio::test]
    async fn test_lookup_failures() {
        let source = MemorySource::new(vec![0x00]);
        let fields = ReferenceIndex::new();
        let mut registry = ScriptRegistry::new();
        registry.register("negative", Negative);
        let ctx = context(&source, &fields, 0);

        assert!(matches!(registry.run(None, &ctx).await, Err(ScriptError::MissingScript)));
        assert!(matches!(registry.run(Some("  "), &ctx).await, Err(ScriptError::MissingScript)));
        assert!(matches!(
            registry.run(Some("cstring"), &ctx).await,
            Err(ScriptError::UnknownScript(name)) if name == "cstring"
        ));
        assert!(matches!(
            registry.run(Some("negative"), &ctx).await,
            Err(ScriptError::InvalidLength(-1))
        ));
    }
}
