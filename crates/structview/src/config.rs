//! Decoder configuration.

/// Default cap on a resolved repeat count.
pub const DEFAULT_MAX_REPEAT: u64 = 65536;

/// Limits applied during a decode pass.
///
/// Use the builder-style setters to configure, then pass the config to
/// [crate::decoder::StructureDecoder::with_config].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Deepest nesting of substructure, repeat, and inline expansion. Fields
    /// below this depth decode as null with zero length.
    pub max_depth: usize,
    /// If set, resolved repeat counts are capped to this value. Zero-length
    /// instances do not advance the offset, so this is their only bound.
    pub max_repeat: Option<u64>,
    /// How many bytes scanning script strategies may read ahead.
    pub script_scan_limit: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_repeat: Some(DEFAULT_MAX_REPEAT),
            script_scan_limit: 4096,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the repeat cap; `None` removes it.
    pub fn set_max_repeat(&mut self, max_repeat: impl Into<Option<u64>>) -> &mut Self {
        self.max_repeat = max_repeat.into();
        self
    }

    pub fn set_script_scan_limit(&mut self, limit: u64) -> &mut Self {
        self.script_scan_limit = limit;
        self
    }

    /// Applies `max_repeat` to a resolved count.
    pub(crate) fn cap_repeat(&self, count: u64) -> u64 {
        self.max_repeat.map_or(count, |max| count.min(max))
    }
}
