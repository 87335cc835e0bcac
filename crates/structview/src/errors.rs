//! Error types for byte sources, script strategies, and decode passes.
//!
//! Field-level problems are never reported through these types: a field that
//! cannot be decoded still produces a [crate::decoded::DecodedField] carrying a
//! null or error-describing value. These errors cover the seams around the
//! decoder instead.

use thiserror::Error;

/// Errors produced by a [crate::source::ByteSource] when reading a range.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The underlying reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// `start` is greater than `end`.
    #[error("invalid range: {start}..{end}")]
    InvalidRange { start: u64, end: u64 },
}

/// Errors produced while evaluating a script field.
///
/// The `Display` text of these errors is what ends up as the field's value.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The descriptor has `type = script` but no script text.
    #[error("script error: no script defined")]
    MissingScript,
    /// No strategy is registered under the given name.
    #[error("script error: unknown script `{0}`")]
    UnknownScript(String),
    /// The strategy returned a negative length.
    #[error("script error: invalid length {0}, expected a non-negative number of bytes")]
    InvalidLength(i64),
    /// The strategy itself reported a failure.
    #[error("script error: {0}")]
    Failed(String),
    /// Reading from the byte source failed inside the strategy.
    #[error("script error: {0}")]
    Source(#[from] SourceError),
}

/// Errors that abort a whole decode pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The pass was cancelled between two fields.
    #[error("decode cancelled")]
    Cancelled,
}

/// Errors produced when loading a project definition.
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The project file could not be read.
    #[error("failed to read project: {0}")]
    Io(#[from] std::io::Error),
    /// The project JSON is malformed or has the wrong shape.
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
}
