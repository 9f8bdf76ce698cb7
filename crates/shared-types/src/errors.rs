//! # Error Types
//!
//! Errors raised while encoding or decoding persisted records.

use thiserror::Error;

/// Errors from the record codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The record could not be serialized.
    #[error("Failed to encode record: {0}")]
    Encode(String),

    /// Stored bytes are not a valid record of the expected shape.
    #[error("Failed to decode record: {0}")]
    Decode(String),
}

/// Errors raised when parsing enum values from their wire names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown {kind} value: {value}")]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
