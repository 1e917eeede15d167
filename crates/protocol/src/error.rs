//! Protocol error types
//!
//! Errors that can occur when encoding or decoding streaming messages.
//! Every error is deterministic for a given input; nothing here is retryable.

use thiserror::Error;

use crate::schema::SchemaId;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Schema identifier at bytes [4,8) does not match the decoder
    #[error("schema mismatch: expected {expected} but got {actual}")]
    SchemaMismatch { expected: SchemaId, actual: SchemaId },

    /// Schema identifier is not one of the known message kinds
    #[error("unknown schema identifier: {0}")]
    UnknownSchema(SchemaId),

    /// Value has no discriminant mapping (complex numbers, >1-D arrays, ...)
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Message decoded structurally but its contents are inconsistent
    #[error("corrupt message: {0}")]
    CorruptMessage(String),

    /// Flattened array length does not agree with the declared shape
    #[error("shape mismatch in {field}: expected {expected} elements, got {actual}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Message is too short to contain required fields
    #[error("message too short: expected at least {expected} bytes, got {actual}")]
    MessageTooShort { expected: usize, actual: usize },

    /// Invalid FlatBuffer format
    #[error("invalid flatbuffer: {0}")]
    InvalidFlatBuffer(String),

    /// Buffer overflow - message exceeds maximum size
    #[error("buffer overflow: message size {size} exceeds maximum {max}")]
    BufferOverflow { size: usize, max: usize },

    /// Builder used out of order (nested tables, forward references, ...)
    #[error("invalid builder state: {0}")]
    InvalidBuilderState(&'static str),

    /// Configuration could not be parsed
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl ProtocolError {
    /// Create a schema mismatch error
    #[inline]
    pub fn schema_mismatch(expected: SchemaId, actual: SchemaId) -> Self {
        Self::SchemaMismatch { expected, actual }
    }

    /// Create an unsupported type error
    #[inline]
    pub fn unsupported_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedType(msg.into())
    }

    /// Create a corrupt message error
    #[inline]
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptMessage(msg.into())
    }

    /// Create a corrupt message error for a required field that is absent
    #[inline]
    pub fn missing_field(field: &'static str) -> Self {
        Self::CorruptMessage(format!("missing required field: {field}"))
    }

    /// Create a shape mismatch error
    #[inline]
    pub fn shape_mismatch(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            field,
            expected,
            actual,
        }
    }

    /// Create a message too short error
    #[inline]
    pub fn too_short(expected: usize, actual: usize) -> Self {
        Self::MessageTooShort { expected, actual }
    }

    /// Create an invalid flatbuffer error
    #[inline]
    pub fn invalid_flatbuffer(msg: impl Into<String>) -> Self {
        Self::InvalidFlatBuffer(msg.into())
    }

    /// Create a message too large error
    #[inline]
    pub fn message_too_large(size: usize, max: usize) -> Self {
        Self::BufferOverflow { size, max }
    }

    /// Create an invalid builder state error
    #[inline]
    pub fn invalid_state(msg: &'static str) -> Self {
        Self::InvalidBuilderState(msg)
    }

    /// Check if this error was raised while encoding (no buffer was produced)
    pub fn is_encode_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType(_)
                | Self::BufferOverflow { .. }
                | Self::InvalidBuilderState(_)
        )
    }
}
