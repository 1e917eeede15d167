//! Codec configuration
//!
//! Tunables for encoding. Decoding needs no configuration.
//!
//! # Example
//!
//! ```toml
//! initial_capacity = 4096
//! max_message_size = 1048576
//! shape_validation = "deferred"
//! ```

use std::str::FromStr;

use serde::Deserialize;

use crate::{ProtocolError, Result};

/// Default initial arena size in bytes
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Default upper bound for a finished message (100MB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

/// When histogram array lengths are checked against the declared shape
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShapeValidation {
    /// Reject mismatched data/errors/dimension counts before encoding (default)
    #[default]
    Strict,
    /// Encode as given; mismatches surface when the decoder reshapes
    Deferred,
}

impl ShapeValidation {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Deferred => "deferred",
        }
    }
}

/// Encoder configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CodecConfig {
    /// Initial arena size in bytes; the arena grows as needed
    /// Default: 1024
    pub initial_capacity: usize,

    /// Largest message the encoder will produce
    /// Default: 100MB
    pub max_message_size: usize,

    /// Histogram shape checking policy
    /// Default: strict
    pub shape_validation: ShapeValidation,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            shape_validation: ShapeValidation::Strict,
        }
    }
}

impl FromStr for CodecConfig {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ProtocolError::InvalidConfig(e.to_string()))
    }
}
