//! Error types for the Bloom filter crate

use thiserror::Error;

/// Errors that can occur while building or querying a Bloom filter
///
/// Validation is eager: everything that can be checked from construction
/// arguments is checked before a filter or index function is returned.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FilterError {
    /// A size, rate or count is outside its allowed range.
    #[error("Invalid argument `{name}`: {constraint}")]
    InvalidArgument {
        name: &'static str,
        constraint: String,
    },

    #[error("Index {index} out of range for bit store of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid hash primitive list: {0}")]
    InvalidPrimitiveList(String),

    #[error("Insufficient hash bits: {needed} needed but primitive yields {available}")]
    InsufficientHashBits { needed: usize, available: usize },

    #[error("Item too large: {0}")]
    ItemTooLarge(String),

    #[error("Invalid element type: filter expects `{expected}`")]
    InvalidElementType { expected: &'static str },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FilterError {
    pub(crate) fn invalid_argument(name: &'static str, constraint: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            constraint: constraint.into(),
        }
    }

    /// True for the argument-validation family (sizes, rates, counts).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Name of the offending parameter, if this is an argument error.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument { name, .. } => Some(name),
            _ => None,
        }
    }
}
