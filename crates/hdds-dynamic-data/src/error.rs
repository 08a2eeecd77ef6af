// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for DynamicData access.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DynamicDataError>;

/// Errors for DynamicData operations.
///
/// Every failing call leaves the sample untouched: kinds, bounds and
/// conversions are validated before anything is written to storage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DynamicDataError {
    /// Name or index not declared in the type.
    #[error("Unknown member: {0}")]
    UnknownMember(String),

    /// Type name not present in the registry.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Malformed path expression.
    #[error("Invalid member path '{path}' at byte {position}: {reason}")]
    PathSyntax {
        path: String,
        position: usize,
        reason: String,
    },

    /// Wrong number of indices for a multi-dimensional array.
    #[error("Dimension mismatch: expected {expected} indices, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Index outside the declared or current bounds.
    #[error("Index out of range: {index} >= {bound}")]
    IndexOutOfRange { index: usize, bound: usize },

    /// Operation not valid for the member's kind, or value of the wrong kind.
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Stored ordinal has no enumerator in the enum type.
    #[error("Unknown enumerator: {type_name} has no enumerator with ordinal {ordinal}")]
    UnknownEnumerator { type_name: String, ordinal: i32 },

    /// `None`/null assigned to a member that is not `@optional`.
    #[error("Member '{0}' is not optional")]
    NotOptional(String),

    /// Bounded sequence would exceed its maximum length.
    #[error("Sequence length exceeds maximum: {length} > {max}")]
    SequenceTooLong { length: usize, max: usize },

    /// Bounded string would exceed its maximum length.
    #[error("String length exceeds maximum: {length} > {max}")]
    StringTooLong { length: usize, max: usize },

    /// A loan taken from this slot was never returned.
    #[error("Member '{0}' is still on loan")]
    LoanOutstanding(String),

    /// CDR buffer could not be encoded or decoded.
    #[error("CDR error: {0}")]
    Cdr(String),
}

impl DynamicDataError {
    pub(crate) fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub(crate) fn path(path: &str, position: usize, reason: impl Into<String>) -> Self {
        Self::PathSyntax {
            path: path.to_string(),
            position,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DynamicDataError::IndexOutOfRange { index: 4, bound: 4 };
        assert_eq!(err.to_string(), "Index out of range: 4 >= 4");

        let err = DynamicDataError::path("a[", 2, "expected index");
        assert_eq!(
            err.to_string(),
            "Invalid member path 'a[' at byte 2: expected index"
        );
    }
}
