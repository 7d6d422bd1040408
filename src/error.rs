//! Internal diagnostic categories (§7).
//!
//! The opcode engine itself never throws: every operation that can fail
//! returns [`crate::value::Value::Invalid`]. `FailureKind` exists
//! alongside that value-based model purely so a failure can be
//! *categorized* for diagnostics — attached to an indirect's `diag`
//! field, logged via `tracing`, or surfaced through the `ext::Parser` /
//! `ext::Emitter` contracts, which do get to report errors properly
//! since they sit outside the core's "errors are values" rule.

use thiserror::Error;

/// The six failure categories an implementation must distinguish
/// internally per §7. These never reach an opcode caller directly —
/// they're for diagnostics collection and for the external contracts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FailureKind {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },

    #[error("index or slice out of range: {detail}")]
    RangeError { detail: String },

    #[error("allocator returned null")]
    AllocationFailure,

    #[error("duplicate key rejected by builder configuration")]
    DuplicateKey,

    #[error("malformed input: {detail}")]
    MalformedInput { detail: String },

    #[error("emit error: {detail}")]
    EmitError { detail: String },
}

impl FailureKind {
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        FailureKind::TypeMismatch { expected, found }
    }

    pub fn range(detail: impl Into<String>) -> Self {
        FailureKind::RangeError { detail: detail.into() }
    }
}
