//! Build-time errors.
//!
//! Every variant aborts the generation pass that raised it. There is no
//! partial success for a type-under-construction: the orchestrator discards
//! the whole type when any contributor returns one of these.

use std::fmt;

use crate::{TypeId, TypePool};

/// What kind of member a [`BuildError::DuplicateMember`] refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Field => f.write_str("field"),
            MemberKind::Method => f.write_str("method"),
        }
    }
}

/// Error raised while building a type-under-construction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Two contributors claimed the same member.
    #[error("duplicate {kind} `{name}` on type `{owner}`")]
    DuplicateMember {
        owner: String,
        kind: MemberKind,
        name: String,
    },

    /// A statement or expression was added after the body was finalized.
    #[error("body of `{method}` is finalized; nothing more can be appended")]
    FrozenBody { method: String },

    /// A `Convert`, `Assign`, `Return` or call node combines incompatible types.
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    #[error("`{method}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid call to `{method}`: {reason}")]
    InvalidInvocation { method: String, reason: &'static str },

    /// An argument or local of one method was used inside another.
    #[error("reference used in `{method}` belongs to a different method body")]
    ForeignReference { method: String },

    /// An expression id that was never allocated in this body.
    #[error("expression #{expr} is not part of the body of `{method}`")]
    UnknownExpr { method: String, expr: u32 },

    #[error("assignment target in `{method}` is not writable storage")]
    NotAssignable { method: String },

    #[error("type `{0}` is not an array")]
    NotAnArray(String),

    /// A reserved field a contributor relies on was never declared.
    #[error("type `{owner}` has no field `{name}`")]
    MissingField { owner: String, name: String },

    #[error("a type named `{0}` is already defined")]
    DuplicateType(String),

    #[error("type definition references unknown type #{0}")]
    UnknownType(u32),

    /// A body does not end in `return` or `throw`.
    #[error("body of `{method}` does not end in a return or throw")]
    MissingTerminator { method: String },

    #[error("statement #{index} in `{method}` follows a return or throw")]
    UnreachableStatement { method: String, index: usize },
}

impl BuildError {
    /// Build a [`BuildError::TypeMismatch`] with names resolved through `pool`.
    pub fn mismatch(pool: &TypePool, expected: TypeId, found: TypeId) -> Self {
        BuildError::TypeMismatch {
            expected: pool.name(expected).to_owned(),
            found: pool.name(found).to_owned(),
        }
    }
}
