//! Run-time errors of generated member bodies.

use proxy_ir::{TypeId, TypePool};

use crate::Value;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// A `Throw` statement executed.
    #[error("{name}: {message}")]
    Thrown {
        exception: TypeId,
        name: String,
        message: String,
    },

    #[error("cannot cast `{from}` to `{to}`")]
    InvalidCast { from: String, to: String },

    #[error("null receiver in call to `{method}`")]
    NullReference { method: String },

    #[error("index {index} is out of range for an array of length {length}")]
    IndexOutOfRange { index: u32, length: usize },

    #[error("no method `{name}` on `{owner}`")]
    MissingMethod { owner: String, name: String },

    #[error("`{method}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("no field `{name}` on `{owner}`")]
    MissingField { owner: String, name: String },

    #[error("key `{0}` was already added to the serialization payload")]
    DuplicateKey(String),

    #[error("type `{0}` could not be resolved")]
    TypeNotFound(String),

    #[error("`{method}` has no expression #{expr}")]
    UnknownExpr { method: String, expr: u32 },

    #[error("call depth exceeded {0}")]
    RecursionLimit(usize),
}

impl RuntimeError {
    /// A failed cast of `value` to `to`, with names resolved through `pool`.
    pub fn invalid_cast(pool: &TypePool, value: &Value, to: TypeId) -> Self {
        RuntimeError::InvalidCast {
            from: value
                .runtime_type()
                .map_or_else(|| "null".to_owned(), |ty| pool.name(ty).to_owned()),
            to: pool.name(to).to_owned(),
        }
    }

    /// Was this raised by a `throw` of the invalid-operation exception?
    ///
    /// This is how a generated `set_proxy_target` reports that the proxy has
    /// no separately stored target.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self,
            RuntimeError::Thrown { exception, .. } if *exception == TypeId::INVALID_OPERATION
        )
    }
}
