//! Generation errors.

use proxy_ir::BuildError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// A contributor or the type-under-construction rejected the pass.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The target cannot be proxied with the requested kind.
    #[error("cannot proxy `{target}`: {reason}")]
    InvalidTarget {
        target: String,
        reason: &'static str,
    },

    #[error("`{0}` is not an interface")]
    NotAnInterface(String),
}
