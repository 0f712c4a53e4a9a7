//! Reference interpreter for generated proxy types.
//!
//! Executes the IR bodies of a [`GeneratedType`] directly against in-memory
//! instances. It stands in for the external lowering step and the runtime it
//! targets, so the behavior of generated members can be observed:
//!
//! - `Convert` performs a run-time cast check ([`RuntimeError::InvalidCast`])
//! - `Throw` surfaces as [`RuntimeError::Thrown`]
//! - calls resolve to registered natives first, then to the generated type's
//!   own methods
//!
//! Objects, arrays and serialization infos are shared by identity (`Rc`), so
//! identity-preservation properties can be checked with [`Value::same`].
//!
//! [`GeneratedType`]: proxy_ir::GeneratedType

mod error;
mod info;
mod interpreter;
mod natives;
mod value;

pub use error::RuntimeError;
pub use info::SerializationInfo;
pub use interpreter::Interpreter;
pub use natives::{NativeFn, Natives};
pub use value::{ArrayData, Object, ObjectRef, Value};
