//! Proxy IR - member synthesis for generated proxy types.
//!
//! This crate contains the data structures contributors use to add members
//! to a type being generated at runtime:
//!
//! - **Type pool** ([`TypePool`], [`TypeId`]) - the types member bodies are
//!   checked against, with the runtime's well-known types pre-interned
//! - **References** ([`Reference`], [`FieldRef`], [`ArgumentRef`],
//!   [`LocalRef`]) - typed handles to storage locations
//! - **Expression/statement IR** ([`ExprKind`], [`Stmt`], [`MethodBody`]) -
//!   small typed trees describing a method body
//! - **Member emitter** ([`MethodEmitter`]) - one method slot and its body
//! - **Type-under-construction** ([`ClassEmitter`]) - the in-progress type
//!   that contributors append fields, methods and attributes to
//!
//! # Design
//!
//! - **Bodies are data**: nothing is emitted while a body is built. An
//!   external generator lowers [`GeneratedType`] once every contributor has
//!   run, so a failed pass leaves nothing behind.
//! - **Arena per body**: expressions are allocated into their
//!   [`MethodBody`] and referenced by [`ExprId`]. No node outlives its body
//!   and no cycles are possible.
//! - **Checked at construction**: `Convert`, `Assign`, `Return` and `Invoke`
//!   nodes are type-checked when they are built, so a well-formed body is
//!   guaranteed regardless of which contributor emitted it.

mod body;
mod class;
mod emitter;
mod error;
mod expr;
mod format;
mod method_desc;
mod reference;
mod stmt;
mod types;
pub mod validate;

pub use body::MethodBody;
pub use class::{ClassEmitter, ClassView, FieldDecl, GeneratedType};
pub use emitter::{MethodEmitter, MethodId};
pub use error::{BuildError, MemberKind};
pub use expr::{ConstValue, ExprId, ExprKind, ExprNode};
pub use format::MethodDisplay;
pub use method_desc::{well_known, MethodDesc};
pub use reference::{ArgumentRef, FieldFlags, FieldId, FieldRef, LocalRef, Reference};
pub use stmt::{AssignTarget, Stmt};
pub use types::{CustomAttribute, PoolCheckpoint, TypeId, TypeInfo, TypeKind, TypePool};
