//! Contributors for proxy synthesis.
//!
//! A contributor appends members to a [`ClassEmitter`] by building IR
//! bodies. The orchestrator runs every contributor of a pass in order, first
//! through [`TypeContributor::collect_elements_to_proxy`] and then through
//! [`TypeContributor::generate`].
//!
//! This crate provides the protocol and one concrete contributor,
//! [`ProxyInstanceContributor`], which adds:
//!
//! - the target accessor pair (`get_proxy_target` / `set_proxy_target`)
//! - the interceptor-list accessor (`get_interceptors`)
//! - the custom-serialization member `get_object_data` (cargo feature
//!   `serialization`)
//! - copies of the target type's non-inheritable attributes
//!
//! How the target is reached differs per [`ProxyKind`].
//!
//! [`ClassEmitter`]: proxy_ir::ClassEmitter

mod contributor;
mod instance;
mod interface_set;
mod kind;
pub mod names;
#[cfg(feature = "serialization")]
mod serialization;

pub use contributor::{
    InterceptAll, MetaMethod, MetaType, ProxyGenerationHook, ProxyTypeId, TypeContributor,
};
pub use instance::ProxyInstanceContributor;
pub use interface_set::InterfaceSet;
pub use kind::ProxyKind;
#[cfg(feature = "serialization")]
pub use serialization::ObjectDataWriter;

/// Whether generated types carry the custom-serialization member.
pub const SERIALIZATION: bool = cfg!(feature = "serialization");
