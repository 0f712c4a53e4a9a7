//! Proxy kinds and the per-kind extension points.
//!
//! The two kinds differ in where the wrapped instance lives:
//!
//! | Kind | Target | `set_proxy_target` |
//! |------|--------|--------------------|
//! | [`ProxyKind::Interface`] | the generated instance, viewed as the target interface | always fails at run time |
//! | [`ProxyKind::Class`] | the reserved `__target` field | stores the converted argument |

use proxy_ir::{BuildError, ClassView, Reference, TypeId, TypePool};

#[cfg(feature = "serialization")]
use proxy_ir::ArgumentRef;

#[cfg(feature = "serialization")]
use crate::names::keys;
use crate::names::TARGET_FIELD;
#[cfg(feature = "serialization")]
use crate::ObjectDataWriter;
use crate::ProxyTypeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// The proxy implements the target interface itself and has no separate
    /// target storage.
    Interface,
    /// The proxy wraps an instance held in the `__target` field.
    Class,
}

impl ProxyKind {
    /// Type id persisted when the request does not supply one.
    pub fn default_type_id(self) -> ProxyTypeId {
        match self {
            ProxyKind::Interface => ProxyTypeId::from("interface.without.target"),
            ProxyKind::Class => ProxyTypeId::from("class.with.target"),
        }
    }

    /// Does the target live in its own field?
    pub fn is_field_backed(self) -> bool {
        matches!(self, ProxyKind::Class)
    }

    /// Where the generated type finds its target.
    pub fn target_reference(
        self,
        class: ClassView<'_>,
        pool: &TypePool,
        target: TypeId,
    ) -> Result<Reference, BuildError> {
        match self {
            ProxyKind::Interface => {
                if pool.is_assignable(class.type_id(), target) {
                    Ok(Reference::This(target))
                } else {
                    Err(BuildError::mismatch(pool, target, class.type_id()))
                }
            }
            ProxyKind::Class => class.require_field(TARGET_FIELD).map(Reference::Field),
        }
    }

    /// Append the kind-specific payload entries.
    #[cfg(feature = "serialization")]
    pub fn customize_get_object_data(
        self,
        writer: &mut ObjectDataWriter<'_>,
        context: ArgumentRef,
        class: ClassView<'_>,
        target: TypeId,
    ) -> Result<(), BuildError> {
        match self {
            ProxyKind::Interface => {
                let interface = writer.pool().qualified_name(target).to_owned();
                writer.add_string(keys::THE_INTERFACE, &interface)?;
                let base = class.base_type();
                let delegate = writer.pool().is_assignable(base, TypeId::SERIALIZABLE);
                writer.add_bool(keys::DELEGATE_TO_BASE, delegate)?;
                if delegate {
                    writer.call_base(base, context)?;
                }
                Ok(())
            }
            ProxyKind::Class => {
                let field = class.require_field(TARGET_FIELD)?;
                let field_type = writer.pool().qualified_name(field.ty()).to_owned();
                writer.add_string(keys::TARGET_FIELD_TYPE, &field_type)
            }
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
