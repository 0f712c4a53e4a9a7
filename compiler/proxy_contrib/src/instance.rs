//! The proxy instance contributor.
//!
//! Adds the members every generated proxy instance exposes regardless of
//! which target members are intercepted:
//!
//! ```text
//! fn get_proxy_target() -> object            // target viewed as object
//! fn set_proxy_target(arg0: object) -> void  // store, or throw when not field-backed
//! fn get_interceptors() -> Interceptor[]     // the __interceptors field, uncopied
//! fn get_object_data(arg0: SerializationInfo, arg1: StreamingContext) -> void
//! ```
//!
//! `get_object_data` is only emitted with the `serialization` feature.

use proxy_ir::{BuildError, ClassEmitter, CustomAttribute, FieldRef, Reference, TypeId, TypePool};

#[cfg(feature = "serialization")]
use proxy_ir::well_known;

#[cfg(feature = "serialization")]
use crate::names::keys;
use crate::names::{
    GET_INTERCEPTORS, GET_PROXY_TARGET, IMMUTABLE_TARGET_MESSAGE, INTERCEPTORS_FIELD,
    SET_PROXY_TARGET,
};
#[cfg(feature = "serialization")]
use crate::{names::GENERATION_OPTIONS_FIELD, ObjectDataWriter};
use crate::{InterfaceSet, MetaType, ProxyGenerationHook, ProxyKind, ProxyTypeId, TypeContributor};

/// Contributes the accessor triad, the serialization member and attribute
/// copies to a generated proxy.
///
/// Expects the orchestrator to have declared `__interceptors` (and, for
/// [`ProxyKind::Class`], `__target`) before it runs. It should run after every
/// other contributor so the serialization member sees all fields.
#[derive(Clone, Debug)]
pub struct ProxyInstanceContributor {
    kind: ProxyKind,
    target_type: TypeId,
    interfaces: InterfaceSet,
    proxy_type_id: ProxyTypeId,
}

impl ProxyInstanceContributor {
    pub fn new(
        kind: ProxyKind,
        target_type: TypeId,
        interfaces: InterfaceSet,
        proxy_type_id: ProxyTypeId,
    ) -> Self {
        Self {
            kind,
            target_type,
            interfaces,
            proxy_type_id,
        }
    }

    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    pub fn target_type(&self) -> TypeId {
        self.target_type
    }

    pub fn interfaces(&self) -> &InterfaceSet {
        &self.interfaces
    }

    pub fn proxy_type_id(&self) -> &ProxyTypeId {
        &self.proxy_type_id
    }

    fn implement_proxy_target_accessor(
        class: &mut ClassEmitter,
        pool: &TypePool,
        target: Reference,
        interceptors: FieldRef,
    ) -> Result<(), BuildError> {
        Self::implement_get_proxy_target(class, pool, target)?;
        Self::implement_set_proxy_target(class, pool, target)?;
        Self::implement_get_interceptors(class, pool, interceptors)
    }

    fn implement_get_proxy_target(
        class: &mut ClassEmitter,
        pool: &TypePool,
        target: Reference,
    ) -> Result<(), BuildError> {
        let id = class.create_method(GET_PROXY_TARGET, TypeId::OBJECT, &[])?;
        let method = class.method_mut(id);
        let body = method.body_mut();
        let value = body.read(pool, target)?;
        let value = body.convert(pool, value, TypeId::OBJECT)?;
        body.ret(pool, Some(value))?;
        method.finalize();
        Ok(())
    }

    fn implement_set_proxy_target(
        class: &mut ClassEmitter,
        pool: &TypePool,
        target: Reference,
    ) -> Result<(), BuildError> {
        let id = class.create_method(SET_PROXY_TARGET, TypeId::VOID, &[TypeId::OBJECT])?;
        let method = class.method_mut(id);
        let new_target = method.arguments()[0];
        let body = method.body_mut();
        match target.as_field() {
            Some(field) => {
                let value = body.read(pool, new_target)?;
                let value = body.convert(pool, value, field.ty())?;
                body.assign(pool, field, value)?;
                body.ret(pool, None)?;
            }
            // Throw is terminal, so no return follows it.
            None => body.throw(pool, TypeId::INVALID_OPERATION, IMMUTABLE_TARGET_MESSAGE)?,
        }
        method.finalize();
        Ok(())
    }

    fn implement_get_interceptors(
        class: &mut ClassEmitter,
        pool: &TypePool,
        interceptors: FieldRef,
    ) -> Result<(), BuildError> {
        let id = class.create_method(GET_INTERCEPTORS, TypeId::INTERCEPTOR_ARRAY, &[])?;
        let method = class.method_mut(id);
        let body = method.body_mut();
        let value = body.read(pool, interceptors)?;
        body.ret(pool, Some(value))?;
        method.finalize();
        Ok(())
    }

    #[cfg(feature = "serialization")]
    fn implement_get_object_data(
        &self,
        class: &mut ClassEmitter,
        pool: &mut TypePool,
    ) -> Result<(), BuildError> {
        let id = class.create_method(
            well_known::GET_OBJECT_DATA,
            TypeId::VOID,
            &[TypeId::SERIALIZATION_INFO, TypeId::STREAMING_CONTEXT],
        )?;
        let reconstruction = pool
            .qualified_name(TypeId::PROXY_OBJECT_REFERENCE)
            .to_owned();
        let base_type = pool.qualified_name(class.base_type()).to_owned();
        let interfaces: Vec<String> = self
            .interfaces
            .qualified_names(pool)
            .map(str::to_owned)
            .collect();

        let (method, view) = class.split_method(id);
        let info = method.arguments()[0];
        let context = method.arguments()[1];
        let mut writer = ObjectDataWriter::new(method.body_mut(), pool, info);

        writer.set_reconstruction_type(&reconstruction)?;
        for field in view
            .fields()
            .iter()
            .filter(|field| !field.is_static() && field.is_serializable())
        {
            writer.add_field(field.name(), field.reference())?;
        }
        writer.add_string_array(keys::INTERFACES, &interfaces)?;
        writer.add_string(keys::BASE_TYPE, &base_type)?;
        let options = view.require_field(GENERATION_OPTIONS_FIELD)?;
        writer.add_field(keys::PROXY_GENERATION_OPTIONS, options)?;
        writer.add_string(keys::PROXY_TYPE_ID, self.proxy_type_id.as_str())?;
        self.kind
            .customize_get_object_data(&mut writer, context, view, self.target_type)?;
        writer.finish()?;

        method.finalize();
        Ok(())
    }

    fn copy_attributes(&self, class: &mut ClassEmitter, pool: &TypePool) {
        let attributes: Vec<CustomAttribute> = pool
            .non_inheritable_attributes(self.target_type)
            .cloned()
            .collect();
        for attribute in attributes {
            class.define_custom_attribute(attribute);
        }
    }
}

impl TypeContributor for ProxyInstanceContributor {
    /// Member selection belongs to other contributors.
    fn collect_elements_to_proxy(&mut self, _hook: &dyn ProxyGenerationHook, _model: &mut MetaType) {}

    fn generate(&self, class: &mut ClassEmitter, pool: &mut TypePool) -> Result<(), BuildError> {
        let interceptors = class.view().require_field(INTERCEPTORS_FIELD)?;
        let target = self
            .kind
            .target_reference(class.view(), pool, self.target_type)?;

        #[cfg(feature = "serialization")]
        self.implement_get_object_data(class, pool)?;

        Self::implement_proxy_target_accessor(class, pool, target, interceptors)?;
        self.copy_attributes(class, pool);

        tracing::debug!(
            proxy = class.name(),
            kind = ?self.kind,
            type_id = %self.proxy_type_id,
            "contributed proxy instance members"
        );
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
