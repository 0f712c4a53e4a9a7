//! Descriptors for methods an `Invoke` node can call.

use crate::TypeId;

/// Signature of a callable method on some type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodDesc {
    owner: TypeId,
    name: String,
    params: Vec<TypeId>,
    return_type: TypeId,
    is_static: bool,
}

impl MethodDesc {
    pub fn new_static(
        owner: TypeId,
        name: impl Into<String>,
        params: &[TypeId],
        return_type: TypeId,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            params: params.to_vec(),
            return_type,
            is_static: true,
        }
    }

    pub fn new_instance(
        owner: TypeId,
        name: impl Into<String>,
        params: &[TypeId],
        return_type: TypeId,
    ) -> Self {
        Self {
            is_static: false,
            ..Self::new_static(owner, name, params, return_type)
        }
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeId] {
        &self.params
    }

    pub fn return_type(&self) -> TypeId {
        self.return_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

/// Runtime methods generated bodies call into.
pub mod well_known {
    use super::MethodDesc;
    use crate::TypeId;

    pub const GET_TYPE: &str = "get_type";
    pub const SET_TYPE: &str = "set_type";
    pub const ADD_VALUE: &str = "add_value";
    pub const GET_OBJECT_DATA: &str = "get_object_data";

    /// `static Type::get_type(qualified_name, throw_on_error, ignore_case) -> Type`
    pub fn type_get_type() -> MethodDesc {
        MethodDesc::new_static(
            TypeId::TYPE,
            GET_TYPE,
            &[TypeId::STRING, TypeId::BOOL, TypeId::BOOL],
            TypeId::TYPE,
        )
    }

    /// `SerializationInfo::set_type(type)`: the type to reconstruct from.
    pub fn info_set_type() -> MethodDesc {
        MethodDesc::new_instance(
            TypeId::SERIALIZATION_INFO,
            SET_TYPE,
            &[TypeId::TYPE],
            TypeId::VOID,
        )
    }

    /// `SerializationInfo::add_value(key, value)`
    pub fn info_add_value() -> MethodDesc {
        MethodDesc::new_instance(
            TypeId::SERIALIZATION_INFO,
            ADD_VALUE,
            &[TypeId::STRING, TypeId::OBJECT],
            TypeId::VOID,
        )
    }

    /// `owner::get_object_data(info, context)`, the supply-serialized-state
    /// signature.
    pub fn get_object_data(owner: TypeId) -> MethodDesc {
        MethodDesc::new_instance(
            owner,
            GET_OBJECT_DATA,
            &[TypeId::SERIALIZATION_INFO, TypeId::STREAMING_CONTEXT],
            TypeId::VOID,
        )
    }
}
