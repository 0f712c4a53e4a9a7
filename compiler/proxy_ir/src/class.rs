//! The type-under-construction.
//!
//! A [`ClassEmitter`] is the mutable builder every contributor in one
//! generation pass appends to. Fields are unique by name; methods are unique
//! by `(name, parameter types)`, so overloads are allowed. Contributors only
//! ever append: nothing here removes or rewrites a member.
//!
//! [`ClassEmitter::finish`] seals every body, validates it and produces the
//! immutable [`GeneratedType`] handed to the external emitter.

use rustc_hash::FxHashMap;

use crate::validate::validate_method;
use crate::{
    BuildError, CustomAttribute, FieldFlags, FieldId, FieldRef, MemberKind, MethodEmitter,
    MethodId, TypeId, TypeInfo, TypePool,
};

/// A declared field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    name: String,
    reference: FieldRef,
}

impl FieldDecl {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> FieldRef {
        self.reference
    }

    pub fn ty(&self) -> TypeId {
        self.reference.ty()
    }

    pub fn flags(&self) -> FieldFlags {
        self.reference.flags()
    }

    pub fn is_static(&self) -> bool {
        self.reference.is_static()
    }

    pub fn is_serializable(&self) -> bool {
        self.reference.is_serializable()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MethodKey {
    name: String,
    params: Vec<TypeId>,
}

impl MethodKey {
    fn new(name: &str, params: &[TypeId]) -> Self {
        Self {
            name: name.to_owned(),
            params: params.to_vec(),
        }
    }
}

/// Mutable builder for a generated type.
pub struct ClassEmitter {
    ty: TypeId,
    name: String,
    base: TypeId,
    interfaces: Vec<TypeId>,
    fields: Vec<FieldDecl>,
    field_index: FxHashMap<String, FieldId>,
    methods: Vec<MethodEmitter>,
    method_index: FxHashMap<MethodKey, MethodId>,
    attributes: Vec<CustomAttribute>,
}

/// Read-only view of a [`ClassEmitter`]'s identity and fields.
///
/// Obtained alongside a mutable method via
/// [`ClassEmitter::split_method`], so a body can be built while the
/// type's fields are inspected.
#[derive(Clone, Copy)]
pub struct ClassView<'a> {
    ty: TypeId,
    name: &'a str,
    base: TypeId,
    interfaces: &'a [TypeId],
    fields: &'a [FieldDecl],
    field_index: &'a FxHashMap<String, FieldId>,
}

impl<'a> ClassView<'a> {
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn base_type(&self) -> TypeId {
        self.base
    }

    pub fn interfaces(&self) -> &'a [TypeId] {
        self.interfaces
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &'a [FieldDecl] {
        self.fields
    }

    pub fn get_field(&self, name: &str) -> Option<FieldRef> {
        self.field_index
            .get(name)
            .map(|id| self.fields[id.index()].reference())
    }

    /// Look up a field the caller cannot proceed without.
    pub fn require_field(&self, name: &str) -> Result<FieldRef, BuildError> {
        self.get_field(name).ok_or_else(|| BuildError::MissingField {
            owner: self.name.to_owned(),
            name: name.to_owned(),
        })
    }
}

impl ClassEmitter {
    /// Define the generated type in `pool` and start building it.
    pub fn new(
        pool: &mut TypePool,
        name: &str,
        qualified_name: &str,
        base: TypeId,
        interfaces: &[TypeId],
    ) -> Result<Self, BuildError> {
        let info = interfaces.iter().fold(
            TypeInfo::class(name, qualified_name).with_base(base),
            |info, &interface| info.with_interface(interface),
        );
        let ty = pool.define(info)?;
        tracing::debug!(
            name,
            base = pool.name(base),
            interfaces = interfaces.len(),
            "started type-under-construction"
        );
        Ok(Self {
            ty,
            name: name.to_owned(),
            base,
            interfaces: interfaces.to_vec(),
            fields: Vec::new(),
            field_index: FxHashMap::default(),
            methods: Vec::new(),
            method_index: FxHashMap::default(),
            attributes: Vec::new(),
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_type(&self) -> TypeId {
        self.base
    }

    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    pub fn view(&self) -> ClassView<'_> {
        ClassView {
            ty: self.ty,
            name: &self.name,
            base: self.base,
            interfaces: &self.interfaces,
            fields: &self.fields,
            field_index: &self.field_index,
        }
    }

    // Fields

    /// Declare an instance field.
    pub fn declare_field(
        &mut self,
        name: &str,
        ty: TypeId,
        serializable: bool,
    ) -> Result<FieldRef, BuildError> {
        let flags = if serializable {
            FieldFlags::empty()
        } else {
            FieldFlags::NOT_SERIALIZED
        };
        self.declare_field_with_flags(name, ty, flags)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "field indices never exceed u32"
    )]
    pub fn declare_field_with_flags(
        &mut self,
        name: &str,
        ty: TypeId,
        flags: FieldFlags,
    ) -> Result<FieldRef, BuildError> {
        if self.field_index.contains_key(name) {
            return Err(self.duplicate(MemberKind::Field, name));
        }
        let id = FieldId::new(self.fields.len() as u32);
        let reference = FieldRef::new(id, ty, flags);
        self.fields.push(FieldDecl {
            name: name.to_owned(),
            reference,
        });
        self.field_index.insert(name.to_owned(), id);
        tracing::debug!(owner = %self.name, field = name, ?flags, "declared field");
        Ok(reference)
    }

    /// Reuse a field declared by an earlier contributor.
    pub fn get_field(&self, name: &str) -> Option<FieldRef> {
        self.view().get_field(name)
    }

    pub fn field(&self, id: FieldId) -> &FieldDecl {
        &self.fields[id.index()]
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    // Methods

    /// Allocate a method slot with an empty body.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "method indices never exceed u32"
    )]
    pub fn create_method(
        &mut self,
        name: &str,
        return_type: TypeId,
        params: &[TypeId],
    ) -> Result<MethodId, BuildError> {
        let key = MethodKey::new(name, params);
        if self.method_index.contains_key(&key) {
            return Err(self.duplicate(MemberKind::Method, name));
        }
        let id = MethodId::new(self.methods.len() as u32);
        self.methods
            .push(MethodEmitter::new(id, self.ty, name, return_type, params));
        self.method_index.insert(key, id);
        tracing::debug!(owner = %self.name, method = name, params = params.len(), "created method");
        Ok(id)
    }

    pub fn find_method(&self, name: &str, params: &[TypeId]) -> Option<MethodId> {
        self.method_index
            .get(&MethodKey::new(name, params))
            .copied()
    }

    pub fn method(&self, id: MethodId) -> &MethodEmitter {
        &self.methods[id.index()]
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodEmitter {
        &mut self.methods[id.index()]
    }

    /// Borrow one method mutably together with a read-only view of the type.
    pub fn split_method(&mut self, id: MethodId) -> (&mut MethodEmitter, ClassView<'_>) {
        let view = ClassView {
            ty: self.ty,
            name: &self.name,
            base: self.base,
            interfaces: &self.interfaces,
            fields: &self.fields,
            field_index: &self.field_index,
        };
        (&mut self.methods[id.index()], view)
    }

    pub fn methods(&self) -> &[MethodEmitter] {
        &self.methods
    }

    // Metadata

    pub fn define_custom_attribute(&mut self, attribute: CustomAttribute) {
        tracing::debug!(owner = %self.name, attribute = %attribute.type_name, "copied attribute");
        self.attributes.push(attribute);
    }

    pub fn attributes(&self) -> &[CustomAttribute] {
        &self.attributes
    }

    fn duplicate(&self, kind: MemberKind, name: &str) -> BuildError {
        BuildError::DuplicateMember {
            owner: self.name.clone(),
            kind,
            name: name.to_owned(),
        }
    }

    // Completion

    /// Finalize every method body.
    pub fn seal(&mut self) {
        for method in &mut self.methods {
            method.finalize();
        }
    }

    /// Seal, validate and freeze the type.
    pub fn finish(mut self) -> Result<GeneratedType, BuildError> {
        self.seal();
        for method in &self.methods {
            validate_method(method)?;
        }
        tracing::debug!(
            name = %self.name,
            fields = self.fields.len(),
            methods = self.methods.len(),
            "finished generated type"
        );
        Ok(GeneratedType {
            ty: self.ty,
            name: self.name,
            base: self.base,
            interfaces: self.interfaces,
            fields: self.fields,
            methods: self.methods,
            attributes: self.attributes,
        })
    }
}

/// A fully built, validated type ready for lowering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedType {
    ty: TypeId,
    name: String,
    base: TypeId,
    interfaces: Vec<TypeId>,
    fields: Vec<FieldDecl>,
    methods: Vec<MethodEmitter>,
    attributes: Vec<CustomAttribute>,
}

impl GeneratedType {
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_type(&self) -> TypeId {
        self.base
    }

    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> &FieldDecl {
        &self.fields[id.index()]
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn methods(&self) -> &[MethodEmitter] {
        &self.methods
    }

    pub fn method(&self, id: MethodId) -> &MethodEmitter {
        &self.methods[id.index()]
    }

    pub fn find_method(&self, name: &str, params: &[TypeId]) -> Option<&MethodEmitter> {
        self.methods
            .iter()
            .find(|method| method.name() == name && method.param_types() == params)
    }

    /// First method with the given name, ignoring overloads.
    pub fn method_by_name(&self, name: &str) -> Option<&MethodEmitter> {
        self.methods.iter().find(|method| method.name() == name)
    }

    pub fn attributes(&self) -> &[CustomAttribute] {
        &self.attributes
    }
}
