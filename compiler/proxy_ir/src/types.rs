//! Type pool for proxy synthesis.
//!
//! `TypeId` is a 32-bit handle into a [`TypePool`]. Types are compared by
//! index equality. The types every generated member relies on (the top type,
//! strings, interceptor arrays, the serialization types) are pre-interned at
//! fixed indices so contributors can name them without a lookup.
//!
//! # Assignability
//!
//! The pool answers the two questions the IR asks when nodes are built:
//!
//! - [`TypePool::is_assignable`]: may a value of `from` be stored where `to`
//!   is declared? Follows class base chains, implemented interfaces, interface
//!   inheritance and array covariance. Everything except `void` is assignable
//!   to [`TypeId::OBJECT`].
//! - [`TypePool::are_related`]: may a `Convert` node cast between the two
//!   types at all?
//!
//! Definitions may only reference types that already exist, so the
//! inheritance graph is acyclic by construction.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::BuildError;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Well-known types (indices 0-16) ===

    /// No value. Only valid as a method return type.
    pub const VOID: Self = Self(0);
    /// The universal top type.
    pub const OBJECT: Self = Self(1);
    pub const BOOL: Self = Self(2);
    pub const INT32: Self = Self(3);
    pub const STRING: Self = Self(4);
    /// Runtime type handle, produced by the static type lookup.
    pub const TYPE: Self = Self(5);
    /// Root of all throwable types.
    pub const EXCEPTION: Self = Self(6);
    /// Raised when an operation is invalid for the object's current shape.
    pub const INVALID_OPERATION: Self = Self(7);
    pub const INTERCEPTOR: Self = Self(8);
    /// `Interceptor[]`, the type of the reserved interceptor-list field.
    pub const INTERCEPTOR_ARRAY: Self = Self(9);
    pub const STRING_ARRAY: Self = Self(10);
    /// Receives the key/value payload of a custom-serialization member.
    pub const SERIALIZATION_INFO: Self = Self(11);
    pub const STREAMING_CONTEXT: Self = Self(12);
    /// Opaque options object stored on every generated type.
    pub const PROXY_GENERATION_OPTIONS: Self = Self(13);
    /// The type the external reconstruction path deserializes proxies through.
    pub const PROXY_OBJECT_REFERENCE: Self = Self(14);
    /// Interface exposing the instance-accessor triad.
    pub const PROXY_TARGET_ACCESSOR: Self = Self(15);
    /// Interface of types that supply their own serialized state.
    pub const SERIALIZABLE: Self = Self(16);

    /// Number of pre-interned types.
    pub const WELL_KNOWN_COUNT: u32 = 17;

    /// Create an index from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is one of the pre-interned types.
    #[inline]
    pub const fn is_well_known(self) -> bool {
        self.0 < Self::WELL_KNOWN_COUNT
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// A custom attribute declared on a type.
///
/// Only attributes with `inherited == false` are copied onto generated
/// types; inherited ones reach the generated type through its base.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomAttribute {
    pub type_name: String,
    pub inherited: bool,
    pub args: Vec<String>,
}

impl CustomAttribute {
    /// An inheritable attribute with no arguments.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            inherited: true,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn non_inherited(mut self) -> Self {
        self.inherited = false;
        self
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Shape of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Object,
    /// Built-in value types (`bool`, `i32`, `string`).
    Primitive,
    Class {
        base: Option<TypeId>,
        interfaces: Vec<TypeId>,
    },
    Interface {
        extends: Vec<TypeId>,
    },
    Array {
        element: TypeId,
    },
}

/// Everything the pool knows about one type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    name: String,
    qualified_name: String,
    kind: TypeKind,
    attributes: Vec<CustomAttribute>,
}

impl TypeInfo {
    /// A class deriving directly from [`TypeId::OBJECT`].
    pub fn class(name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            qualified_name,
            TypeKind::Class {
                base: Some(TypeId::OBJECT),
                interfaces: Vec::new(),
            },
        )
    }

    pub fn interface(name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            qualified_name,
            TypeKind::Interface {
                extends: Vec::new(),
            },
        )
    }

    fn with_kind(
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        kind: TypeKind,
    ) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            kind,
            attributes: Vec::new(),
        }
    }

    /// Set the base class. Ignored for anything but classes.
    #[must_use]
    pub fn with_base(mut self, base: TypeId) -> Self {
        debug_assert!(
            matches!(self.kind, TypeKind::Class { .. }),
            "with_base on non-class type `{}`",
            self.name,
        );
        if let TypeKind::Class { base: slot, .. } = &mut self.kind {
            *slot = Some(base);
        }
        self
    }

    /// Add an implemented (class) or extended (interface) interface.
    #[must_use]
    pub fn with_interface(mut self, interface: TypeId) -> Self {
        debug_assert!(
            self.is_class() || self.is_interface(),
            "with_interface on `{}`",
            self.name,
        );
        match &mut self.kind {
            TypeKind::Class { interfaces, .. } => interfaces.push(interface),
            TypeKind::Interface { extends } => extends.push(interface),
            TypeKind::Void | TypeKind::Object | TypeKind::Primitive | TypeKind::Array { .. } => {}
        }
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn attributes(&self) -> &[CustomAttribute] {
        &self.attributes
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface { .. })
    }

    /// Types referenced by this definition.
    fn referenced(&self) -> Vec<TypeId> {
        match &self.kind {
            TypeKind::Class { base, interfaces } => {
                base.iter().chain(interfaces.iter()).copied().collect()
            }
            TypeKind::Interface { extends } => extends.clone(),
            TypeKind::Array { element } => vec![*element],
            TypeKind::Void | TypeKind::Object | TypeKind::Primitive => Vec::new(),
        }
    }
}

/// Snapshot of the pool size, used to discard types defined by a failed pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolCheckpoint(usize);

/// Type storage for one generation session.
pub struct TypePool {
    types: Vec<TypeInfo>,
    by_name: FxHashMap<String, TypeId>,
    /// Element type → array type.
    arrays: FxHashMap<TypeId, TypeId>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    /// Create a pool with the well-known types pre-interned.
    pub fn new() -> Self {
        let mut pool = Self {
            types: Vec::with_capacity(64),
            by_name: FxHashMap::default(),
            arrays: FxHashMap::default(),
        };
        pool.intern_well_known();
        pool
    }

    fn intern_well_known(&mut self) {
        let rt = |name: &str| format!("rt.{name}");
        let proxy = |name: &str| format!("proxy.{name}");
        let primitive =
            |name: &str, qualified: String| TypeInfo::with_kind(name, qualified, TypeKind::Primitive);

        let well_known = [
            (
                TypeId::VOID,
                TypeInfo::with_kind("void", rt("Void"), TypeKind::Void),
            ),
            (
                TypeId::OBJECT,
                TypeInfo::with_kind("object", rt("Object"), TypeKind::Object),
            ),
            (TypeId::BOOL, primitive("bool", rt("Bool"))),
            (TypeId::INT32, primitive("i32", rt("Int32"))),
            (TypeId::STRING, primitive("string", rt("String"))),
            (TypeId::TYPE, TypeInfo::class("Type", rt("Type"))),
            (TypeId::EXCEPTION, TypeInfo::class("Exception", rt("Exception"))),
            (
                TypeId::INVALID_OPERATION,
                TypeInfo::class("InvalidOperation", rt("InvalidOperation"))
                    .with_base(TypeId::EXCEPTION),
            ),
            (
                TypeId::INTERCEPTOR,
                TypeInfo::interface("Interceptor", proxy("Interceptor")),
            ),
            (
                TypeId::INTERCEPTOR_ARRAY,
                Self::array_info("Interceptor", &proxy("Interceptor"), TypeId::INTERCEPTOR),
            ),
            (
                TypeId::STRING_ARRAY,
                Self::array_info("string", &rt("String"), TypeId::STRING),
            ),
            (
                TypeId::SERIALIZATION_INFO,
                TypeInfo::class("SerializationInfo", rt("SerializationInfo")),
            ),
            (
                TypeId::STREAMING_CONTEXT,
                TypeInfo::class("StreamingContext", rt("StreamingContext")),
            ),
            (
                TypeId::PROXY_GENERATION_OPTIONS,
                TypeInfo::class("GenerationOptions", proxy("GenerationOptions")),
            ),
            (
                TypeId::PROXY_OBJECT_REFERENCE,
                TypeInfo::class("ProxyObjectReference", proxy("ProxyObjectReference")),
            ),
            (
                TypeId::PROXY_TARGET_ACCESSOR,
                TypeInfo::interface("ProxyTargetAccessor", proxy("ProxyTargetAccessor")),
            ),
            (
                TypeId::SERIALIZABLE,
                TypeInfo::interface("Serializable", rt("Serializable")),
            ),
        ];

        for (expected, info) in well_known {
            let id = self.push(info);
            debug_assert_eq!(id, expected, "well-known type interned out of order");
        }
    }

    fn array_info(element_name: &str, element_qualified: &str, element: TypeId) -> TypeInfo {
        TypeInfo::with_kind(
            format!("{element_name}[]"),
            format!("{element_qualified}[]"),
            TypeKind::Array { element },
        )
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "type indices never exceed u32"
    )]
    fn push(&mut self, info: TypeInfo) -> TypeId {
        let id = TypeId::from_raw(self.types.len() as u32);
        self.by_name
            .entry(info.qualified_name.clone())
            .or_insert(id);
        if let TypeKind::Array { element } = info.kind {
            self.arrays.entry(element).or_insert(id);
        }
        self.types.push(info);
        id
    }

    /// Define a new type.
    ///
    /// Fails if the qualified name is taken or the definition references a
    /// type that does not exist yet.
    pub fn define(&mut self, info: TypeInfo) -> Result<TypeId, BuildError> {
        if self.by_name.contains_key(info.qualified_name()) {
            return Err(BuildError::DuplicateType(info.qualified_name));
        }
        if let Some(unknown) = info
            .referenced()
            .into_iter()
            .find(|id| id.index() >= self.types.len())
        {
            return Err(BuildError::UnknownType(unknown.raw()));
        }
        Ok(self.push(info))
    }

    /// Get (or intern) the array type with the given element type.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        if let Some(&id) = self.arrays.get(&element) {
            return id;
        }
        let element_info = self.get(element);
        let info = Self::array_info(element_info.name(), element_info.qualified_name(), element);
        self.push(info)
    }

    /// Look up an already-interned array type.
    pub fn find_array(&self, element: TypeId) -> Option<TypeId> {
        self.arrays.get(&element).copied()
    }

    pub fn get(&self, id: TypeId) -> &TypeInfo {
        debug_assert!(
            id.index() < self.types.len(),
            "TypeId {} out of bounds (pool has {} types)",
            id.raw(),
            self.types.len(),
        );
        &self.types[id.index()]
    }

    pub fn name(&self, id: TypeId) -> &str {
        self.get(id).name()
    }

    pub fn qualified_name(&self, id: TypeId) -> &str {
        self.get(id).qualified_name()
    }

    /// Resolve a type by qualified name.
    pub fn lookup(&self, qualified_name: &str) -> Option<TypeId> {
        self.by_name.get(qualified_name).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Element type of an array type.
    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id).kind {
            TypeKind::Array { element } => Some(element),
            _ => None,
        }
    }

    /// Base class of a class type.
    pub fn base_type(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id).kind {
            TypeKind::Class { base, .. } => base,
            _ => None,
        }
    }

    /// Can a value of type `from` be stored in a location declared as `to`?
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        if from == TypeId::VOID || to == TypeId::VOID {
            return false;
        }
        if to == TypeId::OBJECT {
            return true;
        }
        match &self.get(from).kind {
            TypeKind::Class { base, interfaces } => {
                base.is_some_and(|base| self.is_assignable(base, to))
                    || interfaces.iter().any(|&i| self.is_assignable(i, to))
            }
            TypeKind::Interface { extends } => extends.iter().any(|&i| self.is_assignable(i, to)),
            TypeKind::Array { element } => match self.get(to).kind {
                TypeKind::Array { element: target } => self.is_assignable(*element, target),
                _ => false,
            },
            TypeKind::Void | TypeKind::Object | TypeKind::Primitive => false,
        }
    }

    /// Can a `Convert` node cast between `a` and `b`?
    ///
    /// True for identical types, for any non-void type paired with the top
    /// type, and for types assignable in either direction.
    pub fn are_related(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        if a == TypeId::VOID || b == TypeId::VOID {
            return false;
        }
        a == TypeId::OBJECT
            || b == TypeId::OBJECT
            || self.is_assignable(a, b)
            || self.is_assignable(b, a)
    }

    pub fn is_exception(&self, id: TypeId) -> bool {
        self.is_assignable(id, TypeId::EXCEPTION)
    }

    /// Attributes of `id` that subclasses do not inherit.
    pub fn non_inheritable_attributes(
        &self,
        id: TypeId,
    ) -> impl Iterator<Item = &CustomAttribute> + '_ {
        self.get(id).attributes().iter().filter(|attr| !attr.inherited)
    }

    pub fn checkpoint(&self) -> PoolCheckpoint {
        PoolCheckpoint(self.types.len())
    }

    /// Remove every type defined after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: PoolCheckpoint) {
        let len = checkpoint.0.max(TypeId::WELL_KNOWN_COUNT as usize);
        if len >= self.types.len() {
            return;
        }
        tracing::debug!(
            discarded = self.types.len() - len,
            "rolling type pool back to checkpoint"
        );
        self.types.truncate(len);
        self.by_name.retain(|_, id| id.index() < len);
        self.arrays
            .retain(|element, array| element.index() < len && array.index() < len);
    }
}
