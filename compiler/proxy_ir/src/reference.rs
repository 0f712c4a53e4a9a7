//! Typed handles to storage locations.
//!
//! A [`Reference`] names something a member body can read and (usually)
//! write: a field of the generated type, an argument or local of the
//! enclosing method, or the generated instance itself. Handles are `Copy`
//! and carry their declared type, which never changes after creation.
//!
//! Fields are owned by the [`ClassEmitter`](crate::ClassEmitter); arguments
//! and locals by the method they were allocated in, which they record so a
//! body can reject references that leaked in from another method.

use bitflags::bitflags;

use crate::{MethodId, TypeId};

bitflags! {
    /// Storage attributes of a declared field.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FieldFlags: u8 {
        /// One slot per type rather than per instance.
        const STATIC = 1 << 0;
        /// Excluded from the custom-serialization payload.
        const NOT_SERIALIZED = 1 << 1;
        /// Cannot be the target of an `Assign` in a generated method.
        const READ_ONLY = 1 << 2;
    }
}

/// Index of a field within its type-under-construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct FieldId(u32);

impl FieldId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    id: FieldId,
    ty: TypeId,
    flags: FieldFlags,
}

impl FieldRef {
    pub(crate) fn new(id: FieldId, ty: TypeId, flags: FieldFlags) -> Self {
        Self { id, ty, flags }
    }

    pub fn id(self) -> FieldId {
        self.id
    }

    pub fn ty(self) -> TypeId {
        self.ty
    }

    pub fn flags(self) -> FieldFlags {
        self.flags
    }

    pub fn is_static(self) -> bool {
        self.flags.contains(FieldFlags::STATIC)
    }

    pub fn is_serializable(self) -> bool {
        !self.flags.contains(FieldFlags::NOT_SERIALIZED)
    }
}

/// Positional argument of a method, `Arguments[index]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArgumentRef {
    method: MethodId,
    index: u16,
    ty: TypeId,
}

impl ArgumentRef {
    pub(crate) fn new(method: MethodId, index: u16, ty: TypeId) -> Self {
        Self { method, index, ty }
    }

    pub fn method(self) -> MethodId {
        self.method
    }

    pub fn index(self) -> usize {
        usize::from(self.index)
    }

    pub fn ty(self) -> TypeId {
        self.ty
    }
}

/// Local variable scoped to one method body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalRef {
    method: MethodId,
    index: u16,
    ty: TypeId,
}

impl LocalRef {
    pub(crate) fn new(method: MethodId, index: u16, ty: TypeId) -> Self {
        Self { method, index, ty }
    }

    pub fn method(self) -> MethodId {
        self.method
    }

    pub fn index(self) -> usize {
        usize::from(self.index)
    }

    pub fn ty(self) -> TypeId {
        self.ty
    }
}

/// A typed storage location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reference {
    /// The generated instance itself, viewed as one of its supertypes.
    This(TypeId),
    Field(FieldRef),
    Argument(ArgumentRef),
    Local(LocalRef),
}

impl Reference {
    /// Declared type of the location.
    pub fn ty(self) -> TypeId {
        match self {
            Reference::This(ty) => ty,
            Reference::Field(field) => field.ty(),
            Reference::Argument(arg) => arg.ty(),
            Reference::Local(local) => local.ty(),
        }
    }

    pub fn as_field(self) -> Option<FieldRef> {
        match self {
            Reference::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn is_static(self) -> bool {
        matches!(self, Reference::Field(field) if field.is_static())
    }

    /// Method the reference is scoped to, for arguments and locals.
    pub fn owner_method(self) -> Option<MethodId> {
        match self {
            Reference::Argument(arg) => Some(arg.method()),
            Reference::Local(local) => Some(local.method()),
            Reference::This(_) | Reference::Field(_) => None,
        }
    }

    /// Can an `Assign` statement store into this location?
    pub fn is_writable(self) -> bool {
        match self {
            Reference::This(_) => false,
            Reference::Field(field) => !field.flags().contains(FieldFlags::READ_ONLY),
            Reference::Argument(_) | Reference::Local(_) => true,
        }
    }
}

impl From<FieldRef> for Reference {
    fn from(field: FieldRef) -> Self {
        Reference::Field(field)
    }
}

impl From<ArgumentRef> for Reference {
    fn from(arg: ArgumentRef) -> Self {
        Reference::Argument(arg)
    }
}

impl From<LocalRef> for Reference {
    fn from(local: LocalRef) -> Self {
        Reference::Local(local)
    }
}
