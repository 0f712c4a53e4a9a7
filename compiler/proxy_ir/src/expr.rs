//! Expression nodes.
//!
//! Expressions live in the arena of the [`MethodBody`](crate::MethodBody)
//! that allocated them and refer to each other by [`ExprId`]. A node can only
//! point at nodes allocated before it, so expression trees are acyclic by
//! construction. Every node records its statically known result type.

use crate::{MethodDesc, MethodId, Reference, TypeId};

/// An expression in the arena of one method body.
///
/// Carries the owning method so an id cannot be resolved against another
/// body's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId {
    method: MethodId,
    index: u32,
}

impl ExprId {
    #[inline]
    pub fn new(method: MethodId, raw: u32) -> Self {
        Self { method, index: raw }
    }

    /// The method whose body allocated this expression.
    #[inline]
    pub fn method(self) -> MethodId {
        self.method
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.index
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Literal operand of a `Constant` node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    /// Typed null.
    Null(TypeId),
    Bool(bool),
    Int32(i32),
    Str(String),
}

impl ConstValue {
    pub fn ty(&self) -> TypeId {
        match self {
            ConstValue::Null(ty) => *ty,
            ConstValue::Bool(_) => TypeId::BOOL,
            ConstValue::Int32(_) => TypeId::INT32,
            ConstValue::Str(_) => TypeId::STRING,
        }
    }
}

impl From<&str> for ConstValue {
    fn from(value: &str) -> Self {
        ConstValue::Str(value.to_owned())
    }
}

impl From<bool> for ConstValue {
    fn from(value: bool) -> Self {
        ConstValue::Bool(value)
    }
}

impl From<i32> for ConstValue {
    fn from(value: i32) -> Self {
        ConstValue::Int32(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Constant(ConstValue),
    /// Current value of a storage location.
    Read(Reference),
    /// Explicit representational cast between related types.
    Convert {
        from: TypeId,
        to: TypeId,
        inner: ExprId,
    },
    /// Method call. `target == None` denotes a static call.
    Invoke {
        target: Option<ExprId>,
        method: MethodDesc,
        args: Vec<ExprId>,
    },
    ArrayElement {
        array: ExprId,
        index: u32,
    },
    NewArray {
        length: u32,
        element: TypeId,
    },
}

/// An expression together with its result type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub ty: TypeId,
}
