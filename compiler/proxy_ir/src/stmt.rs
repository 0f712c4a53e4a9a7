//! Statement nodes.

use crate::{ArgumentRef, ExprId, FieldRef, LocalRef, Reference, TypeId};

/// Left-hand side of an `Assign`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignTarget {
    Reference(Reference),
    /// `array[index]`, where `array` holds an array value.
    ArrayElement { array: Reference, index: u32 },
}

impl From<Reference> for AssignTarget {
    fn from(reference: Reference) -> Self {
        AssignTarget::Reference(reference)
    }
}

impl From<FieldRef> for AssignTarget {
    fn from(field: FieldRef) -> Self {
        AssignTarget::Reference(field.into())
    }
}

impl From<ArgumentRef> for AssignTarget {
    fn from(arg: ArgumentRef) -> Self {
        AssignTarget::Reference(arg.into())
    }
}

impl From<LocalRef> for AssignTarget {
    fn from(local: LocalRef) -> Self {
        AssignTarget::Reference(local.into())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stmt {
    /// Brings a local into scope, initialized to null.
    DeclareLocal(LocalRef),
    Assign { target: AssignTarget, value: ExprId },
    Return(Option<ExprId>),
    /// Raise `exception` with a message. Control-terminal.
    Throw { exception: TypeId, message: String },
    /// Evaluate for side effects, discarding the result.
    Expr(ExprId),
}

impl Stmt {
    /// Does control never continue past this statement?
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stmt::Return(_) | Stmt::Throw { .. })
    }
}
