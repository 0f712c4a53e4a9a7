//! Run-time values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use proxy_ir::{TypeId, TypePool};

use crate::SerializationInfo;

/// An instance of some class type.
///
/// Field slots are indexed by [`FieldId`](proxy_ir::FieldId); static fields
/// live on the interpreter instead and leave their slot unused.
pub struct Object {
    ty: TypeId,
    fields: RefCell<Vec<Value>>,
}

pub type ObjectRef = Rc<Object>;

impl Object {
    pub fn new(ty: TypeId, field_count: usize) -> ObjectRef {
        Rc::new(Self {
            ty,
            fields: RefCell::new(vec![Value::Null; field_count]),
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    pub fn field(&self, index: usize) -> Value {
        self.fields.borrow().get(index).cloned().unwrap_or(Value::Null)
    }

    pub(crate) fn set_field(&self, index: usize, value: Value) {
        if let Some(slot) = self.fields.borrow_mut().get_mut(index) {
            *slot = value;
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Fields are omitted: a self-referencing object would recurse.
        write!(f, "Object({:?} @ {:p})", self.ty, self)
    }
}

/// Elements of an array value, with the array's own type.
#[derive(Debug)]
pub struct ArrayData {
    pub ty: TypeId,
    pub items: Vec<Value>,
}

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Str(Rc<str>),
    /// Runtime type handle.
    Type(TypeId),
    Array(Rc<RefCell<ArrayData>>),
    Object(ObjectRef),
    Info(Rc<RefCell<SerializationInfo>>),
    Context,
}

impl Value {
    pub fn string(value: &str) -> Self {
        Value::Str(Rc::from(value))
    }

    pub fn array(ty: TypeId, items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(ArrayData { ty, items })))
    }

    /// An opaque instance with no fields.
    pub fn opaque(ty: TypeId) -> Self {
        Value::Object(Object::new(ty, 0))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// String elements of a `string[]`, or `None` for any other value.
    pub fn as_string_array(&self) -> Option<Vec<String>> {
        match self {
            Value::Array(array) => array
                .borrow()
                .items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect(),
            _ => None,
        }
    }

    /// Dynamic type of the value. `None` for null.
    pub fn runtime_type(&self) -> Option<TypeId> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeId::BOOL),
            Value::Int32(_) => Some(TypeId::INT32),
            Value::Str(_) => Some(TypeId::STRING),
            Value::Type(_) => Some(TypeId::TYPE),
            Value::Array(array) => Some(array.borrow().ty),
            Value::Object(object) => Some(object.type_id()),
            Value::Info(_) => Some(TypeId::SERIALIZATION_INFO),
            Value::Context => Some(TypeId::STREAMING_CONTEXT),
        }
    }

    /// Can this value be stored where `ty` is declared? Null fits anywhere.
    pub fn is_instance_of(&self, pool: &TypePool, ty: TypeId) -> bool {
        match self.runtime_type() {
            Some(actual) => pool.is_assignable(actual, ty),
            None => true,
        }
    }

    /// Identity for shared values, equality for everything else.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Context, Value::Context) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Info(a), Value::Info(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}
