//! Native implementations of runtime methods generated bodies call.
//!
//! Keyed by (owner type, method name). The default registry covers the
//! static type lookup and the serialization-info operations; callers can
//! register more, for example a serializable base type's `get_object_data`.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use proxy_ir::{well_known, TypeId, TypePool};

use crate::{RuntimeError, SerializationInfo, Value};

/// `(pool, receiver, args) -> result`. `receiver` is `None` for static calls.
pub type NativeFn = fn(&TypePool, Option<&Value>, &[Value]) -> Result<Value, RuntimeError>;

#[derive(Clone, Default)]
pub struct Natives {
    by_owner: FxHashMap<TypeId, FxHashMap<String, NativeFn>>,
}

impl Natives {
    /// A registry with the runtime's own methods.
    pub fn runtime() -> Self {
        let mut natives = Self::default();
        natives.register(TypeId::TYPE, well_known::GET_TYPE, type_get_type);
        natives.register(
            TypeId::SERIALIZATION_INFO,
            well_known::SET_TYPE,
            info_set_type,
        );
        natives.register(
            TypeId::SERIALIZATION_INFO,
            well_known::ADD_VALUE,
            info_add_value,
        );
        natives
    }

    pub fn register(&mut self, owner: TypeId, name: &str, native: NativeFn) {
        self.by_owner
            .entry(owner)
            .or_default()
            .insert(name.to_owned(), native);
    }

    pub fn get(&self, owner: TypeId, name: &str) -> Option<NativeFn> {
        self.by_owner.get(&owner)?.get(name).copied()
    }
}

fn arg<'v>(
    args: &'v [Value],
    index: usize,
    method: &str,
    expected: usize,
) -> Result<&'v Value, RuntimeError> {
    if args.len() != expected {
        return Err(RuntimeError::ArityMismatch {
            method: method.to_owned(),
            expected,
            found: args.len(),
        });
    }
    Ok(&args[index])
}

fn string_arg<'v>(pool: &TypePool, value: &'v Value) -> Result<&'v str, RuntimeError> {
    value
        .as_str()
        .ok_or_else(|| RuntimeError::invalid_cast(pool, value, TypeId::STRING))
}

fn bool_arg(pool: &TypePool, value: &Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(RuntimeError::invalid_cast(pool, other, TypeId::BOOL)),
    }
}

fn info_receiver<'v>(
    pool: &TypePool,
    receiver: Option<&'v Value>,
    method: &str,
) -> Result<&'v Rc<RefCell<SerializationInfo>>, RuntimeError> {
    match receiver {
        Some(Value::Info(info)) => Ok(info),
        None | Some(Value::Null) => Err(RuntimeError::NullReference {
            method: method.to_owned(),
        }),
        Some(other) => Err(RuntimeError::invalid_cast(pool, other, TypeId::SERIALIZATION_INFO)),
    }
}

/// `Type::get_type(qualified_name, throw_on_error, ignore_case)`
fn type_get_type(
    pool: &TypePool,
    _receiver: Option<&Value>,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let name = string_arg(pool, arg(args, 0, well_known::GET_TYPE, 3)?)?;
    let throw_on_error = bool_arg(pool, &args[1])?;
    let ignore_case = bool_arg(pool, &args[2])?;

    let found = pool.lookup(name).or_else(|| {
        if !ignore_case {
            return None;
        }
        (0..pool.len())
            .filter_map(|index| u32::try_from(index).ok().map(TypeId::from_raw))
            .find(|&ty| pool.qualified_name(ty).eq_ignore_ascii_case(name))
    });
    match found {
        Some(ty) => Ok(Value::Type(ty)),
        None if throw_on_error => Err(RuntimeError::TypeNotFound(name.to_owned())),
        None => Ok(Value::Null),
    }
}

/// `SerializationInfo::set_type(type)`
fn info_set_type(
    pool: &TypePool,
    receiver: Option<&Value>,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let info = info_receiver(pool, receiver, well_known::SET_TYPE)?;
    match arg(args, 0, well_known::SET_TYPE, 1)? {
        Value::Type(ty) => {
            info.borrow_mut().set_type(*ty);
            Ok(Value::Null)
        }
        other => Err(RuntimeError::invalid_cast(pool, other, TypeId::TYPE)),
    }
}

/// `SerializationInfo::add_value(key, value)`
fn info_add_value(
    pool: &TypePool,
    receiver: Option<&Value>,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let info = info_receiver(pool, receiver, well_known::ADD_VALUE)?;
    let key = string_arg(pool, arg(args, 0, well_known::ADD_VALUE, 2)?)?;
    info.borrow_mut().add_value(key, args[1].clone())?;
    Ok(Value::Null)
}
