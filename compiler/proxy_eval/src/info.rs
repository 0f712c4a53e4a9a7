//! The serialization-info sink written by `get_object_data`.

use std::rc::Rc;

use proxy_ir::TypeId;

use crate::{RuntimeError, Value};

/// Ordered key/value payload plus the type it is reconstructed through.
#[derive(Clone, Debug, Default)]
pub struct SerializationInfo {
    reconstruction_type: Option<TypeId>,
    entries: Vec<(Rc<str>, Value)>,
}

impl SerializationInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconstruction_type(&self) -> Option<TypeId> {
        self.reconstruction_type
    }

    pub fn set_type(&mut self, ty: TypeId) {
        self.reconstruction_type = Some(ty);
    }

    /// Add an entry. Keys are unique.
    pub fn add_value(&mut self, key: &str, value: Value) -> Result<(), RuntimeError> {
        if self.get(key).is_some() {
            return Err(RuntimeError::DuplicateKey(key.to_owned()));
        }
        self.entries.push((Rc::from(key), value));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| &**name == key)
            .map(|(_, value)| value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| &**name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
