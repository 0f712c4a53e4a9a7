//! Ordered, deduplicated interface lists.

use rustc_hash::FxHashSet;

use proxy_ir::{TypeId, TypePool};

/// Interfaces a generated type must satisfy, in first-seen order.
///
/// Immutable once built; the order is the order persisted under
/// `__interfaces`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InterfaceSet {
    interfaces: Vec<TypeId>,
}

impl InterfaceSet {
    pub fn new(interfaces: impl IntoIterator<Item = TypeId>) -> Self {
        let mut seen = FxHashSet::default();
        let interfaces = interfaces
            .into_iter()
            .filter(|&ty| seen.insert(ty))
            .collect();
        Self { interfaces }
    }

    pub fn as_slice(&self) -> &[TypeId] {
        &self.interfaces
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.interfaces.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub fn contains(&self, ty: TypeId) -> bool {
        self.interfaces.contains(&ty)
    }

    /// Qualified names, in order.
    pub fn qualified_names<'a>(&'a self, pool: &'a TypePool) -> impl Iterator<Item = &'a str> {
        self.iter().map(move |ty| pool.qualified_name(ty))
    }
}

impl FromIterator<TypeId> for InterfaceSet {
    fn from_iter<I: IntoIterator<Item = TypeId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests;
