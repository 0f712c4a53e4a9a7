//! Proxy requests and their cache keys.

use proxy_contrib::{InterfaceSet, ProxyKind, ProxyTypeId};
use proxy_ir::TypeId;

/// What to generate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyRequest {
    pub target: TypeId,
    /// Additional interfaces, persisted under `__interfaces`.
    pub interfaces: InterfaceSet,
    pub kind: ProxyKind,
    /// Base class of an interface proxy. Defaults to the root object type.
    pub base: Option<TypeId>,
    /// Defaults to [`ProxyKind::default_type_id`].
    pub proxy_type_id: Option<ProxyTypeId>,
}

impl ProxyRequest {
    /// A proxy implementing the interface `target` with no separate target.
    pub fn interface(target: TypeId) -> Self {
        Self::new(ProxyKind::Interface, target)
    }

    /// A proxy deriving from the class `target` that wraps a separate instance.
    pub fn class(target: TypeId) -> Self {
        Self::new(ProxyKind::Class, target)
    }

    fn new(kind: ProxyKind, target: TypeId) -> Self {
        Self {
            target,
            interfaces: InterfaceSet::default(),
            kind,
            base: None,
            proxy_type_id: None,
        }
    }

    #[must_use]
    pub fn with_interfaces(mut self, interfaces: impl IntoIterator<Item = TypeId>) -> Self {
        self.interfaces = InterfaceSet::new(interfaces);
        self
    }

    /// Derive an interface proxy from `base`. A serializable base also
    /// writes its own payload entries.
    #[must_use]
    pub fn with_base(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_type_id(mut self, id: impl Into<ProxyTypeId>) -> Self {
        self.proxy_type_id = Some(id.into());
        self
    }

    /// The type id to persist.
    pub fn type_id(&self) -> ProxyTypeId {
        self.proxy_type_id
            .clone()
            .unwrap_or_else(|| self.kind.default_type_id())
    }

    pub(crate) fn cache_key(&self) -> CacheKey {
        CacheKey {
            target: self.target,
            interfaces: self.interfaces.clone(),
            kind: self.kind,
            base: self.base,
            proxy_type_id: self.type_id(),
        }
    }
}

/// Requests that resolve to the same key share one generated type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    target: TypeId,
    interfaces: InterfaceSet,
    kind: ProxyKind,
    base: Option<TypeId>,
    proxy_type_id: ProxyTypeId,
}
