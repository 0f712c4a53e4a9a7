//! The contributor protocol.

use std::fmt;
use std::sync::Arc;

use proxy_ir::{BuildError, ClassEmitter, MethodDesc, TypeId, TypePool};

/// Opaque tag naming the proxy template that produced a type.
///
/// Persisted into serialized state so the reconstruction path can pick the
/// matching template.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyTypeId(Arc<str>);

impl ProxyTypeId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProxyTypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Debug for ProxyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProxyTypeId({:?})", self.as_str())
    }
}

impl fmt::Display for ProxyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides which members of the target are intercepted.
pub trait ProxyGenerationHook {
    fn should_intercept(&self, method: &MethodDesc) -> bool;
}

/// Hook that intercepts every candidate method.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterceptAll;

impl ProxyGenerationHook for InterceptAll {
    fn should_intercept(&self, _method: &MethodDesc) -> bool {
        true
    }
}

/// A member selected during the collect phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaMethod {
    pub desc: MethodDesc,
    /// Whether calls go through the interceptor pipeline.
    pub intercepted: bool,
}

/// Model of the members a pass will proxy, filled during the collect phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaType {
    target: TypeId,
    methods: Vec<MetaMethod>,
}

impl MetaType {
    pub fn new(target: TypeId) -> Self {
        Self {
            target,
            methods: Vec::new(),
        }
    }

    pub fn target(&self) -> TypeId {
        self.target
    }

    /// Record a candidate method, asking `hook` whether it is intercepted.
    pub fn add_method(&mut self, hook: &dyn ProxyGenerationHook, desc: MethodDesc) {
        let intercepted = hook.should_intercept(&desc);
        self.methods.push(MetaMethod { desc, intercepted });
    }

    pub fn methods(&self) -> &[MetaMethod] {
        &self.methods
    }
}

/// A component that adds members to a type-under-construction.
///
/// Contributors only append. A contributor that needs a member declared by
/// another one looks it up instead of declaring it again; a second
/// declaration is a [`BuildError::DuplicateMember`].
pub trait TypeContributor {
    /// Select the members this contributor will generate.
    fn collect_elements_to_proxy(&mut self, hook: &dyn ProxyGenerationHook, model: &mut MetaType);

    /// Append members to `class`.
    ///
    /// Any error aborts the whole pass; the orchestrator discards the type.
    fn generate(&self, class: &mut ClassEmitter, pool: &mut TypePool) -> Result<(), BuildError>;
}
