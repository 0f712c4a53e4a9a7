//! The memoizing generator.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use proxy_contrib::{
    names, InterceptAll, InterfaceSet, MetaType, ProxyGenerationHook, ProxyInstanceContributor,
    ProxyKind, TypeContributor,
};
use proxy_ir::{
    BuildError, ClassEmitter, FieldFlags, GeneratedType, TypeId, TypeInfo, TypePool,
};

use crate::request::CacheKey;
use crate::{GenerationError, GeneratorConfig, ProxyRequest};

struct GeneratorState {
    pool: TypePool,
    cache: FxHashMap<CacheKey, Arc<GeneratedType>>,
}

/// Generates proxy types and memoizes them per request.
///
/// All passes run under one lock, which also guards the type pool the
/// generated types live in.
pub struct ProxyGenerator {
    config: GeneratorConfig,
    state: Mutex<GeneratorState>,
}

impl Default for ProxyGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl ProxyGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_type_pool(config, TypePool::new())
    }

    /// A generator over an existing pool, for targets defined up front.
    pub fn with_type_pool(config: GeneratorConfig, pool: TypePool) -> Self {
        Self {
            config,
            state: Mutex::new(GeneratorState {
                pool,
                cache: FxHashMap::default(),
            }),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Define a target type in the generator's pool.
    pub fn define_type(&self, info: TypeInfo) -> Result<TypeId, GenerationError> {
        Ok(self.state.lock().pool.define(info)?)
    }

    /// Run `f` against the pool generated types are resolved through.
    pub fn with_pool<R>(&self, f: impl FnOnce(&TypePool) -> R) -> R {
        f(&self.state.lock().pool)
    }

    /// Number of memoized types.
    pub fn cached_count(&self) -> usize {
        self.state.lock().cache.len()
    }

    /// Generate (or fetch the memoized) proxy for `request`.
    pub fn generate(&self, request: &ProxyRequest) -> Result<Arc<GeneratedType>, GenerationError> {
        let key = request.cache_key();
        let mut state = self.state.lock();
        if let Some(generated) = state.cache.get(&key) {
            trace!(proxy = generated.name(), "proxy cache hit");
            return Ok(Arc::clone(generated));
        }
        let generated = Arc::new(self.run_pass(&mut state.pool, request, &InterceptAll, Vec::new())?);
        state.cache.insert(key, Arc::clone(&generated));
        Ok(generated)
    }

    /// Generate a proxy with extra contributors running before the instance
    /// contributor.
    ///
    /// The contributor set is not part of the cache key, so the result is
    /// never memoized.
    pub fn generate_with_contributors(
        &self,
        request: &ProxyRequest,
        hook: &dyn ProxyGenerationHook,
        contributors: Vec<Box<dyn TypeContributor>>,
    ) -> Result<Arc<GeneratedType>, GenerationError> {
        let mut state = self.state.lock();
        self.run_pass(&mut state.pool, request, hook, contributors)
            .map(Arc::new)
    }

    fn run_pass(
        &self,
        pool: &mut TypePool,
        request: &ProxyRequest,
        hook: &dyn ProxyGenerationHook,
        contributors: Vec<Box<dyn TypeContributor>>,
    ) -> Result<GeneratedType, GenerationError> {
        let checkpoint = pool.checkpoint();
        match self.build(pool, request, hook, contributors) {
            Ok(generated) => {
                if tracing::enabled!(tracing::Level::TRACE) {
                    for method in generated.methods() {
                        trace!("\n{}", method.display(pool, generated.fields()));
                    }
                }
                Ok(generated)
            }
            Err(err) => {
                warn!(
                    target_type = ?request.target,
                    error = %err,
                    "proxy generation failed; discarding type"
                );
                pool.rollback(checkpoint);
                Err(err)
            }
        }
    }

    fn build(
        &self,
        pool: &mut TypePool,
        request: &ProxyRequest,
        hook: &dyn ProxyGenerationHook,
        mut contributors: Vec<Box<dyn TypeContributor>>,
    ) -> Result<GeneratedType, GenerationError> {
        let (base, interfaces) = Self::shape(pool, request)?;
        let (name, qualified) = self.config.type_name(pool, pool.name(request.target));
        debug!(
            assembly = %self.config.assembly_name,
            proxy = %qualified,
            kind = ?request.kind,
            "generating proxy"
        );

        let mut class = ClassEmitter::new(pool, &name, &qualified, base, interfaces.as_slice())?;
        Self::declare_reserved_fields(&mut class, request)?;

        let mut instance = ProxyInstanceContributor::new(
            request.kind,
            request.target,
            request.interfaces.clone(),
            request.type_id(),
        );

        let mut model = MetaType::new(request.target);
        for contributor in &mut contributors {
            contributor.collect_elements_to_proxy(hook, &mut model);
        }
        instance.collect_elements_to_proxy(hook, &mut model);
        debug!(
            selected = model.methods().len(),
            intercepted = model.methods().iter().filter(|m| m.intercepted).count(),
            "collected members"
        );

        // Each contributor sees only the finalized bodies of the ones before it.
        for contributor in &contributors {
            contributor.generate(&mut class, pool)?;
            class.seal();
        }
        instance.generate(&mut class, pool)?;

        Ok(class.finish()?)
    }

    /// Base type and implemented interfaces for the request's kind.
    fn shape(
        pool: &TypePool,
        request: &ProxyRequest,
    ) -> Result<(TypeId, InterfaceSet), GenerationError> {
        let target = request.target;
        Self::check_known(pool, target)?;
        for interface in request.interfaces.iter() {
            Self::check_known(pool, interface)?;
            if !pool.get(interface).is_interface() {
                return Err(GenerationError::NotAnInterface(
                    pool.qualified_name(interface).to_owned(),
                ));
            }
        }

        let (base, first) = match request.kind {
            ProxyKind::Interface => {
                if !pool.get(target).is_interface() {
                    return Err(GenerationError::NotAnInterface(
                        pool.qualified_name(target).to_owned(),
                    ));
                }
                let base = match request.base {
                    Some(base) => {
                        Self::check_known(pool, base)?;
                        if !pool.get(base).is_class() {
                            return Err(GenerationError::InvalidTarget {
                                target: pool.qualified_name(base).to_owned(),
                                reason: "interface proxy bases must be classes",
                            });
                        }
                        base
                    }
                    None => TypeId::OBJECT,
                };
                (base, Some(target))
            }
            ProxyKind::Class => {
                if !pool.get(target).is_class() {
                    return Err(GenerationError::InvalidTarget {
                        target: pool.qualified_name(target).to_owned(),
                        reason: "class proxies need a class target",
                    });
                }
                if request.base.is_some_and(|base| base != target) {
                    return Err(GenerationError::InvalidTarget {
                        target: pool.qualified_name(target).to_owned(),
                        reason: "class proxies derive from their target",
                    });
                }
                (target, None)
            }
        };

        let serializable = proxy_contrib::SERIALIZATION.then_some(TypeId::SERIALIZABLE);
        let interfaces = first
            .into_iter()
            .chain(request.interfaces.iter())
            .chain([TypeId::PROXY_TARGET_ACCESSOR])
            .chain(serializable)
            .collect();
        Ok((base, interfaces))
    }

    fn check_known(pool: &TypePool, ty: TypeId) -> Result<(), GenerationError> {
        if ty.index() < pool.len() {
            Ok(())
        } else {
            Err(BuildError::UnknownType(ty.raw()).into())
        }
    }

    fn declare_reserved_fields(
        class: &mut ClassEmitter,
        request: &ProxyRequest,
    ) -> Result<(), BuildError> {
        class.declare_field(names::INTERCEPTORS_FIELD, TypeId::INTERCEPTOR_ARRAY, true)?;
        class.declare_field_with_flags(
            names::GENERATION_OPTIONS_FIELD,
            TypeId::PROXY_GENERATION_OPTIONS,
            FieldFlags::STATIC,
        )?;
        if request.kind.is_field_backed() {
            class.declare_field(names::TARGET_FIELD, request.target, true)?;
        }
        Ok(())
    }
}
