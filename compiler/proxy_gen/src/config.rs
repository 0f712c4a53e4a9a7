//! Generator configuration.

use proxy_ir::TypePool;

/// Naming of generated types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Namespace prefixed to every generated type's qualified name.
    pub namespace: String,
    /// Name of the dynamic module generated types are reported under.
    pub assembly_name: String,
    /// Appended to the target's short name.
    pub type_name_suffix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: "proxies".to_owned(),
            assembly_name: "DynamicProxyAssembly".to_owned(),
            type_name_suffix: "Proxy".to_owned(),
        }
    }
}

impl GeneratorConfig {
    /// First free `(name, qualified name)` for a proxy of `target_name`.
    ///
    /// The first proxy of a target is `FooProxy`; later ones get a numeric
    /// suffix (`FooProxy1`, `FooProxy2`, ...).
    pub fn type_name(&self, pool: &TypePool, target_name: &str) -> (String, String) {
        let stem = format!("{target_name}{}", self.type_name_suffix);
        let mut name = stem.clone();
        let mut n = 0u32;
        loop {
            let qualified = format!("{}.{name}", self.namespace);
            if pool.lookup(&qualified).is_none() {
                return (name, qualified);
            }
            n += 1;
            name = format!("{stem}{n}");
        }
    }
}
