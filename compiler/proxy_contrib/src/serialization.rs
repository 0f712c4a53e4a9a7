//! Builder for the body of the custom-serialization member.
//!
//! Every entry becomes `info.add_value(key, value)`, where `info` is the
//! member's first argument. Keys are written in call order.

use proxy_ir::{
    well_known, ArgumentRef, BuildError, ExprId, FieldRef, MethodBody, Reference, TypeId, TypePool,
};

/// Appends payload entries to a `get_object_data` body.
pub struct ObjectDataWriter<'a> {
    body: &'a mut MethodBody,
    pool: &'a mut TypePool,
    info: ArgumentRef,
    entries: usize,
}

impl<'a> ObjectDataWriter<'a> {
    /// `info` must be the `SerializationInfo` argument of the method owning
    /// `body`.
    pub fn new(body: &'a mut MethodBody, pool: &'a mut TypePool, info: ArgumentRef) -> Self {
        Self {
            body,
            pool,
            info,
            entries: 0,
        }
    }

    pub fn pool(&self) -> &TypePool {
        &*self.pool
    }

    /// Direct access for entries the helpers do not cover.
    pub fn body(&mut self) -> &mut MethodBody {
        &mut *self.body
    }

    /// Number of payload entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Resolve `qualified_name` through the static type lookup and register it
    /// as the type the payload is reconstructed through.
    pub fn set_reconstruction_type(&mut self, qualified_name: &str) -> Result<(), BuildError> {
        let local = self.body.declare_local(TypeId::TYPE)?;
        let name = self.body.constant(qualified_name)?;
        let throw_on_error = self.body.constant(true)?;
        let ignore_case = self.body.constant(false)?;
        let lookup = self.body.invoke(
            self.pool,
            None,
            well_known::type_get_type(),
            &[name, throw_on_error, ignore_case],
        )?;
        self.body.assign(self.pool, local, lookup)?;

        let info = self.body.read(self.pool, self.info)?;
        let ty = self.body.read(self.pool, local)?;
        let call = self
            .body
            .invoke(self.pool, Some(info), well_known::info_set_type(), &[ty])?;
        self.body.expr_stmt(self.pool, call)
    }

    /// `info.add_value(key, value)`
    pub fn add_value(&mut self, key: &str, value: ExprId) -> Result<(), BuildError> {
        let info = self.body.read(self.pool, self.info)?;
        let key_expr = self.body.constant(key)?;
        let call = self.body.invoke(
            self.pool,
            Some(info),
            well_known::info_add_value(),
            &[key_expr, value],
        )?;
        self.body.expr_stmt(self.pool, call)?;
        self.entries += 1;
        tracing::trace!(key, "payload entry");
        Ok(())
    }

    /// Add the current value of `field`.
    pub fn add_field(&mut self, key: &str, field: FieldRef) -> Result<(), BuildError> {
        let value = self.body.read(self.pool, field)?;
        self.add_value(key, value)
    }

    pub fn add_string(&mut self, key: &str, value: &str) -> Result<(), BuildError> {
        let value = self.body.constant(value)?;
        self.add_value(key, value)
    }

    pub fn add_bool(&mut self, key: &str, value: bool) -> Result<(), BuildError> {
        let value = self.body.constant(value)?;
        self.add_value(key, value)
    }

    /// Build a `string[]` in a local, fill it in order and add it.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "interface sets never reach u32::MAX entries"
    )]
    pub fn add_string_array(&mut self, key: &str, values: &[String]) -> Result<(), BuildError> {
        let local = self.body.declare_local(TypeId::STRING_ARRAY)?;
        let array = self
            .body
            .new_array(self.pool, values.len() as u32, TypeId::STRING)?;
        self.body.assign(self.pool, local, array)?;
        for (index, value) in values.iter().enumerate() {
            let element = self.body.constant(value.as_str())?;
            self.body
                .assign_element(self.pool, local, index as u32, element)?;
        }
        let value = self.body.read(self.pool, local)?;
        self.add_value(key, value)
    }

    /// `this.base::get_object_data(info, context)`, letting a serializable
    /// base type write its own entries.
    pub fn call_base(&mut self, base: TypeId, context: ArgumentRef) -> Result<(), BuildError> {
        let receiver = self.body.read(self.pool, Reference::This(base))?;
        let info = self.body.read(self.pool, self.info)?;
        let context = self.body.read(self.pool, context)?;
        let call = self.body.invoke(
            self.pool,
            Some(receiver),
            well_known::get_object_data(base),
            &[info, context],
        )?;
        self.body.expr_stmt(self.pool, call)
    }

    /// Terminate the body with `return`.
    pub fn finish(self) -> Result<(), BuildError> {
        self.body.ret(self.pool, None)?;
        tracing::debug!(entries = self.entries, "wrote serialization payload");
        Ok(())
    }
}
