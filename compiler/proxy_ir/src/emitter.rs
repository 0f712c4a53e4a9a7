//! Member emitter: one method slot on the type-under-construction.

use crate::{ArgumentRef, MethodBody, TypeId};

/// Index of a method within its type-under-construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MethodId(u32);

impl MethodId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A method being generated: its signature, argument references and body.
///
/// Created by [`ClassEmitter::create_method`](crate::ClassEmitter::create_method).
/// The body accepts statements until [`finalize`](Self::finalize) is called,
/// after which every append fails with
/// [`BuildError::FrozenBody`](crate::BuildError::FrozenBody).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodEmitter {
    id: MethodId,
    name: String,
    return_type: TypeId,
    params: Vec<TypeId>,
    arguments: Vec<ArgumentRef>,
    body: MethodBody,
}

impl MethodEmitter {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "parameter counts never exceed u16"
    )]
    pub(crate) fn new(
        id: MethodId,
        owner: TypeId,
        name: &str,
        return_type: TypeId,
        params: &[TypeId],
    ) -> Self {
        let arguments = params
            .iter()
            .enumerate()
            .map(|(index, &ty)| ArgumentRef::new(id, index as u16, ty))
            .collect();
        Self {
            id,
            name: name.to_owned(),
            return_type,
            params: params.to_vec(),
            arguments,
            body: MethodBody::new(id, owner, name, return_type, params.len()),
        }
    }

    pub fn id(&self) -> MethodId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> TypeId {
        self.return_type
    }

    pub fn param_types(&self) -> &[TypeId] {
        &self.params
    }

    /// `Arguments[0..n)`, typed per the parameter list.
    pub fn arguments(&self) -> &[ArgumentRef] {
        &self.arguments
    }

    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut MethodBody {
        &mut self.body
    }

    /// Freeze the body. Idempotent.
    pub fn finalize(&mut self) {
        if !self.body.is_frozen() {
            tracing::trace!(
                method = %self.name,
                statements = self.body.statements().len(),
                "finalized method body"
            );
        }
        self.body.freeze();
    }

    pub fn is_finalized(&self) -> bool {
        self.body.is_frozen()
    }
}
