//! Method bodies: an expression arena plus an ordered statement list.
//!
//! Bodies are pure data. Building one has no effect until an external
//! generator lowers it, which lets several contributors compose members
//! transactionally and lets the finished type be validated first.
//!
//! Every builder method type-checks the node it adds against the
//! [`TypePool`] and fails once the body has been finalized.

use crate::{
    AssignTarget, BuildError, ConstValue, ExprId, ExprKind, ExprNode, LocalRef, MethodDesc,
    MethodId, Reference, Stmt, TypeId, TypePool,
};

/// The body of one generated method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodBody {
    method: MethodId,
    /// The generated type the method belongs to.
    owner: TypeId,
    name: String,
    return_type: TypeId,
    arity: usize,
    exprs: Vec<ExprNode>,
    stmts: Vec<Stmt>,
    locals: Vec<TypeId>,
    frozen: bool,
}

impl MethodBody {
    pub(crate) fn new(
        method: MethodId,
        owner: TypeId,
        name: &str,
        return_type: TypeId,
        arity: usize,
    ) -> Self {
        Self {
            method,
            owner,
            name: name.to_owned(),
            return_type,
            arity,
            exprs: Vec::new(),
            stmts: Vec::new(),
            locals: Vec::new(),
            frozen: false,
        }
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn statements(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn exprs(&self) -> &[ExprNode] {
        &self.exprs
    }

    /// The node behind `id`, or `None` if another body allocated it.
    pub fn expr(&self, id: ExprId) -> Option<&ExprNode> {
        if id.method() != self.method {
            return None;
        }
        self.exprs.get(id.index())
    }

    pub fn type_of(&self, id: ExprId) -> Option<TypeId> {
        self.expr(id).map(|node| node.ty)
    }

    /// Declared types of the body's locals, by local index.
    pub fn locals(&self) -> &[TypeId] {
        &self.locals
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    // Checks

    fn ensure_open(&self) -> Result<(), BuildError> {
        if self.frozen {
            return Err(BuildError::FrozenBody {
                method: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Resolve an operand, returning its type.
    fn operand(&self, id: ExprId) -> Result<TypeId, BuildError> {
        if id.method() != self.method {
            return Err(BuildError::ForeignReference {
                method: self.name.clone(),
            });
        }
        self.exprs
            .get(id.index())
            .map(|node| node.ty)
            .ok_or_else(|| BuildError::UnknownExpr {
                method: self.name.clone(),
                expr: id.raw(),
            })
    }

    fn check_reference(&self, pool: &TypePool, reference: Reference) -> Result<(), BuildError> {
        let in_scope = match reference {
            Reference::Argument(arg) => arg.method() == self.method && arg.index() < self.arity,
            Reference::Local(local) => {
                local.method() == self.method && local.index() < self.locals.len()
            }
            Reference::This(view) => {
                return Self::ensure_assignable(pool, self.owner, view);
            }
            Reference::Field(_) => true,
        };
        if in_scope {
            Ok(())
        } else {
            Err(BuildError::ForeignReference {
                method: self.name.clone(),
            })
        }
    }

    fn ensure_assignable(pool: &TypePool, from: TypeId, to: TypeId) -> Result<(), BuildError> {
        if pool.is_assignable(from, to) {
            Ok(())
        } else {
            Err(BuildError::mismatch(pool, to, from))
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena indices always fit u32"
    )]
    fn alloc(&mut self, kind: ExprKind, ty: TypeId) -> ExprId {
        let id = ExprId::new(self.method, self.exprs.len() as u32);
        self.exprs.push(ExprNode { kind, ty });
        id
    }

    // Expressions

    pub fn constant(&mut self, value: impl Into<ConstValue>) -> Result<ExprId, BuildError> {
        self.ensure_open()?;
        let value = value.into();
        let ty = value.ty();
        Ok(self.alloc(ExprKind::Constant(value), ty))
    }

    /// Read a storage location. `This` must name a type the generated type
    /// is assignable to.
    pub fn read(
        &mut self,
        pool: &TypePool,
        reference: impl Into<Reference>,
    ) -> Result<ExprId, BuildError> {
        self.ensure_open()?;
        let reference = reference.into();
        self.check_reference(pool, reference)?;
        Ok(self.alloc(ExprKind::Read(reference), reference.ty()))
    }

    /// Cast `inner` to `to`. Fails unless the types are related.
    pub fn convert(
        &mut self,
        pool: &TypePool,
        inner: ExprId,
        to: TypeId,
    ) -> Result<ExprId, BuildError> {
        self.ensure_open()?;
        let from = self.operand(inner)?;
        if !pool.are_related(from, to) {
            return Err(BuildError::mismatch(pool, to, from));
        }
        Ok(self.alloc(ExprKind::Convert { from, to, inner }, to))
    }

    /// Call `method`. Pass `None` as `target` for static methods.
    pub fn invoke(
        &mut self,
        pool: &TypePool,
        target: Option<ExprId>,
        method: MethodDesc,
        args: &[ExprId],
    ) -> Result<ExprId, BuildError> {
        self.ensure_open()?;
        match (target, method.is_static()) {
            (Some(_), true) => {
                return Err(BuildError::InvalidInvocation {
                    method: method.name().to_owned(),
                    reason: "static method called with a receiver",
                });
            }
            (None, false) => {
                return Err(BuildError::InvalidInvocation {
                    method: method.name().to_owned(),
                    reason: "instance method called without a receiver",
                });
            }
            (Some(receiver), false) => {
                let receiver_ty = self.operand(receiver)?;
                Self::ensure_assignable(pool, receiver_ty, method.owner())?;
            }
            (None, true) => {}
        }
        if args.len() != method.params().len() {
            return Err(BuildError::ArityMismatch {
                method: method.name().to_owned(),
                expected: method.params().len(),
                found: args.len(),
            });
        }
        for (&arg, &param) in args.iter().zip(method.params()) {
            let arg_ty = self.operand(arg)?;
            Self::ensure_assignable(pool, arg_ty, param)?;
        }
        let ty = method.return_type();
        Ok(self.alloc(
            ExprKind::Invoke {
                target,
                method,
                args: args.to_vec(),
            },
            ty,
        ))
    }

    pub fn array_element(
        &mut self,
        pool: &TypePool,
        array: ExprId,
        index: u32,
    ) -> Result<ExprId, BuildError> {
        self.ensure_open()?;
        let array_ty = self.operand(array)?;
        let element = pool
            .element_type(array_ty)
            .ok_or_else(|| BuildError::NotAnArray(pool.name(array_ty).to_owned()))?;
        Ok(self.alloc(ExprKind::ArrayElement { array, index }, element))
    }

    /// Allocate an array of `length` null elements.
    pub fn new_array(
        &mut self,
        pool: &mut TypePool,
        length: u32,
        element: TypeId,
    ) -> Result<ExprId, BuildError> {
        self.ensure_open()?;
        if element == TypeId::VOID {
            return Err(BuildError::mismatch(pool, TypeId::OBJECT, TypeId::VOID));
        }
        let ty = pool.array_of(element);
        Ok(self.alloc(ExprKind::NewArray { length, element }, ty))
    }

    // Statements

    /// Declare a local scoped to this body.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "generated bodies never declare 65k locals"
    )]
    pub fn declare_local(&mut self, ty: TypeId) -> Result<LocalRef, BuildError> {
        self.ensure_open()?;
        let local = LocalRef::new(self.method, self.locals.len() as u16, ty);
        self.locals.push(ty);
        self.stmts.push(Stmt::DeclareLocal(local));
        Ok(local)
    }

    /// Append a statement after checking it against the body's signature.
    pub fn append(&mut self, pool: &TypePool, stmt: Stmt) -> Result<(), BuildError> {
        self.ensure_open()?;
        self.check_stmt(pool, &stmt)?;
        self.stmts.push(stmt);
        Ok(())
    }

    fn check_stmt(&self, pool: &TypePool, stmt: &Stmt) -> Result<(), BuildError> {
        match stmt {
            Stmt::DeclareLocal(local) => self.check_reference(pool, Reference::Local(*local)),
            Stmt::Assign { target, value } => {
                let value_ty = self.operand(*value)?;
                match *target {
                    AssignTarget::Reference(reference) => {
                        self.check_reference(pool, reference)?;
                        if !reference.is_writable() {
                            return Err(BuildError::NotAssignable {
                                method: self.name.clone(),
                            });
                        }
                        Self::ensure_assignable(pool, value_ty, reference.ty())
                    }
                    AssignTarget::ArrayElement { array, .. } => {
                        self.check_reference(pool, array)?;
                        let element = pool.element_type(array.ty()).ok_or_else(|| {
                            BuildError::NotAnArray(pool.name(array.ty()).to_owned())
                        })?;
                        Self::ensure_assignable(pool, value_ty, element)
                    }
                }
            }
            Stmt::Return(None) => {
                if self.return_type == TypeId::VOID {
                    Ok(())
                } else {
                    Err(BuildError::mismatch(pool, self.return_type, TypeId::VOID))
                }
            }
            Stmt::Return(Some(value)) => {
                let value_ty = self.operand(*value)?;
                Self::ensure_assignable(pool, value_ty, self.return_type)
            }
            Stmt::Throw { exception, .. } => {
                if pool.is_exception(*exception) {
                    Ok(())
                } else {
                    Err(BuildError::mismatch(pool, TypeId::EXCEPTION, *exception))
                }
            }
            Stmt::Expr(expr) => self.operand(*expr).map(|_| ()),
        }
    }

    pub fn assign(
        &mut self,
        pool: &TypePool,
        target: impl Into<AssignTarget>,
        value: ExprId,
    ) -> Result<(), BuildError> {
        self.append(
            pool,
            Stmt::Assign {
                target: target.into(),
                value,
            },
        )
    }

    /// `array[index] = value`
    pub fn assign_element(
        &mut self,
        pool: &TypePool,
        array: impl Into<Reference>,
        index: u32,
        value: ExprId,
    ) -> Result<(), BuildError> {
        self.append(
            pool,
            Stmt::Assign {
                target: AssignTarget::ArrayElement {
                    array: array.into(),
                    index,
                },
                value,
            },
        )
    }

    pub fn ret(&mut self, pool: &TypePool, value: Option<ExprId>) -> Result<(), BuildError> {
        self.append(pool, Stmt::Return(value))
    }

    pub fn throw(
        &mut self,
        pool: &TypePool,
        exception: TypeId,
        message: impl Into<String>,
    ) -> Result<(), BuildError> {
        self.append(
            pool,
            Stmt::Throw {
                exception,
                message: message.into(),
            },
        )
    }

    /// Evaluate `expr` for its side effects.
    pub fn expr_stmt(&mut self, pool: &TypePool, expr: ExprId) -> Result<(), BuildError> {
        self.append(pool, Stmt::Expr(expr))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
