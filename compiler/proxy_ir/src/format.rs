//! Human-readable rendering of method bodies.
//!
//! Used for `trace!` output and for inspecting generated types in tests.
//!
//! ```text
//! fn set_proxy_target(arg0: object) -> void {
//!     __target = (Foo) arg0;
//!     return;
//! }
//! ```

use std::fmt::{self, Write};

use crate::{
    AssignTarget, ConstValue, ExprId, ExprKind, FieldDecl, MethodBody, MethodEmitter, Reference,
    Stmt, TypePool,
};

/// Display adapter returned by [`MethodEmitter::display`].
pub struct MethodDisplay<'a> {
    method: &'a MethodEmitter,
    pool: &'a TypePool,
    fields: &'a [FieldDecl],
}

impl MethodEmitter {
    /// Render this method, resolving type names through `pool` and field
    /// names through `fields`.
    pub fn display<'a>(&'a self, pool: &'a TypePool, fields: &'a [FieldDecl]) -> MethodDisplay<'a> {
        MethodDisplay {
            method: self,
            pool,
            fields,
        }
    }
}

impl MethodDisplay<'_> {
    fn reference(&self, f: &mut impl Write, reference: Reference) -> fmt::Result {
        match reference {
            Reference::This(_) => f.write_str("this"),
            Reference::Field(field) => match self.fields.get(field.id().index()) {
                Some(decl) => f.write_str(decl.name()),
                None => write!(f, "field{}", field.id().raw()),
            },
            Reference::Argument(arg) => write!(f, "arg{}", arg.index()),
            Reference::Local(local) => write!(f, "local{}", local.index()),
        }
    }

    fn expr(&self, f: &mut impl Write, body: &MethodBody, id: ExprId) -> fmt::Result {
        let Some(node) = body.expr(id) else {
            return write!(f, "<unknown #{}>", id.raw());
        };
        match &node.kind {
            ExprKind::Constant(value) => match value {
                ConstValue::Null(_) => f.write_str("null"),
                ConstValue::Bool(b) => write!(f, "{b}"),
                ConstValue::Int32(n) => write!(f, "{n}"),
                ConstValue::Str(s) => write!(f, "{s:?}"),
            },
            ExprKind::Read(reference) => self.reference(f, *reference),
            ExprKind::Convert { to, inner, .. } => {
                write!(f, "({}) ", self.pool.name(*to))?;
                self.expr(f, body, *inner)
            }
            ExprKind::Invoke {
                target,
                method,
                args,
            } => {
                match target {
                    Some(receiver) => {
                        self.expr(f, body, *receiver)?;
                        f.write_char('.')?;
                    }
                    None => write!(f, "{}::", self.pool.name(method.owner()))?,
                }
                write!(f, "{}(", method.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    self.expr(f, body, *arg)?;
                }
                f.write_char(')')
            }
            ExprKind::ArrayElement { array, index } => {
                self.expr(f, body, *array)?;
                write!(f, "[{index}]")
            }
            ExprKind::NewArray { length, element } => {
                write!(f, "new {}[{length}]", self.pool.name(*element))
            }
        }
    }

    fn stmt(&self, f: &mut impl Write, body: &MethodBody, stmt: &Stmt) -> fmt::Result {
        match stmt {
            Stmt::DeclareLocal(local) => {
                write!(f, "let local{}: {}", local.index(), self.pool.name(local.ty()))
            }
            Stmt::Assign { target, value } => {
                match *target {
                    AssignTarget::Reference(reference) => self.reference(f, reference)?,
                    AssignTarget::ArrayElement { array, index } => {
                        self.reference(f, array)?;
                        write!(f, "[{index}]")?;
                    }
                }
                f.write_str(" = ")?;
                self.expr(f, body, *value)
            }
            Stmt::Return(None) => f.write_str("return"),
            Stmt::Return(Some(value)) => {
                f.write_str("return ")?;
                self.expr(f, body, *value)
            }
            Stmt::Throw { exception, message } => {
                write!(f, "throw {}({message:?})", self.pool.name(*exception))
            }
            Stmt::Expr(expr) => self.expr(f, body, *expr),
        }
    }
}

impl fmt::Display for MethodDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = self.method;
        write!(f, "fn {}(", method.name())?;
        for (i, arg) in method.arguments().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "arg{i}: {}", self.pool.name(arg.ty()))?;
        }
        writeln!(f, ") -> {} {{", self.pool.name(method.return_type()))?;
        let body = method.body();
        for stmt in body.statements() {
            f.write_str("    ")?;
            self.stmt(f, body, stmt)?;
            f.write_str(";\n")?;
        }
        f.write_char('}')
    }
}
