//! Tree-walking interpreter over generated method bodies.
//!
//! One [`Interpreter`] serves one [`GeneratedType`]. It owns the type's
//! static field slots; instance state lives in the [`Object`]s it creates.
//!
//! Calls are dispatched in this order:
//! 1. natives registered for `(owner, name)`
//! 2. the generated type's own methods, when `owner` is the generated type
//!
//! Anything else is a [`RuntimeError::MissingMethod`]. A call to a base
//! type's method is never routed back into the generated type, so a body
//! delegating to its base cannot recurse into itself.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use proxy_contrib::names;
use proxy_ir::{
    well_known, AssignTarget, ConstValue, ExprId, ExprKind, GeneratedType, MethodDesc,
    MethodEmitter, Reference, Stmt, TypeId, TypePool,
};

use crate::{NativeFn, Natives, Object, ObjectRef, RuntimeError, SerializationInfo, Value};

/// Maximum nesting of generated-method calls.
const MAX_CALL_DEPTH: usize = 128;

type Args = SmallVec<[Value; 4]>;

/// Activation record of one generated-method call.
struct Frame<'a> {
    method: &'a MethodEmitter,
    this: ObjectRef,
    args: Args,
    locals: Vec<Value>,
}

enum Flow {
    Continue,
    Return(Value),
}

pub struct Interpreter<'a> {
    pool: &'a TypePool,
    ty: &'a GeneratedType,
    natives: Natives,
    statics: Vec<Value>,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    /// An interpreter with the runtime natives registered and every static
    /// field null.
    pub fn new(pool: &'a TypePool, ty: &'a GeneratedType) -> Self {
        Self {
            pool,
            ty,
            natives: Natives::runtime(),
            statics: vec![Value::Null; ty.fields().len()],
            depth: 0,
        }
    }

    pub fn generated_type(&self) -> &'a GeneratedType {
        self.ty
    }

    pub fn register_native(&mut self, owner: TypeId, name: &str, native: NativeFn) {
        self.natives.register(owner, name, native);
    }

    // Storage

    fn field_index(&self, name: &str, want_static: bool) -> Result<usize, RuntimeError> {
        self.ty
            .get_field(name)
            .filter(|field| field.is_static() == want_static)
            .map(|field| field.reference().id().index())
            .ok_or_else(|| RuntimeError::MissingField {
                owner: self.ty.name().to_owned(),
                name: name.to_owned(),
            })
    }

    fn check_field_value(&self, name: &str, value: &Value) -> Result<(), RuntimeError> {
        let ty = self
            .ty
            .get_field(name)
            .map_or(TypeId::OBJECT, proxy_ir::FieldDecl::ty);
        if value.is_instance_of(self.pool, ty) {
            Ok(())
        } else {
            Err(RuntimeError::invalid_cast(self.pool, value, ty))
        }
    }

    pub fn set_static(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let index = self.field_index(name, true)?;
        self.check_field_value(name, &value)?;
        self.statics[index] = value;
        Ok(())
    }

    pub fn static_value(&self, name: &str) -> Result<Value, RuntimeError> {
        let index = self.field_index(name, true)?;
        Ok(self.statics[index].clone())
    }

    /// A new instance with every field null.
    pub fn instantiate(&self) -> ObjectRef {
        Object::new(self.ty.type_id(), self.ty.fields().len())
    }

    pub fn set_field(
        &self,
        instance: &ObjectRef,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let index = self.field_index(name, false)?;
        self.check_field_value(name, &value)?;
        instance.set_field(index, value);
        Ok(())
    }

    pub fn field(&self, instance: &ObjectRef, name: &str) -> Result<Value, RuntimeError> {
        let index = self.field_index(name, false)?;
        Ok(instance.field(index))
    }

    // Calls

    /// Call a generated instance method by name.
    pub fn call(
        &mut self,
        instance: &ObjectRef,
        name: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let ty = self.ty;
        let method = ty
            .methods()
            .iter()
            .find(|method| method.name() == name && method.param_types().len() == args.len());
        let Some(method) = method else {
            return Err(match ty.method_by_name(name) {
                Some(other) => RuntimeError::ArityMismatch {
                    method: name.to_owned(),
                    expected: other.param_types().len(),
                    found: args.len(),
                },
                None => RuntimeError::MissingMethod {
                    owner: ty.name().to_owned(),
                    name: name.to_owned(),
                },
            });
        };
        self.invoke_generated(method, Rc::clone(instance), args.iter().cloned().collect())
    }

    /// `get_proxy_target()`
    pub fn get_proxy_target(&mut self, instance: &ObjectRef) -> Result<Value, RuntimeError> {
        self.call(instance, names::GET_PROXY_TARGET, &[])
    }

    /// `set_proxy_target(target)`
    pub fn set_proxy_target(
        &mut self,
        instance: &ObjectRef,
        target: Value,
    ) -> Result<(), RuntimeError> {
        self.call(instance, names::SET_PROXY_TARGET, &[target])
            .map(|_| ())
    }

    /// `get_interceptors()`
    pub fn get_interceptors(&mut self, instance: &ObjectRef) -> Result<Value, RuntimeError> {
        self.call(instance, names::GET_INTERCEPTORS, &[])
    }

    /// Run `get_object_data` against a fresh info and return what it wrote.
    pub fn get_object_data(
        &mut self,
        instance: &ObjectRef,
    ) -> Result<SerializationInfo, RuntimeError> {
        let info = Rc::new(RefCell::new(SerializationInfo::new()));
        self.call(
            instance,
            well_known::GET_OBJECT_DATA,
            &[Value::Info(Rc::clone(&info)), Value::Context],
        )?;
        Ok(Rc::try_unwrap(info).map_or_else(|shared| shared.borrow().clone(), RefCell::into_inner))
    }

    fn invoke_generated(
        &mut self,
        method: &'a MethodEmitter,
        this: ObjectRef,
        args: Args,
    ) -> Result<Value, RuntimeError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::RecursionLimit(MAX_CALL_DEPTH));
        }
        for (value, &param) in args.iter().zip(method.param_types()) {
            if !value.is_instance_of(self.pool, param) {
                return Err(RuntimeError::invalid_cast(self.pool, value, param));
            }
        }
        tracing::trace!(method = method.name(), args = args.len(), "call generated method");

        let mut frame = Frame {
            method,
            this,
            args,
            locals: vec![Value::Null; method.body().locals().len()],
        };
        self.depth += 1;
        let result = self.run(&mut frame);
        self.depth -= 1;
        result
    }

    fn run(&mut self, frame: &mut Frame<'a>) -> Result<Value, RuntimeError> {
        let method = frame.method;
        for stmt in method.body().statements() {
            if let Flow::Return(value) = self.exec(frame, stmt)? {
                return Ok(value);
            }
        }
        Ok(Value::Null)
    }

    fn dispatch(
        &mut self,
        caller: &str,
        receiver: Option<Value>,
        method: &MethodDesc,
        args: Args,
    ) -> Result<Value, RuntimeError> {
        tracing::trace!(
            owner = self.pool.name(method.owner()),
            method = method.name(),
            "invoke"
        );
        if let Some(native) = self.natives.get(method.owner(), method.name()) {
            return native(self.pool, receiver.as_ref(), &args);
        }
        if method.owner() == self.ty.type_id() {
            let this = match receiver {
                Some(Value::Object(object)) => object,
                Some(Value::Null) | None => {
                    return Err(RuntimeError::NullReference {
                        method: caller.to_owned(),
                    })
                }
                Some(other) => {
                    return Err(RuntimeError::invalid_cast(self.pool, &other, method.owner()))
                }
            };
            let ty = self.ty;
            if let Some(callee) = ty.find_method(method.name(), method.params()) {
                return self.invoke_generated(callee, this, args);
            }
        }
        Err(RuntimeError::MissingMethod {
            owner: self.pool.name(method.owner()).to_owned(),
            name: method.name().to_owned(),
        })
    }

    // Storage access

    fn load(&self, frame: &Frame<'a>, reference: Reference) -> Value {
        match reference {
            Reference::This(_) => Value::Object(Rc::clone(&frame.this)),
            Reference::Field(field) if field.is_static() => self
                .statics
                .get(field.id().index())
                .cloned()
                .unwrap_or(Value::Null),
            Reference::Field(field) => frame.this.field(field.id().index()),
            Reference::Argument(arg) => frame.args.get(arg.index()).cloned().unwrap_or(Value::Null),
            Reference::Local(local) => frame
                .locals
                .get(local.index())
                .cloned()
                .unwrap_or(Value::Null),
        }
    }

    fn store(&mut self, frame: &mut Frame<'a>, reference: Reference, value: Value) {
        let slot = match reference {
            Reference::Field(field) if field.is_static() => self.statics.get_mut(field.id().index()),
            Reference::Field(field) => {
                frame.this.set_field(field.id().index(), value);
                return;
            }
            Reference::Argument(arg) => frame.args.get_mut(arg.index()),
            Reference::Local(local) => frame.locals.get_mut(local.index()),
            // Rejected when the body was built.
            Reference::This(_) => None,
        };
        if let Some(slot) = slot {
            *slot = value;
        }
    }

    // Evaluation

    fn eval(&mut self, frame: &Frame<'a>, id: ExprId) -> Result<Value, RuntimeError> {
        let method: &'a MethodEmitter = frame.method;
        let body = method.body();
        let node = body.expr(id).ok_or_else(|| RuntimeError::UnknownExpr {
            method: method.name().to_owned(),
            expr: id.raw(),
        })?;
        match &node.kind {
            ExprKind::Constant(value) => Ok(match value {
                ConstValue::Null(_) => Value::Null,
                ConstValue::Bool(b) => Value::Bool(*b),
                ConstValue::Int32(n) => Value::Int32(*n),
                ConstValue::Str(s) => Value::string(s),
            }),
            ExprKind::Read(reference) => Ok(self.load(frame, *reference)),
            ExprKind::Convert { to, inner, .. } => {
                let value = self.eval(frame, *inner)?;
                if value.is_instance_of(self.pool, *to) {
                    Ok(value)
                } else {
                    Err(RuntimeError::invalid_cast(self.pool, &value, *to))
                }
            }
            ExprKind::Invoke {
                target,
                method,
                args,
            } => {
                let receiver = match target {
                    Some(target) => Some(self.eval(frame, *target)?),
                    None => None,
                };
                let mut values = Args::with_capacity(args.len());
                for &arg in args {
                    values.push(self.eval(frame, arg)?);
                }
                self.dispatch(frame.method.name(), receiver, method, values)
            }
            ExprKind::ArrayElement { array, index } => match self.eval(frame, *array)? {
                Value::Array(data) => {
                    let data = data.borrow();
                    data.items
                        .get(*index as usize)
                        .cloned()
                        .ok_or(RuntimeError::IndexOutOfRange {
                            index: *index,
                            length: data.items.len(),
                        })
                }
                Value::Null => Err(RuntimeError::NullReference {
                    method: frame.method.name().to_owned(),
                }),
                other => Err(RuntimeError::invalid_cast(
                    self.pool,
                    &other,
                    body.type_of(*array).unwrap_or(TypeId::OBJECT),
                )),
            },
            ExprKind::NewArray { length, .. } => Ok(Value::array(
                node.ty,
                vec![Value::Null; *length as usize],
            )),
        }
    }

    fn exec(&mut self, frame: &mut Frame<'a>, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::DeclareLocal(local) => {
                if let Some(slot) = frame.locals.get_mut(local.index()) {
                    *slot = Value::Null;
                }
            }
            Stmt::Assign { target, value } => {
                let value = self.eval(frame, *value)?;
                match *target {
                    AssignTarget::Reference(reference) => self.store(frame, reference, value),
                    AssignTarget::ArrayElement { array, index } => {
                        self.store_element(frame, array, index, value)?;
                    }
                }
            }
            Stmt::Return(None) => return Ok(Flow::Return(Value::Null)),
            Stmt::Return(Some(value)) => return Ok(Flow::Return(self.eval(frame, *value)?)),
            Stmt::Throw { exception, message } => {
                return Err(RuntimeError::Thrown {
                    exception: *exception,
                    name: self.pool.name(*exception).to_owned(),
                    message: message.clone(),
                });
            }
            Stmt::Expr(expr) => {
                self.eval(frame, *expr)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn store_element(
        &self,
        frame: &Frame<'a>,
        array: Reference,
        index: u32,
        value: Value,
    ) -> Result<(), RuntimeError> {
        match self.load(frame, array) {
            Value::Array(data) => {
                let mut data = data.borrow_mut();
                let length = data.items.len();
                let slot = data
                    .items
                    .get_mut(index as usize)
                    .ok_or(RuntimeError::IndexOutOfRange { index, length })?;
                *slot = value;
                Ok(())
            }
            Value::Null => Err(RuntimeError::NullReference {
                method: frame.method.name().to_owned(),
            }),
            other => Err(RuntimeError::invalid_cast(self.pool, &other, array.ty())),
        }
    }
}
