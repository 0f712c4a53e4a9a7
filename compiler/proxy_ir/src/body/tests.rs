use pretty_assertions::assert_eq;

use super::*;
use crate::{well_known, ClassEmitter, FieldFlags};

struct Fixture {
    pool: TypePool,
    foo: TypeId,
    class: ClassEmitter,
}

fn fixture() -> Fixture {
    let mut pool = TypePool::new();
    let foo = pool
        .define(crate::TypeInfo::class("Foo", "acme.Foo"))
        .unwrap();
    let class = ClassEmitter::new(&mut pool, "FooProxy", "acme.FooProxy", foo, &[]).unwrap();
    Fixture { pool, foo, class }
}

#[test]
fn constants_carry_their_types() {
    let mut fx = fixture();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(id).body_mut();
    let s = body.constant("hi").unwrap();
    let b = body.constant(true).unwrap();
    let n = body.constant(7).unwrap();
    let null = body.constant(ConstValue::Null(fx.foo)).unwrap();
    assert_eq!(body.type_of(s), Some(TypeId::STRING));
    assert_eq!(body.type_of(b), Some(TypeId::BOOL));
    assert_eq!(body.type_of(n), Some(TypeId::INT32));
    assert_eq!(body.type_of(null), Some(fx.foo));
}

#[test]
fn convert_between_unrelated_types_fails() {
    let mut fx = fixture();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(id).body_mut();
    let n = body.constant(1).unwrap();
    assert_eq!(
        body.convert(&fx.pool, n, TypeId::STRING),
        Err(BuildError::TypeMismatch {
            expected: "string".to_owned(),
            found: "i32".to_owned(),
        })
    );
    let up = body.convert(&fx.pool, n, TypeId::OBJECT).unwrap();
    let down = body.convert(&fx.pool, up, fx.foo).unwrap();
    assert_eq!(body.type_of(down), Some(fx.foo));
}

#[test]
fn assign_checks_value_against_field_type() {
    let mut fx = fixture();
    let field = fx.class.declare_field("__target", fx.foo, true).unwrap();
    let id = fx
        .class
        .create_method("set", TypeId::VOID, &[TypeId::OBJECT])
        .unwrap();
    let method = fx.class.method_mut(id);
    let arg = method.arguments()[0];
    let body = method.body_mut();

    let raw = body.read(&fx.pool, arg).unwrap();
    assert!(matches!(
        body.assign(&fx.pool, field, raw),
        Err(BuildError::TypeMismatch { .. })
    ));

    let cast = body.convert(&fx.pool, raw, fx.foo).unwrap();
    body.assign(&fx.pool, field, cast).unwrap();
    body.ret(&fx.pool, None).unwrap();
    assert_eq!(body.statements().len(), 2);
}

#[test]
fn this_and_read_only_fields_reject_assignment() {
    let mut fx = fixture();
    let frozen = fx
        .class
        .declare_field_with_flags("__fixed", TypeId::STRING, FieldFlags::READ_ONLY)
        .unwrap();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(id).body_mut();
    let value = body.constant("x").unwrap();
    assert_eq!(
        body.assign(&fx.pool, frozen, value),
        Err(BuildError::NotAssignable {
            method: "m".to_owned()
        })
    );
    let this = body.read(&fx.pool, Reference::This(fx.foo)).unwrap();
    assert_eq!(
        body.assign(&fx.pool, Reference::This(fx.foo), this),
        Err(BuildError::NotAssignable {
            method: "m".to_owned()
        })
    );
}

#[test]
fn return_must_match_signature() {
    let mut fx = fixture();
    let getter = fx
        .class
        .create_method("get", TypeId::OBJECT, &[])
        .unwrap();
    let body = fx.class.method_mut(getter).body_mut();
    assert_eq!(
        body.ret(&fx.pool, None),
        Err(BuildError::TypeMismatch {
            expected: "object".to_owned(),
            found: "void".to_owned(),
        })
    );
    let value = body.constant("s").unwrap();
    body.ret(&fx.pool, Some(value)).unwrap();

    let setter = fx.class.create_method("set", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(setter).body_mut();
    let value = body.constant(1).unwrap();
    assert!(matches!(
        body.ret(&fx.pool, Some(value)),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn throw_requires_an_exception_type() {
    let mut fx = fixture();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(id).body_mut();
    assert!(matches!(
        body.throw(&fx.pool, TypeId::STRING, "nope"),
        Err(BuildError::TypeMismatch { .. })
    ));
    body.throw(&fx.pool, TypeId::INVALID_OPERATION, "no").unwrap();
}

#[test]
fn invoke_checks_receiver_and_arity() {
    let mut fx = fixture();
    let id = fx
        .class
        .create_method(
            well_known::GET_OBJECT_DATA,
            TypeId::VOID,
            &[TypeId::SERIALIZATION_INFO, TypeId::STREAMING_CONTEXT],
        )
        .unwrap();
    let method = fx.class.method_mut(id);
    let info = method.arguments()[0];
    let body = method.body_mut();
    let info = body.read(&fx.pool, info).unwrap();
    let name = body.constant("proxy.ProxyObjectReference").unwrap();
    let yes = body.constant(true).unwrap();
    let no = body.constant(false).unwrap();

    assert_eq!(
        body.invoke(&fx.pool, Some(info), well_known::type_get_type(), &[name, yes, no]),
        Err(BuildError::InvalidInvocation {
            method: "get_type".to_owned(),
            reason: "static method called with a receiver",
        })
    );
    assert_eq!(
        body.invoke(&fx.pool, None, well_known::type_get_type(), &[name, yes]),
        Err(BuildError::ArityMismatch {
            method: "get_type".to_owned(),
            expected: 3,
            found: 2,
        })
    );
    assert!(matches!(
        body.invoke(&fx.pool, None, well_known::type_get_type(), &[yes, yes, no]),
        Err(BuildError::TypeMismatch { .. })
    ));

    let ty = body
        .invoke(&fx.pool, None, well_known::type_get_type(), &[name, yes, no])
        .unwrap();
    assert_eq!(body.type_of(ty), Some(TypeId::TYPE));
    assert!(matches!(
        body.invoke(&fx.pool, None, well_known::info_set_type(), &[ty]),
        Err(BuildError::InvalidInvocation { .. })
    ));
    assert!(matches!(
        body.invoke(&fx.pool, Some(name), well_known::info_set_type(), &[ty]),
        Err(BuildError::TypeMismatch { .. })
    ));
    let call = body
        .invoke(&fx.pool, Some(info), well_known::info_set_type(), &[ty])
        .unwrap();
    body.expr_stmt(&fx.pool, call).unwrap();
}

#[test]
fn arguments_of_other_methods_are_rejected() {
    let mut fx = fixture();
    let first = fx
        .class
        .create_method("first", TypeId::VOID, &[TypeId::OBJECT])
        .unwrap();
    let second = fx
        .class
        .create_method("second", TypeId::VOID, &[TypeId::OBJECT])
        .unwrap();
    let foreign = fx.class.method(first).arguments()[0];
    let body = fx.class.method_mut(second).body_mut();
    assert_eq!(
        body.read(&fx.pool, foreign),
        Err(BuildError::ForeignReference {
            method: "second".to_owned()
        })
    );
}

#[test]
fn expressions_of_other_methods_are_rejected() {
    let mut fx = fixture();
    let a = fx.class.create_method("a", TypeId::VOID, &[]).unwrap();
    let b = fx.class.create_method("b", TypeId::STRING, &[]).unwrap();
    let foreign = fx
        .class
        .method_mut(a)
        .body_mut()
        .constant("from a")
        .unwrap();

    let body = fx.class.method_mut(b).body_mut();
    let local = body.constant(42).unwrap();
    assert_eq!(foreign.raw(), local.raw());
    assert_eq!(body.expr(foreign), None);
    assert_eq!(body.type_of(foreign), None);
    assert_eq!(
        body.ret(&fx.pool, Some(foreign)),
        Err(BuildError::ForeignReference {
            method: "b".to_owned()
        })
    );
    assert!(body.statements().is_empty());
}

#[test]
fn this_must_view_the_generated_type_as_a_supertype() {
    let mut fx = fixture();
    let other = fx
        .pool
        .define(crate::TypeInfo::class("Other", "acme.Other"))
        .unwrap();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(id).body_mut();
    assert!(matches!(
        body.read(&fx.pool, Reference::This(other)),
        Err(BuildError::TypeMismatch { .. })
    ));
    assert!(body.read(&fx.pool, Reference::This(fx.foo)).is_ok());
    assert!(body.read(&fx.pool, Reference::This(TypeId::OBJECT)).is_ok());
}

#[test]
fn unknown_expression_ids_are_rejected() {
    let mut fx = fixture();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(id).body_mut();
    assert_eq!(body.expr(ExprId::new(id, 3)), None);
    assert_eq!(
        body.expr_stmt(&fx.pool, ExprId::new(id, 3)),
        Err(BuildError::UnknownExpr {
            method: "m".to_owned(),
            expr: 3,
        })
    );
}

#[test]
fn arrays_and_locals() {
    let mut fx = fixture();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(id).body_mut();

    let names = body.declare_local(TypeId::STRING_ARRAY).unwrap();
    let array = body.new_array(&mut fx.pool, 2, TypeId::STRING).unwrap();
    assert_eq!(body.type_of(array), Some(TypeId::STRING_ARRAY));
    body.assign(&fx.pool, names, array).unwrap();

    let first = body.constant("acme.IBar").unwrap();
    body.assign_element(&fx.pool, names, 0, first).unwrap();
    let number = body.constant(3).unwrap();
    assert!(matches!(
        body.assign_element(&fx.pool, names, 1, number),
        Err(BuildError::TypeMismatch { .. })
    ));

    let read = body.read(&fx.pool, names).unwrap();
    let element = body.array_element(&fx.pool, read, 0).unwrap();
    assert_eq!(body.type_of(element), Some(TypeId::STRING));
    assert_eq!(
        body.array_element(&fx.pool, first, 0),
        Err(BuildError::NotAnArray("string".to_owned()))
    );
    assert_eq!(body.locals(), &[TypeId::STRING_ARRAY]);
    assert!(matches!(body.statements()[0], Stmt::DeclareLocal(_)));
}

#[test]
fn new_void_array_is_rejected() {
    let mut fx = fixture();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let body = fx.class.method_mut(id).body_mut();
    assert!(body.new_array(&mut fx.pool, 1, TypeId::VOID).is_err());
}

#[test]
fn finalized_body_rejects_every_append() {
    let mut fx = fixture();
    let id = fx.class.create_method("m", TypeId::VOID, &[]).unwrap();
    let method = fx.class.method_mut(id);
    method.body_mut().ret(&fx.pool, None).unwrap();
    method.finalize();
    method.finalize();
    assert!(method.is_finalized());

    let frozen = BuildError::FrozenBody {
        method: "m".to_owned(),
    };
    let body = method.body_mut();
    assert_eq!(body.constant(1), Err(frozen.clone()));
    assert_eq!(body.declare_local(TypeId::OBJECT), Err(frozen.clone()));
    assert_eq!(body.ret(&fx.pool, None), Err(frozen));
    assert_eq!(body.statements().len(), 1);
}
