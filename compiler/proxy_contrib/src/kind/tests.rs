use pretty_assertions::assert_eq;
use proxy_ir::{ClassEmitter, TypeInfo};

use super::*;

fn interface_pool() -> (TypePool, TypeId) {
    let mut pool = TypePool::new();
    let bar = pool
        .define(TypeInfo::interface("IBar", "acme.IBar"))
        .unwrap();
    (pool, bar)
}

#[test]
fn interface_kind_targets_the_instance_itself() {
    let (mut pool, bar) = interface_pool();
    let class =
        ClassEmitter::new(&mut pool, "BarProxy", "acme.BarProxy", TypeId::OBJECT, &[bar])
            .unwrap();
    let target = ProxyKind::Interface
        .target_reference(class.view(), &pool, bar)
        .unwrap();
    assert_eq!(target, Reference::This(bar));
    assert!(!target.is_writable());
}

#[test]
fn interface_kind_requires_the_interface_to_be_implemented() {
    let (mut pool, bar) = interface_pool();
    let class =
        ClassEmitter::new(&mut pool, "BarProxy", "acme.BarProxy", TypeId::OBJECT, &[]).unwrap();
    assert_eq!(
        ProxyKind::Interface.target_reference(class.view(), &pool, bar),
        Err(BuildError::TypeMismatch {
            expected: "IBar".to_owned(),
            found: "BarProxy".to_owned(),
        })
    );
}

#[test]
fn class_kind_targets_the_reserved_field() {
    let (mut pool, _) = interface_pool();
    let foo = pool.define(TypeInfo::class("Foo", "acme.Foo")).unwrap();
    let mut class =
        ClassEmitter::new(&mut pool, "FooProxy", "acme.FooProxy", foo, &[]).unwrap();

    assert_eq!(
        ProxyKind::Class.target_reference(class.view(), &pool, foo),
        Err(BuildError::MissingField {
            owner: "FooProxy".to_owned(),
            name: "__target".to_owned(),
        })
    );

    let field = class.declare_field(TARGET_FIELD, foo, true).unwrap();
    let target = ProxyKind::Class
        .target_reference(class.view(), &pool, foo)
        .unwrap();
    assert_eq!(target.as_field(), Some(field));
    assert!(target.is_writable());
}

#[test]
fn default_type_ids_differ_per_kind() {
    assert_ne!(
        ProxyKind::Interface.default_type_id(),
        ProxyKind::Class.default_type_id()
    );
    assert!(ProxyKind::Class.is_field_backed());
    assert!(!ProxyKind::Interface.is_field_backed());
}
