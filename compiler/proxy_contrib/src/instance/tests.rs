use pretty_assertions::assert_eq;
use proxy_ir::{FieldFlags, MethodEmitter, TypeInfo};

use super::*;
use crate::names::{GENERATION_OPTIONS_FIELD, TARGET_FIELD};

struct Fixture {
    pool: TypePool,
    foo: TypeId,
    bar: TypeId,
}

fn fixture() -> Fixture {
    let mut pool = TypePool::new();
    let bar = pool.define(TypeInfo::interface("IBar", "IBar")).unwrap();
    let foo = pool
        .define(
            TypeInfo::class("Foo", "acme.Foo")
                .with_interface(bar)
                .with_attribute(CustomAttribute::new("Serializable"))
                .with_attribute(CustomAttribute::new("DebuggerDisplay").non_inherited()),
        )
        .unwrap();
    Fixture { pool, foo, bar }
}

/// Declare the fields the orchestrator would declare.
fn declare_reserved(class: &mut ClassEmitter, target: Option<TypeId>) {
    class
        .declare_field(INTERCEPTORS_FIELD, TypeId::INTERCEPTOR_ARRAY, false)
        .unwrap();
    class
        .declare_field_with_flags(
            GENERATION_OPTIONS_FIELD,
            TypeId::PROXY_GENERATION_OPTIONS,
            FieldFlags::STATIC,
        )
        .unwrap();
    if let Some(target) = target {
        class.declare_field(TARGET_FIELD, target, true).unwrap();
    }
}

fn class_proxy(fx: &mut Fixture) -> (ClassEmitter, ProxyInstanceContributor) {
    let mut class = ClassEmitter::new(
        &mut fx.pool,
        "FooProxy",
        "acme.FooProxy",
        fx.foo,
        &[TypeId::PROXY_TARGET_ACCESSOR],
    )
    .unwrap();
    declare_reserved(&mut class, Some(fx.foo));
    let contributor = ProxyInstanceContributor::new(
        ProxyKind::Class,
        fx.foo,
        InterfaceSet::new([fx.bar]),
        ProxyTypeId::from("class.with.target"),
    );
    (class, contributor)
}

fn interface_proxy(fx: &mut Fixture, base: TypeId) -> (ClassEmitter, ProxyInstanceContributor) {
    let mut class = ClassEmitter::new(
        &mut fx.pool,
        "IBarProxy",
        "acme.IBarProxy",
        base,
        &[fx.bar, TypeId::PROXY_TARGET_ACCESSOR],
    )
    .unwrap();
    declare_reserved(&mut class, None);
    let contributor = ProxyInstanceContributor::new(
        ProxyKind::Interface,
        fx.bar,
        InterfaceSet::new([fx.bar]),
        ProxyTypeId::from("IF-001"),
    );
    (class, contributor)
}

fn render(class: &ClassEmitter, pool: &TypePool, name: &str) -> String {
    let method = class
        .methods()
        .iter()
        .find(|method| method.name() == name)
        .unwrap();
    method.display(pool, class.fields()).to_string()
}

#[test]
fn accessor_triad_has_the_expected_signatures() {
    let mut fx = fixture();
    let (mut class, contributor) = class_proxy(&mut fx);
    contributor.generate(&mut class, &mut fx.pool).unwrap();

    let get = class.find_method(GET_PROXY_TARGET, &[]).unwrap();
    let set = class
        .find_method(SET_PROXY_TARGET, &[TypeId::OBJECT])
        .unwrap();
    let interceptors = class.find_method(GET_INTERCEPTORS, &[]).unwrap();
    assert_eq!(class.method(get).return_type(), TypeId::OBJECT);
    assert_eq!(class.method(set).return_type(), TypeId::VOID);
    assert_eq!(
        class.method(interceptors).return_type(),
        TypeId::INTERCEPTOR_ARRAY
    );
    assert!(class.methods().iter().all(MethodEmitter::is_finalized));
}

#[test]
fn field_backed_target_is_read_and_stored_through_the_field() {
    let mut fx = fixture();
    let (mut class, contributor) = class_proxy(&mut fx);
    contributor.generate(&mut class, &mut fx.pool).unwrap();

    assert_eq!(
        render(&class, &fx.pool, GET_PROXY_TARGET),
        "fn get_proxy_target() -> object {\n    return (object) __target;\n}"
    );
    assert_eq!(
        render(&class, &fx.pool, SET_PROXY_TARGET),
        "fn set_proxy_target(arg0: object) -> void {\n    __target = (Foo) arg0;\n    return;\n}"
    );
    assert_eq!(
        render(&class, &fx.pool, GET_INTERCEPTORS),
        "fn get_interceptors() -> Interceptor[] {\n    return __interceptors;\n}"
    );
    assert!(class.finish().is_ok());
}

#[test]
fn self_targeting_proxy_throws_on_set() {
    let mut fx = fixture();
    let (mut class, contributor) = interface_proxy(&mut fx, TypeId::OBJECT);
    contributor.generate(&mut class, &mut fx.pool).unwrap();

    assert_eq!(
        render(&class, &fx.pool, GET_PROXY_TARGET),
        "fn get_proxy_target() -> object {\n    return (object) this;\n}"
    );
    assert_eq!(
        render(&class, &fx.pool, SET_PROXY_TARGET),
        format!(
            "fn set_proxy_target(arg0: object) -> void {{\n    throw InvalidOperation({IMMUTABLE_TARGET_MESSAGE:?});\n}}"
        )
    );
    assert!(class.finish().is_ok());
}

#[test]
fn missing_interceptor_field_aborts() {
    let mut fx = fixture();
    let mut class =
        ClassEmitter::new(&mut fx.pool, "FooProxy", "acme.FooProxy", fx.foo, &[]).unwrap();
    let contributor = ProxyInstanceContributor::new(
        ProxyKind::Class,
        fx.foo,
        InterfaceSet::default(),
        ProxyKind::Class.default_type_id(),
    );
    assert_eq!(
        contributor.generate(&mut class, &mut fx.pool),
        Err(BuildError::MissingField {
            owner: "FooProxy".to_owned(),
            name: INTERCEPTORS_FIELD.to_owned(),
        })
    );
    assert!(class.methods().is_empty());
}

#[test]
fn contributing_twice_collides() {
    let mut fx = fixture();
    let (mut class, contributor) = class_proxy(&mut fx);
    contributor.generate(&mut class, &mut fx.pool).unwrap();
    assert!(matches!(
        contributor.generate(&mut class, &mut fx.pool),
        Err(BuildError::DuplicateMember { .. })
    ));
}

#[test]
fn only_non_inheritable_attributes_are_copied() {
    let mut fx = fixture();
    let (mut class, contributor) = class_proxy(&mut fx);
    contributor.generate(&mut class, &mut fx.pool).unwrap();
    let copied: Vec<&str> = class
        .attributes()
        .iter()
        .map(|attr| attr.type_name.as_str())
        .collect();
    assert_eq!(copied, vec!["DebuggerDisplay"]);
}

#[test]
fn collect_phase_selects_nothing() {
    let mut fx = fixture();
    let (_, mut contributor) = class_proxy(&mut fx);
    let mut model = MetaType::new(fx.foo);
    contributor.collect_elements_to_proxy(&crate::InterceptAll, &mut model);
    assert!(model.methods().is_empty());
}

#[cfg(feature = "serialization")]
mod serialization {
    use pretty_assertions::assert_eq;
    use proxy_ir::{ConstValue, ExprKind, Stmt};

    use super::*;

    /// Keys passed to `add_value`, in emission order.
    fn payload_keys(method: &MethodEmitter) -> Vec<String> {
        let body = method.body();
        body.statements()
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Expr(expr) => Some(*expr),
                _ => None,
            })
            .filter_map(|expr| match &body.expr(expr)?.kind {
                ExprKind::Invoke { method, args, .. } if method.name() == well_known::ADD_VALUE => {
                    match &body.expr(args[0])?.kind {
                        ExprKind::Constant(ConstValue::Str(key)) => Some(key.clone()),
                        _ => None,
                    }
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn payload_skips_static_and_non_serialized_fields() {
        let mut fx = fixture();
        let (mut class, contributor) = class_proxy(&mut fx);
        class.declare_field("a", TypeId::INT32, true).unwrap();
        class.declare_field("b", TypeId::INT32, false).unwrap();
        class
            .declare_field_with_flags("c", TypeId::STRING, FieldFlags::STATIC)
            .unwrap();
        contributor.generate(&mut class, &mut fx.pool).unwrap();

        let method = class
            .find_method(
                well_known::GET_OBJECT_DATA,
                &[TypeId::SERIALIZATION_INFO, TypeId::STREAMING_CONTEXT],
            )
            .unwrap();
        let written = payload_keys(class.method(method));
        assert_eq!(
            written,
            vec![
                "__target",
                "a",
                keys::INTERFACES,
                keys::BASE_TYPE,
                keys::PROXY_GENERATION_OPTIONS,
                keys::PROXY_TYPE_ID,
                keys::TARGET_FIELD_TYPE,
            ]
        );
    }

    #[test]
    fn body_registers_reconstruction_type_first() {
        let mut fx = fixture();
        let (mut class, contributor) = class_proxy(&mut fx);
        contributor.generate(&mut class, &mut fx.pool).unwrap();
        let rendered = render(&class, &fx.pool, well_known::GET_OBJECT_DATA);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            &lines[..4],
            &[
                "fn get_object_data(arg0: SerializationInfo, arg1: StreamingContext) -> void {",
                "    let local0: Type;",
                "    local0 = Type::get_type(\"proxy.ProxyObjectReference\", true, false);",
                "    arg0.set_type(local0);",
            ]
        );
        assert!(rendered.contains("    local1[0] = \"IBar\";\n"));
        assert!(rendered.contains("arg0.add_value(\"__baseType\", \"acme.Foo\");"));
        assert!(rendered.contains("arg0.add_value(\"__targetFieldType\", \"acme.Foo\");"));
        assert!(rendered.ends_with("    return;\n}"));
    }

    #[test]
    fn interface_kind_records_the_interface() {
        let mut fx = fixture();
        let (mut class, contributor) = interface_proxy(&mut fx, TypeId::OBJECT);
        contributor.generate(&mut class, &mut fx.pool).unwrap();
        let rendered = render(&class, &fx.pool, well_known::GET_OBJECT_DATA);
        assert!(rendered.contains("arg0.add_value(\"__proxyTypeId\", \"IF-001\");"));
        assert!(rendered.contains("arg0.add_value(\"__theInterface\", \"IBar\");"));
        assert!(rendered.contains("arg0.add_value(\"__delegateToBase\", false);"));
        assert!(!rendered.contains("this.get_object_data"));
    }

    #[test]
    fn serializable_base_is_delegated_to() {
        let mut fx = fixture();
        let base = fx
            .pool
            .define(
                TypeInfo::class("Persisted", "acme.Persisted").with_interface(TypeId::SERIALIZABLE),
            )
            .unwrap();
        let (mut class, contributor) = interface_proxy(&mut fx, base);
        contributor.generate(&mut class, &mut fx.pool).unwrap();
        let rendered = render(&class, &fx.pool, well_known::GET_OBJECT_DATA);
        assert!(rendered.contains("arg0.add_value(\"__delegateToBase\", true);"));
        assert!(rendered.contains("    this.get_object_data(arg0, arg1);\n"));
        assert!(class.finish().is_ok());
    }

    #[test]
    fn missing_options_field_aborts() {
        let mut fx = fixture();
        let mut class =
            ClassEmitter::new(&mut fx.pool, "FooProxy", "acme.FooProxy", fx.foo, &[]).unwrap();
        class
            .declare_field(INTERCEPTORS_FIELD, TypeId::INTERCEPTOR_ARRAY, false)
            .unwrap();
        class.declare_field(TARGET_FIELD, fx.foo, true).unwrap();
        let contributor = ProxyInstanceContributor::new(
            ProxyKind::Class,
            fx.foo,
            InterfaceSet::default(),
            ProxyKind::Class.default_type_id(),
        );
        assert_eq!(
            contributor.generate(&mut class, &mut fx.pool),
            Err(BuildError::MissingField {
                owner: "FooProxy".to_owned(),
                name: GENERATION_OPTIONS_FIELD.to_owned(),
            })
        );
    }
}
